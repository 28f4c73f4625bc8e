//! simplebench binary
//!
//! Runs one of the built-in benchmark definitions by name

use simplebench::cli::{run_main, DEFINITIONS};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = run_main(DEFINITIONS).await;
    std::process::exit(code);
}
