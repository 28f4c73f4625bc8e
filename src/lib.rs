//! simplebench - a duration-budgeted microbenchmark harness
//!
//! Each registered test body is called in a loop for a fixed time budget,
//! completed iterations are counted and turned into operations per second,
//! and tests can be ranked against each other inside their group. Tests run
//! strictly one at a time on a single-threaded cooperative scheduler.
//!
//! ```no_run
//! use simplebench::{Config, Done, Suite};
//!
//! # async fn demo() -> simplebench::Result<()> {
//! let mut config = Config::default();
//! config.suite.compare = true;
//!
//! let data = vec![1u64, 2, 3, 4, 5];
//! let mut suite = Suite::new(config);
//! suite.add("sum", move |done: Done| {
//!     std::hint::black_box(data.iter().sum::<u64>());
//!     done.complete();
//! });
//!
//! let result = suite.run().await?;
//! print!("{}", simplebench::report::render(&result));
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod logging;

// Engine
pub mod body;
pub mod registry;
pub mod runner;
pub mod stats;
pub mod suite;

// Output and command line
pub mod cli;
pub mod persistence;
pub mod report;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;

// Public API exports
pub use body::{AsyncBody, BodyResult, Done, TestBody};
pub use config::{Config, ConfigOverrides};
pub use error::{BodyError, Result, SimpleBenchError};
pub use registry::{TestRegistry, DEFAULT_GROUP};
pub use runner::TimedLoop;
pub use stats::{RankedResult, TestStats};
pub use suite::{HostInfo, Skip, Suite, SuiteResult, SuiteResults};
