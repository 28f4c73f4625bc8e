//! Command line interface for simplebench
//!
//! Parses flags, resolves configuration and runs a benchmark definition
//! that receives its suite explicitly. Binaries with their own definitions
//! call [`run_main`] with their name table.

pub mod commands;
pub mod demos;
pub mod execute;

pub use commands::Cli;
pub use demos::DEFINITIONS;
pub use execute::{
    execute, find_definition, resolve_config, run_main, run_with_args, Definition,
};
