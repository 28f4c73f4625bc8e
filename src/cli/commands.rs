//! CLI argument definitions using clap

use crate::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

/// simplebench command line
#[derive(Parser, Debug, Clone)]
#[command(name = "simplebench")]
#[command(about = "Run a benchmark definition for a fixed time budget per test")]
#[command(version)]
pub struct Cli {
    /// Benchmark definition to run
    pub target: String,

    /// Time budget per test in milliseconds
    #[arg(long, value_name = "MS")]
    pub duration: Option<u64>,

    /// Periodically yield to the scheduler during a test's loop
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub bounce: Option<bool>,

    /// Completed invocations between yields when bouncing
    #[arg(long, value_name = "N")]
    pub bounce_every: Option<u64>,

    /// Pick a winner and report percentage differences
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub compare: Option<bool>,

    /// Write the results to a JSON file
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub save: Option<bool>,

    /// Directory results are written into
    #[arg(long, value_name = "DIR")]
    pub save_path: Option<PathBuf>,

    /// Result filename template; `{root}` and `{date}` are substituted
    #[arg(long, value_name = "TEMPLATE")]
    pub save_filename: Option<String>,

    /// Print the resolved configuration before running
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub log_args: Option<bool>,

    /// TOML file with default options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Overrides given explicitly on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            duration: self.duration,
            bounce: self.bounce,
            bounce_every: self.bounce_every,
            compare: self.compare,
            save: self.save,
            save_path: self.save_path.clone(),
            save_file_root: None,
            save_filename: self.save_filename.clone(),
            log_args: self.log_args,
            log_level: self.log_level.clone(),
            log_format: None,
        }
    }
}
