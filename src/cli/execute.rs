//! Command line execution flow
//!
//! Resolves the configuration from all layers, hands a fresh [`Suite`] to
//! the benchmark definition, runs it, prints the report and saves the result
//! when asked to. [`run_main`] wraps the whole flow for binaries that ship
//! their own definitions.

use crate::cli::commands::Cli;
use crate::config::{Config, ConfigOverrides};
use crate::error::{Result, SimpleBenchError};
use crate::logging::LoggingSystem;
use crate::persistence;
use crate::report;
use crate::suite::{Suite, SuiteResult};
use clap::Parser;
use std::ffi::OsString;
use std::io::Write;
use tracing::{error, info};

/// A benchmark definition: registers tests on the suite it is given
pub type Definition = fn(&mut Suite) -> Result<()>;

/// Exit status for configuration and usage errors
pub const EXIT_USAGE: i32 = 2;
/// Exit status for a failed run
pub const EXIT_FAILURE: i32 = 1;

/// Look up a definition by target name
pub fn find_definition(definitions: &[(&str, Definition)], name: &str) -> Result<Definition> {
    definitions
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, definition)| *definition)
        .ok_or_else(|| SimpleBenchError::ConfigError {
            message: format!(
                "unknown benchmark '{name}', available: {}",
                definitions
                    .iter()
                    .map(|(n, _)| *n)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            field: Some("target".to_string()),
        })
}

/// Parse the process arguments, run the selected definition and report to
/// stdout. Returns the process exit status.
pub async fn run_main(definitions: &[(&str, Definition)]) -> i32 {
    run_with_args(std::env::args_os(), definitions, &mut std::io::stdout()).await
}

/// [`run_main`] with explicit arguments and output
pub async fn run_with_args<I, T, W>(
    args: I,
    definitions: &[(&str, Definition)],
    out: &mut W,
) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return e.exit_code();
        }
    };

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_USAGE;
        }
    };

    if let Err(e) = LoggingSystem::new(config.logging.clone()).initialize() {
        eprintln!("Error: {e}");
        return EXIT_USAGE;
    }

    let definition = match find_definition(definitions, &cli.target) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_USAGE;
        }
    };

    match execute(config, definition, out).await {
        Ok(_) => 0,
        Err(e) => {
            error!("Benchmark run failed: {}", e);
            eprintln!("Error: {e}");
            if e.is_config_error() {
                EXIT_USAGE
            } else {
                EXIT_FAILURE
            }
        }
    }
}

/// Resolve configuration: defaults, then target-derived values, then the
/// `--config` file, then `SIMPLEBENCH_*` variables, then flags
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let env = ConfigOverrides::from_env()?;
    resolve_config_with_env(cli, env)
}

/// Same as [`resolve_config`] with an explicit environment layer
pub fn resolve_config_with_env(cli: &Cli, env: ConfigOverrides) -> Result<Config> {
    let target = ConfigOverrides {
        save_file_root: Some(cli.target.clone()),
        ..Default::default()
    };
    let file = match &cli.config {
        Some(path) => ConfigOverrides::from_file(path)?,
        None => ConfigOverrides::default(),
    };

    Config::resolve([target, file, env, cli.overrides()])
}

/// Build a suite from `config`, let `define` register tests, run it and
/// report to `out`
pub async fn execute<F, W>(config: Config, define: F, out: &mut W) -> Result<SuiteResult>
where
    F: FnOnce(&mut Suite) -> Result<()>,
    W: Write,
{
    if config.suite.log_args {
        writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
    }

    let mut suite = Suite::new(config);
    define(&mut suite)?;
    info!(
        tests = suite.registry().test_count(),
        skipped = suite.registry().skipped_count(),
        "benchmark definition loaded"
    );

    let result = suite.run().await?;
    report::write_report(&result, out)?;

    if result.config.save.enabled {
        let path = persistence::save_results(&result, &result.config.save).await?;
        writeln!(out, "Saved results to {}", path.display())?;
    }

    Ok(result)
}
