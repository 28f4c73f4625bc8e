//! Structured logging setup for simplebench
//!
//! Installs a global tracing subscriber according to [`LoggingConfig`].
//! Logs go to stderr so that reports printed on stdout stay clean.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Result, SimpleBenchError};
use tracing::{warn, Level};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Logging system manager holding the configuration it was built from
#[derive(Debug)]
pub struct LoggingSystem {
    config: LoggingConfig,
}

impl LoggingSystem {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Install the global subscriber. A subscriber that is already set
    /// (common in tests) is left in place.
    pub fn initialize(&self) -> Result<()> {
        let env_filter = self.env_filter()?;

        let installed = match self.config.format {
            LogFormat::Json => Registry::default()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_current_span(false)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_target(true),
                )
                .try_init(),
            LogFormat::Pretty => Registry::default()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_target(true)
                        .with_file(false)
                        .with_line_number(false),
                )
                .try_init(),
            LogFormat::Compact => Registry::default()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_target(false),
                )
                .try_init(),
        };

        if let Err(e) = installed {
            warn!(
                "Failed to initialize tracing subscriber (may already be set): {}",
                e
            );
        }
        Ok(())
    }

    /// Filter built from the configured level; `RUST_LOG` directives still
    /// apply on top of it
    pub fn env_filter(&self) -> Result<EnvFilter> {
        let level = parse_log_level(&self.config.level)?;
        Ok(EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy())
    }
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(SimpleBenchError::config(
            format!("Invalid log level: {level_str}"),
            "logging.level",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert!(parse_log_level("chatty").is_err());
    }

    #[test]
    fn test_initialize_twice_is_harmless() {
        let system = LoggingSystem::new(LoggingConfig::default());
        assert!(system.initialize().is_ok());
        assert!(system.initialize().is_ok());
    }

    #[test]
    fn test_invalid_level_fails_initialization() {
        let system = LoggingSystem::new(LoggingConfig {
            level: "shout".to_string(),
            format: LogFormat::Json,
        });
        assert!(system.initialize().is_err());
    }
}
