//! Configuration management for simplebench
//!
//! A [`Config`] is resolved once, before a suite is built: defaults first,
//! then a TOML file, then `SIMPLEBENCH_*` environment variables, then command
//! line flags. Every layer is expressed as a [`ConfigOverrides`] whose fields
//! are all optional; [`Config::resolve`] applies them and validates the result.

use crate::error::{Result, SimpleBenchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default time budget per test, in milliseconds
pub const DEFAULT_DURATION_MS: u64 = 1000;

/// Default number of completed invocations between scheduler yields
pub const DEFAULT_BOUNCE_EVERY: u64 = 1000;

/// Default result filename template
pub const DEFAULT_SAVE_FILENAME: &str = "{root}-{date}.json";

/// Prefix of the environment variables read by [`ConfigOverrides::from_env`]
pub const ENV_PREFIX: &str = "SIMPLEBENCH_";

/// Fully resolved harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub suite: SuiteConfig,
    pub save: SaveConfig,
    pub logging: LoggingConfig,
}

/// Settings that drive test execution and ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Time budget per test, always in microseconds
    pub duration_us: u64,
    /// Periodically yield to the scheduler during a test's loop
    pub bounce: bool,
    /// Completed invocations between yields when `bounce` is set
    pub bounce_every: u64,
    /// Compute a winner and percentage differences
    pub compare: bool,
    /// Echo the resolved configuration before running
    pub log_args: bool,
}

/// Where and whether results are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveConfig {
    pub enabled: bool,
    /// Directory the result file is written into
    pub path: PathBuf,
    /// Substituted for `{root}` in the filename template
    pub file_root: String,
    /// Filename template, supports `{root}` and `{date}`
    pub filename: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = SimpleBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(SimpleBenchError::config(
                format!("Invalid log format: {s}"),
                "logging.format",
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            suite: SuiteConfig::default(),
            save: SaveConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            duration_us: DEFAULT_DURATION_MS * 1000,
            bounce: false,
            bounce_every: DEFAULT_BOUNCE_EVERY,
            compare: false,
            log_args: false,
        }
    }
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("."),
            file_root: "simplebench".to_string(),
            filename: DEFAULT_SAVE_FILENAME.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl SuiteConfig {
    /// Per-test budget as a [`Duration`]
    pub fn duration(&self) -> Duration {
        Duration::from_micros(self.duration_us)
    }
}

impl Config {
    /// Apply override layers in order (later layers win) and validate
    pub fn resolve<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = ConfigOverrides>,
    {
        let mut config = Config::default();
        for layer in layers {
            layer.apply_to(&mut config);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every resolved configuration must hold
    pub fn validate(&self) -> Result<()> {
        if self.suite.duration_us == 0 {
            return Err(SimpleBenchError::config(
                "duration must be greater than zero",
                "suite.duration",
            ));
        }
        if self.suite.bounce_every == 0 {
            return Err(SimpleBenchError::config(
                "bounce_every must be greater than zero",
                "suite.bounce_every",
            ));
        }
        if self.save.file_root.trim().is_empty() {
            return Err(SimpleBenchError::config(
                "save file root cannot be empty",
                "save.file_root",
            ));
        }
        if self.save.filename.trim().is_empty() {
            return Err(SimpleBenchError::config(
                "save filename template cannot be empty",
                "save.filename",
            ));
        }
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(SimpleBenchError::config(
                format!("Invalid log level: {other}"),
                "logging.level",
            )),
        }
    }
}

/// One layer of optional settings. Durations are given in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub duration: Option<u64>,
    pub bounce: Option<bool>,
    pub bounce_every: Option<u64>,
    pub compare: Option<bool>,
    pub save: Option<bool>,
    pub save_path: Option<PathBuf>,
    pub save_file_root: Option<String>,
    pub save_filename: Option<String>,
    pub log_args: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl ConfigOverrides {
    /// Load overrides from a TOML file with flat keys (`duration = 250`)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SimpleBenchError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
            field: None,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse overrides from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SimpleBenchError::ConfigError {
            message: format!("Invalid config file: {e}"),
            field: None,
        })
    }

    /// Read `SIMPLEBENCH_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build overrides from `(name, value)` pairs; names without the
    /// `SIMPLEBENCH_` prefix are ignored
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = ConfigOverrides::default();
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match name {
                "DURATION" => overrides.duration = Some(parse_number(value, "duration")?),
                "BOUNCE" => overrides.bounce = Some(parse_bool(value, "bounce")?),
                "BOUNCE_EVERY" => {
                    overrides.bounce_every = Some(parse_number(value, "bounce_every")?)
                }
                "COMPARE" => overrides.compare = Some(parse_bool(value, "compare")?),
                "SAVE" => overrides.save = Some(parse_bool(value, "save")?),
                "SAVE_PATH" => overrides.save_path = Some(PathBuf::from(value)),
                "SAVE_FILE_ROOT" => overrides.save_file_root = Some(value.to_string()),
                "SAVE_FILENAME" => overrides.save_filename = Some(value.to_string()),
                "LOG_ARGS" => overrides.log_args = Some(parse_bool(value, "log_args")?),
                "LOG_LEVEL" => overrides.log_level = Some(value.to_string()),
                "LOG_FORMAT" => overrides.log_format = Some(value.parse()?),
                _ => {
                    return Err(SimpleBenchError::config(
                        format!("Unknown environment variable {}", key.as_ref()),
                        name.to_lowercase(),
                    ))
                }
            }
        }
        Ok(overrides)
    }

    /// Write every set field into `config`
    pub fn apply_to(self, config: &mut Config) {
        if let Some(ms) = self.duration {
            config.suite.duration_us = ms.saturating_mul(1000);
        }
        if let Some(bounce) = self.bounce {
            config.suite.bounce = bounce;
        }
        if let Some(every) = self.bounce_every {
            config.suite.bounce_every = every;
        }
        if let Some(compare) = self.compare {
            config.suite.compare = compare;
        }
        if let Some(log_args) = self.log_args {
            config.suite.log_args = log_args;
        }
        if let Some(save) = self.save {
            config.save.enabled = save;
        }
        if let Some(path) = self.save_path {
            config.save.path = path;
        }
        if let Some(root) = self.save_file_root {
            config.save.file_root = root;
        }
        if let Some(filename) = self.save_filename {
            config.save.filename = filename;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

fn parse_bool(value: &str, field: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SimpleBenchError::config(
            format!("Expected a boolean for {field}, got '{value}'"),
            field,
        )),
    }
}

fn parse_number(value: &str, field: &str) -> Result<u64> {
    value.parse().map_err(|_| {
        SimpleBenchError::config(
            format!("Expected a non-negative integer for {field}, got '{value}'"),
            field,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.suite.duration_us, 1_000_000);
        assert_eq!(config.suite.duration(), Duration::from_secs(1));
        assert!(!config.suite.bounce);
        assert_eq!(config.suite.bounce_every, 1000);
        assert!(!config.suite.compare);
        assert!(!config.suite.log_args);
        assert!(!config.save.enabled);
        assert_eq!(config.save.filename, "{root}-{date}.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duration_is_stored_in_microseconds() {
        let config = Config::resolve([ConfigOverrides {
            duration: Some(100),
            ..Default::default()
        }])
        .unwrap();
        assert_eq!(config.suite.duration_us, 100_000);
    }

    #[test]
    fn test_later_layers_win() {
        let file = ConfigOverrides {
            duration: Some(250),
            compare: Some(true),
            ..Default::default()
        };
        let cli = ConfigOverrides {
            duration: Some(50),
            ..Default::default()
        };
        let config = Config::resolve([file, cli]).unwrap();
        assert_eq!(config.suite.duration_us, 50_000);
        assert!(config.suite.compare);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = Config::resolve([ConfigOverrides {
            duration: Some(0),
            ..Default::default()
        }])
        .unwrap_err();
        assert!(matches!(
            err,
            SimpleBenchError::ConfigError { field: Some(ref f), .. } if f == "suite.duration"
        ));

        let err = Config::resolve([ConfigOverrides {
            bounce_every: Some(0),
            ..Default::default()
        }])
        .unwrap_err();
        assert!(err.is_config_error());

        let err = Config::resolve([ConfigOverrides {
            log_level: Some("loud".to_string()),
            ..Default::default()
        }])
        .unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_overrides_from_toml() {
        let overrides = ConfigOverrides::from_toml_str(
            r#"
duration = 250
bounce = true
bounce_every = 10
log_format = "Json"
"#,
        )
        .unwrap();
        assert_eq!(overrides.duration, Some(250));
        assert_eq!(overrides.bounce, Some(true));
        assert_eq!(overrides.bounce_every, Some(10));
        assert_eq!(overrides.log_format, Some(LogFormat::Json));
        assert_eq!(overrides.compare, None);
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        let err = ConfigOverrides::from_toml_str("durration = 5").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_overrides_from_vars() {
        let vars = vec![
            ("SIMPLEBENCH_DURATION", "20"),
            ("SIMPLEBENCH_COMPARE", "yes"),
            ("SIMPLEBENCH_LOG_FORMAT", "pretty"),
            ("PATH", "/usr/bin"),
        ];
        let overrides = ConfigOverrides::from_vars(vars).unwrap();
        assert_eq!(overrides.duration, Some(20));
        assert_eq!(overrides.compare, Some(true));
        assert_eq!(overrides.log_format, Some(LogFormat::Pretty));
    }

    #[test]
    fn test_bad_env_values() {
        let err = ConfigOverrides::from_vars([("SIMPLEBENCH_BOUNCE", "maybe")]).unwrap_err();
        assert!(matches!(
            err,
            SimpleBenchError::ConfigError { field: Some(ref f), .. } if f == "bounce"
        ));

        let err = ConfigOverrides::from_vars([("SIMPLEBENCH_DURATION", "-5")]).unwrap_err();
        assert!(err.is_config_error());

        let err = ConfigOverrides::from_vars([("SIMPLEBENCH_SPEED", "11")]).unwrap_err();
        assert!(err.to_string().contains("SIMPLEBENCH_SPEED"));
    }

    #[test]
    fn test_from_process_env() {
        let _guard = crate::test_utils::GLOBAL_ENV_TEST_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let original = crate::test_utils::clean_simplebench_env();

        std::env::set_var("SIMPLEBENCH_BOUNCE", "true");
        std::env::set_var("SIMPLEBENCH_BOUNCE_EVERY", "64");
        let overrides = ConfigOverrides::from_env();

        crate::test_utils::restore_env(original);

        let overrides = overrides.unwrap();
        assert_eq!(overrides.bounce, Some(true));
        assert_eq!(overrides.bounce_every, Some(64));
        assert_eq!(overrides.duration, None);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
