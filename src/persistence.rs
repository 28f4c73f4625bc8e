//! Result persistence
//!
//! Writes a [`SuiteResult`] as pretty-printed JSON. The file name comes from
//! the configured template, where `{root}` is the file root and `{date}` the
//! run timestamp.

use crate::config::SaveConfig;
use crate::error::{Result, SimpleBenchError};
use crate::suite::SuiteResult;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::info;

/// Format used for the `{date}` placeholder
pub const DATE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Expand the filename template
pub fn render_filename(template: &str, root: &str, timestamp: &DateTime<Utc>) -> String {
    template
        .replace("{root}", root)
        .replace("{date}", &timestamp.format(DATE_FORMAT).to_string())
}

/// Full path the result of a run at `timestamp` is written to
pub fn result_path(save: &SaveConfig, timestamp: &DateTime<Utc>) -> PathBuf {
    save.path
        .join(render_filename(&save.filename, &save.file_root, timestamp))
}

/// Serialize `result` and write it under `save`, creating directories as
/// needed. Returns the written path.
pub async fn save_results(result: &SuiteResult, save: &SaveConfig) -> Result<PathBuf> {
    let path = result_path(save, &result.timestamp);
    let json = serde_json::to_string_pretty(result)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SimpleBenchError::PersistenceError {
                message: format!("Failed to create result directory: {e}"),
                path: parent.to_path_buf(),
                source: Some(Box::new(e)),
            })?;
    }

    tokio::fs::write(&path, json)
        .await
        .map_err(|e| SimpleBenchError::PersistenceError {
            message: format!("Failed to write results: {e}"),
            path: path.clone(),
            source: Some(Box::new(e)),
        })?;

    info!("Results saved to {:?}", path);
    Ok(path)
}
