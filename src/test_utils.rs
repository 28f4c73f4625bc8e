//! Test utilities for simplebench
//!
//! Helpers for tests that touch `SIMPLEBENCH_*` environment variables, so
//! they do not leak settings into each other.

use crate::config::ENV_PREFIX;
use std::collections::HashMap;
use std::env;
use std::sync::Mutex;

/// Serializes all tests that read or write the process environment
pub static GLOBAL_ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

/// Remove every `SIMPLEBENCH_` variable, returning the original values
pub fn clean_simplebench_env() -> HashMap<String, String> {
    let original: HashMap<String, String> = env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();

    for key in original.keys() {
        env::remove_var(key);
    }

    original
}

/// Drop any `SIMPLEBENCH_` variables set by a test and put back the originals
pub fn restore_env(original: HashMap<String, String>) {
    for (key, _) in env::vars() {
        if key.starts_with(ENV_PREFIX) {
            env::remove_var(&key);
        }
    }

    for (key, value) in original {
        env::set_var(key, value);
    }
}
