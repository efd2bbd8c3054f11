use std::path::PathBuf;

use thiserror::Error;

use crate::protocol::UnknownMethodPolicy;
use crate::services::segmenter::{Language, SegmenterConfig, DEFAULT_MAX_LENGTH};
use crate::worker::DEFAULT_MAX_LINE_BYTES;

pub const LANGUAGE_VAR: &str = "SENTER_LANGUAGE";
pub const ABBREVIATIONS_VAR: &str = "SENTER_ABBREVIATIONS";
pub const MAX_LENGTH_VAR: &str = "SENTER_MAX_LENGTH";
pub const UNKNOWN_METHOD_VAR: &str = "SENTER_UNKNOWN_METHOD";
pub const MAX_LINE_BYTES_VAR: &str = "SENTER_MAX_LINE_BYTES";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub segmenter: SegmenterConfig,
    pub unknown_methods: UnknownMethodPolicy,
    pub max_line_bytes: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            unknown_methods: UnknownMethodPolicy::default(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let language = match get(LANGUAGE_VAR) {
            Some(v) => v.parse::<Language>().map_err(|e| invalid(LANGUAGE_VAR, e))?,
            None => Language::default(),
        };

        let max_length = match get(MAX_LENGTH_VAR) {
            Some(v) => positive(MAX_LENGTH_VAR, &v)?,
            None => DEFAULT_MAX_LENGTH,
        };

        let max_line_bytes = match get(MAX_LINE_BYTES_VAR) {
            Some(v) => positive(MAX_LINE_BYTES_VAR, &v)?,
            None => DEFAULT_MAX_LINE_BYTES,
        };

        let unknown_methods = match get(UNKNOWN_METHOD_VAR) {
            Some(v) => v
                .parse::<UnknownMethodPolicy>()
                .map_err(|e| invalid(UNKNOWN_METHOD_VAR, e))?,
            None => UnknownMethodPolicy::default(),
        };

        Ok(WorkerConfig {
            segmenter: SegmenterConfig {
                language,
                abbreviations_file: get(ABBREVIATIONS_VAR).map(PathBuf::from),
                max_length,
            },
            unknown_methods,
            max_line_bytes,
        })
    }
}

fn positive(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.parse::<usize>() {
        Ok(0) => Err(invalid(var, "must be greater than zero")),
        Ok(n) => Ok(n),
        Err(e) => Err(invalid(var, e)),
    }
}

fn invalid(var: &'static str, message: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        message: message.to_string(),
    }
}
