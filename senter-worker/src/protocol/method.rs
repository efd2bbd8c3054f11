use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

pub const SENTER: &str = "senter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Senter,
    Unknown,
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s {
            SENTER => Method::Senter,
            _ => Method::Unknown,
        }
    }
}

impl From<&Value> for Method {
    fn from(v: &Value) -> Self {
        v.as_str().map(Method::from).unwrap_or(Method::Unknown)
    }
}

/// Reply given to a method outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownMethodPolicy {
    /// `{"id": .., "result": null}`, as existing callers expect.
    #[default]
    Null,
    /// `{"id": .., "error": "unknown method: .."}`.
    Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported unknown-method policy '{0}' (expected null or error)")]
pub struct UnsupportedPolicy(pub String);

impl FromStr for UnknownMethodPolicy {
    type Err = UnsupportedPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "null" => Ok(UnknownMethodPolicy::Null),
            "error" => Ok(UnknownMethodPolicy::Error),
            other => Err(UnsupportedPolicy(other.to_string())),
        }
    }
}
