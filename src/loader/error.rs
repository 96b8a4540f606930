//! Error types for the loader.
//!
//! Every failure here is non-fatal to the page: configuration errors surface
//! to the caller before a pass starts, host and pass errors are contained at
//! the conductor's step boundary.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// A denylist rule that could not be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A rule with an empty pattern would match every candidate.
    #[error("denylist rule `{0}` has an empty pattern")]
    EmptyPattern(String),
    #[error("unrecognized denylist rule `{0}`")]
    Unrecognized(String),
    #[error("failed to compile substring matcher: {0}")]
    Matcher(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("visibility threshold {0} is outside 0..=1")]
    InvalidThreshold(f64),
    #[error("placeholder class must not be empty")]
    EmptyPlaceholderClass,
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Failure reported by the page host (a thrown JS exception, or a missing primitive).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host call `{call}` failed: {message}")]
    Call { call: &'static str, message: String },
    #[error("host capability `{0}` is unavailable")]
    Unsupported(&'static str),
}

impl HostError {
    pub fn call(call: &'static str, message: impl Into<String>) -> Self {
        HostError::Call {
            call,
            message: message.into(),
        }
    }
}

/// Failure of a single pass step. Never aborts the remaining steps.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PassError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("step `{step}` skipped: {reason}")]
    Skipped { step: &'static str, reason: String },
}

impl From<ConfigError> for JsValue {
    fn from(err: ConfigError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<FilterError> for JsValue {
    fn from(err: FilterError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
