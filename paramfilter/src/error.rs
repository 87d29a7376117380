//! Error types.
//!
//! Only [`ConfigError`] ever reaches a caller. [`CoercionError`] and
//! [`DelegateError`] are produced at the engine's seams and absorbed there: a
//! failed coercion counts as "no match", a failed delegate triggers manual
//! filtering.

use thiserror::Error;

/// A key or value could not be turned into text for pattern matching.
#[derive(Debug, Error)]
#[error("cannot coerce `{type_name}` to a string: {reason}")]
pub struct CoercionError {
    type_name: &'static str,
    reason: String,
}

impl CoercionError {
    /// Creates an error for a value of type `type_name`.
    pub fn new(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            type_name,
            reason: reason.into(),
        }
    }

    /// Name of the type that refused coercion.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Failure reported by a host-supplied delegate filter.
#[derive(Debug, Error)]
pub enum DelegateError {
    /// The delegate rejected the input or failed internally.
    #[error("delegate filter failed: {0}")]
    Failed(String),
    /// The delegate panicked while filtering.
    #[error("delegate filter panicked: {0}")]
    Panicked(String),
    /// Wraps an arbitrary error raised inside the delegate.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl DelegateError {
    /// Shorthand for [`DelegateError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the config schema.
    #[error("invalid request log configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A limit was configured as zero.
    #[error("`{0}` must be greater than zero")]
    ZeroLimit(&'static str),
}
