//! Error types for the configuration store.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced to collaborators through the path-addressed API.
///
/// These indicate collaborator misuse (reading an undefined option,
/// treating a scalar as a list) and are propagated, never swallowed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A segment of the dotted path does not exist.
    #[error("no option at '{path}'")]
    PathNotFound { path: String },

    /// An intermediate segment of the path resolves to a leaf value.
    #[error("'{path}' is not a section")]
    NotASection { path: String },

    /// A set-semantics helper was called on an option that is not a list.
    #[error("'{path}' is not a list")]
    NotAList { path: String },

    /// A typed getter found a value of another type.
    #[error("'{path}' is not a {expected}")]
    TypeMismatch { path: String, expected: &'static str },
}

/// Failure to convert a loaded value to the type of its default.
///
/// Raised by the coercion engine and caught by the per-key merge loop in
/// `read`; it never crosses the store's public boundary.
#[derive(Debug, Error)]
#[error("cannot convert {value} to {target}")]
pub struct CoercionError {
    /// The offending value, as loaded.
    pub value: Value,
    /// Name of the target type, taken from the default.
    pub target: &'static str,
}

/// Result type for store operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
