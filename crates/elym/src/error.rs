//! Builder errors
//!
//! Only construction and the lookup factories fail; every other operation
//! degrades to a no-op or an empty read.

/// Result type for fallible builder operations
pub type ElymResult<T> = Result<T, ElymError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElymError {
    /// Markup did not yield a usable root element
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A selector matched nothing, or a node no longer exists
    #[error("not found: {0}")]
    NotFound(String),
}
