//! Content error types

use thiserror::Error;

/// Errors raised by content operations that take caller-chosen parameters.
///
/// The core conversions never fail on malformed documents; these cover
/// requests that cannot be interpreted at all.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Channel name must not be empty")]
    EmptyChannel,

    #[error("Preview variables must be an object")]
    InvalidVariables,

    #[error("Content serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;
