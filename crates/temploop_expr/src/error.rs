//! Error types for expression evaluation.

use thiserror::Error;

/// Result type alias for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors that can occur while evaluating intrinsic functions.
#[derive(Error, Debug)]
pub enum ExprError {
    #[error("Invalid argument to {function}: {message}")]
    Validation { function: String, message: String },

    #[error("Invalid short-form pattern for {function}: {source}")]
    Pattern {
        function: String,
        #[source]
        source: regex::Error,
    },
}

impl ExprError {
    /// Build a validation error for the given function.
    pub fn validation(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            function: function.into(),
            message: message.into(),
        }
    }
}
