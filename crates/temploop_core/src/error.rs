//! Error types for the expansion engine.

use thiserror::Error;

use temploop_expr::ExprError;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that abort a transformation.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Parameter [{0}] is not defined")]
    UndefinedParameter(String),

    #[error("Resource [{resource}] does not have 'Metadata.{key}' attribute")]
    MissingDirective { resource: String, key: String },

    #[error("Invalid type of '{key}' attribute on resource [{resource}]: {found}")]
    InvalidDirectiveType {
        resource: String,
        key: String,
        found: String,
    },

    #[error("Iteration directive of resource [{resource}] resolved to a {found}, expected a sequence")]
    NonSequenceDirective { resource: String, found: String },

    #[error("Invalid fragment: {0}")]
    InvalidFragment(String),

    #[error("Expanded resource name [{0}] collides with another resource")]
    DuplicateResource(String),

    #[error("Expression error: {0}")]
    Expression(#[from] ExprError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
