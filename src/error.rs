use serde_json::Value;
use thiserror::Error;

use crate::dialect::DialectId;

/// Main error type for Nimbus operations
#[derive(Error, Debug)]
pub enum NimbusError {
    /// The query text is not valid JSON, or its root is not an object
    #[error("Malformed query input: {message}")]
    MalformedInput {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// No recognized clause is reachable from the query root
    #[error("Unsupported query format: {raw}")]
    UnsupportedQueryFormat { raw: Value },

    #[error("No dialect registered for {0}")]
    UnknownDialect(DialectId),

    #[error("Document missing string '{field}' field")]
    MissingIdField { field: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Nimbus operations
pub type Result<T> = std::result::Result<T, NimbusError>;

impl NimbusError {
    /// Wrap a JSON decode failure of the query text
    pub fn malformed_json(err: serde_json::Error) -> Self {
        NimbusError::MalformedInput {
            message: "query text is not valid JSON".to_string(),
            source: Some(err),
        }
    }

    /// Report a query root that decoded to something other than an object
    pub fn malformed_root(found: &Value) -> Self {
        NimbusError::MalformedInput {
            message: format!("query root must be a JSON object, got {}", json_type_name(found)),
            source: None,
        }
    }

    /// Whether this error was raised while translating query text
    pub fn is_translation_error(&self) -> bool {
        matches!(
            self,
            NimbusError::MalformedInput { .. } | NimbusError::UnsupportedQueryFormat { .. }
        )
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
