//! Unified error handling for the adapter
//!
//! Every transport-calling component translates upstream failures into this
//! taxonomy before returning; no raw HTTP or decode error crosses the crate
//! boundary unwrapped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error type for all adapter operations
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The upstream reports the request as unauthenticated
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A record or object is absent upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// The upstream rejected a supplied value
    #[error("Validation error: {0}")]
    Validation(String),

    /// The upstream forbids the operation
    #[error("Permission error: {0}")]
    Permission(String),

    /// The remote endpoint is unreachable or answered with garbage
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request exceeded the transport deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A requested object or field name is unknown to the discovered schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// A caller-supplied payload is not the expected shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AdapterError {
    fn from(error: serde_json::Error) -> Self {
        AdapterError::Serialization(error.to_string())
    }
}

/// Result type alias for operations that can result in an AdapterError
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Machine-readable tag of an [`AdapterError`] variant, for callers that
/// classify failures without parsing display strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    NotFound,
    Validation,
    Permission,
    Connection,
    Timeout,
    Schema,
    MalformedInput,
    Serialization,
}

impl AdapterError {
    /// The taxonomy tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Authentication(_) => ErrorKind::Authentication,
            AdapterError::NotFound(_) => ErrorKind::NotFound,
            AdapterError::Validation(_) => ErrorKind::Validation,
            AdapterError::Permission(_) => ErrorKind::Permission,
            AdapterError::Connection(_) => ErrorKind::Connection,
            AdapterError::Timeout(_) => ErrorKind::Timeout,
            AdapterError::Schema(_) => ErrorKind::Schema,
            AdapterError::MalformedInput(_) => ErrorKind::MalformedInput,
            AdapterError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

impl AdapterError {
    /// Translate a non-2xx HTTP status into a taxonomy variant.
    pub fn from_status(status: u16, message: &str) -> Self {
        let message = message.to_string();
        match status {
            401 => AdapterError::Authentication(message),
            403 => AdapterError::Permission(message),
            404 => AdapterError::NotFound(message),
            400 | 422 => AdapterError::Validation(message),
            _ => AdapterError::Connection(format!("HTTP {}: {}", status, message)),
        }
    }

    /// Translate a decoded GraphQL `errors` array into a taxonomy variant.
    ///
    /// Classification prefers the machine-readable extension code of the
    /// first error; message heuristics are the fallback for servers that
    /// omit codes. Unclassifiable errors are reported as validation
    /// failures since they describe a rejected request, not a dead wire.
    pub fn from_graphql_errors(errors: &[Value]) -> Self {
        let messages: Vec<String> = errors
            .iter()
            .filter_map(|e| e.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        let message = if messages.is_empty() {
            "GraphQL request failed".to_string()
        } else {
            messages.join("; ")
        };

        let code = errors
            .first()
            .and_then(|e| e.pointer("/extensions/code"))
            .and_then(Value::as_str)
            .unwrap_or("");

        match code {
            "UNAUTHENTICATED" => return AdapterError::Authentication(message),
            "FORBIDDEN" => return AdapterError::Permission(message),
            "NOT_FOUND" => return AdapterError::NotFound(message),
            "BAD_USER_INPUT" | "BAD_REQUEST" => return AdapterError::Validation(message),
            _ => {}
        }

        let lowered = message.to_lowercase();
        if lowered.contains("unauthenticated") || lowered.contains("unauthorized") {
            AdapterError::Authentication(message)
        } else if lowered.contains("forbidden") {
            AdapterError::Permission(message)
        } else if lowered.contains("not found") {
            AdapterError::NotFound(message)
        } else {
            AdapterError::Validation(message)
        }
    }
}
