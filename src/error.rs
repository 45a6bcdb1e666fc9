//! Error types for the Gmail MCP HTTP server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Gmail MCP HTTP server
#[derive(Error, Debug)]
pub enum ServerError {
    /// Credential verification errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Gmail API errors
    #[error("Gmail API error: {0}")]
    Gmail(#[from] GmailApiError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Credential verification errors
///
/// Every failed verification collapses to a fixed (status, message) pair that
/// is returned verbatim as the HTTP response for the denied request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl AuthError {
    /// A 401 rejection with the given message
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AuthError::Rejected {
            status: 401,
            message: message.into(),
        }
    }

    /// HTTP status to return for this rejection
    pub fn status(&self) -> u16 {
        match self {
            AuthError::Rejected { status, .. } => *status,
        }
    }
}

/// Gmail API errors
#[derive(Error, Debug)]
pub enum GmailApiError {
    #[error("Message not found: {message_id}")]
    MessageNotFound { message_id: String },

    #[error("API request failed: {message}")]
    RequestFailed { message: String },
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// The execution context carried no access token. A caller configuration
    /// error, surfaced before any network call.
    #[error("Missing Gmail access token")]
    MissingCredential,

    /// A downstream call failed; wrapped once with the operation name, never
    /// retried.
    #[error("Failed to {operation}: {message}")]
    OperationFailed { operation: String, message: String },
}

impl ToolError {
    /// Wrap a downstream failure with the name of the operation that hit it
    pub fn operation(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ToolError::OperationFailed {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;
