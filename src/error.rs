//! Domain-specific error types for decision-lab

use serde_json::json;
use thiserror::Error;

/// Main error type for the decision-lab service
#[derive(Error, Debug)]
pub enum DecisionLabError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DecisionLabError {
    /// HTTP status code the error maps to at the API boundary
    pub fn status_code(&self) -> u16 {
        match self {
            DecisionLabError::InvalidParams { .. } => 400,
            _ => 500,
        }
    }

    /// Message without the category prefix; this is what API clients see
    pub fn message(&self) -> &str {
        match self {
            DecisionLabError::Config { message }
            | DecisionLabError::Transport { message }
            | DecisionLabError::InvalidParams { message }
            | DecisionLabError::Internal { message } => message,
        }
    }

    /// JSON body used by the HTTP layer for failed requests
    pub fn to_body(&self) -> serde_json::Value {
        json!({ "success": false, "error": self.message() })
    }
}

/// Result type alias for decision-lab operations
pub type Result<T> = std::result::Result<T, DecisionLabError>;
