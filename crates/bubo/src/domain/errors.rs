//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Integration unavailable: {0}")]
    Unavailable(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    /// Validation failure for a named tool input field.
    pub fn invalid_input(tool: &str, detail: impl std::fmt::Display) -> Self {
        Self::Validation(format!("invalid input for {}: {}", tool, detail))
    }
}
