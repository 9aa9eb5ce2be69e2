//! Error types for the scheduling core

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A rebuild is already in progress")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AppError {
    /// Text shown to the user through the interaction presenter.
    ///
    /// Business failures reported by the backend are passed through verbatim,
    /// transport failures are collapsed into a generic retry hint.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::BusinessRule(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Backend(msg) => format!("Could not reach the booking service: {}", msg),
            AppError::Http(e) if e.is_timeout() => {
                "The booking service did not answer in time, please retry".to_string()
            }
            AppError::Http(_) => "Could not reach the booking service, please retry".to_string(),
            AppError::Busy => "Still loading, please wait".to_string(),
            AppError::Config(e) => format!("Invalid configuration: {}", e),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
