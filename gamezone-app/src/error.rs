//! Error types for the application shell.

use gamezone_client::ConfigError;
use gamezone_core::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Failed to encode view: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
    #[error("Usage: {0}")]
    Usage(String),
    #[error("Login failed for {0}")]
    LoginFailed(String),
}

pub type AppResult<T> = Result<T, AppError>;
