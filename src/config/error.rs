//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Refinement question budget must be at least 1")]
    InvalidRefineBudget,

    #[error("Session idle timeout must be positive")]
    InvalidIdleTimeout,

    #[error("Dataset path must not be a directory")]
    DatasetPathIsDirectory,
}
