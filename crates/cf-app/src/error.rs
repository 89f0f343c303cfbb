//! Error types for the cf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and gives the CLI one error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Case file error: {0}")]
    Project(String),

    #[error("Failed to write report: {path}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Prediction error: {0}")]
    Recipe(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cf_project::ProjectError> for AppError {
    fn from(err: cf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<cf_sim::SimError> for AppError {
    fn from(err: cf_sim::SimError) -> Self {
        AppError::InvalidParameters(err.to_string())
    }
}

impl From<cf_recipe::RecipeError> for AppError {
    fn from(err: cf_recipe::RecipeError) -> Self {
        AppError::Recipe(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
