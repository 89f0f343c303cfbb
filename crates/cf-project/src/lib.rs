//! cf-project: case file format, migration and validation.

pub mod migrate;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, case_warnings, validate_case_file};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Unknown case file format: {path}")]
    UnknownFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<CaseFile> {
    let content = std::fs::read_to_string(path)?;
    let file: CaseFile = serde_yaml::from_str(&content)?;
    finish_load(file)
}

pub fn save_yaml(path: &Path, file: &CaseFile) -> ProjectResult<()> {
    validate_case_file(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<CaseFile> {
    let content = std::fs::read_to_string(path)?;
    let file: CaseFile = serde_json::from_str(&content)?;
    finish_load(file)
}

pub fn save_json(path: &Path, file: &CaseFile) -> ProjectResult<()> {
    validate_case_file(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` is JSON, `.yaml`/`.yml` is YAML.
pub fn load(path: &Path) -> ProjectResult<CaseFile> {
    match extension(path).as_deref() {
        Some("json") => load_json(path),
        Some("yaml" | "yml") => load_yaml(path),
        _ => Err(ProjectError::UnknownFormat {
            path: path.display().to_string(),
        }),
    }
}

pub fn save(path: &Path, file: &CaseFile) -> ProjectResult<()> {
    match extension(path).as_deref() {
        Some("json") => save_json(path, file),
        Some("yaml" | "yml") => save_yaml(path, file),
        _ => Err(ProjectError::UnknownFormat {
            path: path.display().to_string(),
        }),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn finish_load(file: CaseFile) -> ProjectResult<CaseFile> {
    let file = migrate_to_latest(file)?;
    validate_case_file(&file)?;
    Ok(file)
}
