//! Case file loading, saving, validation, and introspection.

use std::path::Path;

use cf_project::schema::{CaseDef, CaseFile};
use tracing::warn;

use crate::error::{AppError, AppResult};

/// Summary of a case for listing.
#[derive(Debug, Clone)]
pub struct CaseSummary {
    pub id: String,
    pub name: String,
    pub target_depth_mm: Option<f64>,
    pub temperature_c: Option<f64>,
    pub hardness_value: Option<f64>,
}

/// Load a case file (YAML or JSON by extension), migrated and validated.
pub fn load_case_file(path: &Path) -> AppResult<CaseFile> {
    let file = cf_project::load(path)?;
    for warning in collect_warnings(&file) {
        warn!(file = %path.display(), "{warning}");
    }
    Ok(file)
}

pub fn save_case_file(path: &Path, file: &CaseFile) -> AppResult<()> {
    cf_project::save(path, file)?;
    Ok(())
}

/// Validate a case file and return its non-fatal warnings.
pub fn validate_case_file(file: &CaseFile) -> AppResult<Vec<String>> {
    cf_project::validate_case_file(file).map_err(cf_project::ProjectError::from)?;
    Ok(collect_warnings(file))
}

fn collect_warnings(file: &CaseFile) -> Vec<String> {
    file.cases
        .iter()
        .flat_map(cf_project::case_warnings)
        .collect()
}

pub fn list_cases(file: &CaseFile) -> Vec<CaseSummary> {
    file.cases
        .iter()
        .map(|case| CaseSummary {
            id: case.id.clone(),
            name: case.name.clone(),
            target_depth_mm: case.process.target_depth_mm,
            temperature_c: case.process.temperature_c,
            hardness_value: case.hardness_value,
        })
        .collect()
}

/// Get a specific case by ID.
pub fn get_case<'a>(file: &'a CaseFile, case_id: &str) -> AppResult<&'a CaseDef> {
    file.case(case_id)
        .ok_or_else(|| AppError::CaseNotFound(case_id.to_string()))
}
