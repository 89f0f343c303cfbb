//! Shared application service layer for carbflow.
//!
//! Centralizes case file handling, case compilation, run execution,
//! reporting and recipe prediction for the CLI.

pub mod case_compile;
pub mod error;
pub mod predict_service;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod report;
pub mod run_service;

pub use case_compile::{CompiledCase, ThresholdSource, compile_case};
pub use error::{AppError, AppResult};
pub use predict_service::predict_recipe;
pub use progress::{CycleProgress, RunProgressEvent, RunStage};
pub use project_service::{
    CaseSummary, get_case, list_cases, load_case_file, save_case_file, validate_case_file,
};
pub use query::{CycleRow, cycle_reaching, cycle_rows, depth_series};
pub use report::{RunReport, RunSummary, build_report, compute_run_id, write_report};
pub use run_service::{
    CaseOutcome, RunRequest, run_all_cases, run_case, run_case_with_progress, run_compiled,
    run_parameters,
};
