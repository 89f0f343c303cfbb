//! Query helpers for finished run reports.

use crate::error::{AppError, AppResult};
use crate::report::RunReport;

/// One printable row per cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRow {
    pub cycle: usize,
    pub carb_s: u64,
    pub diff_s: u64,
    pub final_s: u64,
    pub depth_mm: f64,
    pub surface_carbon: f64,
    pub elapsed_s: u64,
    pub truncated: bool,
}

pub fn cycle_rows(report: &RunReport) -> Vec<CycleRow> {
    report
        .cycles
        .iter()
        .map(|c| CycleRow {
            cycle: c.cycle,
            carb_s: c.result.carb_seconds,
            diff_s: c.result.diff_seconds,
            final_s: c.result.final_seconds,
            depth_mm: c.result.effective_depth_mm,
            surface_carbon: c.surface_carbon,
            elapsed_s: c.total_time_s,
            truncated: c.truncated(),
        })
        .collect()
}

/// Case depth against elapsed simulated time, one point per cycle.
pub fn depth_series(report: &RunReport) -> Vec<(u64, f64)> {
    report
        .cycles
        .iter()
        .map(|c| (c.total_time_s, c.result.effective_depth_mm))
        .collect()
}

/// First cycle (1-based) whose depth reaches `depth_mm`.
pub fn cycle_reaching(report: &RunReport, depth_mm: f64) -> AppResult<Option<usize>> {
    if !depth_mm.is_finite() {
        return Err(AppError::InvalidParameters(format!(
            "depth must be finite, got {}",
            depth_mm
        )));
    }
    Ok(report
        .cycles
        .iter()
        .find(|c| c.result.effective_depth_mm >= depth_mm)
        .map(|c| c.cycle))
}
