//! Run reports: identity, summary totals and serialization.

use std::path::Path;

use cf_core::{format_hms, s};
use cf_recipe::RecipeStep;
use cf_sim::{CycleRecord, ProcessParameters, SimulationReport, StopReason};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::case_compile::{CompiledCase, ThresholdSource};
use crate::error::{AppError, AppResult};

/// Engine version mixed into every run id.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Totals over a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub cycles: usize,
    pub total_carb_s: u64,
    /// Sum of diffusion times plus the last final hold
    pub total_diff_s: u64,
    /// Every simulated second, discarded final holds included
    pub total_time_s: u64,
    pub final_depth_mm: Option<f64>,
    pub layer_max: usize,
    pub truncated: bool,
    pub degenerate_depth: bool,
}

impl RunSummary {
    pub fn from_simulation(sim: &SimulationReport) -> Self {
        let last_final = sim
            .cycles
            .last()
            .map(|c| c.result.final_seconds)
            .unwrap_or(0);
        Self {
            cycles: sim.cycles.len(),
            total_carb_s: sim.cycles.iter().map(|c| c.result.carb_seconds).sum(),
            total_diff_s: sim
                .cycles
                .iter()
                .map(|c| c.result.diff_seconds)
                .sum::<u64>()
                + last_final,
            total_time_s: sim.total_time_s,
            final_depth_mm: sim.final_depth_mm(),
            layer_max: sim.layer_max,
            truncated: sim.any_truncated(),
            degenerate_depth: sim.any_degenerate_depth(),
        }
    }

    pub fn total_carb_hms(&self) -> String {
        format_hms(s(self.total_carb_s as f64))
    }

    pub fn total_diff_hms(&self) -> String {
        format_hms(s(self.total_diff_s as f64))
    }

    pub fn total_time_hms(&self) -> String {
        format_hms(s(self.total_time_s as f64))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    /// RFC 3339, UTC
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    pub threshold: ThresholdSource,
    pub parameters: ProcessParameters,
    pub stop_reason: StopReason,
    pub summary: RunSummary,
    /// The recipe to program: every cycle, final hold on the last one only
    pub recipe: Vec<RecipeStep>,
    pub cycles: Vec<CycleRecord>,
}

/// Deterministic id of a run: SHA-256 over the case id, the parameters and
/// the engine version.
pub fn compute_run_id(case_id: Option<&str>, params: &ProcessParameters) -> String {
    let mut hasher = Sha256::new();

    hasher.update(case_id.unwrap_or("").as_bytes());

    let params_json = serde_json::to_string(params).unwrap_or_default();
    hasher.update(params_json.as_bytes());

    hasher.update(ENGINE_VERSION.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

fn recipe_from(cycles: &[CycleRecord]) -> Vec<RecipeStep> {
    let last = cycles.len().saturating_sub(1);
    cycles
        .iter()
        .enumerate()
        .map(|(i, c)| RecipeStep {
            carb_seconds: c.result.carb_seconds,
            diff_seconds: c.result.diff_seconds,
            final_seconds: (i == last).then_some(c.result.final_seconds),
        })
        .collect()
}

pub fn build_report(
    case: Option<&CompiledCase>,
    params: &ProcessParameters,
    sim: SimulationReport,
) -> RunReport {
    let case_id = case.map(|c| c.id.clone());
    RunReport {
        run_id: compute_run_id(case_id.as_deref(), params),
        created_at: chrono::Utc::now().to_rfc3339(),
        case_name: case.map(|c| c.name.clone()),
        case_id,
        threshold: case.map(|c| c.threshold).unwrap_or(ThresholdSource::Explicit),
        parameters: *params,
        stop_reason: sim.stop_reason,
        summary: RunSummary::from_simulation(&sim),
        recipe: recipe_from(&sim.cycles),
        cycles: sim.cycles,
    }
}

pub fn report_to_json(report: &RunReport) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn report_to_yaml(report: &RunReport) -> AppResult<String> {
    Ok(serde_yaml::to_string(report)?)
}

/// Write a report; `.yaml`/`.yml` gives YAML, anything else JSON.
pub fn write_report(path: &Path, report: &RunReport) -> AppResult<()> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let content = if is_yaml {
        report_to_yaml(report)?
    } else {
        report_to_json(report)?
    };
    std::fs::write(path, content).map_err(|e| AppError::ReportWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
