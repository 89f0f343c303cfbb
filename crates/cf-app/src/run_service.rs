//! Run execution service.

use std::path::Path;
use std::time::Instant;

use cf_sim::{CycleRecord, ProcessParameters, simulate_with_progress};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::case_compile::{CompiledCase, compile_case};
use crate::error::AppResult;
use crate::progress::{CycleProgress, RunProgressEvent, RunStage};
use crate::project_service;
use crate::report::{RunReport, build_report};

/// Request to run one case of a case file.
pub struct RunRequest<'a> {
    pub case_file_path: &'a Path,
    pub case_id: &'a str,
}

/// Result of one case in a batch.
#[derive(Debug)]
pub struct CaseOutcome {
    pub case_id: String,
    pub result: AppResult<RunReport>,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    case_id: Option<&str>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    cycle: Option<CycleProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            case_id: case_id.map(str::to_string),
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            cycle,
        });
    }
}

pub fn run_case(request: &RunRequest) -> AppResult<RunReport> {
    run_case_with_progress(request, None)
}

/// Load, compile and run one case, streaming progress events.
pub fn run_case_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunReport> {
    let started = Instant::now();
    let case_id = Some(request.case_id);

    emit_progress(
        &mut progress_cb,
        case_id,
        RunStage::LoadingCaseFile,
        started,
        Some("Loading case file".to_string()),
        None,
    );
    let file = project_service::load_case_file(request.case_file_path)?;
    let case = project_service::get_case(&file, request.case_id)?;

    emit_progress(
        &mut progress_cb,
        case_id,
        RunStage::Compiling,
        started,
        None,
        None,
    );
    let compiled = compile_case(case)?;

    Ok(execute(Some(&compiled), &compiled.params, started, progress_cb))
}

/// Run an already compiled case.
pub fn run_compiled(
    case: &CompiledCase,
    progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> RunReport {
    execute(Some(case), &case.params, Instant::now(), progress_cb)
}

/// Ad-hoc run of raw parameters, no case file involved.
pub fn run_parameters(
    params: &ProcessParameters,
    progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunReport> {
    params.validate()?;
    Ok(execute(None, params, Instant::now(), progress_cb))
}

fn execute(
    case: Option<&CompiledCase>,
    params: &ProcessParameters,
    started: Instant,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> RunReport {
    let case_id = case.map(|c| c.id.as_str());

    if params.hold_below_core() {
        warn!(
            case = case_id.unwrap_or("-"),
            carbon_min = params.carbon_min,
            carbon_final = params.carbon_final,
            initial_carbon = params.initial_carbon,
            "hold threshold below core carbon; the phase will hit its time limit"
        );
    }

    emit_progress(
        &mut progress_cb,
        case_id,
        RunStage::Simulating,
        started,
        Some(format!("Target depth {} mm", params.target_depth)),
        None,
    );

    let target = params.target_depth;
    let mut on_cycle = |record: &CycleRecord| {
        let depth = record.result.effective_depth_mm;
        let fraction = if target > 0.0 { depth / target } else { 1.0 };
        emit_progress(
            &mut progress_cb,
            case_id,
            RunStage::Simulating,
            started,
            None,
            Some(CycleProgress {
                cycle: record.cycle,
                depth_mm: depth,
                target_depth_mm: target,
                fraction_complete: fraction.clamp(0.0, 1.0),
                sim_time_s: record.total_time_s,
                truncated: record.truncated(),
            }),
        );
    };
    let sim = simulate_with_progress(params, Some(&mut on_cycle));

    if sim.any_truncated() {
        warn!(
            case = case_id.unwrap_or("-"),
            stop_reason = ?sim.stop_reason,
            "phase safety limit reached; phase times are partial"
        );
    }

    emit_progress(
        &mut progress_cb,
        case_id,
        RunStage::BuildingReport,
        started,
        None,
        None,
    );
    let report = build_report(case, params, sim);

    info!(
        case = case_id.unwrap_or("-"),
        run_id = %report.run_id,
        cycles = report.summary.cycles,
        wall_s = started.elapsed().as_secs_f64(),
        "run complete"
    );
    emit_progress(
        &mut progress_cb,
        case_id,
        RunStage::Completed,
        started,
        None,
        None,
    );

    report
}

/// Run every case of a case file in parallel. Outcomes keep file order; a
/// case that fails to compile does not stop the others.
pub fn run_all_cases(case_file_path: &Path) -> AppResult<Vec<CaseOutcome>> {
    let file = project_service::load_case_file(case_file_path)?;

    let outcomes = file
        .cases
        .par_iter()
        .map(|case| CaseOutcome {
            case_id: case.id.clone(),
            result: compile_case(case).map(|compiled| run_compiled(&compiled, None)),
        })
        .collect();

    Ok(outcomes)
}
