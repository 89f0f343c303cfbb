//! Cycle orchestration and simulation entry points.
//!
//! A cycle is carburizing → diffusion → final hold, followed by a depth
//! measurement. The run stops at the first cycle whose depth reaches the
//! target, at the first cycle with a stalled phase, or at the cycle cap.
//!
//! Continuation rule: the next cycle starts from the state left by the
//! *diffusion* phase, not the final hold. The final-hold excursion only
//! feeds the depth measurement and the reported hold time. Shop recipes are
//! calibrated against this handoff; it changes every cycle after the first.

use cf_core::{Length, Real, Time, mm, s};
use tracing::{debug, info};

use crate::constants::MAX_CYCLES;
use crate::depth::{DepthEstimate, EffectiveDepthEstimator};
use crate::layers::{LayerField, external_flux};
use crate::params::ProcessParameters;
use crate::phase::{PhaseOutcome, PhaseConfig, run_phase};
use crate::stepper::DiffusionStepper;

/// Elapsed seconds and cycle counter of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationClock {
    total_time: u64,
    step: usize,
}

impl SimulationClock {
    pub fn total_time(&self) -> u64 {
        self.total_time
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub(crate) fn tick(&mut self) {
        self.total_time += 1;
    }

    fn next_cycle(&mut self) {
        self.step += 1;
    }
}

/// Phase durations and resulting case depth of one cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleResult {
    pub carb_seconds: u64,
    pub diff_seconds: u64,
    pub final_seconds: u64,
    pub effective_depth_mm: Real,
}

impl CycleResult {
    pub fn carb_time(&self) -> Time {
        s(self.carb_seconds as Real)
    }

    pub fn diff_time(&self) -> Time {
        s(self.diff_seconds as Real)
    }

    pub fn final_time(&self) -> Time {
        s(self.final_seconds as Real)
    }

    pub fn effective_depth(&self) -> Length {
        mm(self.effective_depth_mm)
    }
}

/// Full record of one cycle, diagnostics included.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleRecord {
    /// 1-based cycle number
    pub cycle: usize,
    pub result: CycleResult,
    pub carburizing: PhaseOutcome,
    pub diffusion: PhaseOutcome,
    pub final_hold: PhaseOutcome,
    pub depth: DepthEstimate,
    /// Surface concentration after the final hold (%)
    pub surface_carbon: Real,
    /// Deepest settled layer at the end of the cycle
    pub layer_max: usize,
    /// Seconds elapsed in the run so far, all phases included
    pub total_time_s: u64,
}

impl CycleRecord {
    pub fn truncated(&self) -> bool {
        self.carburizing.truncated || self.diffusion.truncated || self.final_hold.truncated
    }

    pub fn stalled(&self) -> bool {
        self.carburizing.stalled || self.diffusion.stalled || self.final_hold.stalled
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The last cycle's depth reached the target.
    TargetReached,
    /// The cycle cap was hit first; the results are partial.
    CycleCap,
    /// A phase hit its time limit without meeting its stop condition. Every
    /// later cycle would do the same, so the run ends there.
    PhaseStalled,
}

/// Everything a run produced.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationReport {
    pub cycles: Vec<CycleRecord>,
    pub total_time_s: u64,
    pub layer_max: usize,
    pub stop_reason: StopReason,
    /// Concentration profile after the last final hold, surface slot first
    pub profile: Vec<Real>,
}

impl SimulationReport {
    pub fn results(&self) -> Vec<CycleResult> {
        self.cycles.iter().map(|c| c.result).collect()
    }

    pub fn final_depth_mm(&self) -> Option<Real> {
        self.cycles.last().map(|c| c.result.effective_depth_mm)
    }

    pub fn any_truncated(&self) -> bool {
        self.cycles.iter().any(CycleRecord::truncated)
    }

    pub fn any_degenerate_depth(&self) -> bool {
        self.cycles.iter().any(|c| c.depth.degenerate)
    }
}

/// Run the full multi-cycle simulation and return one result per cycle.
pub fn simulate(params: &ProcessParameters) -> Vec<CycleResult> {
    simulate_detailed(params).results()
}

/// Run the simulation and keep every diagnostic.
pub fn simulate_detailed(params: &ProcessParameters) -> SimulationReport {
    simulate_with_progress(params, None)
}

/// Run the simulation, handing each finished cycle to `progress_cb`.
pub fn simulate_with_progress(
    params: &ProcessParameters,
    mut progress_cb: Option<&mut dyn FnMut(&CycleRecord)>,
) -> SimulationReport {
    let stepper = DiffusionStepper::for_temperature(params.temperature);
    let carburizing = PhaseConfig::carburizing(params, external_flux(params.carbon_flow));
    let diffusion = PhaseConfig::diffusion(params);
    let final_hold = PhaseConfig::final_hold(params);
    let depth_estimator = EffectiveDepthEstimator::new(params.eff_carbon);

    let mut field = LayerField::new(params.initial_carbon);
    let mut clock = SimulationClock::default();
    let mut cycles = Vec::new();
    let mut stop_reason = StopReason::CycleCap;

    debug!(
        diffusion_factor = stepper.diffusion_factor(),
        external_flux = carburizing.external_flux,
        target_depth_mm = params.target_depth,
        "starting carburizing simulation"
    );

    while clock.step() < MAX_CYCLES {
        let carb = run_phase(&carburizing, &stepper, &mut field, &mut clock);
        let carb_snapshot = field.snapshot();

        field.restore_active(&carb_snapshot);
        let diff = run_phase(&diffusion, &stepper, &mut field, &mut clock);
        let diff_snapshot = field.snapshot();

        field.restore_active(&diff_snapshot);
        let hold = run_phase(&final_hold, &stepper, &mut field, &mut clock);

        let depth = depth_estimator.estimate(&field);
        let record = CycleRecord {
            cycle: clock.step() + 1,
            result: CycleResult {
                carb_seconds: carb.seconds,
                diff_seconds: diff.seconds,
                final_seconds: hold.seconds,
                effective_depth_mm: depth.depth_mm,
            },
            carburizing: carb,
            diffusion: diff,
            final_hold: hold,
            depth,
            surface_carbon: field.surface(),
            layer_max: field.current_layer_max(),
            total_time_s: clock.total_time(),
        };

        debug!(
            cycle = record.cycle,
            carb_s = carb.seconds,
            diff_s = diff.seconds,
            final_s = hold.seconds,
            depth_mm = depth.depth_mm,
            surface = record.surface_carbon,
            layer_max = record.layer_max,
            "cycle complete"
        );

        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(&record);
        }
        let stalled = record.stalled();
        cycles.push(record);

        if depth.depth_mm >= params.target_depth {
            stop_reason = StopReason::TargetReached;
            break;
        }
        if stalled {
            stop_reason = StopReason::PhaseStalled;
            break;
        }
        if clock.step() >= MAX_CYCLES - 1 {
            break;
        }

        // Next cycle resumes from the post-diffusion state.
        field.restore_active(&diff_snapshot);
        clock.next_cycle();
    }

    info!(
        cycles = cycles.len(),
        total_time_s = clock.total_time(),
        stop_reason = ?stop_reason,
        "simulation finished"
    );

    SimulationReport {
        cycles,
        total_time_s: clock.total_time(),
        layer_max: field.current_layer_max(),
        stop_reason,
        profile: field.values().to_vec(),
    }
}
