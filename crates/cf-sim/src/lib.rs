//! Carburizing diffusion engine for carbflow.
//!
//! Provides:
//! - Layered carbon-concentration field with an extrapolated surface slot
//! - Explicit per-layer diffusion stepper
//! - One phase runner shared by carburizing, diffusion and final hold
//! - Multi-cycle orchestration with snapshot/restore handoff between phases
//! - Effective case-depth estimation by threshold search + interpolation

pub mod constants;
pub mod cycle;
pub mod depth;
pub mod error;
pub mod layers;
pub mod params;
pub mod phase;
pub mod stepper;

pub use cycle::{
    CycleRecord, CycleResult, SimulationClock, SimulationReport, StopReason, simulate,
    simulate_detailed, simulate_with_progress,
};
pub use depth::{DepthEstimate, EffectiveDepthEstimator};
pub use error::{SimError, SimResult};
pub use layers::{LayerField, LayerSnapshot, diffusion_factor, external_flux};
pub use params::ProcessParameters;
pub use phase::{PhaseKind, PhaseOutcome, PhaseConfig, StopWhen, run_phase};
pub use stepper::DiffusionStepper;
