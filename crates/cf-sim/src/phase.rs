//! Phase runner shared by carburizing, diffusion and final hold.
//!
//! Each simulated second walks the stack from layer 1 downward, feeding the
//! internal delta of one layer in as the external delta of the next. The
//! second settles once the walk reaches the settled high-water mark and the
//! delta has died out. After every settled second the phase checks its stop
//! predicate against the surface slot.
//!
//! A walk that reaches the last sublayer without settling ends the phase
//! early and marks it truncated. So does a phase whose surface never meets
//! its stop predicate within `max_seconds`; that one is also marked stalled.

use cf_core::Real;
use tracing::warn;

use crate::constants::{CONVERGENCE_THRESHOLD, MAX_LAYERS, MAX_PHASE_SECONDS};
use crate::cycle::SimulationClock;
use crate::layers::LayerField;
use crate::params::ProcessParameters;
use crate::stepper::DiffusionStepper;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseKind {
    Carburizing,
    Diffusion,
    FinalHold,
}

impl PhaseKind {
    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Carburizing => "carburizing",
            PhaseKind::Diffusion => "diffusion",
            PhaseKind::FinalHold => "final-hold",
        }
    }
}

/// Surface condition that ends a phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StopWhen {
    SurfaceAtLeast(Real),
    SurfaceAtMost(Real),
}

impl StopWhen {
    #[inline]
    pub fn is_met(self, surface: Real) -> bool {
        match self {
            StopWhen::SurfaceAtLeast(limit) => surface >= limit,
            StopWhen::SurfaceAtMost(limit) => surface <= limit,
        }
    }
}

/// Configuration of one phase: how much carbon enters layer 1 each second
/// and when to stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseConfig {
    pub kind: PhaseKind,
    pub external_flux: Real,
    pub stop: StopWhen,
    /// Safety limit on settled seconds
    pub max_seconds: u64,
}

impl PhaseConfig {
    pub fn carburizing(params: &ProcessParameters, external_flux: Real) -> Self {
        Self {
            kind: PhaseKind::Carburizing,
            external_flux,
            stop: StopWhen::SurfaceAtLeast(params.carbon_max),
            max_seconds: MAX_PHASE_SECONDS,
        }
    }

    pub fn diffusion(params: &ProcessParameters) -> Self {
        Self {
            kind: PhaseKind::Diffusion,
            external_flux: 0.0,
            stop: StopWhen::SurfaceAtMost(params.carbon_min),
            max_seconds: MAX_PHASE_SECONDS,
        }
    }

    pub fn final_hold(params: &ProcessParameters) -> Self {
        Self {
            kind: PhaseKind::FinalHold,
            external_flux: 0.0,
            stop: StopWhen::SurfaceAtMost(params.carbon_final),
            max_seconds: MAX_PHASE_SECONDS,
        }
    }

    pub fn with_max_seconds(mut self, max_seconds: u64) -> Self {
        self.max_seconds = max_seconds;
        self
    }
}

/// What a phase did: whole seconds elapsed, and whether a safety limit cut
/// it short.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseOutcome {
    pub kind: PhaseKind,
    pub seconds: u64,
    /// Ended by the layer ceiling or the time limit
    pub truncated: bool,
    /// Ended by the time limit; the stop predicate is out of reach
    pub stalled: bool,
}

/// Run one phase to completion on `field`, advancing `clock` by every
/// settled second.
pub fn run_phase(
    config: &PhaseConfig,
    stepper: &DiffusionStepper,
    field: &mut LayerField,
    clock: &mut SimulationClock,
) -> PhaseOutcome {
    let mut seconds = 0_u64;

    loop {
        let mut layer = 1;
        let mut external_delta = config.external_flux;

        loop {
            let internal_delta = stepper.step(field, layer, external_delta);

            if layer >= field.current_layer_max() && internal_delta < CONVERGENCE_THRESHOLD {
                field.settle_at(layer);
                seconds += 1;
                clock.tick();

                if config.stop.is_met(field.surface()) {
                    return PhaseOutcome {
                        kind: config.kind,
                        seconds,
                        truncated: false,
                        stalled: false,
                    };
                }
                if seconds >= config.max_seconds {
                    warn!(
                        phase = config.kind.label(),
                        seconds,
                        surface = field.surface(),
                        "stop condition not met within the phase time limit; phase truncated"
                    );
                    return PhaseOutcome {
                        kind: config.kind,
                        seconds,
                        truncated: true,
                        stalled: true,
                    };
                }
                break;
            }

            layer += 1;
            if layer >= MAX_LAYERS {
                warn!(
                    phase = config.kind.label(),
                    seconds,
                    layer_max = field.current_layer_max(),
                    "layer ceiling reached before the second settled; phase truncated"
                );
                return PhaseOutcome {
                    kind: config.kind,
                    seconds,
                    truncated: true,
                    stalled: false,
                };
            }
            external_delta = internal_delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FIELD_LEN;

    #[test]
    fn stop_predicates_are_inclusive() {
        assert!(StopWhen::SurfaceAtLeast(1.8).is_met(1.8));
        assert!(!StopWhen::SurfaceAtLeast(1.8).is_met(1.79));
        assert!(StopWhen::SurfaceAtMost(1.0).is_met(1.0));
        assert!(!StopWhen::SurfaceAtMost(1.0).is_met(1.01));
    }

    #[test]
    fn phase_configs_carry_thresholds() {
        let p = ProcessParameters::default();
        let carb = PhaseConfig::carburizing(&p, 0.5);
        assert_eq!(carb.external_flux, 0.5);
        assert_eq!(carb.stop, StopWhen::SurfaceAtLeast(1.8));
        assert_eq!(PhaseConfig::diffusion(&p).external_flux, 0.0);
        assert_eq!(PhaseConfig::diffusion(&p).stop, StopWhen::SurfaceAtMost(1.0));
        assert_eq!(PhaseConfig::final_hold(&p).stop, StopWhen::SurfaceAtMost(0.70));
    }

    #[test]
    fn saturated_surface_stops_after_one_second() {
        let p = ProcessParameters {
            initial_carbon: 2.0,
            ..Default::default()
        };
        let stepper = DiffusionStepper::for_temperature(p.temperature);
        let config = PhaseConfig::carburizing(&p, crate::external_flux(p.carbon_flow));
        let mut field = LayerField::new(p.initial_carbon);
        let mut clock = SimulationClock::default();

        let outcome = run_phase(&config, &stepper, &mut field, &mut clock);
        assert_eq!(outcome.seconds, 1);
        assert!(!outcome.truncated);
        assert_eq!(clock.total_time(), 1);
    }

    #[test]
    fn unsettled_walk_is_truncated_at_the_ceiling() {
        // A constant gradient of 1% per layer keeps every internal delta at
        // 0.04, far above the settling threshold.
        let values: Vec<Real> = (0..FIELD_LEN).map(|i| (FIELD_LEN - i) as Real).collect();
        let mut field = LayerField::from_profile(values, 1).unwrap();
        let stepper = DiffusionStepper::new(1e-6);
        let p = ProcessParameters::default();
        let config = PhaseConfig::diffusion(&p);
        let mut clock = SimulationClock::default();

        let outcome = run_phase(&config, &stepper, &mut field, &mut clock);
        assert!(outcome.truncated);
        assert!(!outcome.stalled);
        assert_eq!(outcome.seconds, 0);
        assert_eq!(clock.total_time(), 0);
        assert_eq!(field.current_layer_max(), 1);
    }

    #[test]
    fn zero_flow_carburizing_stalls_at_the_time_limit() {
        let p = ProcessParameters {
            carbon_flow: 0.0,
            ..Default::default()
        };
        let stepper = DiffusionStepper::for_temperature(p.temperature);
        let config = PhaseConfig::carburizing(&p, crate::external_flux(p.carbon_flow))
            .with_max_seconds(500);
        let mut field = LayerField::new(p.initial_carbon);
        let mut clock = SimulationClock::default();

        let outcome = run_phase(&config, &stepper, &mut field, &mut clock);
        assert!(outcome.truncated);
        assert!(outcome.stalled);
        assert_eq!(outcome.seconds, 500);
        assert_eq!(clock.total_time(), 500);
        assert_eq!(field.surface(), p.initial_carbon);
    }

    #[test]
    fn diffusion_below_core_carbon_stalls() {
        let p = ProcessParameters {
            carbon_min: 0.1,
            ..Default::default()
        };
        let stepper = DiffusionStepper::for_temperature(p.temperature);
        let config = PhaseConfig::diffusion(&p).with_max_seconds(2_000);
        let mut values = vec![p.initial_carbon; FIELD_LEN];
        values[0] = 1.9;
        values[1] = 1.8;
        let mut field = LayerField::from_profile(values, 1).unwrap();
        let mut clock = SimulationClock::default();

        let outcome = run_phase(&config, &stepper, &mut field, &mut clock);
        assert!(outcome.stalled);
        assert_eq!(outcome.seconds, 2_000);
        assert!(field.surface() > p.carbon_min);
    }

    #[test]
    fn layer_max_never_decreases_within_a_phase() {
        let p = ProcessParameters::default();
        let stepper = DiffusionStepper::for_temperature(p.temperature);
        let config = PhaseConfig::carburizing(&p, crate::external_flux(p.carbon_flow));
        let mut field = LayerField::new(p.initial_carbon);
        let mut clock = SimulationClock::default();

        let outcome = run_phase(&config, &stepper, &mut field, &mut clock);
        assert!(!outcome.truncated);
        assert!(outcome.seconds > 0);
        assert!(field.surface() >= p.carbon_max);
        assert!(field.current_layer_max() > 1);
        assert!(field.current_layer_max() < MAX_LAYERS);
        assert_eq!(clock.total_time(), outcome.seconds);
    }
}
