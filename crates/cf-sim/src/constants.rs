//! Model constants of the layered carburizing engine.

use cf_core::Real;

/// Number of physical sublayers (indices 1..=MAX_LAYERS of the field).
pub const MAX_LAYERS: usize = 2000;
/// Field length including the surface slot at index 0.
pub const FIELD_LEN: usize = MAX_LAYERS + 1;
/// Hard ceiling on carburize/diffuse/hold cycles per run.
pub const MAX_CYCLES: usize = 500;
/// Settled seconds after which a phase is abandoned (100 h).
pub const MAX_PHASE_SECONDS: u64 = 360_000;

/// Sublayer pitch (mm).
pub const LAYER_THICKNESS_MM: Real = 0.05;
/// Half a sublayer (mm); depth offset of a layer centre.
pub const HALF_LAYER_MM: Real = 0.025;
/// Length scale dividing the concentration gradient in the stepper.
pub const DIFFUSION_LENGTH_SCALE: Real = 0.000025;
/// A second settles once the internal delta drops below this.
pub const CONVERGENCE_THRESHOLD: Real = 0.000001;

/// Arrhenius prefactor D0.
pub const DIFFUSION_D0: Real = 9.332;
/// Arrhenius activation constant K (kelvin).
pub const ACTIVATION_K: Real = 21393.1;
/// Steel density (g/cm³).
pub const STEEL_DENSITY: Real = 7.87;
pub const CELSIUS_OFFSET: Real = 273.15;
pub const SECONDS_PER_HOUR: Real = 3600.0;
