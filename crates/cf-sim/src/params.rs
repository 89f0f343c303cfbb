//! Process parameters for one simulation run.

use cf_core::{Real, Temperature, degc, ensure_finite, to_kelvin};

use crate::error::{SimError, SimResult};

/// Immutable inputs of one carburizing simulation.
///
/// Concentrations are mass percent carbon, temperature is °C and the target
/// depth is mm. `Default` gives the standard recipe used whenever a caller
/// leaves a value out.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessParameters {
    /// Treatment temperature (°C)
    pub temperature: Real,
    /// Carbon flow supplied by the atmosphere during carburizing (%)
    pub carbon_flow: Real,
    /// Surface concentration that ends a carburizing phase (%)
    pub carbon_max: Real,
    /// Surface concentration that ends a diffusion phase (%)
    pub carbon_min: Real,
    /// Surface concentration that ends the final hold (%)
    pub carbon_final: Real,
    /// Case depth at which the run stops (mm)
    pub target_depth: Real,
    /// Concentration defining the case-depth boundary (%)
    pub eff_carbon: Real,
    /// Core carbon content of the steel (%)
    pub initial_carbon: Real,
}

impl Default for ProcessParameters {
    fn default() -> Self {
        Self {
            temperature: 950.0,
            carbon_flow: 14.0,
            carbon_max: 1.8,
            carbon_min: 1.0,
            carbon_final: 0.70,
            target_depth: 2.1,
            eff_carbon: 0.36,
            initial_carbon: 0.20,
        }
    }
}

impl ProcessParameters {
    pub fn treatment_temperature(&self) -> Temperature {
        degc(self.temperature)
    }

    /// Check that every value is finite, the temperature is above absolute
    /// zero and the atmosphere actually supplies carbon.
    ///
    /// `simulate` does not call this; it runs on anything and degrades to
    /// truncated output. Service layers call it to reject garbage early.
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.temperature, "temperature")?;
        ensure_finite(self.carbon_flow, "carbon_flow")?;
        ensure_finite(self.carbon_max, "carbon_max")?;
        ensure_finite(self.carbon_min, "carbon_min")?;
        ensure_finite(self.carbon_final, "carbon_final")?;
        ensure_finite(self.target_depth, "target_depth")?;
        ensure_finite(self.eff_carbon, "eff_carbon")?;
        ensure_finite(self.initial_carbon, "initial_carbon")?;

        if to_kelvin(self.treatment_temperature()) <= 0.0 {
            return Err(SimError::InvalidParameter {
                what: "temperature must be above absolute zero",
            });
        }
        if self.carbon_flow <= 0.0 {
            return Err(SimError::InvalidParameter {
                what: "carbon_flow must be positive",
            });
        }
        Ok(())
    }

    /// Whether a diffusion or final-hold threshold sits below the core
    /// carbon. The surface never drops under the core, so such a phase runs
    /// into its time limit.
    pub fn hold_below_core(&self) -> bool {
        self.carbon_min < self.initial_carbon || self.carbon_final < self.initial_carbon
    }
}
