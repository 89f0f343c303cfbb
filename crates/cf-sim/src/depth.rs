//! Effective case-depth estimation.

use cf_core::Real;
use tracing::warn;

use crate::constants::{HALF_LAYER_MM, LAYER_THICKNESS_MM};
use crate::layers::LayerField;

/// Case depth plus the diagnostics of how it was found.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepthEstimate {
    pub depth_mm: Real,
    /// Layer the interpolation started from
    pub layer_index: usize,
    /// False when no settled layer reached the threshold
    pub threshold_found: bool,
    /// True when the two bracketing layers were equal and no interpolation
    /// was possible
    pub degenerate: bool,
}

/// Locates the depth where concentration crosses `eff_carbon`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveDepthEstimator {
    eff_carbon: Real,
}

impl EffectiveDepthEstimator {
    pub fn new(eff_carbon: Real) -> Self {
        Self { eff_carbon }
    }

    pub fn eff_carbon(&self) -> Real {
        self.eff_carbon
    }

    /// Scan settled layers from the deepest upward for the first one at or
    /// above the threshold, then interpolate towards the layer below it.
    ///
    /// Layer 1 is measured from the surface over half a pitch; deeper layers
    /// from their centre over a full pitch. If nothing reaches the threshold
    /// the deepest settled layer is used with zero concentrations, which
    /// lands on the degenerate branch.
    pub fn estimate(&self, field: &LayerField) -> DepthEstimate {
        let values = field.values();
        let layer_max = field.current_layer_max();

        let found = (1..=layer_max).rev().find(|&i| values[i] >= self.eff_carbon);
        let (index, carb_n, carb_next) = match found {
            Some(i) => (i, values[i], values[i + 1]),
            None => (layer_max, 0.0, 0.0),
        };

        let (base, half_step) = if index > 1 {
            ((index as Real * LAYER_THICKNESS_MM) - HALF_LAYER_MM, LAYER_THICKNESS_MM)
        } else {
            (0.0, HALF_LAYER_MM)
        };

        if carb_n == carb_next {
            warn!(
                index,
                carb_n,
                eff_carbon = self.eff_carbon,
                base_mm = base,
                "flat profile at the threshold layer; depth not interpolated"
            );
            return DepthEstimate {
                depth_mm: base,
                layer_index: index,
                threshold_found: found.is_some(),
                degenerate: true,
            };
        }

        let depth_mm = base + (half_step * ((carb_n - self.eff_carbon) / (carb_n - carb_next)));
        DepthEstimate {
            depth_mm,
            layer_index: index,
            threshold_found: found.is_some(),
            degenerate: false,
        }
    }
}
