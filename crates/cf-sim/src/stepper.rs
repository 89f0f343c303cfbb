//! Elementary per-layer diffusion update.

use cf_core::Real;

use crate::constants::{DIFFUSION_LENGTH_SCALE, MAX_LAYERS};
use crate::layers::{LayerField, diffusion_factor};

/// Applies one explicit update to a single layer.
///
/// The diffusion factor is fixed for a run; it depends on temperature only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusionStepper {
    diffusion_factor: Real,
}

impl DiffusionStepper {
    pub fn new(diffusion_factor: Real) -> Self {
        Self { diffusion_factor }
    }

    pub fn for_temperature(temperature_c: Real) -> Self {
        Self::new(diffusion_factor(temperature_c))
    }

    pub fn diffusion_factor(&self) -> Real {
        self.diffusion_factor
    }

    /// Update `layer` with `external_delta` flowing in from above and return
    /// the internal delta passed on to the layer below.
    ///
    /// The surface slot is re-extrapolated after every update.
    ///
    /// # Panics
    ///
    /// If `layer` is 0 or the last sublayer; the update reads `layer + 1`.
    pub fn step(&self, field: &mut LayerField, layer: usize, external_delta: Real) -> Real {
        assert!(
            (1..MAX_LAYERS).contains(&layer),
            "stepper layer {layer} outside 1..{MAX_LAYERS}"
        );
        let values = field.values_mut();

        let layer_n = values[layer];
        let layer_next = values[layer + 1];
        let internal_delta =
            self.diffusion_factor * ((layer_n - layer_next) / DIFFUSION_LENGTH_SCALE);

        values[layer] = layer_n + external_delta - internal_delta;
        values[0] = values[1] + ((values[1] - values[2]) / 2.0);

        internal_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FIELD_LEN;

    #[test]
    fn uniform_field_has_no_internal_flow() {
        let stepper = DiffusionStepper::for_temperature(950.0);
        let mut field = LayerField::new(0.2);
        let delta = stepper.step(&mut field, 1, 0.0);
        assert_eq!(delta, 0.0);
        assert_eq!(field.get(1), Some(0.2));
        assert_eq!(field.surface(), 0.2);
    }

    #[test]
    fn external_delta_raises_layer_and_surface() {
        let stepper = DiffusionStepper::new(1e-7);
        let mut field = LayerField::new(0.2);
        let delta = stepper.step(&mut field, 1, 0.01);
        assert_eq!(delta, 0.0);
        assert_eq!(field.get(1), Some(0.2 + 0.01));
        // surface = f1 + (f1 - f2) / 2
        let expected_surface = (0.2 + 0.01) + ((0.2 + 0.01) - 0.2) / 2.0;
        assert_eq!(field.surface(), expected_surface);
    }

    #[test]
    fn gradient_drives_internal_delta() {
        let stepper = DiffusionStepper::new(1e-6);
        let mut values = vec![0.2; FIELD_LEN];
        values[1] = 1.2;
        let mut field = LayerField::from_profile(values, 1).unwrap();

        let delta = stepper.step(&mut field, 1, 0.0);
        let expected = 1e-6 * ((1.2 - 0.2) / 0.000025);
        assert_eq!(delta, expected);
        assert_eq!(field.get(1), Some(1.2 - expected));
    }

    #[test]
    #[should_panic]
    fn last_layer_is_rejected() {
        let stepper = DiffusionStepper::new(1e-7);
        let mut field = LayerField::new(0.2);
        stepper.step(&mut field, MAX_LAYERS, 0.0);
    }
}
