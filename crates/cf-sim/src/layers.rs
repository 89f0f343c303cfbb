//! Discretized carbon-concentration field.
//!
//! Index 0 holds the surface value, extrapolated from layers 1 and 2.
//! Indices 1..=MAX_LAYERS are physical sublayers of `LAYER_THICKNESS_MM`
//! pitch. The buffer length is fixed at construction and every access goes
//! through a bounds check.

use cf_core::{CfError, CfResult, Real};

use crate::constants::{
    ACTIVATION_K, CELSIUS_OFFSET, DIFFUSION_D0, FIELD_LEN, LAYER_THICKNESS_MM, MAX_LAYERS,
    SECONDS_PER_HOUR, STEEL_DENSITY,
};

/// Arrhenius diffusion factor for a treatment temperature in °C.
pub fn diffusion_factor(temperature_c: Real) -> Real {
    DIFFUSION_D0 * (-ACTIVATION_K / (temperature_c + CELSIUS_OFFSET)).exp()
}

/// Carbon added to the first layer per second of carburizing.
pub fn external_flux(carbon_flow: Real) -> Real {
    carbon_flow * (1.0 / (SECONDS_PER_HOUR * STEEL_DENSITY * LAYER_THICKNESS_MM))
}

/// Concentration profile plus the deepest settled layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerField {
    values: Box<[Real]>,
    current_layer_max: usize,
}

/// Frozen copy of a field's values, taken between phases.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSnapshot {
    values: Box<[Real]>,
}

impl LayerSnapshot {
    pub fn values(&self) -> &[Real] {
        &self.values
    }
}

impl LayerField {
    /// Uniform field, surface slot included, with only layer 1 settled.
    pub fn new(initial_carbon: Real) -> Self {
        Self {
            values: vec![initial_carbon; FIELD_LEN].into_boxed_slice(),
            current_layer_max: 1,
        }
    }

    /// Build a field from an explicit profile.
    ///
    /// `values` must cover the surface slot and every sublayer, and
    /// `current_layer_max` must leave room for the layer below it.
    pub fn from_profile(values: Vec<Real>, current_layer_max: usize) -> CfResult<Self> {
        if values.len() != FIELD_LEN {
            return Err(CfError::InvalidArg {
                what: "profile must hold the surface slot plus every sublayer",
            });
        }
        if current_layer_max == 0 || current_layer_max >= MAX_LAYERS {
            return Err(CfError::IndexOob {
                what: "current_layer_max",
                index: current_layer_max,
                len: MAX_LAYERS,
            });
        }
        Ok(Self {
            values: values.into_boxed_slice(),
            current_layer_max,
        })
    }

    #[inline]
    pub fn surface(&self) -> Real {
        self.values[0]
    }

    pub fn get(&self, index: usize) -> Option<Real> {
        self.values.get(index).copied()
    }

    pub fn set(&mut self, index: usize, value: Real) -> CfResult<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or(CfError::IndexOob {
            what: "layer index",
            index,
            len,
        })?;
        *slot = value;
        Ok(())
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    #[inline]
    pub fn current_layer_max(&self) -> usize {
        self.current_layer_max
    }

    /// Record that `layer` settled. The high-water mark never moves back.
    pub(crate) fn settle_at(&mut self, layer: usize) {
        debug_assert!(layer < MAX_LAYERS);
        debug_assert!(layer >= self.current_layer_max);
        self.current_layer_max = layer;
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Real] {
        &mut self.values
    }

    pub fn snapshot(&self) -> LayerSnapshot {
        LayerSnapshot {
            values: self.values.clone(),
        }
    }

    /// Copy slots `0..=current_layer_max` back from `snapshot`.
    ///
    /// Deeper slots keep whatever the last phase left in them.
    pub fn restore_active(&mut self, snapshot: &LayerSnapshot) {
        let end = self.current_layer_max + 1;
        self.values[..end].copy_from_slice(&snapshot.values[..end]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_is_uniform() {
        let field = LayerField::new(0.2);
        assert_eq!(field.values().len(), FIELD_LEN);
        assert!(field.values().iter().all(|&v| v == 0.2));
        assert_eq!(field.current_layer_max(), 1);
        assert_eq!(field.surface(), 0.2);
    }

    #[test]
    fn diffusion_factor_at_950c() {
        let d = diffusion_factor(950.0);
        let expected = 9.332 * (-21393.1_f64 / 1223.15).exp();
        assert_eq!(d, expected);
        assert!(d > 2.0e-7 && d < 3.0e-7);
    }

    #[test]
    fn external_flux_scales_with_flow() {
        let q = external_flux(14.0);
        assert!((q - 14.0 / (3600.0 * 7.87 * 0.05)).abs() < 1e-15);
        assert_eq!(external_flux(0.0), 0.0);
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut field = LayerField::new(0.2);
        assert!(field.get(FIELD_LEN).is_none());
        assert!(field.set(FIELD_LEN, 1.0).is_err());
        field.set(MAX_LAYERS, 1.0).unwrap();
        assert_eq!(field.get(MAX_LAYERS), Some(1.0));
    }

    #[test]
    fn from_profile_rejects_bad_shapes() {
        assert!(LayerField::from_profile(vec![0.2; 10], 1).is_err());
        assert!(LayerField::from_profile(vec![0.2; FIELD_LEN], 0).is_err());
        assert!(LayerField::from_profile(vec![0.2; FIELD_LEN], MAX_LAYERS).is_err());
        assert!(LayerField::from_profile(vec![0.2; FIELD_LEN], MAX_LAYERS - 1).is_ok());
    }

    #[test]
    fn restore_only_touches_active_slots() {
        let mut field = LayerField::new(0.2);
        let snap = field.snapshot();
        field.settle_at(3);
        for i in 0..10 {
            field.set(i, 9.0).unwrap();
        }
        field.restore_active(&snap);
        for i in 0..=3 {
            assert_eq!(field.get(i), Some(0.2));
        }
        for i in 4..10 {
            assert_eq!(field.get(i), Some(9.0));
        }
    }
}
