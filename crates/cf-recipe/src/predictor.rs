//! Recipe prediction: simulate, assemble a feature row, regress, rebuild.
//!
//! The regression model is a seam. A `LinearModel` can be loaded from JSON
//! coefficients; `SimulatorBaseline` echoes the physics-derived features and
//! needs no trained weights.

use std::path::Path;

use cf_core::Real;
use cf_sim::{ProcessParameters, SimulationReport, simulate_detailed};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::{RecipeFeatures, extract_features};
use crate::hardness::eff_carbon_for_hardness;
use crate::reconstruct::{PredictedFeatures, RecipeStep, reconstruct_recipe};
use crate::{RecipeError, RecipeResult};

/// Diffusion ends at this fraction of the carburizing ceiling.
pub const CARBON_MIN_RATIO: Real = 0.7;
/// Final hold ends at this fraction of the carburizing ceiling.
pub const CARBON_FINAL_RATIO: Real = 0.69;

/// Column order of the model input row.
pub const FEATURE_COLUMNS: [&str; 17] = [
    "hardness_value",
    "target_depth",
    "load_weight",
    "weight",
    "is_weight_unknown",
    "recipe_temperature",
    "recipe_carbon_max",
    "recipe_carbon_flow",
    "carbon_percentage",
    "sim_first_carb",
    "sim_first_diff",
    "sim_second_carb",
    "sim_second_diff",
    "sim_last_carb",
    "sim_last_diff",
    "sim_final_time",
    "sim_num_cycles",
];

/// Column order of the model output.
pub const OUTPUT_COLUMNS: [&str; 8] = [
    "first_carb",
    "first_diff",
    "second_carb",
    "second_diff",
    "last_carb",
    "last_diff",
    "final_time",
    "num_cycles",
];

/// The nine raw inputs of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Target surface hardness (HV)
    pub hardness_value: Real,
    /// Target case depth (mm)
    pub target_depth: Real,
    /// Furnace load weight (kg)
    pub load_weight: Real,
    /// Part weight (kg)
    pub weight: Real,
    #[serde(default)]
    pub is_weight_unknown: bool,
    pub recipe_temperature: Real,
    pub recipe_carbon_max: Real,
    pub recipe_carbon_flow: Real,
    /// Core carbon content of the steel (%)
    pub carbon_percentage: Real,
}

impl PredictionRequest {
    /// Simulator inputs derived from the request.
    pub fn process_parameters(&self) -> ProcessParameters {
        ProcessParameters {
            temperature: self.recipe_temperature,
            carbon_flow: self.recipe_carbon_flow,
            carbon_max: self.recipe_carbon_max,
            carbon_min: CARBON_MIN_RATIO * self.recipe_carbon_max,
            carbon_final: CARBON_FINAL_RATIO * self.recipe_carbon_max,
            target_depth: self.target_depth,
            eff_carbon: eff_carbon_for_hardness(self.hardness_value),
            initial_carbon: self.carbon_percentage,
        }
    }
}

/// Model input: the raw request followed by the simulated features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub values: [Real; FEATURE_COLUMNS.len()],
}

impl FeatureRow {
    pub fn new(req: &PredictionRequest, sim: &RecipeFeatures) -> Self {
        Self {
            values: [
                req.hardness_value,
                req.target_depth,
                req.load_weight,
                req.weight,
                if req.is_weight_unknown { 1.0 } else { 0.0 },
                req.recipe_temperature,
                req.recipe_carbon_max,
                req.recipe_carbon_flow,
                req.carbon_percentage,
                sim.first_carb as Real,
                sim.first_diff as Real,
                sim.second_carb as Real,
                sim.second_diff as Real,
                sim.last_carb as Real,
                sim.last_diff as Real,
                sim.final_time as Real,
                sim.num_cycles as Real,
            ],
        }
    }

    pub fn get(&self, column: &str) -> Option<Real> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.values[i])
    }
}

/// Regression from a feature row to the eight recipe outputs, in
/// `OUTPUT_COLUMNS` order.
pub trait RegressionModel {
    fn predict(&self, row: &FeatureRow) -> RecipeResult<[Real; OUTPUT_COLUMNS.len()]>;
}

/// Echoes the simulator's own features as the prediction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatorBaseline;

impl RegressionModel for SimulatorBaseline {
    fn predict(&self, row: &FeatureRow) -> RecipeResult<[Real; OUTPUT_COLUMNS.len()]> {
        let mut out = [0.0; OUTPUT_COLUMNS.len()];
        for (slot, name) in out.iter_mut().zip(OUTPUT_COLUMNS) {
            let column = format!("sim_{name}");
            *slot = row.get(&column).ok_or_else(|| RecipeError::Model {
                message: format!("feature row has no column '{column}'"),
            })?;
        }
        Ok(out)
    }
}

/// Linear model: one weight vector and intercept per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<Vec<Real>>,
    pub intercepts: Vec<Real>,
}

impl LinearModel {
    pub fn from_json_str(content: &str) -> RecipeResult<Self> {
        let model: LinearModel = serde_json::from_str(content)?;
        model.check_shape()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> RecipeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn check_shape(&self) -> RecipeResult<()> {
        if self.coefficients.len() != OUTPUT_COLUMNS.len() {
            return Err(RecipeError::ModelShape {
                what: "coefficient rows",
                expected: OUTPUT_COLUMNS.len(),
                actual: self.coefficients.len(),
            });
        }
        if self.intercepts.len() != OUTPUT_COLUMNS.len() {
            return Err(RecipeError::ModelShape {
                what: "intercepts",
                expected: OUTPUT_COLUMNS.len(),
                actual: self.intercepts.len(),
            });
        }
        if let Some(row) = self
            .coefficients
            .iter()
            .find(|r| r.len() != FEATURE_COLUMNS.len())
        {
            return Err(RecipeError::ModelShape {
                what: "coefficients per row",
                expected: FEATURE_COLUMNS.len(),
                actual: row.len(),
            });
        }
        Ok(())
    }
}

impl RegressionModel for LinearModel {
    fn predict(&self, row: &FeatureRow) -> RecipeResult<[Real; OUTPUT_COLUMNS.len()]> {
        self.check_shape()?;
        let mut out = [0.0; OUTPUT_COLUMNS.len()];
        for (k, slot) in out.iter_mut().enumerate() {
            let dot: Real = self.coefficients[k]
                .iter()
                .zip(row.values.iter())
                .map(|(w, x)| w * x)
                .sum();
            *slot = dot + self.intercepts[k];
        }
        Ok(out)
    }
}

/// Everything a prediction produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub parameters: ProcessParameters,
    pub simulated: RecipeFeatures,
    pub predicted: PredictedFeatures,
    pub recipe: Vec<RecipeStep>,
}

pub struct PredictorService<M: RegressionModel> {
    model: M,
}

impl<M: RegressionModel> PredictorService<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run the simulator for the request and build the model input.
    pub fn build_feature_row(
        &self,
        req: &PredictionRequest,
    ) -> RecipeResult<(FeatureRow, RecipeFeatures, SimulationReport)> {
        let params = req.process_parameters();
        params.validate()?;

        let report = simulate_detailed(&params);
        let simulated = extract_features(&report.results())?;
        debug!(
            cycles = simulated.num_cycles,
            final_time = simulated.final_time,
            "simulator features ready"
        );
        Ok((FeatureRow::new(req, &simulated), simulated, report))
    }

    pub fn predict(&self, req: &PredictionRequest) -> RecipeResult<Prediction> {
        let (row, simulated, _report) = self.build_feature_row(req)?;
        let y = self.model.predict(&row)?;

        // Outputs come back in OUTPUT_COLUMNS order; no predicted totals.
        let predicted = PredictedFeatures {
            first_carb: y[0],
            first_diff: y[1],
            second_carb: y[2],
            second_diff: y[3],
            last_carb: y[4],
            last_diff: y[5],
            final_time: y[6],
            num_cycles: y[7],
            total_carb_time: None,
            total_diff_time: None,
        };
        let recipe = reconstruct_recipe(&predicted);
        debug!(steps = recipe.len(), "recipe reconstructed");

        Ok(Prediction {
            parameters: req.process_parameters(),
            simulated,
            predicted,
            recipe,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PredictionRequest {
        PredictionRequest {
            hardness_value: 650.0,
            target_depth: 0.6,
            load_weight: 450.0,
            weight: 1.2,
            is_weight_unknown: false,
            recipe_temperature: 950.0,
            recipe_carbon_max: 1.8,
            recipe_carbon_flow: 14.0,
            carbon_percentage: 0.2,
        }
    }

    #[test]
    fn request_maps_to_simulator_inputs() {
        let p = request().process_parameters();
        assert_eq!(p.temperature, 950.0);
        assert_eq!(p.carbon_max, 1.8);
        assert!((p.carbon_min - 1.26).abs() < 1e-12);
        assert!((p.carbon_final - 1.242).abs() < 1e-12);
        assert_eq!(p.eff_carbon, 0.42);
        assert_eq!(p.initial_carbon, 0.2);
    }

    #[test]
    fn feature_row_column_lookup() {
        let sim = RecipeFeatures {
            num_cycles: 3,
            first_carb: 10,
            first_diff: 20,
            second_carb: 30,
            second_diff: 40,
            last_carb: 50,
            last_diff: 60,
            final_time: 70,
            total_carb_time: 90,
            total_diff_time: 190,
        };
        let row = FeatureRow::new(&request(), &sim);
        assert_eq!(row.get("hardness_value"), Some(650.0));
        assert_eq!(row.get("is_weight_unknown"), Some(0.0));
        assert_eq!(row.get("sim_second_diff"), Some(40.0));
        assert_eq!(row.get("sim_num_cycles"), Some(3.0));
        assert_eq!(row.get("nope"), None);

        let y = SimulatorBaseline.predict(&row).unwrap();
        assert_eq!(y, [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 3.0]);
    }

    #[test]
    fn linear_model_shape_is_checked() {
        let bad = r#"{"coefficients": [[1.0]], "intercepts": [0.0]}"#;
        assert!(matches!(
            LinearModel::from_json_str(bad),
            Err(RecipeError::ModelShape { .. })
        ));
    }

    #[test]
    fn linear_model_with_identity_weights_matches_baseline() {
        let mut coefficients = vec![vec![0.0; FEATURE_COLUMNS.len()]; OUTPUT_COLUMNS.len()];
        for (k, row) in coefficients.iter_mut().enumerate() {
            row[9 + k] = 1.0;
        }
        let model = LinearModel {
            coefficients,
            intercepts: vec![0.0; OUTPUT_COLUMNS.len()],
        };
        let json = serde_json::to_string(&model).unwrap();
        let model = LinearModel::from_json_str(&json).unwrap();

        let sim = RecipeFeatures {
            num_cycles: 2,
            first_carb: 231,
            first_diff: 203,
            second_carb: 95,
            second_diff: 323,
            last_carb: 95,
            last_diff: 323,
            final_time: 822,
            total_carb_time: 326,
            total_diff_time: 1348,
        };
        let row = FeatureRow::new(&request(), &sim);
        assert_eq!(
            model.predict(&row).unwrap(),
            SimulatorBaseline.predict(&row).unwrap()
        );
    }
}
