//! Recipe prediction entry point for frontends.

use std::path::Path;

use cf_recipe::{LinearModel, Prediction, PredictionRequest, PredictorService, SimulatorBaseline};
use tracing::info;

use crate::error::AppResult;

/// Predict a recipe. With a model file the linear model is used, otherwise
/// the simulator baseline.
pub fn predict_recipe(
    request: &PredictionRequest,
    model_path: Option<&Path>,
) -> AppResult<Prediction> {
    let prediction = match model_path {
        Some(path) => {
            let model = LinearModel::load(path)?;
            info!(model = %path.display(), "using linear model");
            PredictorService::new(model).predict(request)?
        }
        None => PredictorService::new(SimulatorBaseline).predict(request)?,
    };

    info!(
        simulated_cycles = prediction.simulated.num_cycles,
        recipe_steps = prediction.recipe.len(),
        "prediction complete"
    );
    Ok(prediction)
}
