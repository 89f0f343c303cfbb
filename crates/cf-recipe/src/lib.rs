//! cf-recipe: turns simulated cycles into recipe features and back.
//!
//! - features: compact per-run features extracted from cycle results
//! - reconstruct: per-cycle recipe rebuilt from (predicted) features
//! - hardness: effective-carbon threshold lookup by target hardness
//! - predictor: feature row assembly + regression model seam

pub mod features;
pub mod hardness;
pub mod predictor;
pub mod reconstruct;

pub use features::{RecipeFeatures, extract_features};
pub use hardness::eff_carbon_for_hardness;
pub use predictor::{
    FEATURE_COLUMNS, FeatureRow, LinearModel, OUTPUT_COLUMNS, Prediction, PredictionRequest,
    PredictorService, RegressionModel, SimulatorBaseline,
};
pub use reconstruct::{PredictedFeatures, RecipeStep, reconstruct_recipe};

pub type RecipeResult<T> = Result<T, RecipeError>;

#[derive(thiserror::Error, Debug)]
pub enum RecipeError {
    #[error("Recipe has no cycles")]
    EmptyRecipe,

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] cf_sim::SimError),

    #[error("Model shape mismatch: {what} (expected {expected}, got {actual})")]
    ModelShape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Model error: {message}")]
    Model { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
