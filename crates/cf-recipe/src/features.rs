//! Compact features of a simulated (or measured) recipe.

use cf_sim::CycleResult;
use serde::{Deserialize, Serialize};

use crate::reconstruct::PredictedFeatures;
use crate::{RecipeError, RecipeResult};

/// Timings that summarize a multi-cycle recipe.
///
/// Only the last cycle's final hold counts; earlier holds are discarded by
/// the continuation rule and never appear in a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFeatures {
    pub num_cycles: u64,
    pub first_carb: u64,
    pub first_diff: u64,
    pub second_carb: u64,
    pub second_diff: u64,
    pub last_carb: u64,
    pub last_diff: u64,
    pub final_time: u64,
    pub total_carb_time: u64,
    /// Sum of diffusion times plus the final hold
    pub total_diff_time: u64,
}

/// Extract features from an ordered cycle sequence.
///
/// With a single cycle the "second" timings repeat the first.
pub fn extract_features(cycles: &[CycleResult]) -> RecipeResult<RecipeFeatures> {
    let first = cycles.first().ok_or(RecipeError::EmptyRecipe)?;
    let last = cycles.last().ok_or(RecipeError::EmptyRecipe)?;
    let second = cycles.get(1).unwrap_or(first);

    let total_carb_time = cycles.iter().map(|c| c.carb_seconds).sum();
    let total_diff: u64 = cycles.iter().map(|c| c.diff_seconds).sum();

    Ok(RecipeFeatures {
        num_cycles: cycles.len() as u64,
        first_carb: first.carb_seconds,
        first_diff: first.diff_seconds,
        second_carb: second.carb_seconds,
        second_diff: second.diff_seconds,
        last_carb: last.carb_seconds,
        last_diff: last.diff_seconds,
        final_time: last.final_seconds,
        total_carb_time,
        total_diff_time: total_diff + last.final_seconds,
    })
}

impl RecipeFeatures {
    /// The same features in the shape a regression model predicts, with the
    /// totals attached so reconstruction rescales against them.
    pub fn as_prediction(&self) -> PredictedFeatures {
        PredictedFeatures {
            num_cycles: self.num_cycles as f64,
            first_carb: self.first_carb as f64,
            first_diff: self.first_diff as f64,
            second_carb: self.second_carb as f64,
            second_diff: self.second_diff as f64,
            last_carb: self.last_carb as f64,
            last_diff: self.last_diff as f64,
            final_time: self.final_time as f64,
            total_carb_time: Some(self.total_carb_time as f64),
            total_diff_time: Some(self.total_diff_time as f64),
        }
    }
}
