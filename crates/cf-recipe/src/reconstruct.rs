//! Recipe reconstruction from predicted features.
//!
//! The first two cycles are taken as predicted. From the second cycle on,
//! carburizing time decays and diffusion time grows linearly to reach the
//! predicted last-cycle values. When predicted totals are available the
//! draft is rescaled proportionally to match them, then every value is
//! rounded to whole seconds and floored at zero.

use cf_core::{Real, round_seconds};
use serde::{Deserialize, Serialize};

/// Features as a regression model predicts them: real-valued, with optional
/// totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedFeatures {
    pub num_cycles: Real,
    pub first_carb: Real,
    pub first_diff: Real,
    pub second_carb: Real,
    pub second_diff: Real,
    pub last_carb: Real,
    pub last_diff: Real,
    pub final_time: Real,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carb_time: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_diff_time: Option<Real>,
}

/// One cycle of a reconstructed recipe. Only the last step carries a final
/// hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub carb_seconds: u64,
    pub diff_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct DraftStep {
    carb: Real,
    diff: Real,
    hold: Option<Real>,
}

#[inline]
fn whole(v: Real) -> Real {
    v.round_ties_even()
}

/// Rebuild the per-cycle recipe.
///
/// A predicted cycle count that rounds below one yields an empty recipe.
pub fn reconstruct_recipe(features: &PredictedFeatures) -> Vec<RecipeStep> {
    let rounded_cycles = whole(features.num_cycles);
    if !(rounded_cycles >= 1.0) {
        return Vec::new();
    }
    let num_cycles = rounded_cycles as usize;

    let (carb_decay, diff_growth) = if num_cycles > 2 {
        let steps = (num_cycles - 2) as Real;
        (
            (features.second_carb - features.last_carb) / steps,
            (features.last_diff - features.second_diff) / steps,
        )
    } else {
        (0.0, 0.0)
    };

    let mut draft: Vec<DraftStep> = (0..num_cycles)
        .map(|i| {
            let (carb, diff) = match i {
                0 => (whole(features.first_carb), whole(features.first_diff)),
                1 => (whole(features.second_carb), whole(features.second_diff)),
                _ => {
                    let from_second = (i - 1) as Real;
                    (
                        whole(features.second_carb - carb_decay * from_second),
                        whole(features.second_diff + diff_growth * from_second),
                    )
                }
            };
            let hold = (i == num_cycles - 1 && features.final_time > 0.0)
                .then(|| whole(features.final_time));
            DraftStep { carb, diff, hold }
        })
        .collect();

    if let (Some(total_carb), Some(total_diff)) =
        (features.total_carb_time, features.total_diff_time)
    {
        rescale(&mut draft, total_carb, total_diff);
    }

    draft
        .into_iter()
        .map(|s| RecipeStep {
            carb_seconds: round_seconds(s.carb),
            diff_seconds: round_seconds(s.diff),
            final_seconds: s.hold.map(round_seconds),
        })
        .collect()
}

/// Distribute the gap to the predicted totals across steps by weight.
/// The final hold belongs to the diffusion budget.
fn rescale(draft: &mut [DraftStep], total_carb: Real, total_diff: Real) {
    let carb_sum: Real = draft.iter().map(|s| s.carb).sum();
    let carb_delta = total_carb - carb_sum;
    if carb_sum != 0.0 {
        for step in draft.iter_mut() {
            step.carb += carb_delta * (step.carb / carb_sum);
        }
    }

    let hold = draft.last().and_then(|s| s.hold).unwrap_or(0.0);
    let diff_sum: Real = draft.iter().map(|s| s.diff).sum::<Real>() + hold;
    let diff_delta = total_diff - diff_sum;
    if diff_sum != 0.0 {
        for step in draft.iter_mut() {
            step.diff += diff_delta * (step.diff / diff_sum);
            if let Some(h) = step.hold.as_mut() {
                *h += diff_delta * (*h / diff_sum);
            }
        }
    }
}
