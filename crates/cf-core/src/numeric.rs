use crate::CfError;

/// Floating point type used throughout the engine
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CfError::NonFinite { what, value: v })
    }
}

/// Round to the nearest integer, ties to even, and floor the result at zero.
///
/// Recipe durations are whole seconds; negative predictions collapse to 0.
pub fn round_seconds(v: Real) -> u64 {
    let r = v.round_ties_even();
    if r.is_nan() || r <= 0.0 { 0 } else { r as u64 }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_seconds_within_half(v in 0.0_f64..1.0e6) {
            let r = round_seconds(v) as f64;
            prop_assert!((r - v).abs() <= 0.5);
        }
    }
}
