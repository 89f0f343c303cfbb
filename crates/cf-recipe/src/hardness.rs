//! Effective-carbon threshold by target surface hardness (HV).

use cf_core::Real;

/// Threshold used when the hardness is not in the table.
pub const DEFAULT_EFF_CARBON: Real = 0.36;

const TABLE: [(Real, Real); 5] = [
    (700.0, 0.45),
    (650.0, 0.42),
    (600.0, 0.39),
    (550.0, 0.36),
    (513.0, 0.32),
];

/// Carbon content (%) that defines the case boundary for a hardness target.
///
/// Only the tabulated hardness values match; anything else gets the default.
pub fn eff_carbon_for_hardness(hardness_value: Real) -> Real {
    TABLE
        .iter()
        .find(|(hv, _)| *hv == hardness_value)
        .map(|&(_, c)| c)
        .unwrap_or(DEFAULT_EFF_CARBON)
}
