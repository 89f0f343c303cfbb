//! Case file validation logic.

use std::collections::HashSet;

use cf_core::Real;

use crate::schema::{CaseDef, CaseFile};

/// Lowest temperature accepted, in °C.
const ABSOLUTE_ZERO_C: Real = -273.15;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing value: {field} in {context}")]
    Missing { field: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_case_file(file: &CaseFile) -> Result<(), ValidationError> {
    if file.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let mut case_ids = HashSet::new();
    for case in &file.cases {
        if case.id.trim().is_empty() {
            return Err(ValidationError::Missing {
                field: "id".to_string(),
                context: format!("case '{}'", case.name),
            });
        }
        if !case_ids.insert(&case.id) {
            return Err(ValidationError::DuplicateId {
                id: case.id.clone(),
                context: "cases".to_string(),
            });
        }
        validate_case(case)?;
    }

    Ok(())
}

fn validate_case(case: &CaseDef) -> Result<(), ValidationError> {
    let p = &case.process;
    let fields = [
        ("temperature_c", p.temperature_c),
        ("carbon_flow", p.carbon_flow),
        ("carbon_max", p.carbon_max),
        ("carbon_min", p.carbon_min),
        ("carbon_final", p.carbon_final),
        ("target_depth_mm", p.target_depth_mm),
        ("eff_carbon", p.eff_carbon),
        ("initial_carbon", case.steel.initial_carbon),
        ("hardness_value", case.hardness_value),
    ];
    for (field, value) in fields {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(invalid(case, field, v, "must be finite"));
            }
        }
    }

    if let Some(t) = p.temperature_c {
        if t <= ABSOLUTE_ZERO_C {
            return Err(invalid(case, "temperature_c", t, "must be above absolute zero"));
        }
    }
    if let Some(f) = p.carbon_flow {
        if f <= 0.0 {
            return Err(invalid(case, "carbon_flow", f, "must be positive"));
        }
    }
    if let Some(d) = p.target_depth_mm {
        if d <= 0.0 {
            return Err(invalid(case, "target_depth_mm", d, "must be positive"));
        }
    }
    if let Some(h) = case.hardness_value {
        if h <= 0.0 {
            return Err(invalid(case, "hardness_value", h, "must be positive"));
        }
    }
    if let Some(c) = p.legacy_initial_carbon {
        return Err(invalid(
            case,
            "process.initial_carbon",
            c,
            "moved to steel.initial_carbon",
        ));
    }

    Ok(())
}

fn invalid(case: &CaseDef, field: &str, value: Real, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: format!("{}.{}", case.id, field),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Suspicious but runnable settings. Returned as messages, never as errors.
pub fn case_warnings(case: &CaseDef) -> Vec<String> {
    let p = &case.process;
    let mut warnings = Vec::new();

    if let (Some(max), Some(min)) = (p.carbon_max, p.carbon_min) {
        if min >= max {
            warnings.push(format!(
                "{}: carbon_min {} is not below carbon_max {}; diffusion ends at once",
                case.id, min, max
            ));
        }
    }
    if let (Some(min), Some(fin)) = (p.carbon_min, p.carbon_final) {
        if fin > min {
            warnings.push(format!(
                "{}: carbon_final {} is above carbon_min {}",
                case.id, fin, min
            ));
        }
    }
    if let Some(core) = case.steel.initial_carbon {
        for (field, value) in [("carbon_min", p.carbon_min), ("carbon_final", p.carbon_final)] {
            if let Some(v) = value.filter(|v| *v < core) {
                warnings.push(format!(
                    "{}: {} {} is below the core carbon {}; the phase runs to its time limit",
                    case.id, field, v, core
                ));
            }
        }
    }
    if let (Some(eff), Some(core)) = (p.eff_carbon, case.steel.initial_carbon) {
        if eff <= core {
            warnings.push(format!(
                "{}: eff_carbon {} does not exceed the core carbon {}; depth will not be found",
                case.id, eff, core
            ));
        }
    }
    if p.eff_carbon.is_some() && case.hardness_value.is_some() {
        warnings.push(format!(
            "{}: both eff_carbon and hardness_value given; eff_carbon wins",
            case.id
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ProcessDef, SteelDef};

    fn case(id: &str) -> CaseDef {
        CaseDef {
            id: id.to_string(),
            name: format!("Case {id}"),
            process: ProcessDef::default(),
            steel: SteelDef::default(),
            hardness_value: None,
        }
    }

    fn file(cases: Vec<CaseDef>) -> CaseFile {
        CaseFile {
            version: crate::migrate::LATEST_VERSION,
            name: "test".to_string(),
            description: None,
            cases,
        }
    }

    #[test]
    fn empty_file_is_valid() {
        validate_case_file(&file(vec![])).unwrap();
    }

    #[test]
    fn duplicate_case_ids_rejected() {
        let err = validate_case_file(&file(vec![case("a"), case("a")])).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { .. }));
    }

    #[test]
    fn blank_id_rejected() {
        let err = validate_case_file(&file(vec![case("  ")])).unwrap_err();
        assert!(matches!(err, ValidationError::Missing { .. }));
    }

    #[test]
    fn future_version_rejected() {
        let mut f = file(vec![]);
        f.version = crate::migrate::LATEST_VERSION + 1;
        assert!(matches!(
            validate_case_file(&f),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn non_finite_value_rejected() {
        let mut c = case("a");
        c.process.carbon_flow = Some(Real::INFINITY);
        let err = validate_case_file(&file(vec![c])).unwrap_err();
        match err {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "a.carbon_flow"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn range_checks() {
        let mut cold = case("cold");
        cold.process.temperature_c = Some(-300.0);
        assert!(validate_case_file(&file(vec![cold])).is_err());

        let mut flat = case("flat");
        flat.process.target_depth_mm = Some(0.0);
        assert!(validate_case_file(&file(vec![flat])).is_err());

        let mut soft = case("soft");
        soft.hardness_value = Some(-1.0);
        assert!(validate_case_file(&file(vec![soft])).is_err());

        let mut idle = case("idle");
        idle.process.carbon_flow = Some(0.0);
        match validate_case_file(&file(vec![idle])).unwrap_err() {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "idle.carbon_flow"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hold_below_core_only_warns() {
        let mut c = case("deep");
        c.steel.initial_carbon = Some(0.2);
        c.process.carbon_final = Some(0.1);
        c.process.carbon_min = Some(0.15);

        validate_case_file(&file(vec![c.clone()])).unwrap();
        let warnings = case_warnings(&c);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("carbon_final")));
        assert!(warnings.iter().any(|w| w.contains("carbon_min")));
    }

    #[test]
    fn leftover_legacy_field_rejected() {
        let mut c = case("a");
        c.process.legacy_initial_carbon = Some(0.2);
        assert!(validate_case_file(&file(vec![c])).is_err());
    }

    #[test]
    fn threshold_ordering_only_warns() {
        let mut c = case("a");
        c.process.carbon_max = Some(1.0);
        c.process.carbon_min = Some(1.2);
        c.process.carbon_final = Some(1.3);
        c.process.eff_carbon = Some(0.36);
        c.hardness_value = Some(600.0);

        validate_case_file(&file(vec![c.clone()])).unwrap();
        let warnings = case_warnings(&c);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| w.starts_with("a:")));
    }

    #[test]
    fn defaults_have_no_warnings() {
        assert!(case_warnings(&case("a")).is_empty());
    }
}
