//! Case definition to simulator input.
//!
//! Missing process values take the standard recipe. The case-depth
//! threshold comes from `eff_carbon` when given, otherwise from the
//! hardness table, otherwise from the standard recipe.

use cf_project::schema::CaseDef;
use cf_recipe::eff_carbon_for_hardness;
use cf_sim::ProcessParameters;
use serde::Serialize;

use crate::error::AppResult;

/// Where the case-depth threshold came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    Explicit,
    Hardness,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCase {
    pub id: String,
    pub name: String,
    pub params: ProcessParameters,
    pub threshold: ThresholdSource,
}

pub fn compile_case(case: &CaseDef) -> AppResult<CompiledCase> {
    let defaults = ProcessParameters::default();
    let p = &case.process;

    let (eff_carbon, threshold) = match (p.eff_carbon, case.hardness_value) {
        (Some(eff), _) => (eff, ThresholdSource::Explicit),
        (None, Some(hv)) => (eff_carbon_for_hardness(hv), ThresholdSource::Hardness),
        (None, None) => (defaults.eff_carbon, ThresholdSource::Default),
    };

    let params = ProcessParameters {
        temperature: p.temperature_c.unwrap_or(defaults.temperature),
        carbon_flow: p.carbon_flow.unwrap_or(defaults.carbon_flow),
        carbon_max: p.carbon_max.unwrap_or(defaults.carbon_max),
        carbon_min: p.carbon_min.unwrap_or(defaults.carbon_min),
        carbon_final: p.carbon_final.unwrap_or(defaults.carbon_final),
        target_depth: p.target_depth_mm.unwrap_or(defaults.target_depth),
        eff_carbon,
        initial_carbon: case.steel.initial_carbon.unwrap_or(defaults.initial_carbon),
    };
    params.validate()?;

    Ok(CompiledCase {
        id: case.id.clone(),
        name: case.name.clone(),
        params,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_project::schema::{ProcessDef, SteelDef};

    fn case(process: ProcessDef, hardness_value: Option<f64>) -> CaseDef {
        CaseDef {
            id: "c".to_string(),
            name: "C".to_string(),
            process,
            steel: SteelDef::default(),
            hardness_value,
        }
    }

    #[test]
    fn empty_case_compiles_to_defaults() {
        let compiled = compile_case(&case(ProcessDef::default(), None)).unwrap();
        assert_eq!(compiled.params, ProcessParameters::default());
        assert_eq!(compiled.threshold, ThresholdSource::Default);
    }

    #[test]
    fn hardness_selects_threshold() {
        let compiled = compile_case(&case(ProcessDef::default(), Some(700.0))).unwrap();
        assert_eq!(compiled.params.eff_carbon, 0.45);
        assert_eq!(compiled.threshold, ThresholdSource::Hardness);
    }

    #[test]
    fn explicit_threshold_beats_hardness() {
        let process = ProcessDef {
            eff_carbon: Some(0.5),
            ..Default::default()
        };
        let compiled = compile_case(&case(process, Some(700.0))).unwrap();
        assert_eq!(compiled.params.eff_carbon, 0.5);
        assert_eq!(compiled.threshold, ThresholdSource::Explicit);
    }

    #[test]
    fn given_values_override_defaults() {
        let process = ProcessDef {
            temperature_c: Some(920.0),
            target_depth_mm: Some(0.8),
            ..Default::default()
        };
        let mut c = case(process, None);
        c.steel.initial_carbon = Some(0.15);
        let params = compile_case(&c).unwrap().params;
        assert_eq!(params.temperature, 920.0);
        assert_eq!(params.target_depth, 0.8);
        assert_eq!(params.initial_carbon, 0.15);
        assert_eq!(params.carbon_flow, ProcessParameters::default().carbon_flow);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let process = ProcessDef {
            carbon_max: Some(f64::NAN),
            ..Default::default()
        };
        assert!(compile_case(&case(process, None)).is_err());
    }
}
