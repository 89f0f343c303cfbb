//! Case file schema definitions.

use cf_core::Real;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseFile {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub cases: Vec<CaseDef>,
}

/// One named carburizing job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub process: ProcessDef,
    #[serde(default)]
    pub steel: SteelDef,
    /// Target surface hardness (HV). Selects the case-depth threshold when
    /// `process.eff_carbon` is left out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardness_value: Option<Real>,
}

/// Furnace settings. Every field falls back to the standard recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProcessDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_flow: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_max: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_min: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_final: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_depth_mm: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eff_carbon: Option<Real>,
    /// Version 1 files kept the core carbon here; migration moves it to
    /// `steel.initial_carbon`.
    #[serde(
        rename = "initial_carbon",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_initial_carbon: Option<Real>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SteelDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    /// Core carbon content (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_carbon: Option<Real>,
}

impl CaseFile {
    pub fn case(&self, id: &str) -> Option<&CaseDef> {
        self.cases.iter().find(|c| c.id == id)
    }
}
