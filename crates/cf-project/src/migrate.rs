//! Schema migration framework.

use crate::ProjectError;
use crate::schema::CaseFile;

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut file: CaseFile) -> Result<CaseFile, ProjectError> {
    while file.version < LATEST_VERSION {
        file = migrate_one_version(file)?;
    }
    Ok(file)
}

fn migrate_one_version(file: CaseFile) -> Result<CaseFile, ProjectError> {
    match file.version {
        0 => migrate_v0_to_v1(file),
        1 => migrate_v1_to_v2(file),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut file: CaseFile) -> Result<CaseFile, ProjectError> {
    file.version = 1;
    Ok(file)
}

/// Core carbon moved from the process block to the steel block.
fn migrate_v1_to_v2(mut file: CaseFile) -> Result<CaseFile, ProjectError> {
    for case in &mut file.cases {
        if let Some(carbon) = case.process.legacy_initial_carbon.take() {
            if case.steel.initial_carbon.is_none() {
                case.steel.initial_carbon = Some(carbon);
            }
        }
    }
    file.version = 2;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CaseDef, ProcessDef, SteelDef};

    fn file(version: u32, cases: Vec<CaseDef>) -> CaseFile {
        CaseFile {
            version,
            name: "test".to_string(),
            description: None,
            cases,
        }
    }

    fn case(process: ProcessDef, steel: SteelDef) -> CaseDef {
        CaseDef {
            id: "c1".to_string(),
            name: "Case".to_string(),
            process,
            steel,
            hardness_value: None,
        }
    }

    #[test]
    fn migrate_latest_is_noop() {
        let f = file(LATEST_VERSION, vec![case(ProcessDef::default(), SteelDef::default())]);
        let migrated = migrate_to_latest(f.clone()).unwrap();
        assert_eq!(migrated, f);
    }

    #[test]
    fn migrate_moves_core_carbon_to_steel() {
        let process = ProcessDef {
            legacy_initial_carbon: Some(0.18),
            ..Default::default()
        };
        let legacy = file(1, vec![case(process, SteelDef::default())]);
        let migrated = migrate_to_latest(legacy).unwrap();

        assert_eq!(migrated.version, LATEST_VERSION);
        let c = &migrated.cases[0];
        assert_eq!(c.steel.initial_carbon, Some(0.18));
        assert_eq!(c.process.legacy_initial_carbon, None);
    }

    #[test]
    fn migrate_keeps_explicit_steel_carbon() {
        let process = ProcessDef {
            legacy_initial_carbon: Some(0.18),
            ..Default::default()
        };
        let steel = SteelDef {
            grade: None,
            initial_carbon: Some(0.22),
        };
        let migrated = migrate_to_latest(file(0, vec![case(process, steel)])).unwrap();
        assert_eq!(migrated.cases[0].steel.initial_carbon, Some(0.22));
        assert_eq!(migrated.cases[0].process.legacy_initial_carbon, None);
    }
}
