use cf_project::schema::*;
use cf_project::{ProjectError, load, load_json, load_yaml, save_json, save_yaml};

fn sample() -> CaseFile {
    CaseFile {
        version: 2,
        name: "Roundtrip".to_string(),
        description: Some("two cases".to_string()),
        cases: vec![
            CaseDef {
                id: "defaults".to_string(),
                name: "All defaults".to_string(),
                process: ProcessDef::default(),
                steel: SteelDef::default(),
                hardness_value: None,
            },
            CaseDef {
                id: "gear".to_string(),
                name: "Gear".to_string(),
                process: ProcessDef {
                    temperature_c: Some(930.0),
                    carbon_max: Some(1.2),
                    target_depth_mm: Some(0.8),
                    ..Default::default()
                },
                steel: SteelDef {
                    grade: Some("20MnCr5".to_string()),
                    initial_carbon: Some(0.18),
                },
                hardness_value: Some(600.0),
            },
        ],
    }
}

#[test]
fn roundtrip_yaml() {
    let file = sample();
    let path = std::env::temp_dir().join("cf_project_roundtrip.yaml");

    save_yaml(&path, &file).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(file, loaded);
}

#[test]
fn roundtrip_json() {
    let file = sample();
    let path = std::env::temp_dir().join("cf_project_roundtrip.json");

    save_json(&path, &file).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(file, loaded);

    let by_extension = load(&path).unwrap();
    assert_eq!(file, by_extension);
}

#[test]
fn unknown_extension_rejected() {
    let path = std::env::temp_dir().join("cf_project_roundtrip.toml");
    assert!(matches!(
        load(&path),
        Err(ProjectError::UnknownFormat { .. })
    ));
}

#[test]
fn invalid_file_is_not_saved() {
    let mut file = sample();
    file.cases[1].id = "defaults".to_string();
    let path = std::env::temp_dir().join("cf_project_invalid.yaml");
    assert!(matches!(
        save_yaml(&path, &file),
        Err(ProjectError::Validation(_))
    ));
}

#[test]
fn missing_blocks_default_to_empty() {
    let yaml = "version: 2\nname: Minimal\ncases:\n  - id: a\n    name: A\n";
    let file: CaseFile = serde_yaml::from_str(yaml).unwrap();
    let case = file.case("a").unwrap();
    assert_eq!(case.process, ProcessDef::default());
    assert_eq!(case.steel, SteelDef::default());
    assert!(file.case("b").is_none());
}
