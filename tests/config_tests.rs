use schedule_engine::config::{ConfigError, DEPENDENCY_POLICY_ENV};
use schedule_engine::{DependencyType, DependencyTypePolicy, EngineConfig, ScheduleError};
use std::fs;
use tempfile::tempdir;

#[test]
fn defaults_reject_unknown_codes() {
    let config = EngineConfig::default();
    assert_eq!(config.dependency_type_policy, DependencyTypePolicy::Reject);
    assert!(config.validate_snapshots);
    assert_eq!(config.max_conflict_scan_tasks, 500);

    assert_eq!(
        config.parse_dependency_type("ff").unwrap(),
        DependencyType::FinishToFinish
    );
    assert_eq!(
        config.parse_dependency_type("  ").unwrap(),
        DependencyType::FinishToStart
    );
    assert!(matches!(
        config.parse_dependency_type("finish"),
        Err(ScheduleError::UnknownDependencyType(_))
    ));
}

#[test]
fn fallback_policy_maps_unknown_codes_to_finish_to_start() {
    let config = EngineConfig {
        dependency_type_policy: DependencyTypePolicy::FallbackToFinishToStart,
        ..EngineConfig::default()
    };
    assert_eq!(
        config.parse_dependency_type("??").unwrap(),
        DependencyType::FinishToStart
    );
    assert_eq!(
        config.parse_dependency_type("SF").unwrap(),
        DependencyType::StartToFinish
    );
}

#[test]
fn partial_json_keeps_remaining_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    fs::write(&path, r#"{"dependency_type_policy": "fallback_to_finish_to_start"}"#).unwrap();

    let config = EngineConfig::from_json_file(&path).unwrap();
    assert_eq!(
        config.dependency_type_policy,
        DependencyTypePolicy::FallbackToFinishToStart
    );
    assert_eq!(config.max_conflict_scan_tasks, 500);
}

#[test]
fn saved_config_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    let config = EngineConfig {
        validate_snapshots: false,
        max_conflict_scan_tasks: 42,
        ..EngineConfig::default()
    };

    config.save_json_file(&path).unwrap();
    assert_eq!(EngineConfig::from_json_file(&path).unwrap(), config);
}

#[test]
fn malformed_files_are_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    fs::write(&path, r#"{"dependency_type_policy": "sometimes"}"#).unwrap();

    assert!(matches!(
        EngineConfig::from_json_file(&path),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        EngineConfig::from_json_file(dir.path().join("missing.json")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn policy_override_rejects_unknown_values() {
    let err = EngineConfig::default()
        .with_overrides(|key| (key == DEPENDENCY_POLICY_ENV).then(|| "lenient".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("lenient"));

    let config = EngineConfig::default()
        .with_overrides(|key| (key == DEPENDENCY_POLICY_ENV).then(|| "Reject".to_string()))
        .unwrap();
    assert_eq!(config.dependency_type_policy, DependencyTypePolicy::Reject);
}

#[test]
fn policy_parses_through_from_str() {
    assert_eq!(
        "fallback".parse::<DependencyTypePolicy>().unwrap(),
        DependencyTypePolicy::FallbackToFinishToStart
    );
    assert_eq!(
        " FALLBACK_TO_FINISH_TO_START ".parse::<DependencyTypePolicy>().unwrap(),
        DependencyTypePolicy::FallbackToFinishToStart
    );
    assert_eq!(
        "reject".parse::<DependencyTypePolicy>().unwrap(),
        DependencyTypePolicy::Reject
    );
    let err = "lenient".parse::<DependencyTypePolicy>().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            key: DEPENDENCY_POLICY_ENV,
            ref value,
        } if value == "lenient"
    ));
}
