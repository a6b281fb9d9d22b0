use crate::api::{apply_override, validate};
use crate::defaults::default_policy;
use crate::errors::PolicyError;
use crate::loader::{load_policy, load_policy_with_options, LoadOptions};
use crate::model::PolicySource;
use foldbeacon_core_types::{ActivationPolicy, ReferenceLine};
use serial_test::serial;
use std::env;

#[test]
fn default_policy_matches_beacon_defaults() {
    let policy = default_policy();
    assert!(policy.features.atf && policy.features.lrc);
    assert_eq!(policy.lazy.threshold_px, 1800.0);
    assert_eq!(policy.lazy.skip_strings, vec!["memex".to_string()]);
    assert_eq!(policy.lazy.activation, ActivationPolicy::ParentRelative);
    assert_eq!(policy.paint.max_candidates, None);
    assert_eq!(policy.lazy.marker_attribute, "data-location-hash");
    assert!(validate(&policy).is_ok());
}

#[test]
#[serial]
fn load_policy_applies_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("beacon.yaml");
    std::fs::write(
        &file_path,
        r#"paint:
  elements: "img, picture"
  max_candidates: 1
lazy:
  threshold_px: 600
  activation: depth_relative
  reference: scroll_top
  exclusions:
    - attribute: class
      pattern: "^carousel"
timing:
  start_delay_ms: 0
"#,
    )
    .unwrap();

    let policy = load_policy(Some(&file_path)).unwrap();
    assert_eq!(policy.paint.elements, "img, picture");
    assert_eq!(policy.paint.max_candidates, Some(1));
    assert_eq!(policy.lazy.threshold_px, 600.0);
    assert_eq!(policy.lazy.activation, ActivationPolicy::DepthRelative);
    assert_eq!(policy.lazy.reference, ReferenceLine::ScrollTop);
    assert_eq!(policy.lazy.exclusions.len(), 1);
    assert_eq!(policy.lazy.exclusions[0].pattern, "^carousel");
    assert_eq!(policy.timing.start_delay_ms, 0);
    assert_eq!(policy.source_of("lazy.threshold_px"), Some(PolicySource::File));
    assert_eq!(policy.source_of("timing.guard_ms"), Some(PolicySource::Builtin));
}

#[test]
#[serial]
fn env_overrides_take_precedence_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("beacon.yaml");
    std::fs::write(&file_path, "lazy:\n  threshold_px: 600\n").unwrap();

    env::set_var("FOLDBEACON_POLICY__LAZY__THRESHOLD_PX", "900");
    env::set_var("FOLDBEACON_POLICY__LAZY__SKIP_STRINGS", "memex, widget");
    let result = load_policy(Some(&file_path));
    env::remove_var("FOLDBEACON_POLICY__LAZY__THRESHOLD_PX");
    env::remove_var("FOLDBEACON_POLICY__LAZY__SKIP_STRINGS");

    let policy = result.unwrap();
    assert_eq!(policy.lazy.threshold_px, 900.0);
    assert_eq!(
        policy.lazy.skip_strings,
        vec!["memex".to_string(), "widget".to_string()]
    );
    assert_eq!(policy.source_of("lazy.threshold_px"), Some(PolicySource::Env));
}

#[test]
#[serial]
fn json_env_override_is_flattened() {
    env::set_var(
        "FOLDBEACON_POLICY_OVERRIDE_JSON",
        r#"{"features": {"lrc": false}, "screen": {"is_mobile": true}}"#,
    );
    let result = load_policy(None);
    env::remove_var("FOLDBEACON_POLICY_OVERRIDE_JSON");

    let policy = result.unwrap();
    assert!(!policy.features.lrc);
    assert!(policy.screen.is_mobile);
}

#[test]
#[serial]
fn cli_overrides_are_applied_last() {
    env::set_var("FOLDBEACON_POLICY__DEBUG", "false");
    let options = LoadOptions {
        paths: Vec::new(),
        include_env: true,
        cli_overrides: vec!["debug=true".into(), "paint.max_candidates=null".into()],
    };
    let result = load_policy_with_options(&options);
    env::remove_var("FOLDBEACON_POLICY__DEBUG");

    let policy = result.unwrap();
    assert!(policy.debug);
    assert_eq!(policy.source_of("debug"), Some(PolicySource::Cli));
}

#[test]
fn unknown_paths_are_rejected() {
    let mut policy = default_policy();
    let err = apply_override(
        &mut policy,
        "lazy.nope",
        &serde_json::json!(1),
        PolicySource::Cli,
    )
    .unwrap_err();
    assert!(matches!(err, PolicyError::UnsupportedPath(_)));
}

#[test]
fn override_bumps_revision_only_on_change() {
    let mut policy = default_policy();
    let rev = policy.rev;
    let same = apply_override(
        &mut policy,
        "features.atf",
        &serde_json::json!(true),
        PolicySource::Cli,
    )
    .unwrap();
    assert!(!same);
    assert_eq!(policy.rev, rev);

    let changed = apply_override(
        &mut policy,
        "lazy.activation",
        &serde_json::json!("depth-relative"),
        PolicySource::Cli,
    )
    .unwrap();
    assert!(changed);
    assert_eq!(policy.rev, rev + 1);
}

#[test]
fn validation_rejects_missing_selector_and_threshold() {
    let mut policy = default_policy();
    policy.paint.elements = "  ".into();
    assert!(matches!(validate(&policy), Err(PolicyError::InvalidValue(_))));

    let mut policy = default_policy();
    policy.lazy.threshold_px = f64::NAN;
    assert!(validate(&policy).is_err());

    let mut policy = default_policy();
    policy.paint.max_candidates = Some(0);
    assert!(validate(&policy).is_err());
}

#[test]
fn malformed_cli_pairs_are_rejected() {
    let options = LoadOptions {
        cli_overrides: vec!["lazy.threshold_px".into()],
        ..LoadOptions::default()
    };
    assert!(matches!(
        load_policy_with_options(&options),
        Err(PolicyError::Override(_))
    ));
}

#[test]
fn unreadable_yaml_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("broken.yaml");
    std::fs::write(&file_path, "lazy: [unclosed").unwrap();
    let err = load_policy_with_options(&LoadOptions {
        paths: vec![file_path.clone()],
        ..LoadOptions::default()
    })
    .unwrap_err();
    assert!(matches!(&err, PolicyError::Yaml { path, .. } if *path == file_path));
}
