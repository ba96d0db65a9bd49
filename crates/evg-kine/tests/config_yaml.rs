use std::fs;

use evg_core::EvgError;
use evg_kine::KineConfig;
use tempfile::tempdir;

#[test]
fn empty_document_yields_defaults() {
    let config = KineConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, KineConfig::default());
    assert_eq!(config.wcut, Some(1.7));
    assert_eq!(config.max_xsec_safety_factor, 1.25);
    assert_eq!(config.min_energy_cached, 1.0);
    assert_eq!(config.max_iterations, 1000);
    assert_eq!(config.scan.q2_points, 15);
    assert!(!config.uniform_over_phase_space);
}

#[test]
fn partial_document_overrides_selected_keys() {
    let yaml = "
uniform-over-phase-space: true
wcut: null
cuts:
  w-max: 1.5
  q2-min: 0.05
scan:
  q2-points: 30
";
    let config = KineConfig::from_yaml_str(yaml).unwrap();
    assert!(config.uniform_over_phase_space);
    assert_eq!(config.wcut, None);
    assert_eq!(config.cuts.w_max, Some(1.5));
    assert_eq!(config.cuts.q2_min, Some(0.05));
    assert_eq!(config.cuts.w_min, None);
    assert_eq!(config.scan.q2_points, 30);
    assert_eq!(config.scan.refine_steps, 3);
}

#[test]
fn invalid_values_are_rejected() {
    let err = KineConfig::from_yaml_str("max-xsec-safety-factor: -1.0").unwrap_err();
    assert!(matches!(err, EvgError::Config(_)));
    assert_eq!(err.info().code, "config-invalid");
    assert_eq!(err.info().context["key"], "max-xsec-safety-factor");

    let err = KineConfig::from_yaml_str("scan:\n  q2-points: 1").unwrap_err();
    assert_eq!(err.info().context["key"], "scan.q2-points");

    let err = KineConfig::from_yaml_str("max-xsec-diff-tolerance: -0.5").unwrap_err();
    assert_eq!(err.info().code, "config-invalid");
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = KineConfig::from_yaml_str("max-iterations: [1, 2").unwrap_err();
    assert_eq!(err.info().code, "config-parse");
}

#[test]
fn load_reads_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kine.yaml");
    fs::write(&path, "max-iterations: 250\n").unwrap();
    let config = KineConfig::load(&path).unwrap();
    assert_eq!(config.max_iterations, 250);

    let err = KineConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(err.info().code, "config-read");
}
