use evg_core::{EvgError, Resonance, ResonanceChannel};
use evg_sim::{generate, parse_channel, scan, RunConfig};
use tempfile::tempdir;

fn small_config() -> RunConfig {
    RunConfig {
        events: 60,
        ..RunConfig::default()
    }
}

#[test]
fn generation_accounts_for_every_event() {
    let config = small_config();
    let summary = generate(&config, 17).unwrap();

    let failed: u64 = summary.failures.values().sum();
    assert_eq!(summary.requested, 60);
    assert_eq!(summary.events.len() as u64 + failed, 60);
    assert_eq!(summary.stats.accepted, summary.events.len() as u64);
    assert_eq!(summary.stats.selections, 60);
    assert_eq!(summary.provenance.master_seed, 17);
    assert_eq!(summary.provenance.config_hash.len(), 64);
    for event in &summary.events {
        assert_eq!(event.weight, 1.0);
        assert!(event.energy >= 1.0 && event.energy <= 3.0);
        assert!(event.w > 1.0 && event.w < 1.7);
        assert!(event.q2 > 0.0);
        assert!(event.x > 0.0 && event.x <= 1.0);
        assert!(event.y > 0.0 && event.y <= 1.0);
    }
}

#[test]
fn same_seed_reproduces_summary() {
    let config = small_config();
    assert_eq!(generate(&config, 5).unwrap(), generate(&config, 5).unwrap());
}

#[test]
fn cache_snapshot_is_reused_across_runs() {
    let dir = tempdir().unwrap();
    let config = RunConfig {
        cache_file: Some(dir.path().join("cache").join("maxxsec.bin")),
        ..small_config()
    };

    let first = generate(&config, 9).unwrap();
    assert!(first.stats.cache_misses > 0);
    assert!(dir.path().join("cache").join("maxxsec.bin").exists());

    let second = generate(&config, 9).unwrap();
    assert_eq!(second.stats.cache_misses, 0);
    assert_eq!(second.events, first.events);
    assert_eq!(second.cache_entries, first.cache_entries);
}

#[test]
fn cache_snapshot_from_other_model_is_refused() {
    let dir = tempdir().unwrap();
    let config = RunConfig {
        cache_file: Some(dir.path().join("maxxsec.bin")),
        ..small_config()
    };
    generate(&config, 9).unwrap();

    let mut louder = config.clone();
    louder.model.normalization = 20.0;
    let err = generate(&louder, 9).unwrap_err();
    assert!(matches!(err, EvgError::Cache(_)));
    assert_eq!(err.info().code, "cache-config");

    let mut narrower = config.clone();
    narrower.kinematics.wcut = Some(1.5);
    assert_eq!(generate(&narrower, 9).unwrap_err().info().code, "cache-config");

    // Seed, event count and spectrum do not change the ceilings.
    let mut longer = config.clone();
    longer.events = 80;
    longer.beam.energy_max = 2.5;
    assert!(generate(&longer, 10).is_ok());
}

#[test]
fn cache_fingerprint_tracks_ceiling_inputs_only() {
    let config = RunConfig::default();
    let base = config.cache_fingerprint("toy-resonance").unwrap();
    assert!(base.starts_with("toy-resonance:"));
    assert_ne!(base, config.cache_fingerprint("other-model").unwrap());

    let mut reseeded = config.clone();
    reseeded.seed_policy.master_seed = 1;
    reseeded.events = 5;
    assert_eq!(base, reseeded.cache_fingerprint("toy-resonance").unwrap());

    let mut rescaled = config.clone();
    rescaled.model.dipole_mass2 = 1.0;
    assert_ne!(base, rescaled.cache_fingerprint("toy-resonance").unwrap());

    let mut safer = config;
    safer.kinematics.max_xsec_safety_factor = 1.5;
    assert_ne!(base, safer.cache_fingerprint("toy-resonance").unwrap());
}

#[test]
fn uniform_mode_produces_weighted_events() {
    let mut config = small_config();
    config.kinematics.uniform_over_phase_space = true;
    let summary = generate(&config, 3).unwrap();
    assert!(!summary.events.is_empty());
    assert!(summary
        .events
        .iter()
        .all(|event| event.weight.is_finite() && event.weight > 0.0));
    assert!(summary.events.iter().any(|event| event.weight != 1.0));
}

#[test]
fn yaml_config_round_trips_and_hash_tracks_changes() {
    let yaml = "
events: 10
seed-policy:
  master-seed: 99
beam:
  energy-min: 2.0
  energy-max: 2.0
  channel:
    kind: known
    resonance: S11_1535
kinematics:
  wcut: 1.9
";
    let config = RunConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.events, 10);
    assert_eq!(config.seed_policy.master_seed, 99);
    assert_eq!(config.kinematics.wcut, Some(1.9));

    let mut other = config.clone();
    other.events = 11;
    assert_ne!(config.hash().unwrap(), other.hash().unwrap());
    assert_eq!(config.hash().unwrap(), config.clone().hash().unwrap());
}

#[test]
fn bad_energy_spectrum_is_rejected() {
    let err = RunConfig::from_yaml_str("beam:\n  energy-min: 3.0\n  energy-max: 1.0\n").unwrap_err();
    assert_eq!(err.info().code, "config-invalid");
}

#[test]
fn scan_reports_scaled_ceiling() {
    let report = scan(&RunConfig::default(), 2.0).unwrap();
    assert_eq!(report.channel, "P33(1232)");
    assert!(report.ceiling.raw_max > 0.0);
    assert!((report.ceiling.value - 1.25 * report.ceiling.raw_max).abs() < 1e-12);
}

#[test]
fn channel_names_parse_for_the_command_line() {
    assert_eq!(
        parse_channel("P11(1440)").unwrap(),
        ResonanceChannel::Known(Resonance::P11_1440)
    );
    assert_eq!(
        parse_channel("D13_1520").unwrap(),
        ResonanceChannel::Known(Resonance::D13_1520)
    );
    assert_eq!(parse_channel("Generic").unwrap(), ResonanceChannel::Generic);

    let err = parse_channel("Z99(9999)").unwrap_err();
    assert!(matches!(err, EvgError::Config(_)));
    assert_eq!(err.info().code, "config-channel");
}

#[test]
fn scan_follows_parsed_channel() {
    let mut config = RunConfig::default();
    config.beam.channel = parse_channel("S11(1535)").unwrap();
    let report = scan(&config, 2.0).unwrap();
    assert_eq!(report.channel, "S11(1535)");
    assert!(report.ceiling.value > 0.0);
}
