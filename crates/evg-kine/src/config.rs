use std::fs;
use std::path::Path;

use evg_core::{ErrorInfo, EvgError};
use serde::{Deserialize, Serialize};

/// YAML-configurable options of the kinematics selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KineConfig {
    /// User cuts narrowing the physical phase space.
    #[serde(default)]
    pub cuts: KineCuts,
    /// Ceiling on W applied on top of the cuts (`null` disables it).
    #[serde(default = "default_wcut")]
    pub wcut: Option<f64>,
    /// Factor scaling the searched maximum cross section.
    #[serde(default = "default_safety_factor")]
    pub max_xsec_safety_factor: f64,
    /// Factor used instead of `max_xsec_safety_factor` at low energies.
    #[serde(default = "default_low_energy_safety_factor")]
    pub low_energy_safety_factor: f64,
    /// Energy (GeV) below which `low_energy_safety_factor` applies.
    #[serde(default = "default_low_energy_threshold")]
    pub low_energy_threshold: f64,
    /// Energy (GeV) below which maxima are never cached.
    #[serde(default = "default_min_energy_cached")]
    pub min_energy_cached: f64,
    /// Width (GeV) of the energy buckets of the maximum cache.
    #[serde(default = "default_cache_energy_bin")]
    pub cache_energy_bin: f64,
    /// Generate uniformly over phase space and weight events.
    #[serde(default)]
    pub uniform_over_phase_space: bool,
    /// Allowed fractional excess of a sampled density over the envelope.
    #[serde(default)]
    pub max_xsec_diff_tolerance: f64,
    /// Trials allowed before a selection is abandoned.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Multiplier between the cross-section ceiling and the envelope plateau.
    #[serde(default = "default_envelope_headroom")]
    pub envelope_headroom: f64,
    /// W steps used when integrating the phase-space volume.
    #[serde(default = "default_volume_steps")]
    pub phase_space_volume_steps: usize,
    /// Maximum search grid.
    #[serde(default)]
    pub scan: ScanConfig,
}

fn default_wcut() -> Option<f64> {
    Some(1.7)
}

fn default_safety_factor() -> f64 {
    1.25
}

fn default_low_energy_safety_factor() -> f64 {
    2.0
}

fn default_low_energy_threshold() -> f64 {
    0.8
}

fn default_min_energy_cached() -> f64 {
    1.0
}

fn default_cache_energy_bin() -> f64 {
    0.05
}

fn default_max_iterations() -> usize {
    1000
}

fn default_envelope_headroom() -> f64 {
    5.0
}

fn default_volume_steps() -> usize {
    100
}

impl Default for KineConfig {
    fn default() -> Self {
        Self {
            cuts: KineCuts::default(),
            wcut: default_wcut(),
            max_xsec_safety_factor: default_safety_factor(),
            low_energy_safety_factor: default_low_energy_safety_factor(),
            low_energy_threshold: default_low_energy_threshold(),
            min_energy_cached: default_min_energy_cached(),
            cache_energy_bin: default_cache_energy_bin(),
            uniform_over_phase_space: false,
            max_xsec_diff_tolerance: 0.0,
            max_iterations: default_max_iterations(),
            envelope_headroom: default_envelope_headroom(),
            phase_space_volume_steps: default_volume_steps(),
            scan: ScanConfig::default(),
        }
    }
}

/// User cuts on W and Q².
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KineCuts {
    /// Lower W cut in GeV.
    #[serde(default)]
    pub w_min: Option<f64>,
    /// Upper W cut in GeV.
    #[serde(default)]
    pub w_max: Option<f64>,
    /// Lower Q² cut in GeV².
    #[serde(default)]
    pub q2_min: Option<f64>,
    /// Upper Q² cut in GeV².
    #[serde(default)]
    pub q2_max: Option<f64>,
}

/// Grid of the maximum cross-section search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScanConfig {
    /// Points of the coarse logarithmic Q² grid.
    #[serde(default = "default_q2_points")]
    pub q2_points: usize,
    /// Step divisor and number of backward steps of the refinement.
    #[serde(default = "default_refine_steps")]
    pub refine_steps: usize,
}

fn default_q2_points() -> usize {
    15
}

fn default_refine_steps() -> usize {
    3
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            q2_points: default_q2_points(),
            refine_steps: default_refine_steps(),
        }
    }
}

impl KineConfig {
    /// Parses a YAML document and validates it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EvgError> {
        let config: KineConfig = serde_yaml::from_str(yaml)
            .map_err(|err| EvgError::Config(ErrorInfo::new("config-parse", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML file.
    pub fn load(path: &Path) -> Result<Self, EvgError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            EvgError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Rejects settings the selector cannot honour.
    pub fn validate(&self) -> Result<(), EvgError> {
        let positive = [
            ("max-xsec-safety-factor", self.max_xsec_safety_factor),
            ("low-energy-safety-factor", self.low_energy_safety_factor),
            ("cache-energy-bin", self.cache_energy_bin),
            ("envelope-headroom", self.envelope_headroom),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(key, value, "must be positive and finite"));
            }
        }
        if !(self.max_xsec_diff_tolerance >= 0.0) {
            return Err(invalid(
                "max-xsec-diff-tolerance",
                self.max_xsec_diff_tolerance,
                "must not be negative",
            ));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max-iterations", 0, "must be at least 1"));
        }
        if self.phase_space_volume_steps == 0 {
            return Err(invalid("phase-space-volume-steps", 0, "must be at least 1"));
        }
        if self.scan.q2_points < 2 {
            return Err(invalid("scan.q2-points", self.scan.q2_points, "must be at least 2"));
        }
        if self.scan.refine_steps == 0 {
            return Err(invalid("scan.refine-steps", 0, "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString, reason: &str) -> EvgError {
    EvgError::Config(
        ErrorInfo::new("config-invalid", format!("{key} {reason}"))
            .with_context("key", key)
            .with_context("value", value),
    )
}
