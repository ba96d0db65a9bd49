use std::fs;
use std::path::{Path, PathBuf};

use evg_core::kinematics::{MQD2, MUON_MASS, PROTON_MASS};
use evg_core::{ErrorInfo, EvgError, InitialState, Interaction, Resonance, ResonanceChannel};
use evg_kine::KineConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Top-level configuration of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunConfig {
    /// Kinematics selector options.
    #[serde(default)]
    pub kinematics: KineConfig,
    /// Probe, target and energy spectrum.
    #[serde(default)]
    pub beam: BeamConfig,
    /// Toy cross-section model.
    #[serde(default)]
    pub model: ToyModelConfig,
    /// Number of events to attempt.
    #[serde(default = "default_events")]
    pub events: usize,
    /// Seeding of the random streams.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Maximum cross-section snapshot read before and written after the run.
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
}

fn default_events() -> usize {
    1000
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            kinematics: KineConfig::default(),
            beam: BeamConfig::default(),
            model: ToyModelConfig::default(),
            events: default_events(),
            seed_policy: SeedPolicy::default(),
            cache_file: None,
        }
    }
}

/// Incident beam and target description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BeamConfig {
    /// PDG code of the probe.
    #[serde(default = "default_probe_pdg")]
    pub probe_pdg: i32,
    /// PDG code of the target.
    #[serde(default = "default_nucleon_pdg")]
    pub target_pdg: i32,
    /// PDG code of the struck nucleon.
    #[serde(default = "default_nucleon_pdg")]
    pub hit_nucleon_pdg: i32,
    /// Struck nucleon mass in GeV.
    #[serde(default = "default_nucleon_mass")]
    pub hit_nucleon_mass: f64,
    /// Final state lepton mass in GeV.
    #[serde(default = "default_lepton_mass")]
    pub lepton_mass: f64,
    /// Lower edge of the flat energy spectrum in GeV.
    #[serde(default = "default_energy_min")]
    pub energy_min: f64,
    /// Upper edge of the flat energy spectrum in GeV.
    #[serde(default = "default_energy_max")]
    pub energy_max: f64,
    /// Resonance channel generated.
    #[serde(default = "default_channel")]
    pub channel: ResonanceChannel,
}

fn default_probe_pdg() -> i32 {
    14
}

fn default_nucleon_pdg() -> i32 {
    2212
}

fn default_nucleon_mass() -> f64 {
    PROTON_MASS
}

fn default_lepton_mass() -> f64 {
    MUON_MASS
}

fn default_energy_min() -> f64 {
    1.0
}

fn default_energy_max() -> f64 {
    3.0
}

fn default_channel() -> ResonanceChannel {
    ResonanceChannel::Known(Resonance::P33_1232)
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            probe_pdg: default_probe_pdg(),
            target_pdg: default_nucleon_pdg(),
            hit_nucleon_pdg: default_nucleon_pdg(),
            hit_nucleon_mass: default_nucleon_mass(),
            lepton_mass: default_lepton_mass(),
            energy_min: default_energy_min(),
            energy_max: default_energy_max(),
            channel: default_channel(),
        }
    }
}

impl BeamConfig {
    /// Interaction hypothesis at the given probe energy.
    pub fn interaction(&self, energy: f64) -> Interaction {
        let init_state = InitialState {
            probe_pdg: self.probe_pdg,
            target_pdg: self.target_pdg,
            hit_nucleon_pdg: self.hit_nucleon_pdg,
            probe_energy: energy,
            hit_nucleon_mass: self.hit_nucleon_mass,
        };
        Interaction::new(init_state, self.channel, self.lepton_mass)
    }
}

/// Parameters of the toy Breit-Wigner times dipole model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToyModelConfig {
    /// Overall scale of the differential cross section.
    #[serde(default = "default_normalization")]
    pub normalization: f64,
    /// Squared dipole mass in GeV².
    #[serde(default = "default_dipole_mass2")]
    pub dipole_mass2: f64,
    /// Total cross section assigned to every event (uniform mode weights).
    #[serde(default = "default_total_xsec")]
    pub total_xsec: f64,
}

fn default_normalization() -> f64 {
    1.0
}

fn default_dipole_mass2() -> f64 {
    MQD2
}

fn default_total_xsec() -> f64 {
    1.0
}

impl Default for ToyModelConfig {
    fn default() -> Self {
        Self {
            normalization: default_normalization(),
            dipole_mass2: default_dipole_mass2(),
            total_xsec: default_total_xsec(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeedPolicy {
    /// Master seed from which every stream is derived.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
        }
    }
}

impl RunConfig {
    /// Parses and validates a YAML run configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EvgError> {
        let config: RunConfig = serde_yaml::from_str(yaml)
            .map_err(|err| EvgError::Config(ErrorInfo::new("config-parse", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a YAML run configuration from disk.
    pub fn load(path: &Path) -> Result<Self, EvgError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            EvgError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Checks the beam and model sections and the nested selector options.
    pub fn validate(&self) -> Result<(), EvgError> {
        self.kinematics.validate()?;
        let beam = &self.beam;
        if !(beam.energy_min > 0.0 && beam.energy_min <= beam.energy_max) {
            return Err(EvgError::Config(
                ErrorInfo::new("config-invalid", "energy spectrum must satisfy 0 < min <= max")
                    .with_context("energy-min", beam.energy_min)
                    .with_context("energy-max", beam.energy_max),
            ));
        }
        let positive = [
            ("model.normalization", self.model.normalization),
            ("model.dipole-mass2", self.model.dipole_mass2),
            ("model.total-xsec", self.model.total_xsec),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EvgError::Config(
                    ErrorInfo::new("config-invalid", format!("{key} must be positive"))
                        .with_context("key", key)
                        .with_context("value", value),
                ));
            }
        }
        Ok(())
    }

    /// SHA-256 of the resolved configuration in canonical JSON, hex encoded.
    pub fn hash(&self) -> Result<String, EvgError> {
        let bytes = serde_json::to_vec(self)
            .map_err(|err| EvgError::Config(ErrorInfo::new("config-serialize", err.to_string())))?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// Identity of the settings a cached ceiling depends on.
    ///
    /// Covers the model id, the selector options, the model parameters and
    /// the masses of the interaction. Event count, seed, spectrum and cache
    /// path are left out so runs differing only in those share a snapshot.
    pub fn cache_fingerprint(&self, model_id: &str) -> Result<String, EvgError> {
        let section = (
            &self.kinematics,
            &self.model,
            self.beam.hit_nucleon_mass,
            self.beam.lepton_mass,
        );
        let bytes = serde_json::to_vec(&section)
            .map_err(|err| EvgError::Config(ErrorInfo::new("config-serialize", err.to_string())))?;
        Ok(format!("{model_id}:{}", hex::encode(Sha256::digest(&bytes))))
    }
}

/// Parses a resonance channel name as accepted on the command line.
///
/// Takes a spectroscopic name such as `P33(1232)`, an enum label such as
/// `P33_1232`, or `generic`.
pub fn parse_channel(name: &str) -> Result<ResonanceChannel, EvgError> {
    if name.trim().eq_ignore_ascii_case("generic") {
        return Ok(ResonanceChannel::Generic);
    }
    Resonance::from_name(name)
        .map(ResonanceChannel::Known)
        .ok_or_else(|| {
            EvgError::Config(
                ErrorInfo::new("config-channel", format!("unknown resonance `{name}`"))
                    .with_hint("use a name such as P33(1232), its label P33_1232, or generic"),
            )
        })
}
