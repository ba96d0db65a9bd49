//! Interaction hypotheses and their mutable kinematic state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kinematics::PROTON_MASS;

/// Kinematic variables tracked on an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KineVar {
    /// Hadronic invariant mass.
    W,
    /// Momentum transfer squared (positive convention).
    Q2,
    /// Bjorken scaling variable.
    X,
    /// Inelasticity.
    Y,
}

impl KineVar {
    /// Short label used in logs and error contexts.
    pub fn as_str(&self) -> &'static str {
        match self {
            KineVar::W => "W",
            KineVar::Q2 => "Q2",
            KineVar::X => "x",
            KineVar::Y => "y",
        }
    }
}

/// Baryon resonances reachable in single-resonance production.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resonance {
    /// Delta(1232).
    P33_1232,
    /// N(1535).
    S11_1535,
    /// N(1520).
    D13_1520,
    /// N(1650).
    S11_1650,
    /// N(1700).
    D13_1700,
    /// N(1675).
    D15_1675,
    /// Delta(1620).
    S31_1620,
    /// Delta(1700).
    D33_1700,
    /// N(1440), the Roper.
    P11_1440,
    /// Delta(1600).
    P33_1600,
    /// N(1720).
    P13_1720,
    /// N(1680).
    F15_1680,
    /// Delta(1910).
    P31_1910,
    /// Delta(1920).
    P33_1920,
    /// Delta(1905).
    F35_1905,
    /// Delta(1950).
    F37_1950,
}

impl Resonance {
    /// Every resonance in canonical order.
    pub const ALL: [Resonance; 16] = [
        Resonance::P33_1232,
        Resonance::S11_1535,
        Resonance::D13_1520,
        Resonance::S11_1650,
        Resonance::D13_1700,
        Resonance::D15_1675,
        Resonance::S31_1620,
        Resonance::D33_1700,
        Resonance::P11_1440,
        Resonance::P33_1600,
        Resonance::P13_1720,
        Resonance::F15_1680,
        Resonance::P31_1910,
        Resonance::P33_1920,
        Resonance::F35_1905,
        Resonance::F37_1950,
    ];

    /// Pole mass in GeV.
    pub fn mass(&self) -> f64 {
        match self {
            Resonance::P33_1232 => 1.232,
            Resonance::S11_1535 => 1.535,
            Resonance::D13_1520 => 1.520,
            Resonance::S11_1650 => 1.650,
            Resonance::D13_1700 => 1.700,
            Resonance::D15_1675 => 1.675,
            Resonance::S31_1620 => 1.620,
            Resonance::D33_1700 => 1.700,
            Resonance::P11_1440 => 1.440,
            Resonance::P33_1600 => 1.600,
            Resonance::P13_1720 => 1.720,
            Resonance::F15_1680 => 1.680,
            Resonance::P31_1910 => 1.910,
            Resonance::P33_1920 => 1.920,
            Resonance::F35_1905 => 1.905,
            Resonance::F37_1950 => 1.950,
        }
    }

    /// Total width in GeV.
    pub fn width(&self) -> f64 {
        match self {
            Resonance::P33_1232 => 0.120,
            Resonance::S11_1535 => 0.150,
            Resonance::D13_1520 => 0.120,
            Resonance::S11_1650 => 0.150,
            Resonance::D13_1700 => 0.100,
            Resonance::D15_1675 => 0.150,
            Resonance::S31_1620 => 0.150,
            Resonance::D33_1700 => 0.300,
            Resonance::P11_1440 => 0.350,
            Resonance::P33_1600 => 0.350,
            Resonance::P13_1720 => 0.150,
            Resonance::F15_1680 => 0.130,
            Resonance::P31_1910 => 0.250,
            Resonance::P33_1920 => 0.200,
            Resonance::F35_1905 => 0.350,
            Resonance::F37_1950 => 0.300,
        }
    }

    /// Spectroscopic name, e.g. `P33(1232)`.
    pub fn name(&self) -> &'static str {
        match self {
            Resonance::P33_1232 => "P33(1232)",
            Resonance::S11_1535 => "S11(1535)",
            Resonance::D13_1520 => "D13(1520)",
            Resonance::S11_1650 => "S11(1650)",
            Resonance::D13_1700 => "D13(1700)",
            Resonance::D15_1675 => "D15(1675)",
            Resonance::S31_1620 => "S31(1620)",
            Resonance::D33_1700 => "D33(1700)",
            Resonance::P11_1440 => "P11(1440)",
            Resonance::P33_1600 => "P33(1600)",
            Resonance::P13_1720 => "P13(1720)",
            Resonance::F15_1680 => "F15(1680)",
            Resonance::P31_1910 => "P31(1910)",
            Resonance::P33_1920 => "P33(1920)",
            Resonance::F35_1905 => "F35(1905)",
            Resonance::F37_1950 => "F37(1950)",
        }
    }

    /// Looks a resonance up by its spectroscopic name or enum label.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|res| res.name() == wanted || format!("{res:?}") == wanted)
    }
}

/// Envelope width used for every known resonance, in GeV.
pub const KNOWN_ENVELOPE_WIDTH: f64 = 0.220;
/// Envelope mass used when the resonance is not known, in GeV.
pub const GENERIC_ENVELOPE_MASS: f64 = 1.2;
/// Envelope width used when the resonance is not known, in GeV.
pub const GENERIC_ENVELOPE_WIDTH: f64 = 0.6;
/// Representative W of the maximum search when the resonance is not known.
pub const GENERIC_SCAN_MASS: f64 = 1.23;

/// Exclusive channel tag of a resonance-production interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "resonance", rename_all = "kebab-case")]
pub enum ResonanceChannel {
    /// A specific resonance is produced.
    Known(Resonance),
    /// Resonance not specified; generic parameters apply.
    Generic,
}

impl ResonanceChannel {
    /// `(mass, width)` that shape the importance sampling envelope.
    pub fn envelope_params(&self) -> (f64, f64) {
        match self {
            ResonanceChannel::Known(res) => (res.mass(), KNOWN_ENVELOPE_WIDTH),
            ResonanceChannel::Generic => (GENERIC_ENVELOPE_MASS, GENERIC_ENVELOPE_WIDTH),
        }
    }

    /// W at which the differential cross section is expected to peak.
    pub fn scan_mass(&self) -> f64 {
        match self {
            ResonanceChannel::Known(res) => res.mass(),
            ResonanceChannel::Generic => GENERIC_SCAN_MASS,
        }
    }

    /// Stable numeric identifier used in cache signatures.
    pub fn code(&self) -> i32 {
        match self {
            ResonanceChannel::Known(res) => Resonance::ALL
                .iter()
                .position(|candidate| candidate == res)
                .map_or(-1, |idx| idx as i32),
            ResonanceChannel::Generic => -1,
        }
    }
}

impl fmt::Display for ResonanceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResonanceChannel::Known(res) => f.write_str(res.name()),
            ResonanceChannel::Generic => f.write_str("generic"),
        }
    }
}

/// Probe and target of an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    /// PDG code of the incident particle.
    pub probe_pdg: i32,
    /// PDG code of the nuclear target.
    pub target_pdg: i32,
    /// PDG code of the struck nucleon.
    pub hit_nucleon_pdg: i32,
    /// Probe energy in the struck-nucleon rest frame, in GeV.
    pub probe_energy: f64,
    /// Invariant mass of the struck nucleon (may be off shell), in GeV.
    pub hit_nucleon_mass: f64,
}

impl InitialState {
    /// Muon neutrino on a free proton at the given energy.
    pub fn numu_proton(probe_energy: f64) -> Self {
        Self {
            probe_pdg: 14,
            target_pdg: 2212,
            hit_nucleon_pdg: 2212,
            probe_energy,
            hit_nucleon_mass: PROTON_MASS,
        }
    }
}

/// Running (candidate) and selected (locked) kinematic values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    running: BTreeMap<KineVar, f64>,
    selected: BTreeMap<KineVar, f64>,
}

impl Kinematics {
    /// Sets a candidate value for the current trial.
    pub fn set_running(&mut self, var: KineVar, value: f64) {
        self.running.insert(var, value);
    }

    /// Candidate value for the current trial, if any.
    pub fn running(&self, var: KineVar) -> Option<f64> {
        self.running.get(&var).copied()
    }

    /// Locks a final value.
    pub fn lock(&mut self, var: KineVar, value: f64) {
        self.selected.insert(var, value);
    }

    /// Locked value, if selection completed.
    pub fn selected(&self, var: KineVar) -> Option<f64> {
        self.selected.get(&var).copied()
    }

    /// Whether any value has been locked.
    pub fn is_locked(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Drops every running value.
    pub fn clear_running(&mut self) {
        self.running.clear();
    }
}

/// Interaction hypothesis handed to the kinematics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Probe and target.
    pub init_state: InitialState,
    /// Exclusive resonance channel.
    pub channel: ResonanceChannel,
    /// Mass of the final state primary lepton, in GeV.
    pub lepton_mass: f64,
    /// Kinematic state.
    #[serde(default)]
    pub kinematics: Kinematics,
}

impl Interaction {
    /// Creates an interaction with no kinematic state.
    pub fn new(init_state: InitialState, channel: ResonanceChannel, lepton_mass: f64) -> Self {
        Self {
            init_state,
            channel,
            lepton_mass,
            kinematics: Kinematics::default(),
        }
    }

    /// Probe energy in the struck-nucleon rest frame.
    pub fn probe_energy(&self) -> f64 {
        self.init_state.probe_energy
    }

    /// Struck nucleon mass.
    pub fn hit_nucleon_mass(&self) -> f64 {
        self.init_state.hit_nucleon_mass
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "probe={};tgt={};N={};E={:.4};res={}",
            self.init_state.probe_pdg,
            self.init_state.target_pdg,
            self.init_state.hit_nucleon_pdg,
            self.init_state.probe_energy,
            self.channel
        )
    }
}
