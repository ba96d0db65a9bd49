use evg_core::interaction::{GENERIC_ENVELOPE_MASS, GENERIC_ENVELOPE_WIDTH};
use evg_core::kinematics::qd2_jacobian;
use evg_core::{Interaction, KinePhaseSpace, KineVar, ResonanceChannel, XSecModel};

use crate::config::ToyModelConfig;

/// Non-relativistic Breit-Wigner in W times a squared dipole in Q².
///
/// Reads the running `W` and `Q2` and returns zero when either is missing.
#[derive(Debug, Clone)]
pub struct ToyResonanceModel {
    normalization: f64,
    dipole_mass2: f64,
}

impl ToyResonanceModel {
    /// Builds the model from its configuration section.
    pub fn new(config: &ToyModelConfig) -> Self {
        Self {
            normalization: config.normalization,
            dipole_mass2: config.dipole_mass2,
        }
    }

    /// d²σ/dWdQ² at `(w, q2)` for `channel`.
    pub fn at(&self, channel: ResonanceChannel, w: f64, q2: f64) -> f64 {
        let (mass, width) = match channel {
            ResonanceChannel::Known(res) => (res.mass(), res.width()),
            ResonanceChannel::Generic => (GENERIC_ENVELOPE_MASS, GENERIC_ENVELOPE_WIDTH),
        };
        let half = 0.5 * width;
        let dw = w - mass;
        let breit_wigner = half * half / (dw * dw + half * half);
        let dipole = 1.0 / (1.0 + q2 / self.dipole_mass2);
        self.normalization * breit_wigner * dipole * dipole
    }
}

impl XSecModel for ToyResonanceModel {
    fn xsec(&self, interaction: &Interaction, space: KinePhaseSpace) -> f64 {
        let kine = &interaction.kinematics;
        let (Some(w), Some(q2)) = (kine.running(KineVar::W), kine.running(KineVar::Q2)) else {
            return 0.0;
        };
        let xsec = self.at(interaction.channel, w, q2);
        match space {
            KinePhaseSpace::WQ2fE => xsec,
            KinePhaseSpace::WQD2fE => xsec * qd2_jacobian(q2),
        }
    }

    fn id(&self) -> &str {
        "toy-resonance"
    }
}
