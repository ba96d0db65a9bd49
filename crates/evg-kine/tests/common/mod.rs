#![allow(dead_code)]

use evg_core::kinematics::{MQD2, MUON_MASS};
use evg_core::{
    InitialState, Interaction, KineLimits, KinePhaseSpace, KineVar, Range1D, Resonance,
    ResonanceChannel, UniformSource, XSecModel,
};

/// Rectangular phase space independent of the interaction.
pub struct BoxLimits {
    pub w: Range1D,
    pub q2: Range1D,
}

impl BoxLimits {
    pub fn standard() -> Self {
        Self {
            w: Range1D::new(1.0, 2.0),
            q2: Range1D::new(0.01, 1.0),
        }
    }
}

impl KineLimits for BoxLimits {
    fn w_limits(&self, _interaction: &Interaction) -> Range1D {
        self.w
    }

    fn q2_limits(&self, _interaction: &Interaction, w: f64) -> Range1D {
        if self.w.contains(w) {
            self.q2
        } else {
            Range1D::empty()
        }
    }
}

/// Breit-Wigner in W (unit peak) times a squared dipole in Q².
///
/// The dipole power cancels the QD² Jacobian, so `J·σ` never exceeds
/// `MQD2 · BW(W)`.
pub struct ToyModel {
    pub mass: f64,
    pub half_width: f64,
}

impl ToyModel {
    pub fn delta() -> Self {
        Self {
            mass: 1.232,
            half_width: 0.06,
        }
    }

    pub fn at(&self, w: f64, q2: f64) -> f64 {
        let dw = w - self.mass;
        let hh = self.half_width * self.half_width;
        let bw = hh / (dw * dw + hh);
        let dipole = 1.0 / (1.0 + q2 / MQD2);
        bw * dipole * dipole
    }
}

impl XSecModel for ToyModel {
    fn xsec(&self, interaction: &Interaction, _space: KinePhaseSpace) -> f64 {
        match (
            interaction.kinematics.running(KineVar::W),
            interaction.kinematics.running(KineVar::Q2),
        ) {
            (Some(w), Some(q2)) => self.at(w, q2),
            _ => 0.0,
        }
    }

    fn id(&self) -> &str {
        "toy-delta"
    }
}

/// Replays a fixed list of uniforms, cycling when exhausted.
pub struct Scripted {
    values: Vec<f64>,
    next: usize,
}

impl Scripted {
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            next: 0,
        }
    }

    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl UniformSource for Scripted {
    fn uniform(&mut self) -> f64 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

pub fn numu_delta(energy: f64) -> Interaction {
    Interaction::new(
        InitialState::numu_proton(energy),
        ResonanceChannel::Known(Resonance::P33_1232),
        MUON_MASS,
    )
}

pub fn running_q2(interaction: &Interaction) -> f64 {
    interaction.kinematics.running(KineVar::Q2).unwrap_or(0.0)
}

pub fn running_w(interaction: &Interaction) -> f64 {
    interaction.kinematics.running(KineVar::W).unwrap_or(0.0)
}
