//! Kinematic constants, variable transforms and inelastic phase-space limits.

use crate::interaction::Interaction;
use crate::range::Range1D;
use crate::KineLimits;

/// Small offset keeping samples away from exact phase-space boundaries.
pub const A_SMALL_NUM: f64 = 1e-6;
/// Smallest Q² (GeV²) considered physical.
pub const MIN_Q2_LIMIT: f64 = 1e-4;
/// Dipole mass squared (GeV²) of the Q² → QD² transform.
pub const MQD2: f64 = 0.71;
/// Charged pion mass in GeV.
pub const PION_MASS: f64 = 0.139_570;
/// Proton mass in GeV.
pub const PROTON_MASS: f64 = 0.938_272;
/// Neutron mass in GeV.
pub const NEUTRON_MASS: f64 = 0.939_565;
/// Muon mass in GeV.
pub const MUON_MASS: f64 = 0.105_658;

/// Maps Q² onto QD² = 1 / (1 + Q²/M²), which takes out the dipole fall-off.
pub fn q2_to_qd2(q2: f64) -> f64 {
    1.0 / (1.0 + q2 / MQD2)
}

/// Inverse of [`q2_to_qd2`].
pub fn qd2_to_q2(qd2: f64) -> f64 {
    MQD2 * (1.0 / qd2 - 1.0)
}

/// |dQ²/dQD²| evaluated at `q2`.
///
/// Multiplying a density in (W, Q²) by this factor gives the density in
/// (W, QD²).
pub fn qd2_jacobian(q2: f64) -> f64 {
    let ratio = 1.0 + q2 / MQD2;
    MQD2 * ratio * ratio
}

/// Computes `(x, y)` for the given `(W, Q²)` on a nucleon of mass `m` hit by
/// a probe of energy `e`.
pub fn wq2_to_xy(e: f64, m: f64, w: f64, q2: f64) -> (f64, f64) {
    let hadronic = w * w - m * m + q2;
    let x = q2 / hadronic;
    let y = hadronic / (2.0 * m * e);
    (x, y)
}

/// Centre-of-mass energy squared of a probe of energy `e` on mass `m` at rest.
pub fn mandelstam_s(e: f64, m: f64) -> f64 {
    m * m + 2.0 * m * e
}

/// Two-body inelastic limits for `probe + N → lepton + X(W)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InelasticLimits;

impl KineLimits for InelasticLimits {
    fn w_limits(&self, interaction: &Interaction) -> Range1D {
        let m = interaction.hit_nucleon_mass();
        let s = mandelstam_s(interaction.probe_energy(), m);
        if s <= 0.0 {
            return Range1D::empty();
        }
        let range = Range1D::new(NEUTRON_MASS + PION_MASS, s.sqrt() - interaction.lepton_mass);
        if range.is_empty() {
            Range1D::empty()
        } else {
            range
        }
    }

    fn q2_limits(&self, interaction: &Interaction, w: f64) -> Range1D {
        let m = interaction.hit_nucleon_mass();
        let ml2 = interaction.lepton_mass * interaction.lepton_mass;
        let s = mandelstam_s(interaction.probe_energy(), m);
        if s <= 0.0 || w <= 0.0 {
            return Range1D::empty();
        }
        let sqs = s.sqrt();
        let e1_cm = (s + ml2 - w * w) / (2.0 * sqs);
        let p1_sq = e1_cm * e1_cm - ml2;
        if e1_cm <= 0.0 || p1_sq < 0.0 {
            return Range1D::empty();
        }
        let p1_cm = p1_sq.sqrt();
        let e0_cm = (s - m * m) / (2.0 * sqs);
        let q2_min = -ml2 + 2.0 * e0_cm * (e1_cm - p1_cm);
        let q2_max = -ml2 + 2.0 * e0_cm * (e1_cm + p1_cm);
        Range1D::new(q2_min.max(MIN_Q2_LIMIT), q2_max)
    }
}
