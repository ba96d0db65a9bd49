use evg_core::kinematics::{A_SMALL_NUM, MIN_Q2_LIMIT};
use evg_core::{Interaction, KinePhaseSpace, KineVar, XSecModel};
use tracing::{debug, trace};

use crate::bounds::PhaseSpaceBounds;
use crate::cache::Ceiling;
use crate::config::KineConfig;

/// Fast estimate of the differential cross-section maximum.
///
/// W is pinned near the resonance peak and Q² is scanned on a coarse
/// logarithmic grid. The first time the scan stops increasing the step is
/// refined and a few points behind the current one are revisited, which
/// recovers peaks the coarse grid straddles. The scan then ends. The result
/// is not exact, and the safety factor covers the difference.
pub struct MaxXSecSearch<'a> {
    bounds: &'a PhaseSpaceBounds,
    model: &'a dyn XSecModel,
    config: &'a KineConfig,
}

impl<'a> MaxXSecSearch<'a> {
    /// Creates a search over the cut phase space of `bounds`.
    pub fn new(
        bounds: &'a PhaseSpaceBounds,
        model: &'a dyn XSecModel,
        config: &'a KineConfig,
    ) -> Self {
        Self {
            bounds,
            model,
            config,
        }
    }

    /// Safety factor applied at the interaction's energy.
    pub fn safety_factor(&self, interaction: &Interaction) -> f64 {
        if interaction.probe_energy() < self.config.low_energy_threshold {
            self.config.low_energy_safety_factor
        } else {
            self.config.max_xsec_safety_factor
        }
    }

    /// Scans the phase space of `interaction` for its maximum.
    ///
    /// The running kinematics are cleared before returning.
    pub fn search(&self, interaction: &mut Interaction) -> Ceiling {
        let safety_factor = self.safety_factor(interaction);
        let ceiling = self.scan(interaction, safety_factor);
        interaction.kinematics.clear_running();
        debug!(
            %interaction,
            model = self.model.id(),
            raw_max = ceiling.raw_max,
            max = ceiling.value,
            evaluations = ceiling.evaluations,
            "max xsec in phase space"
        );
        ceiling
    }

    fn scan(&self, interaction: &mut Interaction, safety_factor: f64) -> Ceiling {
        let w_range = self.bounds.w_range(interaction);
        if w_range.is_empty() {
            return Ceiling::zero(safety_factor);
        }
        let peak = interaction.channel.scan_mass();
        let w = if w_range.contains(peak) {
            peak
        } else if peak >= w_range.max {
            w_range.max - A_SMALL_NUM
        } else {
            w_range.min + A_SMALL_NUM
        };
        interaction.kinematics.set_running(KineVar::W, w);

        let q2_range = self.bounds.q2_range(interaction, w);
        if q2_range.max < MIN_Q2_LIMIT || q2_range.min <= 0.0 || q2_range.is_empty() {
            return Ceiling::zero(safety_factor);
        }

        let points = self.config.scan.q2_points;
        let divisor = self.config.scan.refine_steps;
        let log_min = (q2_range.min + A_SMALL_NUM).ln();
        let log_max = (q2_range.max - A_SMALL_NUM).ln();
        let mut dlog = (log_max - log_min) / (points - 1) as f64;

        let mut max_xsec = 0.0_f64;
        let mut previous = -1.0;
        let mut evaluations = 0;
        for point in 0..points {
            let mut q2 = (log_min + point as f64 * dlog).exp();
            let xsec = self.evaluate(interaction, w, q2);
            evaluations += 1;
            max_xsec = max_xsec.max(xsec);
            let increasing = xsec > previous;
            previous = xsec;
            if increasing {
                continue;
            }

            dlog /= divisor as f64;
            for _ in 0..divisor {
                q2 = (q2.ln() - dlog).exp();
                if q2 < q2_range.min {
                    continue;
                }
                let xsec = self.evaluate(interaction, w, q2);
                evaluations += 1;
                max_xsec = max_xsec.max(xsec);
            }
            break;
        }

        Ceiling {
            value: max_xsec * safety_factor,
            raw_max: max_xsec,
            safety_factor,
            evaluations,
        }
    }

    fn evaluate(&self, interaction: &mut Interaction, w: f64, q2: f64) -> f64 {
        interaction.kinematics.set_running(KineVar::Q2, q2);
        let xsec = self.model.xsec(interaction, KinePhaseSpace::WQ2fE);
        trace!(w, q2, xsec, "scan point");
        xsec
    }
}
