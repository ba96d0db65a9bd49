use evg_core::{ErrorInfo, EvgError, Interaction, KineLimits, KineVar, Range1D};
use tracing::debug;

use crate::config::{KineConfig, KineCuts};

/// Physical kinematic ranges narrowed by user cuts and the W ceiling.
pub struct PhaseSpaceBounds {
    limits: Box<dyn KineLimits>,
    cuts: KineCuts,
    wcut: Option<f64>,
    volume_steps: usize,
}

impl PhaseSpaceBounds {
    /// Combines a limits provider with the cuts of `config`.
    pub fn new(limits: Box<dyn KineLimits>, config: &KineConfig) -> Self {
        Self {
            limits,
            cuts: config.cuts.clone(),
            wcut: config.wcut,
            volume_steps: config.phase_space_volume_steps.max(1),
        }
    }

    /// W range including cuts and the W ceiling. May be empty.
    pub fn w_range(&self, interaction: &Interaction) -> Range1D {
        let mut range = self.limits.w_limits(interaction);
        debug!(min = range.min, max = range.max, "physical W range");
        range.apply_cuts(self.cuts.w_min, self.cuts.w_max);
        if let Some(wcut) = self.wcut {
            range.cap_max(wcut);
        }
        debug!(min = range.min, max = range.max, "W range including cuts");
        range
    }

    /// Q² range at fixed `w` including cuts. May be empty.
    pub fn q2_range(&self, interaction: &Interaction, w: f64) -> Range1D {
        let mut range = self.limits.q2_limits(interaction, w);
        range.apply_cuts(self.cuts.q2_min, self.cuts.q2_max);
        range
    }

    /// Non-empty range of `var` or [`EvgError::NoAvailablePhaseSpace`].
    ///
    /// Q² is conditioned on the running W of the interaction, or on the
    /// lower W edge when no W has been set yet.
    pub fn bounds(&self, interaction: &Interaction, var: KineVar) -> Result<Range1D, EvgError> {
        let range = match var {
            KineVar::W => self.w_range(interaction),
            KineVar::Q2 => {
                let w = match interaction.kinematics.running(KineVar::W) {
                    Some(w) => w,
                    None => self.w_range(interaction).min,
                };
                self.q2_range(interaction, w)
            }
            KineVar::X | KineVar::Y => {
                return Err(EvgError::Config(
                    ErrorInfo::new("unsupported-variable", "no bounds for derived variable")
                        .with_context("variable", var.as_str()),
                ))
            }
        };
        if range.is_empty() {
            return Err(no_phase_space(interaction, var, range));
        }
        Ok(range)
    }

    /// ∫ dW ΔQ²(W) over the cut W range (midpoint rule).
    pub fn phase_space_volume(&self, interaction: &Interaction) -> f64 {
        let w = self.w_range(interaction);
        if w.is_empty() {
            return 0.0;
        }
        let dw = w.width() / self.volume_steps as f64;
        (0..self.volume_steps)
            .map(|step| {
                let q2 = self.q2_range(interaction, w.min + (step as f64 + 0.5) * dw);
                if q2.is_empty() {
                    0.0
                } else {
                    q2.width() * dw
                }
            })
            .sum()
    }
}

pub(crate) fn no_phase_space(interaction: &Interaction, var: KineVar, range: Range1D) -> EvgError {
    EvgError::NoAvailablePhaseSpace(
        ErrorInfo::new("no-phase-space", "No available phase space")
            .with_context("variable", var.as_str())
            .with_context("min", range.min)
            .with_context("max", range.max)
            .with_context("interaction", interaction),
    )
}
