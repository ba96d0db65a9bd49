use evg_core::kinematics::{self, A_SMALL_NUM};
use evg_core::{
    ErrorInfo, EventFlag, EventRecord, EvgError, Interaction, KineLimits, KinePhaseSpace, KineVar,
    Range1D, UniformSource, XSecModel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::bounds::{self, PhaseSpaceBounds};
use crate::cache::{Ceiling, MaxXSecCache};
use crate::config::KineConfig;
use crate::envelope::{EnvelopeParams, SamplingEnvelope};
use crate::search::MaxXSecSearch;

/// Kinematics committed by a successful selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Hadronic invariant mass.
    pub w: f64,
    /// Momentum transfer squared.
    pub q2: f64,
    /// Bjorken x.
    pub x: f64,
    /// Inelasticity.
    pub y: f64,
    /// Differential cross section at the selected point.
    pub diff_xsec: f64,
    /// Event weight after the selection.
    pub weight: f64,
    /// Trials spent, the accepted one included.
    pub iterations: usize,
}

/// Running counters of a selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionStats {
    /// Calls to [`KinematicsSelector::select`].
    pub selections: u64,
    /// Selections that committed kinematics.
    pub accepted: u64,
    /// Selections that returned an error.
    pub failed: u64,
    /// Proposal trials across all selections.
    pub trials: u64,
    /// Cross-section evaluations made by the trial loop.
    pub evaluations: u64,
    /// Ceilings served from the cache.
    pub cache_hits: u64,
    /// Ceilings computed by a search.
    pub cache_misses: u64,
}

impl SelectionStats {
    /// Accepted fraction of all trials.
    pub fn efficiency(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.accepted as f64 / self.trials as f64
        }
    }
}

/// Candidate drawn by one trial.
struct Trial {
    w: f64,
    q2: f64,
    qd2: f64,
}

/// Accept/reject selection of `(W, Q²)` for resonance production.
///
/// In the default mode events are unweighted: candidates come from a
/// [`SamplingEnvelope`] pinned to the cached cross-section ceiling and are
/// accepted with probability `J·σ / envelope`. With
/// `uniform-over-phase-space` candidates are uniform in the allowed region,
/// every candidate with positive cross section is kept, and the event weight
/// carries the density instead.
pub struct KinematicsSelector {
    config: KineConfig,
    bounds: PhaseSpaceBounds,
    model: Box<dyn XSecModel>,
    cache: MaxXSecCache,
    stats: SelectionStats,
}

impl KinematicsSelector {
    /// Builds a selector after validating `config`.
    pub fn new(
        config: KineConfig,
        limits: Box<dyn KineLimits>,
        model: Box<dyn XSecModel>,
    ) -> Result<Self, EvgError> {
        config.validate()?;
        let cache = MaxXSecCache::new(config.min_energy_cached, config.cache_energy_bin);
        Ok(Self {
            bounds: PhaseSpaceBounds::new(limits, &config),
            config,
            model,
            cache,
            stats: SelectionStats::default(),
        })
    }

    /// Replaces the cache, e.g. with one loaded from a snapshot.
    pub fn with_cache(mut self, cache: MaxXSecCache) -> Self {
        self.cache = cache;
        self
    }

    /// Selector configuration.
    pub fn config(&self) -> &KineConfig {
        &self.config
    }

    /// Phase-space bounds used by the selector.
    pub fn bounds(&self) -> &PhaseSpaceBounds {
        &self.bounds
    }

    /// Cross-section ceilings gathered so far.
    pub fn cache(&self) -> &MaxXSecCache {
        &self.cache
    }

    /// Mutable access to the ceiling cache.
    pub fn cache_mut(&mut self) -> &mut MaxXSecCache {
        &mut self.cache
    }

    /// Counters accumulated over every selection.
    pub fn stats(&self) -> &SelectionStats {
        &self.stats
    }

    /// Ceiling for `interaction` from the cache, searching on a miss.
    pub fn max_xsec(&mut self, interaction: &mut Interaction) -> Ceiling {
        let signature = self.cache.signature(interaction);
        if let Some(signature) = &signature {
            if let Some(ceiling) = self.cache.get(signature) {
                self.stats.cache_hits += 1;
                return ceiling;
            }
        }
        self.stats.cache_misses += 1;
        let search = MaxXSecSearch::new(&self.bounds, self.model.as_ref(), &self.config);
        let mut ceiling = search.search(interaction);
        let Some(signature) = signature else {
            return ceiling;
        };
        // A cached ceiling answers every energy in its bin, so it must also
        // hold at the top of the bin, where the phase space is widest.
        let mut upper = interaction.clone();
        upper.init_state.probe_energy = self.cache.bin_upper_edge(&signature);
        let edge = search.search(&mut upper);
        let evaluations = ceiling.evaluations + edge.evaluations;
        if edge.value > ceiling.value {
            ceiling = edge;
        }
        ceiling.evaluations = evaluations;
        if ceiling.value > 0.0 {
            self.cache.put(signature, ceiling);
        }
        ceiling
    }

    /// Selects `(W, Q², x, y)` for the record's interaction.
    ///
    /// On success the kinematics are locked on the interaction, the
    /// differential cross section is stored and, in uniform mode, the event
    /// weight is updated. On failure a flag is raised on the record and no
    /// kinematics are locked. The selector never retries on its own.
    pub fn select(
        &mut self,
        event: &mut EventRecord,
        rng: &mut dyn UniformSource,
    ) -> Result<Selection, EvgError> {
        self.stats.selections += 1;
        let outcome = self.run_selection(event, rng);
        event.interaction.kinematics.clear_running();
        match &outcome {
            Ok(selection) => {
                self.stats.accepted += 1;
                info!(
                    w = selection.w,
                    q2 = selection.q2,
                    iterations = selection.iterations,
                    "selected kinematics"
                );
            }
            Err(err) => {
                self.stats.failed += 1;
                event.set_flag(match err {
                    EvgError::NoAvailablePhaseSpace(_) => EventFlag::NoAvailablePhaseSpace,
                    _ => EventFlag::NoValidKinematics,
                });
                if err.is_fatal() {
                    error!(%err, "kinematic selection aborted");
                } else {
                    warn!(%err, "kinematic selection failed");
                }
            }
        }
        outcome
    }

    fn run_selection(
        &mut self,
        event: &mut EventRecord,
        rng: &mut dyn UniformSource,
    ) -> Result<Selection, EvgError> {
        let uniform = self.config.uniform_over_phase_space;
        if uniform {
            debug!("generating kinematics uniformly over the allowed phase space");
        }

        let w_range = self.bounds.w_range(&event.interaction);
        let w_min = w_range.min + A_SMALL_NUM;
        let w_max = w_range.max - A_SMALL_NUM;
        if w_range.is_empty() || w_min >= w_max {
            return Err(bounds::no_phase_space(
                &event.interaction,
                KineVar::W,
                w_range,
            ));
        }

        let ceiling = if uniform {
            if !(event.xsec.is_finite() && event.xsec > 0.0) {
                return Err(EvgError::Record(
                    ErrorInfo::new("non-positive-total-xsec", "event has no total cross section")
                        .with_context("xsec", event.xsec)
                        .with_hint("weighted generation divides by the total cross section"),
                ));
            }
            None
        } else {
            let ceiling = self.max_xsec(&mut event.interaction);
            if !(ceiling.value > 0.0) {
                return Err(EvgError::NonPositiveCeiling(
                    ErrorInfo::new("non-positive-max-xsec", "Non-positive maximum xsec")
                        .with_context("max_xsec", ceiling.value)
                        .with_context("interaction", &event.interaction),
                ));
            }
            Some(ceiling)
        };

        let w_sampling = Range1D::new(w_min, w_max);
        let mut envelope: Option<SamplingEnvelope> = None;
        let mut iteration = 0;
        loop {
            iteration += 1;
            if iteration > self.config.max_iterations {
                return Err(EvgError::SelectionExhausted(
                    ErrorInfo::new("kinematics-exhausted", "Couldn't select kinematics")
                        .with_context("iterations", self.config.max_iterations)
                        .with_context("interaction", &event.interaction),
                ));
            }
            self.stats.trials += 1;

            let trial = match ceiling {
                None => self.uniform_trial(&event.interaction, w_sampling, rng),
                Some(ceiling) => {
                    if envelope.is_none() {
                        envelope = Some(self.configure_envelope(
                            &event.interaction,
                            w_sampling,
                            w_range,
                            ceiling,
                        )?);
                    }
                    match envelope.as_ref() {
                        Some(envelope) => self.envelope_trial(&event.interaction, envelope, rng),
                        None => None,
                    }
                }
            };
            let Some(trial) = trial else {
                continue;
            };
            trace!(w = trial.w, q2 = trial.q2, "trying kinematics");

            let kine = &mut event.interaction.kinematics;
            kine.set_running(KineVar::W, trial.w);
            kine.set_running(KineVar::Q2, trial.q2);
            let xsec = self.model.xsec(&event.interaction, KinePhaseSpace::WQ2fE);
            self.stats.evaluations += 1;

            let accept = match &envelope {
                None => xsec > 0.0,
                Some(envelope) => {
                    let max = envelope.density(trial.qd2, trial.w);
                    let t = max * rng.uniform();
                    let density = kinematics::qd2_jacobian(trial.q2) * xsec;
                    self.assert_xsec_limits(&event.interaction, density, max)?;
                    trace!(xsec, density, t, "acceptance test");
                    t < density
                }
            };
            if accept {
                return Ok(self.commit(event, &trial, xsec, iteration));
            }
        }
    }

    fn uniform_trial(
        &self,
        interaction: &Interaction,
        w_range: Range1D,
        rng: &mut dyn UniformSource,
    ) -> Option<Trial> {
        let w = w_range.min + w_range.width() * rng.uniform();
        let q2_range = self.bounds.q2_range(interaction, w);
        if q2_range.is_empty() {
            return None;
        }
        let q2 = q2_range.min + q2_range.width() * rng.uniform();
        Some(Trial {
            w,
            q2,
            qd2: kinematics::q2_to_qd2(q2),
        })
    }

    fn envelope_trial(
        &self,
        interaction: &Interaction,
        envelope: &SamplingEnvelope,
        rng: &mut dyn UniformSource,
    ) -> Option<Trial> {
        let (qd2, w) = envelope.sample(rng);
        let q2 = kinematics::qd2_to_q2(qd2);
        if !self.bounds.q2_range(interaction, w).contains(q2) {
            trace!(w, q2, "candidate outside the allowed Q2 range");
            return None;
        }
        Some(Trial { w, q2, qd2 })
    }

    fn configure_envelope(
        &self,
        interaction: &Interaction,
        w_sampling: Range1D,
        w_range: Range1D,
        ceiling: Ceiling,
    ) -> Result<SamplingEnvelope, EvgError> {
        let q2_range = self.bounds.q2_range(interaction, w_sampling.min);
        if q2_range.is_empty() {
            return Err(bounds::no_phase_space(interaction, KineVar::Q2, q2_range));
        }
        let q2_min = A_SMALL_NUM;
        let q2_max = q2_range.max - A_SMALL_NUM;
        let qd2 = Range1D::new(kinematics::q2_to_qd2(q2_max), kinematics::q2_to_qd2(q2_min));
        let (resonance_mass, resonance_width) = interaction.channel.envelope_params();
        let params = EnvelopeParams {
            resonance_mass,
            resonance_width,
            height: ceiling.value * self.config.envelope_headroom,
            w_max: w_range.max,
        };
        debug!(?params, qd2_min = qd2.min, qd2_max = qd2.max, "configured sampling envelope");
        SamplingEnvelope::configure(qd2, w_sampling, params)
    }

    fn assert_xsec_limits(
        &self,
        interaction: &Interaction,
        density: f64,
        max: f64,
    ) -> Result<(), EvgError> {
        if density <= max {
            return Ok(());
        }
        let excess = if max > 0.0 {
            (density - max) / max
        } else {
            f64::INFINITY
        };
        if excess > self.config.max_xsec_diff_tolerance {
            return Err(EvgError::CeilingViolation(
                ErrorInfo::new(
                    "ceiling-violation",
                    "Exceeding estimated maximum differential cross section",
                )
                .with_context("density", density)
                .with_context("max", max)
                .with_context("fractional_excess", excess)
                .with_context("interaction", interaction)
                .with_hint("raise max-xsec-safety-factor or envelope-headroom"),
            ));
        }
        warn!(density, max, excess, "density above envelope within tolerance");
        Ok(())
    }

    fn commit(
        &self,
        event: &mut EventRecord,
        trial: &Trial,
        xsec: f64,
        iterations: usize,
    ) -> Selection {
        let interaction = &event.interaction;
        let (x, y) = kinematics::wq2_to_xy(
            interaction.probe_energy(),
            interaction.hit_nucleon_mass(),
            trial.w,
            trial.q2,
        );
        event.diff_xsec = xsec;

        if self.config.uniform_over_phase_space {
            let volume = self.bounds.phase_space_volume(interaction);
            let weight = volume / event.xsec * xsec;
            debug!(volume, weight, "kinematics weight");
            event.weight *= weight;
            debug!(weight = event.weight, "current event weight");
        }

        let kine = &mut event.interaction.kinematics;
        kine.lock(KineVar::W, trial.w);
        kine.lock(KineVar::Q2, trial.q2);
        kine.lock(KineVar::X, x);
        kine.lock(KineVar::Y, y);
        kine.clear_running();

        Selection {
            w: trial.w,
            q2: trial.q2,
            x,
            y,
            diff_xsec: xsec,
            weight: event.weight,
            iterations,
        }
    }
}
