#![deny(missing_docs)]
#![doc = "Core traits and data types for the EVG kinematics engine: interactions, \
event records, errors, deterministic randomness and kinematic utilities."]

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod interaction;
pub mod kinematics;
pub mod range;
pub mod record;
pub mod rng;

pub use errors::{ErrorInfo, EvgError};
pub use interaction::{InitialState, Interaction, KineVar, Kinematics, Resonance, ResonanceChannel};
pub use kinematics::InelasticLimits;
pub use range::Range1D;
pub use record::{EventFlag, EventRecord};
pub use rng::{derive_substream_seed, RandomStreams, RngHandle, Stream, UniformSource};

/// Phase-space convention in which a differential cross section is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KinePhaseSpace {
    /// d²σ/dWdQ² at fixed probe energy.
    WQ2fE,
    /// d²σ/dWdQD² at fixed probe energy.
    WQD2fE,
}

/// Differential cross-section evaluator.
///
/// Implementations read the running `W` and `Q2` of the interaction. They
/// must be deterministic for fixed inputs and return a non-negative value.
pub trait XSecModel: Send + Sync {
    /// Evaluates the differential cross section at the running kinematics.
    fn xsec(&self, interaction: &Interaction, space: KinePhaseSpace) -> f64;

    /// Identifier used in diagnostics.
    fn id(&self) -> &str {
        "anonymous"
    }
}

impl<F> XSecModel for F
where
    F: Fn(&Interaction, KinePhaseSpace) -> f64 + Send + Sync,
{
    fn xsec(&self, interaction: &Interaction, space: KinePhaseSpace) -> f64 {
        self(interaction, space)
    }
}

/// Provider of physically allowed kinematic ranges.
pub trait KineLimits: Send + Sync {
    /// Allowed hadronic invariant mass range.
    fn w_limits(&self, interaction: &Interaction) -> Range1D;

    /// Allowed Q² range at fixed `w`.
    fn q2_limits(&self, interaction: &Interaction, w: f64) -> Range1D;
}
