#![deny(missing_docs)]

//! Kinematics selection for resonance production: phase-space bounds, the
//! cross-section maximum search and cache, the importance sampling envelope
//! and the accept/reject selector tying them together.

/// Physical ranges narrowed by cuts and the W ceiling.
pub mod bounds;
/// Memo of cross-section ceilings keyed by interaction signature.
pub mod cache;
/// YAML configuration schema and defaults.
pub mod config;
/// Closed-form proposal density over `(QD², W)`.
pub mod envelope;
/// Logarithmic scan for the differential cross-section maximum.
pub mod search;
/// Accept/reject selection entry point.
pub mod selector;

pub use bounds::PhaseSpaceBounds;
pub use cache::{Ceiling, MaxXSecCache, XSecSignature, CACHE_SCHEMA_VERSION};
pub use config::{KineConfig, KineCuts, ScanConfig};
pub use envelope::{EnvelopeParams, SamplingEnvelope};
pub use search::MaxXSecSearch;
pub use selector::{KinematicsSelector, Selection, SelectionStats};
