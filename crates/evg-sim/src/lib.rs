#![deny(missing_docs)]

//! End-to-end driver for the resonance kinematics selector: run
//! configuration, a toy cross-section model and the generation loop.

/// YAML run configuration.
pub mod config;
/// Toy resonance cross section.
pub mod model;
/// Generation and scan entry points.
pub mod run;

pub use config::{parse_channel, BeamConfig, RunConfig, SeedPolicy, ToyModelConfig};
pub use model::ToyResonanceModel;
pub use run::{build_selector, generate, scan, GeneratedEvent, RunProvenance, RunSummary, ScanReport};
