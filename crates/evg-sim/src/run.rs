use std::collections::BTreeMap;

use evg_core::{EventRecord, EvgError, InelasticLimits, RandomStreams, UniformSource, XSecModel};
use evg_kine::{Ceiling, KinematicsSelector, MaxXSecSearch, SelectionStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::model::ToyResonanceModel;

/// Provenance recorded with every summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProvenance {
    /// SHA-256 of the resolved configuration.
    pub config_hash: String,
    /// Master seed of the random streams.
    pub master_seed: u64,
    /// Cross-section model identifier.
    pub model: String,
    /// Version of the driver.
    pub tool_version: String,
}

/// One event with selected kinematics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEvent {
    /// Probe energy in GeV.
    pub energy: f64,
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
    /// Event weight.
    pub weight: f64,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Inputs identifying the run.
    pub provenance: RunProvenance,
    /// Events attempted.
    pub requested: usize,
    /// Events with selected kinematics.
    pub events: Vec<GeneratedEvent>,
    /// Skipped events keyed by error code.
    pub failures: BTreeMap<String, u64>,
    /// Selector counters at the end of the run.
    pub stats: SelectionStats,
    /// Ceilings held by the cache at the end of the run.
    pub cache_entries: usize,
}

/// Ceiling found by a one-off search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Probe energy in GeV.
    pub energy: f64,
    /// Resonance channel scanned.
    pub channel: String,
    /// Search result.
    pub ceiling: Ceiling,
}

/// Selector over the two-body inelastic limits and the toy model.
///
/// The cache is tagged with [`RunConfig::cache_fingerprint`].
pub fn build_selector(config: &RunConfig) -> Result<KinematicsSelector, EvgError> {
    let model = ToyResonanceModel::new(&config.model);
    let fingerprint = config.cache_fingerprint(model.id())?;
    let mut selector = KinematicsSelector::new(
        config.kinematics.clone(),
        Box::new(InelasticLimits),
        Box::new(model),
    )?;
    selector.cache_mut().set_fingerprint(fingerprint);
    Ok(selector)
}

/// Generates `config.events` events with the given master seed.
///
/// Event-level failures are counted and skipped. Any other error aborts the
/// run. The cache snapshot named by `cache-file` is merged before the first
/// event and rewritten at the end. A snapshot saved under another model or
/// selector configuration is refused with a `cache-config` error.
pub fn generate(config: &RunConfig, master_seed: u64) -> Result<RunSummary, EvgError> {
    let mut selector = build_selector(config)?;
    if let Some(path) = &config.cache_file {
        if path.exists() {
            let added = selector.cache_mut().load(path)?;
            info!(path = %path.display(), added, "loaded max xsec cache");
        }
    }

    let mut streams = RandomStreams::new(master_seed);
    let beam = &config.beam;
    let mut events = Vec::new();
    let mut failures: BTreeMap<String, u64> = BTreeMap::new();
    for index in 0..config.events {
        let energy =
            beam.energy_min + (beam.energy_max - beam.energy_min) * streams.flux().uniform();
        let mut record = EventRecord::new(beam.interaction(energy), config.model.total_xsec);
        match selector.select(&mut record, streams.kine()) {
            Ok(selection) => events.push(GeneratedEvent {
                energy,
                w: selection.w,
                q2: selection.q2,
                x: selection.x,
                y: selection.y,
                diff_xsec: selection.diff_xsec,
                weight: selection.weight,
            }),
            Err(err) if err.fast_forward() => {
                debug!(index, energy, code = %err.info().code, "skipping event");
                *failures.entry(err.info().code.clone()).or_default() += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if let Some(path) = &config.cache_file {
        selector.cache().save(path)?;
    }

    let stats = selector.stats().clone();
    info!(
        accepted = stats.accepted,
        failed = stats.failed,
        efficiency = stats.efficiency(),
        "generation finished"
    );
    Ok(RunSummary {
        provenance: RunProvenance {
            config_hash: config.hash()?,
            master_seed,
            model: ToyResonanceModel::new(&config.model).id().to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        requested: config.events,
        events,
        failures,
        stats,
        cache_entries: selector.cache().len(),
    })
}

/// Runs the maximum search at one energy.
pub fn scan(config: &RunConfig, energy: f64) -> Result<ScanReport, EvgError> {
    let selector = build_selector(config)?;
    let model = ToyResonanceModel::new(&config.model);
    let mut interaction = config.beam.interaction(energy);
    let ceiling = MaxXSecSearch::new(selector.bounds(), &model, selector.config())
        .search(&mut interaction);
    Ok(ScanReport {
        energy,
        channel: interaction.channel.to_string(),
        ceiling,
    })
}
