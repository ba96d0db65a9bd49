use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use evg_core::{ErrorInfo, EvgError, Interaction};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Version of the on-disk snapshot layout.
pub const CACHE_SCHEMA_VERSION: u32 = 2;

/// Discretized interaction signature keying the maximum cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct XSecSignature {
    /// PDG code of the probe.
    pub probe_pdg: i32,
    /// PDG code of the target.
    pub target_pdg: i32,
    /// PDG code of the struck nucleon.
    pub hit_nucleon_pdg: i32,
    /// Resonance channel code (`-1` for the generic channel).
    pub channel: i32,
    /// Index of the energy bucket.
    pub energy_bin: u64,
}

/// Ceiling of the differential cross section for one signature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ceiling {
    /// Maximum with the safety factor applied.
    pub value: f64,
    /// Maximum found by the scan.
    pub raw_max: f64,
    /// Safety factor folded into `value`.
    pub safety_factor: f64,
    /// Cross-section evaluations spent finding it.
    pub evaluations: usize,
}

impl Ceiling {
    /// A zero ceiling for degenerate phase space.
    pub fn zero(safety_factor: f64) -> Self {
        Self {
            value: 0.0,
            raw_max: 0.0,
            safety_factor,
            evaluations: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheSnapshot {
    schema_version: u32,
    bin_width: f64,
    fingerprint: String,
    entries: Vec<(XSecSignature, Ceiling)>,
}

/// Append-only memo of cross-section ceilings.
///
/// Not synchronized: a cache belongs to one selector. Workers generating in
/// parallel keep private caches.
///
/// Ceilings depend on the cross-section model and the kinematics settings,
/// neither of which is part of the signature. The owner tags the cache with a
/// fingerprint of both; snapshots carrying another fingerprint are refused.
#[derive(Debug, Clone)]
pub struct MaxXSecCache {
    min_energy: f64,
    bin_width: f64,
    fingerprint: String,
    entries: BTreeMap<XSecSignature, Ceiling>,
    hits: u64,
    misses: u64,
}

impl MaxXSecCache {
    /// Creates an empty cache.
    pub fn new(min_energy: f64, bin_width: f64) -> Self {
        Self {
            min_energy,
            bin_width,
            fingerprint: String::new(),
            entries: BTreeMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Tags the cache with a fingerprint of the model and settings behind it.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.set_fingerprint(fingerprint);
        self
    }

    /// Replaces the fingerprint. Entries already cached are dropped when it
    /// changes.
    pub fn set_fingerprint(&mut self, fingerprint: impl Into<String>) {
        let fingerprint = fingerprint.into();
        if fingerprint != self.fingerprint && !self.entries.is_empty() {
            debug!(dropped = self.entries.len(), "cache fingerprint changed");
            self.entries.clear();
        }
        self.fingerprint = fingerprint;
    }

    /// Fingerprint the cached ceilings were computed under.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Signature of `interaction`, or `None` below the caching threshold.
    pub fn signature(&self, interaction: &Interaction) -> Option<XSecSignature> {
        let energy = interaction.probe_energy();
        if !(energy >= self.min_energy) {
            return None;
        }
        let init = &interaction.init_state;
        Some(XSecSignature {
            probe_pdg: init.probe_pdg,
            target_pdg: init.target_pdg,
            hit_nucleon_pdg: init.hit_nucleon_pdg,
            channel: interaction.channel.code(),
            energy_bin: (energy / self.bin_width).floor() as u64,
        })
    }

    /// Upper energy edge of the bucket `signature` falls in.
    pub fn bin_upper_edge(&self, signature: &XSecSignature) -> f64 {
        (signature.energy_bin + 1) as f64 * self.bin_width
    }

    /// Looks a ceiling up, counting the hit or miss.
    pub fn get(&mut self, signature: &XSecSignature) -> Option<Ceiling> {
        match self.entries.get(signature) {
            Some(ceiling) => {
                self.hits += 1;
                Some(*ceiling)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Looks a ceiling up without touching the counters.
    pub fn peek(&self, signature: &XSecSignature) -> Option<&Ceiling> {
        self.entries.get(signature)
    }

    /// Stores a ceiling unless the signature is already present.
    ///
    /// Returns whether the entry was inserted.
    pub fn put(&mut self, signature: XSecSignature, ceiling: Ceiling) -> bool {
        if self.entries.contains_key(&signature) {
            return false;
        }
        debug!(?signature, ceiling = ceiling.value, "caching max xsec");
        self.entries.insert(signature, ceiling);
        true
    }

    /// Number of cached signatures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that required a search.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Iterates over the cached entries in signature order.
    pub fn iter(&self) -> impl Iterator<Item = (&XSecSignature, &Ceiling)> {
        self.entries.iter()
    }

    /// Writes a binary snapshot of every entry.
    pub fn save(&self, path: &Path) -> Result<(), EvgError> {
        let snapshot = CacheSnapshot {
            schema_version: CACHE_SCHEMA_VERSION,
            bin_width: self.bin_width,
            fingerprint: self.fingerprint.clone(),
            entries: self.entries.iter().map(|(sig, c)| (*sig, *c)).collect(),
        };
        let bytes = bincode::serialize(&snapshot).map_err(|err| {
            EvgError::Cache(
                ErrorInfo::new("cache-serialize", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    EvgError::Cache(
                        ErrorInfo::new("cache-mkdir", err.to_string())
                            .with_context("path", parent.display()),
                    )
                })?;
            }
        }
        fs::write(path, bytes).map_err(|err| {
            EvgError::Cache(
                ErrorInfo::new("cache-write", err.to_string()).with_context("path", path.display()),
            )
        })
    }

    /// Merges a snapshot written by [`MaxXSecCache::save`].
    ///
    /// Entries already present are kept. Returns the number of entries added.
    pub fn load(&mut self, path: &Path) -> Result<usize, EvgError> {
        let bytes = fs::read(path).map_err(|err| {
            EvgError::Cache(
                ErrorInfo::new("cache-read", err.to_string()).with_context("path", path.display()),
            )
        })?;
        let snapshot: CacheSnapshot = bincode::deserialize(&bytes).map_err(|err| {
            EvgError::Cache(
                ErrorInfo::new("cache-parse", err.to_string()).with_context("path", path.display()),
            )
        })?;
        if snapshot.schema_version != CACHE_SCHEMA_VERSION {
            return Err(EvgError::Cache(
                ErrorInfo::new("cache-schema", "unsupported cache snapshot version")
                    .with_context("found", snapshot.schema_version)
                    .with_context("expected", CACHE_SCHEMA_VERSION),
            ));
        }
        if snapshot.bin_width != self.bin_width {
            return Err(EvgError::Cache(
                ErrorInfo::new("cache-binning", "snapshot uses a different energy binning")
                    .with_context("found", snapshot.bin_width)
                    .with_context("expected", self.bin_width)
                    .with_hint("set cache-energy-bin to the value used when saving"),
            ));
        }
        if snapshot.fingerprint != self.fingerprint {
            return Err(EvgError::Cache(
                ErrorInfo::new(
                    "cache-config",
                    "snapshot was computed for a different model or configuration",
                )
                .with_context("path", path.display())
                .with_context("found", &snapshot.fingerprint)
                .with_context("expected", &self.fingerprint)
                .with_hint("remove the cache file or point cache-file elsewhere"),
            ));
        }
        let mut added = 0;
        for (signature, ceiling) in snapshot.entries {
            if self.put(signature, ceiling) {
                added += 1;
            }
        }
        Ok(added)
    }
}
