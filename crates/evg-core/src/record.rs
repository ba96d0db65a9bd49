//! Event-record slice read and written by kinematic selection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::interaction::Interaction;

/// Machine readable flags set on a record when a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventFlag {
    /// Phase space was empty after cuts.
    NoAvailablePhaseSpace,
    /// No kinematics could be selected.
    NoValidKinematics,
}

/// The slice of an event record the kinematics engine reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Interaction whose kinematics are being selected.
    pub interaction: Interaction,
    /// Total cross section already associated with the event.
    pub xsec: f64,
    /// Differential cross section at the selected kinematics.
    #[serde(default)]
    pub diff_xsec: f64,
    /// Accumulated event weight.
    pub weight: f64,
    /// Failure flags.
    #[serde(default)]
    pub flags: BTreeSet<EventFlag>,
}

impl EventRecord {
    /// Wraps an interaction with its total cross section and unit weight.
    pub fn new(interaction: Interaction, xsec: f64) -> Self {
        Self {
            interaction,
            xsec,
            diff_xsec: 0.0,
            weight: 1.0,
            flags: BTreeSet::new(),
        }
    }

    /// Raises a flag.
    pub fn set_flag(&mut self, flag: EventFlag) {
        self.flags.insert(flag);
    }

    /// Whether a flag is raised.
    pub fn has_flag(&self, flag: EventFlag) -> bool {
        self.flags.contains(&flag)
    }
}
