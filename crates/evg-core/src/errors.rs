//! Structured error types shared across EVG crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`EvgError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable reason.
    pub message: String,
    /// Contextual key value pairs (energies, ranges, iteration counts).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the kinematics engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum EvgError {
    /// The physical or cut-narrowed phase space is empty.
    #[error("no available phase space: {0}")]
    NoAvailablePhaseSpace(ErrorInfo),
    /// The accept/reject loop ran out of iterations.
    #[error("kinematic selection exhausted: {0}")]
    SelectionExhausted(ErrorInfo),
    /// A sampled density exceeded the envelope beyond the configured tolerance.
    #[error("cross-section ceiling violation: {0}")]
    CeilingViolation(ErrorInfo),
    /// The cached or searched cross-section maximum was not positive.
    #[error("non-positive cross-section ceiling: {0}")]
    NonPositiveCeiling(ErrorInfo),
    /// The sampling envelope was configured with a degenerate region.
    #[error("invalid sampling envelope: {0}")]
    InvalidEnvelope(ErrorInfo),
    /// The event record is not fit for kinematic selection.
    #[error("event record error: {0}")]
    Record(ErrorInfo),
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Cache snapshot I/O and schema errors.
    #[error("cache error: {0}")]
    Cache(ErrorInfo),
}

impl EvgError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            EvgError::NoAvailablePhaseSpace(info)
            | EvgError::SelectionExhausted(info)
            | EvgError::CeilingViolation(info)
            | EvgError::NonPositiveCeiling(info)
            | EvgError::InvalidEnvelope(info)
            | EvgError::Record(info)
            | EvgError::Config(info)
            | EvgError::Cache(info) => info,
        }
    }

    /// Whether the driver should abandon the current event and move on.
    pub fn fast_forward(&self) -> bool {
        matches!(
            self,
            EvgError::NoAvailablePhaseSpace(_)
                | EvgError::SelectionExhausted(_)
                | EvgError::NonPositiveCeiling(_)
        )
    }

    /// Whether continuing the run would bias the generated sample.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvgError::CeilingViolation(_))
    }
}
