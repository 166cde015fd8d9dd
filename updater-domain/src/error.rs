// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A hierarchical error type for the update orchestrator. Errors are grouped
//! into the taxonomy buckets the engine's failure-handling logic branches on:
//! manifest parsing, integrity verification, check/action execution, state
//! corruption, and job admission.
//!
//! Conversions from `serde_json`/`serde_yaml` are deliberately NOT implemented
//! here — the domain stays serialization-format agnostic; infrastructure maps
//! parser errors into `UpdaterError::Manifest` or `UpdaterError::Serialization`
//! at the boundary where the format is chosen.

use thiserror::Error;

/// Domain-specific errors for the update orchestrator.
///
/// Each variant is actionable: the message carries enough context for an
/// operator to diagnose the failure without re-running with extra verbosity.
#[derive(Error, Debug, Clone)]
pub enum UpdaterError {
    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("integrity check failed: {0}")]
    Integrity(String),

    #[error("precondition/postcondition check failed: {0}")]
    Check(String),

    #[error("action failed: {0}")]
    Action(String),

    #[error("state corrupted, treating as absent: {0}")]
    StateCorruption(String),

    #[error("admission rejected: {0}")]
    Admission(String),

    #[error("subprocess error: {0}")]
    Process(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl UpdaterError {
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    pub fn check_failed(msg: impl Into<String>) -> Self {
        Self::Check(msg.into())
    }

    pub fn action_failed(msg: impl Into<String>) -> Self {
        Self::Action(msg.into())
    }

    pub fn state_corruption(msg: impl Into<String>) -> Self {
        Self::StateCorruption(msg.into())
    }

    pub fn admission(msg: impl Into<String>) -> Self {
        Self::Admission(msg.into())
    }

    pub fn process(msg: impl Into<String>) -> Self {
        Self::Process(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether a retry of the same operation might succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, UpdaterError::Timeout(_) | UpdaterError::Io(_) | UpdaterError::Process(_))
    }

    /// Whether a post-check/action failure of this kind should trigger
    /// auto-rollback (per spec §7: CheckError on post_checks and ActionError
    /// both respect `auto_rollback_on_failure`; ManifestError/AdmissionError
    /// never do).
    pub fn triggers_rollback_consideration(&self) -> bool {
        matches!(self, UpdaterError::Check(_) | UpdaterError::Action(_) | UpdaterError::Process(_) | UpdaterError::Timeout(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            UpdaterError::Manifest(_) => "manifest",
            UpdaterError::Integrity(_) => "integrity",
            UpdaterError::Check(_) => "check",
            UpdaterError::Action(_) => "action",
            UpdaterError::StateCorruption(_) => "state",
            UpdaterError::Admission(_) => "admission",
            UpdaterError::Process(_) => "process",
            UpdaterError::Timeout(_) => "timeout",
            UpdaterError::Io(_) => "io",
            UpdaterError::Serialization(_) => "serialization",
            UpdaterError::Validation(_) => "validation",
            UpdaterError::NotFound(_) => "not_found",
            UpdaterError::Internal(_) => "internal",
        }
    }
}

impl From<std::io::Error> for UpdaterError {
    fn from(err: std::io::Error) -> Self {
        UpdaterError::Io(err.to_string())
    }
}
