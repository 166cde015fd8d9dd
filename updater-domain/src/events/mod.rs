// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Domain events emitted by the job aggregate as it moves through the state
//! machine. The HTTP job façade (C8) turns these into the progress event
//! stream of spec §6; the CLI turns them into log lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker trait for domain events, mirroring the event-sourcing shape used
/// elsewhere in the codebase's lineage: a name for dispatch and a timestamp.
pub trait DomainEvent: std::fmt::Debug {
    fn event_name(&self) -> &'static str;
    fn occurred_at(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStarted {
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckStarted {
    pub kind: String,
    pub phase: CheckPhase,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckPhase {
    Pre,
    Post,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFailed {
    pub kind: String,
    pub phase: CheckPhase,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionStarted {
    pub index: usize,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCompleted {
    pub index: usize,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionFailed {
    pub index: usize,
    pub name: String,
    pub reason: String,
    pub continued: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackStarted {
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackCompleted {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCompleted {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFailed {
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

macro_rules! impl_domain_event {
    ($ty:ty, $name:literal) => {
        impl DomainEvent for $ty {
            fn event_name(&self) -> &'static str {
                $name
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
        }
    };
}

impl_domain_event!(JobStarted, "job_started");
impl_domain_event!(CheckStarted, "check_started");
impl_domain_event!(CheckFailed, "check_failed");
impl_domain_event!(ActionStarted, "action_started");
impl_domain_event!(ActionCompleted, "action_completed");
impl_domain_event!(ActionFailed, "action_failed");
impl_domain_event!(RollbackStarted, "rollback_started");
impl_domain_event!(RollbackCompleted, "rollback_completed");
impl_domain_event!(JobCompleted, "job_completed");
impl_domain_event!(JobFailed, "job_failed");

/// A type-erased event envelope suitable for a log/SSE sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    Started(JobStarted),
    CheckStarted(CheckStarted),
    CheckFailed(CheckFailed),
    ActionStarted(ActionStarted),
    ActionCompleted(ActionCompleted),
    ActionFailed(ActionFailed),
    RollbackStarted(RollbackStarted),
    RollbackCompleted(RollbackCompleted),
    Completed(JobCompleted),
    Failed(JobFailed),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_stable() {
        let e = JobStarted { description: "d".into(), occurred_at: Utc::now() };
        assert_eq!(e.event_name(), "job_started");
    }
}
