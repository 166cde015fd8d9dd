// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Job Aggregate
//!
//! The consistency boundary around a `JobState`: every legal transition of
//! the engine's driver state machine (spec §4.6) is expressed as a method
//! here, so infrastructure can't accidentally produce an inconsistent state
//! (e.g. marking an action complete that was never started, or finalizing a
//! job with actions still outstanding).

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::error::UpdaterError;
use crate::events::{ActionCompleted, ActionFailed, ActionStarted, JobCompleted, JobEvent, JobFailed, JobStarted, RollbackCompleted, RollbackStarted};
use crate::value_objects::{JobState, JobStatus};

pub struct JobAggregate {
    state: JobState,
    total_actions: usize,
    events: Vec<JobEvent>,
}

impl JobAggregate {
    pub fn start(package_path: PathBuf, description: String, total_actions: usize, now: DateTime<Utc>) -> Self {
        let mut agg = Self { state: JobState::new(package_path, description.clone(), now), total_actions, events: Vec::new() };
        agg.state.status = JobStatus::InProgress;
        agg.events.push(JobEvent::Started(JobStarted { description, occurred_at: now }));
        agg
    }

    /// Resumes from a previously persisted state (spec §4.6 resume path).
    pub fn resume(state: JobState, total_actions: usize) -> Self {
        Self { state, total_actions, events: Vec::new() }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn into_state(self) -> JobState {
        self.state
    }

    pub fn drain_events(&mut self) -> Vec<JobEvent> {
        std::mem::take(&mut self.events)
    }

    /// An action index only ever becomes "started" here; it is added to
    /// `completed_actions` by `complete_action`, never here.
    pub fn start_action(&mut self, index: usize, name: String, now: DateTime<Utc>) -> Result<(), UpdaterError> {
        if index >= self.total_actions {
            return Err(UpdaterError::internal(format!("action index {index} out of range ({} actions)", self.total_actions)));
        }
        self.state.current_action = Some(index);
        self.state.current_action_name = Some(name.clone());
        self.state.last_updated = now;
        self.events.push(JobEvent::ActionStarted(ActionStarted { index, name, occurred_at: now }));
        Ok(())
    }

    pub fn complete_action(&mut self, index: usize, now: DateTime<Utc>) {
        let name = self.state.current_action_name.clone().unwrap_or_default();
        self.state.completed_actions.insert(index);
        self.state.last_updated = now;
        self.events.push(JobEvent::ActionCompleted(ActionCompleted { index, name, occurred_at: now }));
    }

    pub fn action_failed_but_continued(&mut self, index: usize, reason: String, now: DateTime<Utc>) {
        let name = self.state.current_action_name.clone().unwrap_or_default();
        self.state.completed_actions.insert(index);
        self.state.last_updated = now;
        self.events.push(JobEvent::ActionFailed(ActionFailed { index, name, reason, continued: true, occurred_at: now }));
    }

    /// `completed_actions` equals the full action set only after a
    /// successful finalize.
    pub fn is_complete(&self) -> bool {
        self.state.completed_actions.len() == self.total_actions
    }

    pub fn finalize_completed(&mut self, now: DateTime<Utc>) {
        self.state.status = JobStatus::Completed;
        self.state.completed_at = Some(now);
        self.state.last_updated = now;
        self.events.push(JobEvent::Completed(JobCompleted { occurred_at: now }));
    }

    pub fn finalize_failed(&mut self, reason: String, now: DateTime<Utc>) {
        self.state.status = JobStatus::Failed;
        self.state.last_updated = now;
        self.events.push(JobEvent::Failed(JobFailed { reason, occurred_at: now }));
    }

    pub fn begin_rollback(&mut self, reason: String, now: DateTime<Utc>) {
        self.state.last_updated = now;
        self.events.push(JobEvent::RollbackStarted(RollbackStarted { reason, occurred_at: now }));
    }

    pub fn finalize_rolled_back(&mut self, now: DateTime<Utc>) {
        self.state.status = JobStatus::RolledBack;
        self.state.completed_at = Some(now);
        self.state.last_updated = now;
        self.events.push(JobEvent::RollbackCompleted(RollbackCompleted { occurred_at: now }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn start_marks_in_progress() {
        let agg = JobAggregate::start(PathBuf::from("/pkg"), "d".into(), 3, now());
        assert_eq!(agg.state().status, JobStatus::InProgress);
    }

    #[test]
    fn out_of_range_action_index_rejected() {
        let mut agg = JobAggregate::start(PathBuf::from("/pkg"), "d".into(), 2, now());
        assert!(agg.start_action(5, "x".into(), now()).is_err());
    }

    #[test]
    fn is_complete_only_after_all_actions_done() {
        let mut agg = JobAggregate::start(PathBuf::from("/pkg"), "d".into(), 2, now());
        agg.start_action(0, "a".into(), now()).unwrap();
        agg.complete_action(0, now());
        assert!(!agg.is_complete());
        agg.start_action(1, "b".into(), now()).unwrap();
        agg.complete_action(1, now());
        assert!(agg.is_complete());
    }

    #[test]
    fn finalize_completed_sets_status_and_timestamp() {
        let mut agg = JobAggregate::start(PathBuf::from("/pkg"), "d".into(), 1, now());
        agg.start_action(0, "a".into(), now()).unwrap();
        agg.complete_action(0, now());
        agg.finalize_completed(now());
        assert_eq!(agg.state().status, JobStatus::Completed);
        assert!(agg.state().completed_at.is_some());
    }

    #[test]
    fn events_drain_empties_buffer() {
        let mut agg = JobAggregate::start(PathBuf::from("/pkg"), "d".into(), 1, now());
        assert_eq!(agg.drain_events().len(), 1);
        assert_eq!(agg.drain_events().len(), 0);
    }
}
