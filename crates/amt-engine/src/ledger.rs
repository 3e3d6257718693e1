//! # Assessment Ledger
//!
//! Holds every assessment together with its append-only transition log.
//! Both live under one lock so that a state change and its audit record
//! are committed as a single step:
//!
//! ```text
//! commit(id, expected_version, build)
//!   ├─ version == expected?      else VersionConflict
//!   ├─ record = build(&assessment, next_sequence)
//!   ├─ log.push(record)
//!   └─ assessment.state = record.to_state; version += 1
//! ```
//!
//! Nothing in the ledger ever edits or removes a transition.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use amt_core::{AssessmentId, Timestamp};
use amt_workflow::{Assessment, Transition};

/// Storage-level failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("assessment {0} not found")]
    NotFound(AssessmentId),

    #[error("version conflict on {assessment_id}: expected {expected}, found {actual}")]
    VersionConflict {
        assessment_id: AssessmentId,
        expected: u64,
        actual: u64,
    },
}

#[derive(Debug)]
struct Entry {
    assessment: Assessment,
    log: Vec<Transition>,
}

#[derive(Debug, Clone, Default)]
pub struct AssessmentLedger {
    entries: Arc<RwLock<HashMap<AssessmentId, Entry>>>,
}

impl AssessmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly created assessment with an empty log.
    pub fn insert(&self, assessment: Assessment) {
        self.entries.write().insert(
            assessment.id,
            Entry {
                assessment,
                log: Vec::new(),
            },
        );
    }

    pub fn get(&self, id: &AssessmentId) -> Option<Assessment> {
        self.entries.read().get(id).map(|e| e.assessment.clone())
    }

    /// All assessments, oldest first.
    pub fn list(&self) -> Vec<Assessment> {
        let mut all: Vec<Assessment> = self
            .entries
            .read()
            .values()
            .map(|e| e.assessment.clone())
            .collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }

    /// Assessments matching `predicate`, oldest first.
    pub fn filter(&self, predicate: impl Fn(&Assessment) -> bool) -> Vec<Assessment> {
        let mut matching: Vec<Assessment> = self
            .entries
            .read()
            .values()
            .map(|e| &e.assessment)
            .filter(|a| predicate(a))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        matching
    }

    /// Transition log, most recent first.
    pub fn transitions(&self, id: &AssessmentId) -> Result<Vec<Transition>, LedgerError> {
        let guard = self.entries.read();
        let entry = guard.get(id).ok_or(LedgerError::NotFound(*id))?;
        Ok(entry.log.iter().rev().cloned().collect())
    }

    /// Append a transition and advance the assessment, provided its version
    /// still equals `expected_version`.
    ///
    /// `build` receives the current assessment and the sequence number the
    /// record must carry. Its `to_state` becomes the new current state.
    pub fn commit(
        &self,
        id: &AssessmentId,
        expected_version: u64,
        build: impl FnOnce(&Assessment, u64) -> Transition,
    ) -> Result<(Assessment, Transition), LedgerError> {
        let mut guard = self.entries.write();
        let entry = guard.get_mut(id).ok_or(LedgerError::NotFound(*id))?;

        if entry.assessment.version != expected_version {
            return Err(LedgerError::VersionConflict {
                assessment_id: *id,
                expected: expected_version,
                actual: entry.assessment.version,
            });
        }

        let transition = build(&entry.assessment, entry.log.len() as u64);
        entry.assessment.state = transition.to_state;
        entry.assessment.version += 1;
        entry.assessment.updated_at = transition.at;
        entry.log.push(transition.clone());

        Ok((entry.assessment.clone(), transition))
    }

    /// Apply a non-state edit (content fields) under the same version
    /// discipline. `edit` may refuse by returning `Err`.
    pub fn update<E>(
        &self,
        id: &AssessmentId,
        now: Timestamp,
        edit: impl FnOnce(&mut Assessment) -> Result<(), E>,
    ) -> Result<Result<Assessment, E>, LedgerError> {
        let mut guard = self.entries.write();
        let entry = guard.get_mut(id).ok_or(LedgerError::NotFound(*id))?;
        let mut draft = entry.assessment.clone();
        if let Err(e) = edit(&mut draft) {
            return Ok(Err(e));
        }
        draft.id = entry.assessment.id;
        draft.state = entry.assessment.state;
        draft.version = entry.assessment.version + 1;
        draft.updated_at = now;
        entry.assessment = draft.clone();
        Ok(Ok(draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amt_core::ModuleId;
    use amt_workflow::{Actor, AssessmentState, AssessmentType};

    fn ledger_with_draft() -> (AssessmentLedger, Assessment) {
        let ledger = AssessmentLedger::new();
        let a = Assessment::new(ModuleId::new(), "Coursework 1", AssessmentType::Coursework, None, Timestamp::now())
            .unwrap();
        ledger.insert(a.clone());
        (ledger, a)
    }

    fn forward(to: AssessmentState) -> impl FnOnce(&Assessment, u64) -> Transition {
        move |a, seq| {
            Transition::forward(a.id, seq, a.state, to, Timestamp::now(), &Actor::system("test"), None, false)
        }
    }

    #[test]
    fn commit_advances_state_and_appends() {
        let (ledger, a) = ledger_with_draft();
        let (updated, t) = ledger
            .commit(&a.id, 0, forward(AssessmentState::ReadyForCheck))
            .unwrap();
        assert_eq!(updated.state, AssessmentState::ReadyForCheck);
        assert_eq!(updated.version, 1);
        assert_eq!(t.from_state, AssessmentState::Draft);
        assert_eq!(t.sequence, 0);
        assert_eq!(ledger.transitions(&a.id).unwrap(), vec![t]);
    }

    #[test]
    fn stale_version_leaves_nothing_behind() {
        let (ledger, a) = ledger_with_draft();
        ledger
            .commit(&a.id, 0, forward(AssessmentState::ReadyForCheck))
            .unwrap();
        let err = ledger
            .commit(&a.id, 0, forward(AssessmentState::Draft))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::VersionConflict {
                assessment_id: a.id,
                expected: 0,
                actual: 1
            }
        );
        assert_eq!(ledger.transitions(&a.id).unwrap().len(), 1);
        assert_eq!(ledger.get(&a.id).unwrap().state, AssessmentState::ReadyForCheck);
    }

    #[test]
    fn transitions_are_most_recent_first() {
        let (ledger, a) = ledger_with_draft();
        ledger.commit(&a.id, 0, forward(AssessmentState::ReadyForCheck)).unwrap();
        ledger.commit(&a.id, 1, forward(AssessmentState::ChangesRequired)).unwrap();
        let log = ledger.transitions(&a.id).unwrap();
        assert_eq!(log[0].sequence, 1);
        assert_eq!(log[0].to_state, AssessmentState::ChangesRequired);
        assert_eq!(log[1].sequence, 0);
    }

    #[test]
    fn update_bumps_version_but_keeps_state() {
        let (ledger, a) = ledger_with_draft();
        let updated = ledger
            .update::<()>(&a.id, Timestamp::now(), |draft| {
                draft.description = Some("Essay question".into());
                draft.state = AssessmentState::Published;
                Ok(())
            })
            .unwrap()
            .unwrap();
        assert_eq!(updated.state, AssessmentState::Draft);
        assert_eq!(updated.version, 1);
        assert_eq!(updated.description.as_deref(), Some("Essay question"));
        assert!(ledger.transitions(&a.id).unwrap().is_empty());
    }

    #[test]
    fn missing_assessment() {
        let ledger = AssessmentLedger::new();
        let id = AssessmentId::new();
        assert_eq!(ledger.transitions(&id), Err(LedgerError::NotFound(id)));
        assert!(ledger.commit(&id, 0, forward(AssessmentState::Draft)).is_err());
    }
}
