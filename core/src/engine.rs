//! The assignment engine: the only writer of supervisor relationships.
//!
//! VALIDATION ORDER (fixed):
//!   1. Self-assignment        → SelfAssignment
//!   2. Resolve both records   → NotFound
//!   3. Eligible level exists  → InvalidLevel
//!   4. Target level matches   → LevelMismatch
//!   5. No cycle through chain → CycleDetected
//!   6. Versioned commit       → StaleRecord on a lost race
//!
//! RULES:
//!   - Either every check passes and the row is committed, or nothing changes.
//!   - The commit is conditional on the version read in step 2, so two
//!     writers racing on the same record cannot both succeed.
//!   - Every commit and every rejection of a known record is audited.

use crate::{
    context::RequestContext,
    error::{DirectoryError, DirectoryResult},
    event::{DirectoryEvent, EventLogEntry},
    level::LevelPolicy,
    record::PersonnelRecord,
    store::DirectoryStore,
    types::{ActorId, RecordId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A request to give `source_id` the supervisor `target_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub source_id: RecordId,
    pub target_id: RecordId,
    #[serde(default)]
    pub requested_by: Option<ActorId>,
}

impl AssignmentRequest {
    pub fn new(source_id: impl Into<RecordId>, target_id: impl Into<RecordId>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            requested_by: None,
        }
    }

    pub fn in_context(mut self, ctx: &RequestContext) -> Self {
        self.requested_by = ctx.actor_id.clone();
        self
    }
}

/// Outcome of a successful `assign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assigned {
    pub source_id: RecordId,
    pub target_id: RecordId,
    pub label: String,
    pub previous_supervisor_id: Option<RecordId>,
    pub record: PersonnelRecord,
}

/// Outcome of a successful `unassign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unassigned {
    pub source_id: RecordId,
    pub previous_supervisor_id: Option<RecordId>,
    pub record: PersonnelRecord,
}

pub struct AssignmentEngine<'a> {
    store: &'a DirectoryStore,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(store: &'a DirectoryStore) -> Self {
        Self { store }
    }

    pub fn assign(&self, req: &AssignmentRequest) -> DirectoryResult<Assigned> {
        let actor = req.requested_by.as_deref();

        if req.source_id == req.target_id {
            let err = DirectoryError::SelfAssignment {
                id: req.source_id.clone(),
            };
            self.record_rejection(req, &err, actor);
            return Err(err);
        }

        let source = self.store.get(&req.source_id)?;
        let target = self.store.get(&req.target_id)?;

        if let Err(err) = self.validate(&source, &target) {
            self.record_rejection(req, &err, actor);
            return Err(err);
        }

        // validate() guarantees the level is set.
        let label = source
            .level
            .map(LevelPolicy::label_for)
            .unwrap_or_default()
            .to_string();
        let event = DirectoryEvent::SupervisorAssigned {
            record_id: source.id.clone(),
            supervisor_id: target.id.clone(),
            previous_supervisor_id: source.supervisor_id.clone(),
            label: label.clone(),
        };
        let audit = EventLogEntry::new(&event, actor)?;
        let record = self
            .store
            .commit_supervisor(&source.id, Some(&target.id), source.version, &audit)?;

        log::info!(
            "assigned {} ({}) under {} ({}) as {label}",
            source.id,
            source.name,
            target.id,
            target.name
        );

        Ok(Assigned {
            source_id: source.id,
            target_id: target.id,
            label,
            previous_supervisor_id: source.supervisor_id,
            record,
        })
    }

    /// Clear the supervisor of `source_id`. Clearing an unsupervised record
    /// succeeds and reports no previous supervisor.
    pub fn unassign(&self, source_id: &str, ctx: &RequestContext) -> DirectoryResult<Unassigned> {
        let source = self.store.get(source_id)?;
        let event = DirectoryEvent::SupervisorCleared {
            record_id: source.id.clone(),
            previous_supervisor_id: source.supervisor_id.clone(),
        };
        let audit = EventLogEntry::new(&event, ctx.actor())?;
        let record = self
            .store
            .commit_supervisor(&source.id, None, source.version, &audit)?;

        log::info!(
            "cleared supervisor of {} (was {:?})",
            source.id,
            source.supervisor_id
        );

        Ok(Unassigned {
            source_id: source.id,
            previous_supervisor_id: source.supervisor_id,
            record,
        })
    }

    /// Steps 3–5 of the validation order. No store writes.
    pub fn validate(&self, source: &PersonnelRecord, target: &PersonnelRecord) -> DirectoryResult<()> {
        let expected = LevelPolicy::require_eligible_level(source.level)?;

        if target.level != Some(expected) {
            return Err(DirectoryError::LevelMismatch {
                // require_eligible_level only succeeds for assigned levels.
                source_level: source.level.unwrap_or(expected),
                expected,
                actual: target
                    .level
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "unassigned".into()),
            });
        }

        if self.would_create_cycle(&source.id, target)? {
            return Err(DirectoryError::CycleDetected {
                source_id: source.id.clone(),
                target_id: target.id.clone(),
            });
        }
        Ok(())
    }

    /// Walk the target's supervisor chain upward looking for `source_id`.
    /// Level rules make a hit impossible on consistent data; stored
    /// levels may be stale, so the walk is still performed.
    pub fn would_create_cycle(&self, source_id: &str, target: &PersonnelRecord) -> DirectoryResult<bool> {
        let mut visited: HashSet<RecordId> = HashSet::new();
        visited.insert(target.id.clone());
        let mut next = target.supervisor_id.clone();

        while let Some(current) = next {
            if current == source_id {
                return Ok(true);
            }
            if !visited.insert(current.clone()) {
                log::warn!(
                    "supervisor chain above {} loops at {current}; stored hierarchy is inconsistent",
                    target.id
                );
                return Ok(false);
            }
            next = match self.store.find(&current)? {
                Some(rec) => rec.supervisor_id,
                None => {
                    log::warn!("supervisor chain above {} references missing record {current}", target.id);
                    None
                }
            };
        }
        Ok(false)
    }

    fn record_rejection(&self, req: &AssignmentRequest, err: &DirectoryError, actor: Option<&str>) {
        log::warn!(
            "rejected assignment of {} under {}: {err}",
            req.source_id,
            req.target_id
        );
        let event = DirectoryEvent::AssignmentRejected {
            record_id: req.source_id.clone(),
            supervisor_id: req.target_id.clone(),
            reason: err.kind().to_string(),
        };
        // A failed audit write must not mask the validation error.
        let written = EventLogEntry::new(&event, actor)
            .map_err(DirectoryError::from)
            .and_then(|entry| self.store.append_event(&entry));
        if let Err(e) = written {
            log::warn!("could not record rejected assignment for {}: {e}", req.source_id);
        }
    }
}
