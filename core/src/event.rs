//! Directory events: the audit trail of every mutation.
//!
//! RULE: Every committed or rejected supervisor change is recorded
//! in the event log together with the acting operator.

use crate::{
    level::Level,
    types::{ActorId, RecordId},
};
use serde::{Deserialize, Serialize};

/// Every event the directory records.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DirectoryEvent {
    RecordProvisioned {
        record_id: RecordId,
        level: Option<Level>,
    },
    SupervisorAssigned {
        record_id: RecordId,
        supervisor_id: RecordId,
        previous_supervisor_id: Option<RecordId>,
        label: String,
    },
    SupervisorCleared {
        record_id: RecordId,
        previous_supervisor_id: Option<RecordId>,
    },
    AssignmentRejected {
        record_id: RecordId,
        supervisor_id: RecordId,
        reason: String,
    },
}

impl DirectoryEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RecordProvisioned { .. }  => "record_provisioned",
            Self::SupervisorAssigned { .. } => "supervisor_assigned",
            Self::SupervisorCleared { .. }  => "supervisor_cleared",
            Self::AssignmentRejected { .. } => "assignment_rejected",
        }
    }

    /// The record the event is about.
    pub fn record_id(&self) -> &str {
        match self {
            Self::RecordProvisioned { record_id, .. }
            | Self::SupervisorAssigned { record_id, .. }
            | Self::SupervisorCleared { record_id, .. }
            | Self::AssignmentRejected { record_id, .. } => record_id,
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub record_id: RecordId,
    pub event_type: String,
    pub actor_id: Option<ActorId>,
    pub payload: String, // JSON-serialized DirectoryEvent
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl EventLogEntry {
    pub fn new(event: &DirectoryEvent, actor_id: Option<&str>) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            record_id: event.record_id().to_string(),
            event_type: event.type_name().to_string(),
            actor_id: actor_id.map(str::to_string),
            payload: serde_json::to_string(event)?,
            created_at: chrono::Utc::now(),
        })
    }

    /// Decode the payload back into the typed event.
    pub fn event(&self) -> serde_json::Result<DirectoryEvent> {
        serde_json::from_str(&self.payload)
    }
}
