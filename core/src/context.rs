//! Per-call request context.
//!
//! Carries the calling operator's identity into every mutating operation
//! so nothing depends on process-wide state.

use crate::types::ActorId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub actor_id: Option<ActorId>,
}

impl RequestContext {
    /// A context with no known actor (system-initiated work, tests).
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_actor(actor_id: impl Into<ActorId>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
        }
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }
}
