//! Read-side queries: candidate supervisors and hierarchy views.

use crate::{
    error::DirectoryResult,
    level::LevelPolicy,
    record::{PersonnelRecord, RecordFilter},
    store::DirectoryStore,
    types::RecordId,
};
use std::collections::HashSet;

pub struct AssignmentQueryService<'a> {
    store: &'a DirectoryStore,
}

impl<'a> AssignmentQueryService<'a> {
    pub fn new(store: &'a DirectoryStore) -> Self {
        Self { store }
    }

    /// Records eligible to supervise `source_id`, sorted by name.
    /// Empty when the source is level1 or has no level.
    pub fn candidates_for(&self, source_id: &str) -> DirectoryResult<Vec<PersonnelRecord>> {
        let source = self.store.get(source_id)?;
        let Some(eligible) = source.level.and_then(LevelPolicy::eligible_level_for) else {
            log::debug!("no eligible supervisor level for {source_id} ({:?})", source.level);
            return Ok(Vec::new());
        };
        let candidates = self.store.list(&RecordFilter::at_level(eligible))?;
        log::debug!(
            "{} candidate(s) at {eligible} for {source_id}",
            candidates.len()
        );
        Ok(candidates)
    }

    /// Supervisors above `id`, nearest first. Stops at the root, at a
    /// dangling reference, or at a repeated node.
    pub fn supervisor_chain(&self, id: &str) -> DirectoryResult<Vec<PersonnelRecord>> {
        let start = self.store.get(id)?;
        let mut visited: HashSet<RecordId> = HashSet::new();
        visited.insert(start.id.clone());
        let mut chain = Vec::new();
        let mut next = start.supervisor_id;

        while let Some(current) = next {
            if !visited.insert(current.clone()) {
                log::warn!("supervisor chain above {id} loops at {current}");
                break;
            }
            match self.store.find(&current)? {
                Some(rec) => {
                    next = rec.supervisor_id.clone();
                    chain.push(rec);
                }
                None => {
                    log::warn!("supervisor chain above {id} references missing record {current}");
                    break;
                }
            }
        }
        Ok(chain)
    }

    /// Records directly supervised by `id`, sorted by name.
    pub fn direct_reports(&self, id: &str) -> DirectoryResult<Vec<PersonnelRecord>> {
        self.store.get(id)?;
        self.store.list(&RecordFilter::reporting_to(id))
    }
}
