//! Outward-facing directory service.
//!
//! Wraps a shared store and hands each call a fresh engine or query
//! service borrowing it. Cheap to clone; safe to share across threads.

use crate::{
    config::DirectoryConfig,
    context::RequestContext,
    engine::{AssignmentEngine, AssignmentRequest, Assigned, Unassigned},
    error::DirectoryResult,
    event::{DirectoryEvent, EventLogEntry},
    query::AssignmentQueryService,
    record::{Department, NewRecord, PersonnelRecord, Position, RecordFilter},
    store::DirectoryStore,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<DirectoryStore>,
}

impl DirectoryService {
    pub fn new(store: DirectoryStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_shared(store: Arc<DirectoryStore>) -> Self {
        Self { store }
    }

    /// Fresh in-memory store with migrations applied.
    pub fn in_memory() -> DirectoryResult<Self> {
        let store = DirectoryStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &DirectoryStore {
        &self.store
    }

    fn engine(&self) -> AssignmentEngine<'_> {
        AssignmentEngine::new(&self.store)
    }

    fn queries(&self) -> AssignmentQueryService<'_> {
        AssignmentQueryService::new(&self.store)
    }

    // ── Records ───────────────────────────────────────────────────

    pub fn get_record(&self, id: &str) -> DirectoryResult<PersonnelRecord> {
        self.store.get(id)
    }

    pub fn list_records(&self, filter: &RecordFilter) -> DirectoryResult<Vec<PersonnelRecord>> {
        self.store.list(filter)
    }

    /// Create a new, unsupervised record.
    pub fn provision(&self, new: NewRecord, ctx: &RequestContext) -> DirectoryResult<PersonnelRecord> {
        new.validate()?;
        let record = PersonnelRecord {
            id: new.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new.name.trim().to_string(),
            email: new.email,
            level: new.level,
            supervisor_id: None,
            department_id: new.department_id,
            position_id: new.position_id,
            version: 0,
        };
        let event = DirectoryEvent::RecordProvisioned {
            record_id: record.id.clone(),
            level: record.level,
        };
        let audit = EventLogEntry::new(&event, ctx.actor())?;
        self.store.insert_record(&record, &audit)?;
        log::info!("provisioned {} ({}) at {:?}", record.id, record.name, record.level);
        Ok(record)
    }

    // ── Assignment ────────────────────────────────────────────────

    pub fn list_candidates(&self, source_id: &str) -> DirectoryResult<Vec<PersonnelRecord>> {
        self.queries().candidates_for(source_id)
    }

    pub fn assign_supervisor(
        &self,
        source_id: &str,
        target_id: &str,
        ctx: &RequestContext,
    ) -> DirectoryResult<Assigned> {
        let req = AssignmentRequest::new(source_id, target_id).in_context(ctx);
        self.engine().assign(&req)
    }

    pub fn unassign_supervisor(&self, source_id: &str, ctx: &RequestContext) -> DirectoryResult<Unassigned> {
        self.engine().unassign(source_id, ctx)
    }

    // ── Hierarchy views ───────────────────────────────────────────

    pub fn supervisor_chain(&self, id: &str) -> DirectoryResult<Vec<PersonnelRecord>> {
        self.queries().supervisor_chain(id)
    }

    pub fn direct_reports(&self, id: &str) -> DirectoryResult<Vec<PersonnelRecord>> {
        self.queries().direct_reports(id)
    }

    /// Audit trail for one record, oldest first.
    pub fn assignment_history(&self, id: &str) -> DirectoryResult<Vec<EventLogEntry>> {
        self.store.get(id)?;
        self.store.events_for_record(id)
    }

    // ── Departments ───────────────────────────────────────────────

    pub fn create_department(&self, name: &str) -> DirectoryResult<Department> {
        let dept = Department {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
        };
        self.store.insert_department(&dept)?;
        Ok(dept)
    }

    pub fn create_position(&self, department_id: &str, name: &str) -> DirectoryResult<Position> {
        let pos = Position {
            id: Uuid::new_v4().to_string(),
            department_id: department_id.to_string(),
            name: name.trim().to_string(),
        };
        self.store.insert_position(&pos)?;
        Ok(pos)
    }

    pub fn departments(&self) -> DirectoryResult<Vec<Department>> {
        self.store.departments()
    }

    pub fn positions_for(&self, department_id: &str) -> DirectoryResult<Vec<Position>> {
        self.store.get_department(department_id)?;
        self.store.positions_for(department_id)
    }

    /// Insert the departments and positions named in `config`, all or nothing.
    pub fn seed_departments(&self, config: &DirectoryConfig) -> DirectoryResult<usize> {
        let rows: Vec<(Department, Vec<Position>)> = config
            .departments
            .iter()
            .map(|dept| {
                let positions = dept
                    .positions
                    .iter()
                    .map(|pos| Position {
                        id: pos.id.clone(),
                        department_id: dept.id.clone(),
                        name: pos.name.clone(),
                    })
                    .collect();
                let department = Department {
                    id: dept.id.clone(),
                    name: dept.name.clone(),
                };
                (department, positions)
            })
            .collect();
        self.store.insert_departments(&rows)?;
        log::info!("seeded {} departments", rows.len());
        Ok(rows.len())
    }
}
