//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine and query service call store methods and never execute SQL directly.
//!
//! The single connection sits behind a mutex so one store can be shared
//! across threads; every method holds the lock for the duration of one
//! statement or one transaction.

use crate::{
    error::{DirectoryError, DirectoryResult},
    event::EventLogEntry,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection};
use std::sync::{Mutex, MutexGuard};

mod department;
mod personnel;

pub struct DirectoryStore {
    conn: Mutex<Connection>,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl DirectoryStore {
    pub fn open(path: &str) -> DirectoryResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // Best effort: memory-backed URIs keep their own journal mode.
        if let Err(err) = conn.execute_batch("PRAGMA journal_mode=WAL;") {
            log::debug!("journal_mode=WAL not applied to {path}: {err}");
        }
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DirectoryResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    pub fn reopen(&self) -> DirectoryResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DirectoryResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(include_str!("../../../migrations/001_directory.sql"))?;
        conn.execute_batch(include_str!("../../../migrations/002_event_log.sql"))?;
        Ok(())
    }

    fn conn(&self) -> DirectoryResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DirectoryError::LockPoisoned)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> DirectoryResult<()> {
        let conn = self.conn()?;
        insert_event(&conn, entry)?;
        Ok(())
    }

    /// All events about `record_id`, in commit order.
    pub fn events_for_record(&self, record_id: &str) -> DirectoryResult<Vec<EventLogEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, record_id, event_type, actor_id, payload, created_at
             FROM event_log WHERE record_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![record_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    record_id: row.get(1)?,
                    event_type: row.get(2)?,
                    actor_id: row.get(3)?,
                    payload: row.get(4)?,
                    created_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, event_type: &str) -> DirectoryResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE event_type = ?1",
            params![event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Shared by `append_event` and the transactional writers.
fn insert_event(conn: &Connection, entry: &EventLogEntry) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO event_log (record_id, event_type, actor_id, payload, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.record_id,
            entry.event_type,
            entry.actor_id,
            entry.payload,
            entry.created_at.to_rfc3339(),
        ],
    )
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
