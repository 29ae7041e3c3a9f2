use super::{insert_event, DirectoryStore};
use crate::{
    error::{DirectoryError, DirectoryResult},
    event::EventLogEntry,
    level::Level,
    record::{LevelFilter, PersonnelRecord, RecordFilter},
    types::Version,
};
use rusqlite::{params, params_from_iter, types::Type, Connection, OptionalExtension, Row};

const RECORD_COLUMNS: &str =
    "record_id, name, email, level, supervisor_id, department_id, position_id, version";

impl DirectoryStore {
    // ── Personnel ─────────────────────────────────────────────────

    /// Insert a fully-resolved record and its audit entry in one transaction.
    /// Checks referential rules the schema cannot express: the position
    /// must belong to the record's department.
    pub fn insert_record(&self, rec: &PersonnelRecord, audit: &EventLogEntry) -> DirectoryResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if record_exists(&tx, &rec.id)? {
            return Err(DirectoryError::InvalidRecord {
                reason: format!("record id '{}' already exists", rec.id),
            });
        }
        let email_taken: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM personnel WHERE lower(email) = lower(?1)",
            params![rec.email],
            |row| row.get(0),
        )?;
        if email_taken {
            return Err(DirectoryError::InvalidRecord {
                reason: format!("email '{}' is already in use", rec.email),
            });
        }
        if let Some(dept) = &rec.department_id {
            let exists: bool = tx.query_row(
                "SELECT COUNT(*) > 0 FROM department WHERE department_id = ?1",
                params![dept],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(DirectoryError::InvalidRecord {
                    reason: format!("department '{dept}' does not exist"),
                });
            }
        }
        if let Some(pos) = &rec.position_id {
            let owner: Option<String> = tx
                .query_row(
                    "SELECT department_id FROM job_position WHERE position_id = ?1",
                    params![pos],
                    |row| row.get(0),
                )
                .optional()?;
            if owner.is_none() || owner != rec.department_id {
                return Err(DirectoryError::InvalidRecord {
                    reason: format!("position '{pos}' does not belong to the record's department"),
                });
            }
        }

        tx.execute(
            "INSERT INTO personnel (
                record_id, name, email, level, supervisor_id, department_id, position_id, version
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, 0)",
            params![
                &rec.id,
                &rec.name,
                &rec.email,
                rec.level.map(Level::as_str),
                &rec.department_id,
                &rec.position_id,
            ],
        )?;
        insert_event(&tx, audit)?;
        tx.commit()?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> DirectoryResult<PersonnelRecord> {
        self.find(id)?.ok_or_else(|| DirectoryError::not_found(id))
    }

    pub fn find(&self, id: &str) -> DirectoryResult<Option<PersonnelRecord>> {
        let conn = self.conn()?;
        Ok(fetch_record(&conn, id)?)
    }

    /// Records matching `filter`, ordered by name then id.
    pub fn list(&self, filter: &RecordFilter) -> DirectoryResult<Vec<PersonnelRecord>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        match filter.level {
            Some(LevelFilter::Exactly(level)) => {
                clauses.push("level = ?");
                args.push(level.as_str().to_string());
            }
            Some(LevelFilter::Unassigned) => clauses.push("level IS NULL"),
            None => {}
        }
        if let Some(dept) = &filter.department_id {
            clauses.push("department_id = ?");
            args.push(dept.clone());
        }
        if let Some(sup) = &filter.supervisor_id {
            clauses.push("supervisor_id = ?");
            args.push(sup.clone());
        }

        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM personnel");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY name ASC, record_id ASC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), row_to_record)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        // SQLite's lower() folds ASCII only, so the name predicate runs here.
        Ok(records.into_iter().filter(|r| filter.matches(r)).collect())
    }

    /// Point the record's supervisor at `supervisor_id` (or clear it).
    /// Only checks that both ids exist; level rules are the engine's job.
    pub fn set_supervisor(&self, id: &str, supervisor_id: Option<&str>) -> DirectoryResult<()> {
        let conn = self.conn()?;
        if !record_exists(&conn, id)? {
            return Err(DirectoryError::not_found(id));
        }
        if let Some(sup) = supervisor_id {
            if !record_exists(&conn, sup)? {
                return Err(DirectoryError::not_found(sup));
            }
        }
        conn.execute(
            "UPDATE personnel SET supervisor_id = ?1, version = version + 1
             WHERE record_id = ?2",
            params![supervisor_id, id],
        )?;
        Ok(())
    }

    /// Commit a supervisor change only if the row still carries
    /// `expected_version`, writing the audit entry in the same transaction.
    /// Returns the updated snapshot.
    pub fn commit_supervisor(
        &self,
        id: &str,
        supervisor_id: Option<&str>,
        expected_version: Version,
        audit: &EventLogEntry,
    ) -> DirectoryResult<PersonnelRecord> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if let Some(sup) = supervisor_id {
            if !record_exists(&tx, sup)? {
                return Err(DirectoryError::not_found(sup));
            }
        }
        let changed = tx.execute(
            "UPDATE personnel SET supervisor_id = ?1, version = version + 1
             WHERE record_id = ?2 AND version = ?3",
            params![supervisor_id, id, expected_version as i64],
        )?;
        if changed == 0 {
            return Err(if record_exists(&tx, id)? {
                DirectoryError::StaleRecord { id: id.to_string() }
            } else {
                DirectoryError::not_found(id)
            });
        }
        insert_event(&tx, audit)?;
        let updated = fetch_record(&tx, id)?.ok_or_else(|| DirectoryError::not_found(id))?;
        tx.commit()?;
        Ok(updated)
    }

    pub fn record_count(&self) -> DirectoryResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM personnel", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Head count per level; `None` groups records with no level.
    pub fn count_by_level(&self) -> DirectoryResult<Vec<(Option<Level>, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT level, COUNT(*) FROM personnel GROUP BY level ORDER BY level IS NULL, level",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((parse_level(0, row.get(0)?)?, row.get::<_, i64>(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn supervised_count(&self) -> DirectoryResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM personnel WHERE supervisor_id IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn record_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM personnel WHERE record_id = ?1",
        params![id],
        |row| row.get(0),
    )
}

fn fetch_record(conn: &Connection, id: &str) -> rusqlite::Result<Option<PersonnelRecord>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS} FROM personnel WHERE record_id = ?1"),
        params![id],
        row_to_record,
    )
    .optional()
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PersonnelRecord> {
    Ok(PersonnelRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        level: parse_level(3, row.get(3)?)?,
        supervisor_id: row.get(4)?,
        department_id: row.get(5)?,
        position_id: row.get(6)?,
        version: row.get::<_, i64>(7)? as Version,
    })
}

fn parse_level(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<Level>> {
    raw.map(|s| {
        s.parse::<Level>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}
