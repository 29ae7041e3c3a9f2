use super::DirectoryStore;
use crate::{
    error::{DirectoryError, DirectoryResult},
    record::{Department, Position},
};
use rusqlite::{params, Connection, OptionalExtension};

impl DirectoryStore {
    // ── Department ────────────────────────────────────────────────

    pub fn insert_department(&self, dept: &Department) -> DirectoryResult<()> {
        let conn = self.conn()?;
        insert_department(&conn, dept)
    }

    pub fn get_department(&self, id: &str) -> DirectoryResult<Department> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT department_id, name FROM department WHERE department_id = ?1",
            params![id],
            |row| {
                Ok(Department {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| DirectoryError::not_found(id))
    }

    pub fn departments(&self) -> DirectoryResult<Vec<Department>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT department_id, name FROM department ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Position ──────────────────────────────────────────────────

    pub fn insert_position(&self, pos: &Position) -> DirectoryResult<()> {
        let conn = self.conn()?;
        insert_position(&conn, pos)
    }

    /// Insert departments and their positions in one transaction. Any
    /// rejected row leaves both tables untouched.
    pub fn insert_departments(
        &self,
        departments: &[(Department, Vec<Position>)],
    ) -> DirectoryResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for (dept, positions) in departments {
            insert_department(&tx, dept)?;
            for pos in positions {
                insert_position(&tx, pos)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn positions_for(&self, department_id: &str) -> DirectoryResult<Vec<Position>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT position_id, department_id, name FROM job_position
             WHERE department_id = ?1 ORDER BY name ASC",
        )?;
        let rows = stmt.query_map(params![department_id], |row| {
            Ok(Position {
                id: row.get(0)?,
                department_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn insert_department(conn: &Connection, dept: &Department) -> DirectoryResult<()> {
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM department
         WHERE department_id = ?1 OR lower(name) = lower(?2)",
        params![&dept.id, &dept.name],
        |row| row.get(0),
    )?;
    if taken {
        return Err(DirectoryError::InvalidRecord {
            reason: format!("department '{}' already exists", dept.name),
        });
    }
    conn.execute(
        "INSERT INTO department (department_id, name) VALUES (?1, ?2)",
        params![&dept.id, &dept.name],
    )?;
    Ok(())
}

fn insert_position(conn: &Connection, pos: &Position) -> DirectoryResult<()> {
    let dept_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM department WHERE department_id = ?1",
        params![&pos.department_id],
        |row| row.get(0),
    )?;
    if !dept_exists {
        return Err(DirectoryError::not_found(&pos.department_id));
    }
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM job_position
         WHERE position_id = ?1 OR (department_id = ?2 AND lower(name) = lower(?3))",
        params![&pos.id, &pos.department_id, &pos.name],
        |row| row.get(0),
    )?;
    if taken {
        return Err(DirectoryError::InvalidRecord {
            reason: format!("position '{}' already exists", pos.id),
        });
    }
    conn.execute(
        "INSERT INTO job_position (position_id, department_id, name) VALUES (?1, ?2, ?3)",
        params![&pos.id, &pos.department_id, &pos.name],
    )?;
    Ok(())
}
