//! Directory entities: personnel records, departments, positions.

use crate::{
    error::{DirectoryError, DirectoryResult},
    level::Level,
    types::{DepartmentId, PositionId, RecordId, Version},
};
use serde::{Deserialize, Serialize};

const MAX_EMAIL_LENGTH: usize = 254;

/// A read-only snapshot of one personnel record.
/// Callers never hold a live handle into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelRecord {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub level: Option<Level>, // None = unassigned
    pub supervisor_id: Option<RecordId>,
    pub department_id: Option<DepartmentId>,
    pub position_id: Option<PositionId>,
    pub version: Version,
}

impl PersonnelRecord {
    pub fn is_supervised(&self) -> bool {
        self.supervisor_id.is_some()
    }
}

/// Input for provisioning a new record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRecord {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub position_id: Option<PositionId>,
}

impl NewRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>, level: Option<Level>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            level,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn in_department(mut self, department_id: impl Into<DepartmentId>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    pub fn at_position(mut self, position_id: impl Into<PositionId>) -> Self {
        self.position_id = Some(position_id.into());
        self
    }

    /// Field-level checks that need no store access.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if let Some(id) = &self.id {
            if id.trim().is_empty() {
                return Err(invalid("id must not be blank"));
            }
        }
        validate_email(&self.email)?;
        if self.position_id.is_some() && self.department_id.is_none() {
            return Err(invalid("a position requires a department"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> DirectoryError {
    DirectoryError::InvalidRecord { reason: reason.to_string() }
}

/// Minimal structural email check: one `@`, non-empty local part,
/// a dotted domain, no whitespace.
pub fn validate_email(email: &str) -> DirectoryResult<()> {
    if email.is_empty() {
        return Err(invalid("email must not be empty"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(invalid("email is too long"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid("email must not contain whitespace"));
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(l), Some(d), None) => (l, d),
        _ => return Err(invalid("email must contain exactly one '@'")),
    };
    if local.is_empty() {
        return Err(invalid("email local part is empty"));
    }
    if domain.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("email domain is malformed"));
    }
    Ok(())
}

/// Level predicate used by `RecordFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelFilter {
    Exactly(Level),
    Unassigned,
}

/// Conjunctive filter over the directory. Empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub level: Option<LevelFilter>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub supervisor_id: Option<RecordId>,
    /// Case-insensitive substring of the display name.
    #[serde(default)]
    pub name_contains: Option<String>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn at_level(level: Level) -> Self {
        Self {
            level: Some(LevelFilter::Exactly(level)),
            ..Default::default()
        }
    }

    pub fn unassigned() -> Self {
        Self {
            level: Some(LevelFilter::Unassigned),
            ..Default::default()
        }
    }

    pub fn reporting_to(supervisor_id: impl Into<RecordId>) -> Self {
        Self {
            supervisor_id: Some(supervisor_id.into()),
            ..Default::default()
        }
    }

    pub fn in_department(mut self, department_id: impl Into<DepartmentId>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn matches(&self, record: &PersonnelRecord) -> bool {
        let level_ok = match self.level {
            None => true,
            Some(LevelFilter::Exactly(l)) => record.level == Some(l),
            Some(LevelFilter::Unassigned) => record.level.is_none(),
        };
        let dept_ok = self
            .department_id
            .as_ref()
            .map_or(true, |d| record.department_id.as_ref() == Some(d));
        let sup_ok = self
            .supervisor_id
            .as_ref()
            .map_or(true, |s| record.supervisor_id.as_ref() == Some(s));
        let name_ok = self
            .name_contains
            .as_ref()
            .map_or(true, |n| record.name.to_lowercase().contains(&n.to_lowercase()));
        level_ok && dept_ok && sup_ok && name_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub department_id: DepartmentId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: Option<Level>) -> PersonnelRecord {
        PersonnelRecord {
            id: "r-1".into(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            level,
            supervisor_id: None,
            department_id: Some("d-eng".into()),
            position_id: None,
            version: 0,
        }
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ada.example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@localhost").is_err());
        assert!(validate_email("ada @example.com").is_err());
    }

    #[test]
    fn new_record_requires_department_for_position() {
        let rec = NewRecord::new("Grace", "grace@example.com", Some(Level::Level2)).at_position("p-1");
        assert!(matches!(rec.validate(), Err(DirectoryError::InvalidRecord { .. })));
    }

    #[test]
    fn filter_level_and_name() {
        let r = record(Some(Level::Level3));
        assert!(RecordFilter::all().matches(&r));
        assert!(RecordFilter::at_level(Level::Level3).matches(&r));
        assert!(!RecordFilter::at_level(Level::Level2).matches(&r));
        assert!(!RecordFilter::unassigned().matches(&r));
        assert!(RecordFilter::unassigned().matches(&record(None)));
        assert!(RecordFilter::all().name_contains("LOVE").matches(&r));
        assert!(!RecordFilter::all().in_department("d-ops").matches(&r));
    }
}
