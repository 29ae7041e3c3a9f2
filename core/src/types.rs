//! Shared primitive types used across the directory.

/// A stable, unique identifier for a personnel record.
pub type RecordId = String;

/// Identifier of a department.
pub type DepartmentId = String;

/// Identifier of a position within a department.
pub type PositionId = String;

/// Identity of the operator issuing a request, used only for audit.
pub type ActorId = String;

/// Optimistic-concurrency counter carried by every personnel row.
pub type Version = u64;
