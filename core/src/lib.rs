//! orgchart-core: personnel directory with a five-level supervisor hierarchy.
//!
//! Layering (leaf to root):
//!   store       SQLite-backed directory of records, departments, audit log
//!   level       level ordering and supervisor eligibility policy
//!   engine      validated, versioned supervisor assignment
//!   query       candidate supervisors and hierarchy views
//!   service     outward contract shared across callers

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod event;
pub mod level;
pub mod name_generator;
pub mod population;
pub mod query;
pub mod record;
pub mod rng;
pub mod service;
pub mod store;
pub mod types;

pub use context::RequestContext;
pub use error::{DirectoryError, DirectoryResult};
pub use level::{Level, LevelPolicy};
pub use record::{PersonnelRecord, RecordFilter};
pub use service::DirectoryService;
