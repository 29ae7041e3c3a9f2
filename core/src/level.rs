//! Hierarchy levels and the policy deciding who may supervise whom.
//!
//! level1 is the most senior rank, level5 the most junior. A record may
//! only be supervised by a record exactly one rank above it; level1 is
//! the root of the hierarchy and has no eligible supervisor level.

use crate::error::{DirectoryError, DirectoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A rank in the five-tier hierarchy. Ordering follows seniority:
/// `Level1 < Level2 < ... < Level5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Level1,
        Level::Level2,
        Level::Level3,
        Level::Level4,
        Level::Level5,
    ];

    /// Numeric rank, 1 (most senior) through 5.
    pub fn rank(self) -> u8 {
        match self {
            Self::Level1 => 1,
            Self::Level2 => 2,
            Self::Level3 => 3,
            Self::Level4 => 4,
            Self::Level5 => 5,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Self::Level1),
            2 => Some(Self::Level2),
            3 => Some(Self::Level3),
            4 => Some(Self::Level4),
            5 => Some(Self::Level5),
            _ => None,
        }
    }

    /// The adjacent, more senior level. `None` for level1.
    pub fn above(self) -> Option<Self> {
        Self::from_rank(self.rank() - 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Level1 => "level1",
            Self::Level2 => "level2",
            Self::Level3 => "level3",
            Self::Level4 => "level4",
            Self::Level5 => "level5",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = DirectoryError;

    /// Accepts `level1`..`level5`, case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> DirectoryResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "level1" => Ok(Self::Level1),
            "level2" => Ok(Self::Level2),
            "level3" => Ok(Self::Level3),
            "level4" => Ok(Self::Level4),
            "level5" => Ok(Self::Level5),
            other => Err(DirectoryError::InvalidLevel {
                reason: format!("unrecognized level '{other}'"),
            }),
        }
    }
}

/// Stateless lookup of assignment eligibility.
pub struct LevelPolicy;

impl LevelPolicy {
    /// The single level eligible to supervise `level`, or `None` for the root.
    pub fn eligible_level_for(level: Level) -> Option<Level> {
        level.above()
    }

    /// Human label for the supervising role a record at `level` reports to.
    pub fn label_for(level: Level) -> &'static str {
        match level {
            Level::Level5 => "Manager",
            Level::Level4 => "Team Leader",
            Level::Level3 => "HOD",
            Level::Level2 => "Top Management",
            Level::Level1 => "N/A",
        }
    }

    /// Eligible supervisor level for a record whose level may be unassigned.
    /// Fails with `InvalidLevel` when no supervisor level exists.
    pub fn require_eligible_level(level: Option<Level>) -> DirectoryResult<Level> {
        match level {
            None => Err(DirectoryError::InvalidLevel {
                reason: "record has no level assigned".into(),
            }),
            Some(l) => Self::eligible_level_for(l).ok_or_else(|| DirectoryError::InvalidLevel {
                reason: format!("{l} is the top of the hierarchy and takes no supervisor"),
            }),
        }
    }
}
