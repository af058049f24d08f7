//! Named index identifiers.
//!
//! Document stores name an index after its key pattern: each field followed
//! by its direction, joined with underscores. The compound index on
//! `{tournament: 1, teamName: 1}` is therefore `tournament_1_teamName_1`.

use std::fmt;

/// Sort direction of one index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirection {
    Ascending,
    Descending,
}

impl IndexDirection {
    /// Numeric form used in key patterns and index names.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// One field of an index key pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub field: String,
    pub direction: IndexDirection,
}

impl IndexKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: IndexDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: IndexDirection::Descending,
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field, self.direction.as_i32())
    }
}

/// Build the default index name for a key pattern.
pub fn index_name(keys: &[IndexKey]) -> String {
    keys.iter()
        .map(IndexKey::to_string)
        .collect::<Vec<_>>()
        .join("_")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
