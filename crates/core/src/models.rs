//! Shape of the team records kept in the document store.
//!
//! Field names follow the stored documents (camelCase), which is also what
//! maintenance selectors and index names refer to.

use serde::{Deserialize, Serialize};

/// Collection holding team records.
pub const TEAMS_COLLECTION: &str = "teams";

/// Team display name. Records without one are malformed.
pub const TEAM_NAME_FIELD: &str = "name";
/// Reference to the owning tournament.
pub const TEAM_TOURNAMENT_FIELD: &str = "tournament";
/// Legacy per-tournament team label, formerly covered by a unique index.
pub const TEAM_LABEL_FIELD: &str = "teamName";

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub name: Option<String>,
    pub tournament: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Team {
    /// A team without a name cannot be displayed or referenced.
    pub fn is_malformed(&self) -> bool {
        self.name.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
