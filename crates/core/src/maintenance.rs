//! Maintenance task model, results, and the run-phase state machine.
//!
//! A [`MaintenanceTask`] names one corrective operation against a single
//! collection. Runners audit before they mutate: the matching documents (or
//! the collection's indexes) are enumerated and reported first, and only
//! then is the action applied.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::selector::Selector;

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Delete every document matching the selector.
pub const ACTION_DELETE_MATCHING: &str = "delete_matching";
/// Drop one index by name.
pub const ACTION_DROP_NAMED_INDEX: &str = "drop_named_index";

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of a collection name.
pub const MAX_COLLECTION_NAME_LEN: usize = 120;

/// Maximum length of a task name.
pub const MAX_TASK_NAME_LEN: usize = 64;

/// Index every collection has; it cannot be dropped.
pub const ID_INDEX_NAME: &str = "_id_";

/// Name `dropIndexes` reads as "every index but `_id_`".
pub const WILDCARD_INDEX_NAME: &str = "*";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceAction {
    DeleteMatching,
    DropNamedIndex,
}

impl MaintenanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeleteMatching => ACTION_DELETE_MATCHING,
            Self::DropNamedIndex => ACTION_DROP_NAMED_INDEX,
        }
    }
}

impl fmt::Display for MaintenanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a task run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The mutation was applied to at least one document or index.
    Applied,
    /// Nothing matched, nothing changed.
    NoOp,
    /// The named index did not exist.
    AlreadyAbsent,
    /// Audit only; mutation skipped on request.
    DryRun,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One corrective operation against a single collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub name: String,
    pub target_collection: String,
    #[serde(default = "default_selector")]
    pub selector: Selector,
    pub action: MaintenanceAction,
    /// Only meaningful for [`MaintenanceAction::DropNamedIndex`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
}

fn default_selector() -> Selector {
    Selector::All
}

impl MaintenanceTask {
    /// Build a task deleting every document in `collection` matching `selector`.
    pub fn delete_matching(
        name: impl Into<String>,
        collection: impl Into<String>,
        selector: Selector,
    ) -> Self {
        Self {
            name: name.into(),
            target_collection: collection.into(),
            selector,
            action: MaintenanceAction::DeleteMatching,
            index_name: None,
        }
    }

    /// Build a task dropping `index` from `collection`.
    pub fn drop_named_index(
        name: impl Into<String>,
        collection: impl Into<String>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_collection: collection.into(),
            selector: Selector::All,
            action: MaintenanceAction::DropNamedIndex,
            index_name: Some(index.into()),
        }
    }

    /// Validate the task before any store is contacted.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_task_name(&self.name)?;
        validate_collection_name(&self.target_collection)?;
        self.selector.validate()?;

        match (self.action, self.index_name.as_deref()) {
            (MaintenanceAction::DropNamedIndex, None) => Err(CoreError::Validation(
                "drop_named_index requires an index_name".to_string(),
            )),
            (MaintenanceAction::DropNamedIndex, Some(index)) => validate_index_name(index),
            (MaintenanceAction::DeleteMatching, Some(_)) => Err(CoreError::Validation(
                "index_name is only valid for drop_named_index".to_string(),
            )),
            (MaintenanceAction::DeleteMatching, None) => Ok(()),
        }
    }
}

/// Validate a task name: non-empty, bounded, kebab/snake-case ASCII.
pub fn validate_task_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.len() > MAX_TASK_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Task name must be 1-{MAX_TASK_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Task name '{name}' may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// Validate the name of an index to drop. Any name the store could have
/// assigned is accepted except the `_id_` index and the wildcard.
pub fn validate_index_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Index name must not be empty".to_string(),
        ));
    }
    if name == ID_INDEX_NAME {
        return Err(CoreError::Validation(
            "The _id_ index cannot be dropped".to_string(),
        ));
    }
    if name == WILDCARD_INDEX_NAME {
        return Err(CoreError::Validation(
            "Index name '*' would drop every index; name one index".to_string(),
        ));
    }
    Ok(())
}

/// Validate a collection name the way document stores do.
pub fn validate_collection_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Collection name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_COLLECTION_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Collection name exceeds maximum length of {MAX_COLLECTION_NAME_LEN} characters"
        )));
    }
    if name.contains('$') || name.contains('\0') {
        return Err(CoreError::Validation(format!(
            "Collection name '{name}' contains a reserved character"
        )));
    }
    if name.starts_with("system.") {
        return Err(CoreError::Validation(format!(
            "Collection '{name}' is a system collection"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Outcome of running one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_name: String,
    pub collection: String,
    pub action: MaintenanceAction,
    /// Documents (or indexes) found during the audit.
    pub matched_count: u64,
    /// Documents (or indexes) changed by the mutation.
    pub affected_count: u64,
    pub succeeded: bool,
    pub outcome: TaskOutcome,
    pub message: String,
}

impl TaskResult {
    pub fn new(
        task: &MaintenanceTask,
        matched_count: u64,
        affected_count: u64,
        outcome: TaskOutcome,
        message: impl Into<String>,
    ) -> Self {
        Self {
            task_name: task.name.clone(),
            collection: task.target_collection.clone(),
            action: task.action,
            matched_count,
            affected_count,
            succeeded: true,
            outcome,
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} on '{}': matched {}, affected {} ({})",
            self.task_name,
            self.action,
            self.collection,
            self.matched_count,
            self.affected_count,
            self.message
        )
    }
}

// ---------------------------------------------------------------------------
// Run phases
// ---------------------------------------------------------------------------

/// Phases of a single task run.
///
/// `Init -> Connected -> Audited -> Mutated -> Disconnected -> Terminated`.
/// A dry run skips `Mutated`. Any phase may fail straight to `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Connected,
    Audited,
    Mutated,
    Disconnected,
    Terminated,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Connected => "connected",
            Self::Audited => "audited",
            Self::Mutated => "mutated",
            Self::Disconnected => "disconnected",
            Self::Terminated => "terminated",
        }
    }

    /// Phases reachable from `self` on the success path.
    pub fn valid_transitions(&self) -> &'static [RunPhase] {
        match self {
            Self::Init => &[Self::Connected, Self::Terminated],
            Self::Connected => &[Self::Audited, Self::Disconnected, Self::Terminated],
            Self::Audited => &[Self::Mutated, Self::Disconnected, Self::Terminated],
            Self::Mutated => &[Self::Disconnected, Self::Terminated],
            Self::Disconnected => &[Self::Terminated],
            Self::Terminated => &[],
        }
    }

    pub fn can_transition(&self, to: RunPhase) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Validate a transition, returning an error for invalid ones.
    pub fn validate_transition(&self, to: RunPhase) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Internal(format!(
                "Invalid run phase transition: {} -> {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
