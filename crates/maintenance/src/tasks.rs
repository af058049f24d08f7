//! Built-in maintenance tasks and JSON task files.

use std::path::{Path, PathBuf};

use tourney_core::index::{index_name, IndexKey};
use tourney_core::maintenance::MaintenanceTask;
use tourney_core::models::{
    TEAMS_COLLECTION, TEAM_LABEL_FIELD, TEAM_NAME_FIELD, TEAM_TOURNAMENT_FIELD,
};
use tourney_core::selector::Selector;

/// Deletes team records whose `name` is null or absent.
pub const REMOVE_UNNAMED_TEAMS: &str = "remove-unnamed-teams";

/// Drops the stale unique index on `{tournament, teamName}`.
pub const DROP_TEAM_NAME_INDEX: &str = "drop-team-name-index";

#[derive(Debug, thiserror::Error)]
pub enum TaskLookupError {
    #[error("Unknown task '{name}'. Built-in tasks: {known}")]
    Unknown { name: String, known: String },

    #[error("Could not read task file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse task file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A task shipped with the binary.
#[derive(Debug, Clone)]
pub struct BuiltinTask {
    pub task: MaintenanceTask,
    pub description: &'static str,
}

/// Every built-in task, in listing order.
pub fn builtin_tasks() -> Vec<BuiltinTask> {
    vec![
        BuiltinTask {
            task: MaintenanceTask::delete_matching(
                REMOVE_UNNAMED_TEAMS,
                TEAMS_COLLECTION,
                Selector::is_null(TEAM_NAME_FIELD),
            ),
            description: "Delete team records whose name is null or missing",
        },
        BuiltinTask {
            task: MaintenanceTask::drop_named_index(
                DROP_TEAM_NAME_INDEX,
                TEAMS_COLLECTION,
                index_name(&[
                    IndexKey::asc(TEAM_TOURNAMENT_FIELD),
                    IndexKey::asc(TEAM_LABEL_FIELD),
                ]),
            ),
            description: "Drop the stale unique index on (tournament, teamName)",
        },
    ]
}

/// Look up a built-in task by name.
pub fn builtin(name: &str) -> Result<MaintenanceTask, TaskLookupError> {
    let tasks = builtin_tasks();
    tasks
        .iter()
        .find(|b| b.task.name == name)
        .map(|b| b.task.clone())
        .ok_or_else(|| TaskLookupError::Unknown {
            name: name.to_string(),
            known: tasks
                .iter()
                .map(|b| b.task.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Read a task definition from a JSON file.
///
/// The file is only parsed here; validation happens when the task runs.
pub fn load_task_file(path: &Path) -> Result<MaintenanceTask, TaskLookupError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TaskLookupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| TaskLookupError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
