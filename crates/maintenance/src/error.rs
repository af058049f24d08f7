use tourney_core::error::CoreError;
use tourney_core::maintenance::MaintenanceTask;
use tourney_db::StoreError;

/// Everything that can end a task run unsuccessfully.
///
/// An absent index is not represented here: the runner downgrades
/// [`StoreError::IndexNotFound`] to a successful result.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Invalid task: {0}")]
    InvalidTask(CoreError),

    #[error("Could not connect to the store: {0}")]
    Connection(StoreError),

    #[error("Task '{task}' failed: {source}")]
    Operation {
        task: String,
        #[source]
        source: StoreError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskError {
    pub fn operation(task: &MaintenanceTask, source: StoreError) -> Self {
        Self::Operation {
            task: task.name.clone(),
            source,
        }
    }
}

impl From<CoreError> for TaskError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(_) => Self::InvalidTask(err),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}
