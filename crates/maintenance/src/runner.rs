//! Runs one maintenance task: connect, audit, mutate, disconnect.
//!
//! The runner owns the store handle for the whole run and releases it on
//! every path that got as far as connecting. It never touches the process:
//! callers map the returned `Result` to an exit code.

use tourney_core::maintenance::{
    MaintenanceAction, MaintenanceTask, RunPhase, TaskOutcome, TaskResult,
};
use tourney_db::{ConnectOptions, DocumentStore, StoreConnector};

use crate::error::TaskError;
use crate::report;

/// Whether the mutation step runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Apply,
    /// Audit and report only.
    DryRun,
}

/// Records the phases a run passes through and rejects invalid transitions.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    history: Vec<RunPhase>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            history: vec![RunPhase::Init],
        }
    }

    pub fn current(&self) -> RunPhase {
        self.history.last().copied().unwrap_or(RunPhase::Init)
    }

    pub fn history(&self) -> &[RunPhase] {
        &self.history
    }

    pub fn advance(&mut self, to: RunPhase) -> Result<(), TaskError> {
        self.current().validate_transition(to)?;
        tracing::debug!(from = %self.current(), to = %to, "Run phase transition");
        self.history.push(to);
        Ok(())
    }

    /// Jump straight to `Terminated`, the failure edge from any phase.
    pub fn fail(&mut self) {
        if self.current() != RunPhase::Terminated {
            tracing::debug!(from = %self.current(), "Run failed; terminating");
            self.history.push(RunPhase::Terminated);
        }
    }
}

/// Run `task` against a store opened by `connector`.
pub async fn execute<C: StoreConnector>(
    connector: &C,
    options: &ConnectOptions,
    task: &MaintenanceTask,
    mode: RunMode,
) -> Result<TaskResult, TaskError> {
    execute_tracked(connector, options, task, mode, &mut PhaseTracker::new()).await
}

/// [`execute`], recording every phase into `phases`.
pub async fn execute_tracked<C: StoreConnector>(
    connector: &C,
    options: &ConnectOptions,
    task: &MaintenanceTask,
    mode: RunMode,
    phases: &mut PhaseTracker,
) -> Result<TaskResult, TaskError> {
    if let Err(e) = task.validate() {
        phases.fail();
        return Err(TaskError::InvalidTask(e));
    }

    let store = match connector.connect(options).await {
        Ok(store) => store,
        Err(e) => {
            phases.fail();
            return Err(TaskError::Connection(e));
        }
    };
    tracing::info!(database = %options.database, "Connected to document store");

    let outcome = run_on_store(&store, task, mode, phases).await;

    store.disconnect().await;
    tracing::info!("Disconnected from document store");

    match outcome {
        Ok(result) => {
            phases.advance(RunPhase::Disconnected)?;
            phases.advance(RunPhase::Terminated)?;
            Ok(result)
        }
        Err(e) => {
            phases.fail();
            Err(e)
        }
    }
}

async fn run_on_store<S: DocumentStore>(
    store: &S,
    task: &MaintenanceTask,
    mode: RunMode,
    phases: &mut PhaseTracker,
) -> Result<TaskResult, TaskError> {
    phases.advance(RunPhase::Connected)?;
    match task.action {
        MaintenanceAction::DeleteMatching => delete_matching(store, task, mode, phases).await,
        MaintenanceAction::DropNamedIndex => drop_named_index(store, task, mode, phases).await,
    }
}

async fn delete_matching<S: DocumentStore>(
    store: &S,
    task: &MaintenanceTask,
    mode: RunMode,
    phases: &mut PhaseTracker,
) -> Result<TaskResult, TaskError> {
    let collection = task.target_collection.as_str();

    let matched = store
        .find_matching(collection, &task.selector)
        .await
        .map_err(|e| TaskError::operation(task, e))?;
    report::audit_documents(task, &matched);
    phases.advance(RunPhase::Audited)?;

    let matched_count = matched.len() as u64;

    if mode == RunMode::DryRun {
        return Ok(TaskResult::new(
            task,
            matched_count,
            0,
            TaskOutcome::DryRun,
            format!("Dry run: {matched_count} documents would be deleted"),
        ));
    }

    if matched_count == 0 {
        return Ok(TaskResult::new(
            task,
            0,
            0,
            TaskOutcome::NoOp,
            "No matching documents; nothing deleted",
        ));
    }

    let deleted = store
        .delete_matching(collection, &task.selector)
        .await
        .map_err(|e| TaskError::operation(task, e))?;
    phases.advance(RunPhase::Mutated)?;

    if deleted != matched_count {
        tracing::warn!(
            matched = matched_count,
            deleted,
            "Deleted count differs from audit; collection changed during the run",
        );
    }

    let outcome = if deleted == 0 {
        TaskOutcome::NoOp
    } else {
        TaskOutcome::Applied
    };
    Ok(TaskResult::new(
        task,
        matched_count,
        deleted,
        outcome,
        format!("Deleted {deleted} documents"),
    ))
}

async fn drop_named_index<S: DocumentStore>(
    store: &S,
    task: &MaintenanceTask,
    mode: RunMode,
    phases: &mut PhaseTracker,
) -> Result<TaskResult, TaskError> {
    let collection = task.target_collection.as_str();
    let index = task.index_name.as_deref().ok_or_else(|| {
        TaskError::Internal("drop_named_index task has no index_name".to_string())
    })?;

    let existing = store
        .list_index_names(collection)
        .await
        .map_err(|e| TaskError::operation(task, e))?;
    report::audit_indexes(task, index, &existing);
    phases.advance(RunPhase::Audited)?;

    let present = existing.iter().any(|name| name == index);
    let matched_count = u64::from(present);

    if mode == RunMode::DryRun {
        let message = if present {
            format!("Dry run: index '{index}' would be dropped")
        } else {
            format!("Dry run: index '{index}' does not exist")
        };
        return Ok(TaskResult::new(
            task,
            matched_count,
            0,
            TaskOutcome::DryRun,
            message,
        ));
    }

    // Drop even when the audit did not list it; the store is authoritative.
    match store.drop_index(collection, index).await {
        Ok(()) => {
            phases.advance(RunPhase::Mutated)?;
            Ok(TaskResult::new(
                task,
                matched_count,
                1,
                TaskOutcome::Applied,
                format!("Dropped index '{index}'"),
            ))
        }
        Err(e) if e.is_expected_absence() => Ok(TaskResult::new(
            task,
            0,
            0,
            TaskOutcome::AlreadyAbsent,
            "Index does not exist",
        )),
        Err(e) => Err(TaskError::operation(task, e)),
    }
}
