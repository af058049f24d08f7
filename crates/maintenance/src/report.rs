//! Operator-facing logging of audits and results.

use serde_json::Value;
use tourney_core::maintenance::{MaintenanceTask, TaskOutcome, TaskResult};
use tourney_core::types::Document;

use crate::error::TaskError;

/// Documents listed individually in an audit before the rest are summarized.
pub const AUDIT_LOG_LIMIT: usize = 100;

/// Short label identifying a document in logs.
///
/// Uses `_id` (unwrapping extended-JSON `$oid`), or `<no _id>`.
pub fn document_label(doc: &Document) -> String {
    match doc.get("_id") {
        Some(Value::Object(id)) => match id.get("$oid") {
            Some(Value::String(hex)) => hex.clone(),
            _ => Value::Object(id.clone()).to_string(),
        },
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "<no _id>".to_string(),
    }
}

/// Log the documents a task is about to act on.
pub fn audit_documents(task: &MaintenanceTask, matched: &[Document]) {
    tracing::info!(
        task = %task.name,
        collection = %task.target_collection,
        selector = %task.selector,
        matched = matched.len(),
        "Found matching documents",
    );

    for doc in matched.iter().take(AUDIT_LOG_LIMIT) {
        tracing::info!(id = %document_label(doc), document = %doc, "Matched document");
    }
    if matched.len() > AUDIT_LOG_LIMIT {
        tracing::info!(
            omitted = matched.len() - AUDIT_LOG_LIMIT,
            "Further matched documents not listed",
        );
    }
}

/// Log the indexes present on a collection before one is dropped.
pub fn audit_indexes(task: &MaintenanceTask, target: &str, existing: &[String]) {
    let present = existing.iter().any(|name| name == target);
    tracing::info!(
        task = %task.name,
        collection = %task.target_collection,
        index = %target,
        present,
        indexes = ?existing,
        "Listed collection indexes",
    );
}

/// Emit the final summary of a successful run.
///
/// The result message is logged once; only a dry run adds a note.
pub fn report(result: &TaskResult) {
    if result.outcome == TaskOutcome::DryRun {
        tracing::info!(
            task = %result.task_name,
            matched = result.matched_count,
            "Dry run; no changes made",
        );
    }

    tracing::info!(
        task = %result.task_name,
        collection = %result.collection,
        action = %result.action,
        outcome = ?result.outcome,
        matched = result.matched_count,
        affected = result.affected_count,
        "{}",
        result.message
    );
}

/// Emit the final summary of a failed run.
pub fn report_failure(task: &MaintenanceTask, err: &TaskError) {
    tracing::error!(
        task = %task.name,
        collection = %task.target_collection,
        error = %err,
        "Maintenance task failed",
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use tourney_core::selector::Selector;
    use tourney_db::StoreError;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedWriter;

        fn make_writer(&'a self) -> Self::Writer {
            CapturedWriter(Arc::clone(&self.0))
        }
    }

    impl io::Write for CapturedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a JSON subscriber and return every emitted event.
    fn capture(f: impl FnOnce()) -> Vec<Value> {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .json()
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("json log line"))
            .collect()
    }

    fn messages(events: &[Value]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| e["fields"]["message"].as_str())
            .collect()
    }

    fn drop_task() -> MaintenanceTask {
        MaintenanceTask::drop_named_index(
            "drop-team-name-index",
            "teams",
            "tournament_1_teamName_1",
        )
    }

    #[test]
    fn label_unwraps_object_id() {
        let doc = json!({"_id": {"$oid": "65f1c0ffee0000000000abcd"}, "name": null});
        assert_eq!(document_label(&doc), "65f1c0ffee0000000000abcd");
    }

    #[test]
    fn label_handles_plain_ids() {
        assert_eq!(document_label(&json!({"_id": "team-7"})), "team-7");
        assert_eq!(document_label(&json!({"_id": 7})), "7");
        assert_eq!(document_label(&json!({"name": "Owls"})), "<no _id>");
    }

    #[test]
    fn absent_index_is_reported_once() {
        let result = TaskResult::new(
            &drop_task(),
            0,
            0,
            TaskOutcome::AlreadyAbsent,
            "Index does not exist",
        );

        let events = capture(|| report(&result));

        let absent = messages(&events)
            .into_iter()
            .filter(|m| m.contains("Index does not exist"))
            .count();
        assert_eq!(absent, 1);
        let summary = &events[events.len() - 1]["fields"];
        assert_eq!(summary["task"], "drop-team-name-index");
        assert_eq!(summary["outcome"], "AlreadyAbsent");
        assert_eq!(summary["affected"], 0);
    }

    #[test]
    fn applied_result_logs_counts() {
        let task = MaintenanceTask::delete_matching(
            "remove-unnamed-teams",
            "teams",
            Selector::is_null("name"),
        );
        let result = TaskResult::new(&task, 3, 3, TaskOutcome::Applied, "Deleted 3 documents");

        let events = capture(|| report(&result));

        assert_eq!(messages(&events), vec!["Deleted 3 documents"]);
        let fields = &events[0]["fields"];
        assert_eq!(fields["collection"], "teams");
        assert_eq!(fields["action"], "delete_matching");
        assert_eq!(fields["matched"], 3);
        assert_eq!(fields["affected"], 3);
    }

    #[test]
    fn dry_run_adds_a_note() {
        let result = TaskResult::new(
            &drop_task(),
            1,
            0,
            TaskOutcome::DryRun,
            "Dry run: index 'tournament_1_teamName_1' would be dropped",
        );

        let events = capture(|| report(&result));

        assert_eq!(
            messages(&events),
            vec![
                "Dry run; no changes made",
                "Dry run: index 'tournament_1_teamName_1' would be dropped",
            ]
        );
    }

    #[test]
    fn failure_is_logged_at_error_level() {
        let err = TaskError::Connection(StoreError::Connection("connection refused".to_string()));

        let events = capture(|| report_failure(&drop_task(), &err));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["level"], "ERROR");
        let fields = &events[0]["fields"];
        assert_eq!(fields["task"], "drop-team-name-index");
        assert!(fields["error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }
}
