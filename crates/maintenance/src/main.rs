//! `tourney-maintenance` -- one-shot maintenance tasks for the tournament store.
//!
//! Connects to MongoDB, audits the target collection, applies a single
//! corrective action, reports, disconnects, and exits `0` on success
//! (including idempotent no-ops) or `1` on any failure.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default   | Description                       |
//! |--------------------------------|----------|-----------|-----------------------------------|
//! | `MONGODB_URI`                  | yes      | --        | `mongodb://` or `mongodb+srv://`  |
//! | `MONGODB_DATABASE`             | no       | `tourney` | Database holding the collections  |
//! | `MONGODB_CONNECT_TIMEOUT_SECS` | no       | `10`      | Server selection timeout          |
//! | `RUST_LOG`                     | no       | `info`    | Log filter                        |

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tourney_core::maintenance::MaintenanceTask;
use tourney_db::MongoConnector;
use tourney_maintenance::config::MaintenanceConfig;
use tourney_maintenance::runner::{self, RunMode};
use tourney_maintenance::{exit_code, report, tasks, EXIT_FAILURE, EXIT_SUCCESS};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tourney-maintenance")]
#[command(about = "Run one maintenance task against the tournament store")]
struct Args {
    /// Built-in task to run (see --list).
    #[arg(
        conflicts_with = "task_file",
        required_unless_present_any = ["task_file", "list"]
    )]
    task: Option<String>,

    /// Run the task described by a JSON file instead of a built-in one.
    #[arg(long, value_name = "PATH")]
    task_file: Option<PathBuf>,

    /// Audit and report without changing anything.
    #[arg(long)]
    dry_run: bool,

    /// List the built-in tasks and exit.
    #[arg(long)]
    list: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tourney_maintenance=info,tourney_db=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn resolve_task(args: &Args) -> anyhow::Result<MaintenanceTask> {
    match (&args.task, &args.task_file) {
        (Some(name), _) => tasks::builtin(name).context("Could not resolve maintenance task"),
        (None, Some(path)) => {
            tasks::load_task_file(path).context("Could not load maintenance task")
        }
        (None, None) => anyhow::bail!("No task given; pass a task name or --task-file"),
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    if args.list {
        for builtin in tasks::builtin_tasks() {
            println!("{:<24} {}", builtin.task.name, builtin.description);
        }
        return Ok(ExitCode::from(EXIT_SUCCESS));
    }

    let task = resolve_task(&args)?;
    let config = MaintenanceConfig::from_env().context("Invalid maintenance configuration")?;
    let mode = if args.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Apply
    };

    tracing::info!(
        task = %task.name,
        action = %task.action,
        collection = %task.target_collection,
        database = %config.database,
        uri = %config.redacted_uri(),
        dry_run = args.dry_run,
        "Starting maintenance task",
    );

    let result = runner::execute(&MongoConnector, &config.connect_options(), &task, mode).await;
    match &result {
        Ok(r) => report::report(r),
        Err(e) => report::report_failure(&task, e),
    }

    Ok(ExitCode::from(exit_code(&result)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(args.json_logs);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            let error = format!("{e:#}");
            tracing::error!(error = %error, "Maintenance run aborted");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
