//! appraise-status - read-only task progress report
//!
//! Prints completion and aggregate statistics for every task in the
//! database, as text lines or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use appraise_common::config::{resolve_database_path, TomlConfig};
use appraise_common::db::{EvaluationStore, SqliteStore, TaskFamily};
use clap::Parser;
use tracing::{error, info};

mod db;
mod report;

use report::build_report;

/// Command-line arguments for appraise-status
#[derive(Parser, Debug)]
#[command(name = "appraise-status")]
#[command(about = "Report evaluation task progress and statistics")]
#[command(version)]
struct Args {
    /// Root folder containing appraise.db
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Database file (overrides the root folder)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Only report tasks of this family
    #[arg(short, long, value_parser = parse_family)]
    family: Option<TaskFamily>,

    /// Print a JSON array instead of text lines
    #[arg(long)]
    json: bool,
}

fn parse_family(s: &str) -> std::result::Result<TaskFamily, String> {
    s.parse().map_err(|e: appraise_common::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appraise_status=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting appraise-status v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = TomlConfig::load();
    let db_path = resolve_database_path(
        args.database.as_deref(),
        args.root_folder.as_deref(),
        &config,
    );
    info!("Database path: {}", db_path.display());

    let pool = match db::connect_readonly(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {:#}", e);
            return Err(e);
        }
    };
    let store = SqliteStore::new(pool);

    let tasks = store
        .list_tasks(args.family)
        .await
        .context("Failed to list tasks")?;
    info!("{} tasks", tasks.len());

    let mut reports = Vec::with_capacity(tasks.len());
    for task in &tasks {
        let report = build_report(&store, task)
            .await
            .with_context(|| format!("Failed to aggregate {}", task))?;
        reports.push(report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report.render_line());
        }
    }

    Ok(())
}
