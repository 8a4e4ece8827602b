//! appraise-repair - fix known character defects in WMT HITs files
//!
//! Each file is validated, patched and revalidated up to the retry bound.
//! Valid results are written next to the input as `<file>.fixed`.

use std::path::PathBuf;

use anyhow::{bail, Result};
use appraise_common::config::TomlConfig;
use appraise_repair::{repair_hits_file, RepairOptions, WmtHitsValidator};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for appraise-repair
#[derive(Parser, Debug)]
#[command(name = "appraise-repair")]
#[command(about = "Repair malformed WMT HITs XML files")]
#[command(version)]
struct Args {
    /// HITs files to check and repair
    #[arg(required = true)]
    hits_files: Vec<PathBuf>,

    /// Validate and patch, but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Validation attempts per file (config file or 10 if unset)
    #[arg(long, env = "APPRAISE_REPAIR_MAX_ATTEMPTS")]
    max_attempts: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appraise_repair=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting appraise-repair v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let max_attempts = match args.max_attempts {
        Some(n) => n,
        None => TomlConfig::load().repair.max_attempts,
    };
    let options = RepairOptions {
        max_attempts,
        dry_run: args.dry_run,
    };
    if options.dry_run {
        info!("Dry run: no .fixed files will be written");
    }

    let validator = WmtHitsValidator::new();
    let mut failed = Vec::new();

    for path in &args.hits_files {
        match repair_hits_file(&validator, path, options) {
            Ok(report) if report.repaired => {
                info!("{}: repaired after {} attempts", path.display(), report.attempts);
            }
            Ok(_) => info!("{}: valid", path.display()),
            Err(e) => {
                error!("{}", e);
                failed.push(path.display().to_string());
            }
        }
    }

    if !failed.is_empty() {
        bail!("Could not repair: {}", failed.join(", "));
    }

    Ok(())
}
