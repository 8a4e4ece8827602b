//! Validate-and-patch loop for HITs files

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use appraise_common::config::DEFAULT_REPAIR_MAX_ATTEMPTS;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::patterns::apply_repair_patterns;
use crate::validator::{HitsValidator, ValidationError};

/// Suffix appended to the input path for the repaired copy
pub const FIXED_SUFFIX: &str = ".fixed";

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Still invalid after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: usize,
        last_error: ValidationError,
    },
}

pub type Result<T> = std::result::Result<T, RepairError>;

/// Text that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome {
    pub text: String,
    /// Validation attempts used, including the successful one
    pub attempts: usize,
    /// True when at least one pattern pass was needed
    pub repaired: bool,
}

/// Validate `xml`, patching it between attempts, until it passes or
/// `max_attempts` validations have failed
///
/// A bound of zero is treated as one.
pub fn repair_hits_xml<V>(validator: &V, xml: &str, max_attempts: usize) -> Result<RepairOutcome>
where
    V: HitsValidator + ?Sized,
{
    let max_attempts = max_attempts.max(1);
    let mut text = xml.to_string();
    let mut attempt = 1;

    loop {
        info!("Validation attempt {}/{}", attempt, max_attempts);

        let error = match validator.validate(&text) {
            Ok(()) => {
                return Ok(RepairOutcome {
                    text,
                    attempts: attempt,
                    repaired: attempt > 1,
                });
            }
            Err(e) => e,
        };
        warn!("{}", error);

        if attempt == max_attempts {
            return Err(RepairError::Exhausted {
                attempts: max_attempts,
                last_error: error,
            });
        }

        text = apply_repair_patterns(&text);
        attempt += 1;
    }
}

/// Options for [`repair_hits_file`]
#[derive(Debug, Clone, Copy)]
pub struct RepairOptions {
    pub max_attempts: usize,
    pub dry_run: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_REPAIR_MAX_ATTEMPTS,
            dry_run: false,
        }
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    /// Where the repaired copy went; `None` in dry-run mode
    pub output: Option<PathBuf>,
    pub attempts: usize,
    pub repaired: bool,
}

/// Repair one HITs file, writing `<path>.fixed` on success
pub fn repair_hits_file<V>(validator: &V, path: &Path, options: RepairOptions) -> Result<FileReport>
where
    V: HitsValidator + ?Sized,
{
    info!("Processing {}", path.display());

    let bytes = fs::read(path).map_err(|source| RepairError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let xml = String::from_utf8(bytes).map_err(|source| RepairError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let outcome = repair_hits_xml(validator, &xml, options.max_attempts)?;

    let output = if options.dry_run {
        debug!("Dry run, not writing output for {}", path.display());
        None
    } else {
        let target = fixed_path(path);
        fs::write(&target, outcome.text.as_bytes()).map_err(|source| RepairError::Write {
            path: target.clone(),
            source,
        })?;
        info!("Wrote {}", target.display());
        Some(target)
    };

    Ok(FileReport {
        input: path.to_path_buf(),
        output,
        attempts: outcome.attempts,
        repaired: outcome.repaired,
    })
}

/// Sibling path with [`FIXED_SUFFIX`] appended to the full file name
pub fn fixed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(FIXED_SUFFIX);
    PathBuf::from(name)
}
