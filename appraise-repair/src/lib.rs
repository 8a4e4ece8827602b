//! HITs XML repair
//!
//! Validates WMT HITs files and applies a fixed table of literal
//! substitutions between attempts until the document validates or the retry
//! bound is reached.

pub mod patterns;
pub mod repair;
pub mod validator;

pub use patterns::{apply_repair_patterns, XML_REPAIR_PATTERNS};
pub use repair::{
    fixed_path, repair_hits_file, repair_hits_xml, FileReport, RepairError, RepairOptions,
    RepairOutcome, Result,
};
pub use validator::{HitsValidator, ValidationError, WmtHitsValidator};
