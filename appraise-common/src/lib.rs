//! # Appraise Common Library
//!
//! Shared code for the Appraise evaluation tools:
//! - Task, item and result models for the four task families
//! - Task identifier generation
//! - Storage interface and its SQLite implementation
//! - Aggregate statistics over task snapshots
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod human_time;
pub mod stats;
pub mod task_id;

pub use error::{Error, Result};
pub use stats::{LucyDistribution, QualityShare, TaskSnapshot, TaskStatus};
pub use task_id::{new_task_id, TaskId};
