//! Storage interface
//!
//! Everything the data model needs from persistence: create and read tasks,
//! items and results by id, flip edited flags, filtered counts, and
//! consistent snapshots for aggregation. [`SqliteStore`](super::SqliteStore)
//! is the shipped implementation.

use crate::db::models::*;
use crate::stats::{TaskSnapshot, TaskStatus};
use crate::task_id::TaskId;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
pub trait EvaluationStore: Send + Sync {
    // --- users -----------------------------------------------------------

    async fn create_user(&self, username: &str) -> Result<User>;

    async fn find_user(&self, username: &str) -> Result<Option<User>>;

    // --- tasks -----------------------------------------------------------

    /// Create a task, minting a fresh unique identifier unless one is given
    ///
    /// A supplied identifier that is already taken fails with
    /// `Error::DuplicateTaskId`.
    async fn create_task(&self, new_task: NewTask) -> Result<Task>;

    async fn get_task(&self, id: i64) -> Result<Task>;

    async fn find_task(&self, task_id: &TaskId) -> Result<Task>;

    /// Tasks in creation order, optionally restricted to one family
    async fn list_tasks(&self, family: Option<TaskFamily>) -> Result<Vec<Task>>;

    /// Update short name and description (identifier and family are fixed)
    async fn update_task(&self, task: &Task) -> Result<()>;

    /// Every task identifier currently stored
    async fn task_ids(&self) -> Result<HashSet<TaskId>>;

    async fn authorize_user(&self, task: i64, user: i64) -> Result<()>;

    async fn task_users(&self, task: i64) -> Result<Vec<User>>;

    // --- items -----------------------------------------------------------

    async fn add_ranking_item(&self, task: i64, item: NewRankingItem) -> Result<RankingItem>;

    async fn add_editing_item(&self, task: i64, item: NewEditingItem) -> Result<EditingItem>;

    async fn add_lucy_item(&self, task: i64, item: NewLucyItem) -> Result<LucyItem>;

    async fn add_quality_item(&self, task: i64, item: NewQualityItem) -> Result<QualityItem>;

    async fn ranking_items(&self, task: i64) -> Result<Vec<RankingItem>>;

    async fn editing_items(&self, task: i64) -> Result<Vec<EditingItem>>;

    async fn lucy_items(&self, task: i64) -> Result<Vec<LucyItem>>;

    async fn quality_items(&self, task: i64) -> Result<Vec<QualityItem>>;

    /// Set or clear the edited flag of an item of the given family
    async fn set_item_edited(&self, family: TaskFamily, item: i64, edited: bool) -> Result<()>;

    /// Edited and total item counts for a task
    async fn item_counts(&self, task: i64) -> Result<TaskStatus>;

    // --- results ---------------------------------------------------------

    async fn submit_ranking_result(&self, result: NewRankingResult) -> Result<RankingResult>;

    async fn submit_classification_result(
        &self,
        result: NewClassificationResult,
    ) -> Result<ClassificationResult>;

    async fn submit_editing_result(&self, result: NewEditingResult) -> Result<EditingResult>;

    async fn submit_lucy_result(&self, result: NewLucyResult) -> Result<LucyResult>;

    async fn submit_quality_result(&self, result: NewQualityResult) -> Result<QualityResult>;

    /// Error classifications recorded for one ranking item
    async fn classification_results(&self, item: i64) -> Result<Vec<ClassificationResult>>;

    async fn editing_results(&self, task: i64) -> Result<Vec<EditingResult>>;

    // --- snapshots for aggregation ---------------------------------------

    async fn ranking_snapshot(&self, task: i64) -> Result<TaskSnapshot<RankingResult>>;

    async fn lucy_snapshot(&self, task: i64) -> Result<TaskSnapshot<LucyResult>>;

    async fn quality_snapshot(&self, task: i64) -> Result<TaskSnapshot<QualityResult>>;

    async fn editing_snapshot(&self, task: i64) -> Result<TaskSnapshot<EditingResult>>;
}
