//! SQLite-backed evaluation store
//!
//! Snapshots for aggregation are read inside one transaction so item flags
//! and results agree with each other.

use crate::db::init::{create_schema, init_database};
use crate::db::models::*;
use crate::db::store::EvaluationStore;
use crate::stats::{ItemJudgments, TaskSnapshot, TaskStatus};
use crate::task_id::TaskId;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::sqlite::{SqliteConnection, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Attempts at minting a task identifier before giving up
const MAX_TASK_ID_ATTEMPTS: usize = 8;

const TASK_COLUMNS: &str = "id, family, shortname, description, task_id";

const RANKING_RESULTS_FOR_TASK: &str = r#"
    SELECT r.id, r.item, r.user, r.rank_a, r.rank_b, r.rank_c, r.rank_d
    FROM ranking_results r
    JOIN ranking_items i ON r.item = i.id
    WHERE i.task = ?
    ORDER BY r.id
"#;

const EDITING_RESULTS_FOR_TASK: &str = r#"
    SELECT r.id, r.item, r.user, r.system, r.postedited
    FROM editing_results r
    JOIN editing_items i ON r.item = i.id
    WHERE i.task = ?
    ORDER BY r.id
"#;

const LUCY_RESULTS_FOR_TASK: &str = r#"
    SELECT r.id, r.item, r.user, r.ranking
    FROM lucy_results r
    JOIN lucy_items i ON r.item = i.id
    WHERE i.task = ?
    ORDER BY r.id
"#;

const QUALITY_RESULTS_FOR_TASK: &str = r#"
    SELECT r.id, r.item, r.user, r.quality, r.duration
    FROM quality_results r
    JOIN quality_items i ON r.item = i.id
    WHERE i.task = ?
    ORDER BY r.id
"#;

/// [`EvaluationStore`] over a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap a pool whose schema already exists
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database file at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(init_database(db_path).await?))
    }

    /// Private in-memory database
    ///
    /// A single connection, since every SQLite memory connection is its own
    /// database.
    pub async fn in_memory() -> Result<Self> {
        // The connection must never be recycled or the database goes with it
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        create_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn require_family(&self, task: i64, family: TaskFamily) -> Result<Task> {
        let mut conn = self.pool.acquire().await?;
        fetch_task_of_family(&mut conn, task, family).await
    }

    async fn load_snapshot<R, F>(
        &self,
        task: i64,
        family: TaskFamily,
        results_sql: &'static str,
        from_row: F,
    ) -> Result<TaskSnapshot<R>>
    where
        R: Send,
        F: Fn(&SqliteRow) -> Result<R> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let task = fetch_task_of_family(&mut tx, task, family).await?;

        let items: Vec<(i64, bool)> = sqlx::query_as(&format!(
            "SELECT id, edited FROM {} WHERE task = ? ORDER BY id",
            family.items_table()
        ))
        .bind(task.id)
        .fetch_all(&mut *tx)
        .await?;

        let rows = sqlx::query(results_sql)
            .bind(task.id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut by_item: HashMap<i64, Vec<R>> = HashMap::new();
        for row in &rows {
            let item: i64 = row.try_get("item")?;
            by_item.entry(item).or_default().push(from_row(row)?);
        }

        let items = items
            .into_iter()
            .map(|(item_id, edited)| ItemJudgments {
                item_id,
                edited,
                results: by_item.remove(&item_id).unwrap_or_default(),
            })
            .collect();

        Ok(TaskSnapshot::new(task, items))
    }
}

async fn fetch_task(conn: &mut SqliteConnection, id: i64) -> Result<Task> {
    let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| Error::NotFound(format!("task {}", id)))?;

    task_from_row(&row)
}

async fn fetch_task_of_family(
    conn: &mut SqliteConnection,
    id: i64,
    family: TaskFamily,
) -> Result<Task> {
    let task = fetch_task(conn, id).await?;
    if task.family != family {
        return Err(Error::InvalidInput(format!(
            "{} is a {} task, expected {}",
            task, task.family, family
        )));
    }
    Ok(task)
}

async fn task_id_exists(conn: &mut SqliteConnection, task_id: &TaskId) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE task_id = ?)")
        .bind(task_id.as_str())
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists)
}

/// Draw identifiers from `next` until one is not yet taken
async fn unique_task_id<F>(conn: &mut SqliteConnection, mut next: F) -> Result<TaskId>
where
    F: FnMut() -> TaskId + Send,
{
    let mut candidate = next();
    let mut attempt = 1;
    while task_id_exists(conn, &candidate).await? {
        warn!("Task identifier collision on attempt {}: {}", attempt, candidate);
        if attempt == MAX_TASK_ID_ATTEMPTS {
            return Err(Error::DuplicateTaskId(candidate.to_string()));
        }
        candidate = next();
        attempt += 1;
    }
    Ok(candidate)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn task_id_conflict(err: sqlx::Error, task_id: &TaskId) -> Error {
    if is_unique_violation(&err) {
        return Error::DuplicateTaskId(task_id.to_string());
    }
    Error::Database(err)
}

fn task_from_row(row: &SqliteRow) -> Result<Task> {
    let family: String = row.try_get("family")?;
    let task_id: String = row.try_get("task_id")?;
    Ok(Task {
        id: row.try_get("id")?,
        family: family.parse()?,
        shortname: row.try_get("shortname")?,
        description: row.try_get("description")?,
        task_id: TaskId::parse(&task_id)
            .map_err(|_| Error::unknown_label("task identifier", task_id))?,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
    })
}

fn rank_column(row: &SqliteRow, column: &str) -> Result<Rank> {
    Rank::try_from(row.try_get::<i64, _>(column)?)
}

fn ranking_result_from_row(row: &SqliteRow) -> Result<RankingResult> {
    Ok(RankingResult {
        id: row.try_get("id")?,
        item: row.try_get("item")?,
        user: row.try_get("user")?,
        rank_a: rank_column(row, "rank_a")?,
        rank_b: rank_column(row, "rank_b")?,
        rank_c: rank_column(row, "rank_c")?,
        rank_d: rank_column(row, "rank_d")?,
    })
}

fn classification_result_from_row(row: &SqliteRow) -> Result<ClassificationResult> {
    let system: String = row.try_get("system")?;
    Ok(ClassificationResult {
        id: row.try_get("id")?,
        item: row.try_get("item")?,
        user: row.try_get("user")?,
        system: system.parse()?,
        errors: ErrorCategories {
            missing_content_words: row.try_get("missing_content_words")?,
            content_words_wrong: row.try_get("content_words_wrong")?,
            wrong_functional_words: row.try_get("wrong_functional_words")?,
            incorrect_word_forms: row.try_get("incorrect_word_forms")?,
            incorrect_word_order: row.try_get("incorrect_word_order")?,
            incorrect_punctuation: row.try_get("incorrect_punctuation")?,
            other_error: row.try_get("other_error")?,
        },
        comments: row.try_get("comments")?,
    })
}

fn editing_result_from_row(row: &SqliteRow) -> Result<EditingResult> {
    let system: String = row.try_get("system")?;
    Ok(EditingResult {
        id: row.try_get("id")?,
        item: row.try_get("item")?,
        user: row.try_get("user")?,
        system: validate_editing_system(system.parse()?)?,
        postedited: row.try_get("postedited")?,
    })
}

fn lucy_result_from_row(row: &SqliteRow) -> Result<LucyResult> {
    let ranking: String = row.try_get("ranking")?;
    Ok(LucyResult {
        id: row.try_get("id")?,
        item: row.try_get("item")?,
        user: row.try_get("user")?,
        ranking: ranking.parse()?,
    })
}

fn quality_result_from_row(row: &SqliteRow) -> Result<QualityResult> {
    let quality: String = row.try_get("quality")?;
    Ok(QualityResult {
        id: row.try_get("id")?,
        item: row.try_get("item")?,
        user: row.try_get("user")?,
        quality: quality.parse()?,
        duration: row.try_get::<Option<NaiveTime>, _>("duration")?,
    })
}

#[async_trait]
impl EvaluationStore for SqliteStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        if username.trim().is_empty() {
            return Err(Error::InvalidInput("username must not be empty".to_string()));
        }

        let result = sqlx::query("INSERT INTO users (username) VALUES (?)")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::InvalidInput(format!("username already exists: {}", username))
                } else {
                    Error::Database(e)
                }
            })?;

        debug!("Created user {}", username);
        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
        })
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task> {
        validate_shortname(&new_task.shortname)?;

        let mut tx = self.pool.begin().await?;

        let task_id = match new_task.task_id {
            Some(task_id) => {
                if task_id_exists(&mut tx, &task_id).await? {
                    return Err(Error::DuplicateTaskId(task_id.to_string()));
                }
                task_id
            }
            None => unique_task_id(&mut tx, TaskId::generate).await?,
        };

        let result = sqlx::query(
            "INSERT INTO tasks (family, shortname, description, task_id) VALUES (?, ?, ?, ?)",
        )
        .bind(new_task.family.as_str())
        .bind(&new_task.shortname)
        .bind(&new_task.description)
        .bind(task_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| task_id_conflict(e, &task_id))?;

        tx.commit().await?;

        let task = Task {
            id: result.last_insert_rowid(),
            family: new_task.family,
            shortname: new_task.shortname,
            description: new_task.description,
            task_id,
        };
        info!("Created {} ({})", task, task.task_id);
        Ok(task)
    }

    async fn get_task(&self, id: i64) -> Result<Task> {
        let mut conn = self.pool.acquire().await?;
        fetch_task(&mut conn, id).await
    }

    async fn find_task(&self, task_id: &TaskId) -> Result<Task> {
        let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE task_id = ?", TASK_COLUMNS))
            .bind(task_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("task {}", task_id)))?;

        task_from_row(&row)
    }

    async fn list_tasks(&self, family: Option<TaskFamily>) -> Result<Vec<Task>> {
        let rows = match family {
            Some(family) => {
                sqlx::query(&format!(
                    "SELECT {} FROM tasks WHERE family = ? ORDER BY id",
                    TASK_COLUMNS
                ))
                .bind(family.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(task_from_row).collect()
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        validate_shortname(&task.shortname)?;

        let result = sqlx::query("UPDATE tasks SET shortname = ?, description = ? WHERE id = ?")
            .bind(&task.shortname)
            .bind(&task.description)
            .bind(task.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("task {}", task.id)));
        }
        Ok(())
    }

    async fn task_ids(&self) -> Result<HashSet<TaskId>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT task_id FROM tasks")
            .fetch_all(&self.pool)
            .await?;

        ids.into_iter()
            .map(|id| TaskId::parse(&id).map_err(|_| Error::unknown_label("task identifier", id)))
            .collect()
    }

    async fn authorize_user(&self, task: i64, user: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO task_users (task, user) VALUES (?, ?)")
            .bind(task)
            .bind(user)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn task_users(&self, task: i64) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username
            FROM users u
            JOIN task_users tu ON tu.user = u.id
            WHERE tu.task = ?
            ORDER BY u.username
            "#,
        )
        .bind(task)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn add_ranking_item(&self, task: i64, item: NewRankingItem) -> Result<RankingItem> {
        self.require_family(task, TaskFamily::Ranking).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO ranking_items (task, source, system_a, system_b, system_c, system_d)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task)
        .bind(&item.source)
        .bind(&item.system_a)
        .bind(&item.system_b)
        .bind(&item.system_c)
        .bind(&item.system_d)
        .execute(&self.pool)
        .await?;

        Ok(RankingItem {
            id: result.last_insert_rowid(),
            task,
            source: item.source,
            system_a: item.system_a,
            system_b: item.system_b,
            system_c: item.system_c,
            system_d: item.system_d,
            edited: false,
        })
    }

    async fn add_editing_item(&self, task: i64, item: NewEditingItem) -> Result<EditingItem> {
        self.require_family(task, TaskFamily::Editing).await?;

        let result = sqlx::query(
            "INSERT INTO editing_items (task, source, system_a, system_b, system_c) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(task)
        .bind(&item.source)
        .bind(&item.system_a)
        .bind(&item.system_b)
        .bind(&item.system_c)
        .execute(&self.pool)
        .await?;

        Ok(EditingItem {
            id: result.last_insert_rowid(),
            task,
            source: item.source,
            system_a: item.system_a,
            system_b: item.system_b,
            system_c: item.system_c,
            edited: false,
        })
    }

    async fn add_lucy_item(&self, task: i64, item: NewLucyItem) -> Result<LucyItem> {
        self.require_family(task, TaskFamily::Lucy).await?;

        let result = sqlx::query(
            "INSERT INTO lucy_items (task, source, reference, system_a, system_b) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(task)
        .bind(&item.source)
        .bind(&item.reference)
        .bind(&item.system_a)
        .bind(&item.system_b)
        .execute(&self.pool)
        .await?;

        Ok(LucyItem {
            id: result.last_insert_rowid(),
            task,
            source: item.source,
            reference: item.reference,
            system_a: item.system_a,
            system_b: item.system_b,
            edited: false,
        })
    }

    async fn add_quality_item(&self, task: i64, item: NewQualityItem) -> Result<QualityItem> {
        self.require_family(task, TaskFamily::Quality).await?;

        let result = sqlx::query(
            "INSERT INTO quality_items (task, source, translation, context) VALUES (?, ?, ?, ?)",
        )
        .bind(task)
        .bind(&item.source)
        .bind(&item.translation)
        .bind(&item.context)
        .execute(&self.pool)
        .await?;

        Ok(QualityItem {
            id: result.last_insert_rowid(),
            task,
            source: item.source,
            translation: item.translation,
            context: item.context,
            edited: false,
        })
    }

    async fn ranking_items(&self, task: i64) -> Result<Vec<RankingItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, task, source, system_a, system_b, system_c, system_d, edited
            FROM ranking_items WHERE task = ? ORDER BY id
            "#,
        )
        .bind(task)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(RankingItem {
                    id: row.try_get("id")?,
                    task: row.try_get("task")?,
                    source: row.try_get("source")?,
                    system_a: row.try_get("system_a")?,
                    system_b: row.try_get("system_b")?,
                    system_c: row.try_get("system_c")?,
                    system_d: row.try_get("system_d")?,
                    edited: row.try_get("edited")?,
                })
            })
            .collect()
    }

    async fn editing_items(&self, task: i64) -> Result<Vec<EditingItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, task, source, system_a, system_b, system_c, edited
            FROM editing_items WHERE task = ? ORDER BY id
            "#,
        )
        .bind(task)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(EditingItem {
                    id: row.try_get("id")?,
                    task: row.try_get("task")?,
                    source: row.try_get("source")?,
                    system_a: row.try_get("system_a")?,
                    system_b: row.try_get("system_b")?,
                    system_c: row.try_get("system_c")?,
                    edited: row.try_get("edited")?,
                })
            })
            .collect()
    }

    async fn lucy_items(&self, task: i64) -> Result<Vec<LucyItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, task, source, reference, system_a, system_b, edited
            FROM lucy_items WHERE task = ? ORDER BY id
            "#,
        )
        .bind(task)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(LucyItem {
                    id: row.try_get("id")?,
                    task: row.try_get("task")?,
                    source: row.try_get("source")?,
                    reference: row.try_get("reference")?,
                    system_a: row.try_get("system_a")?,
                    system_b: row.try_get("system_b")?,
                    edited: row.try_get("edited")?,
                })
            })
            .collect()
    }

    async fn quality_items(&self, task: i64) -> Result<Vec<QualityItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, task, source, translation, context, edited
            FROM quality_items WHERE task = ? ORDER BY id
            "#,
        )
        .bind(task)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(QualityItem {
                    id: row.try_get("id")?,
                    task: row.try_get("task")?,
                    source: row.try_get("source")?,
                    translation: row.try_get("translation")?,
                    context: row.try_get("context")?,
                    edited: row.try_get("edited")?,
                })
            })
            .collect()
    }

    async fn set_item_edited(&self, family: TaskFamily, item: i64, edited: bool) -> Result<()> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET edited = ? WHERE id = ?",
            family.items_table()
        ))
        .bind(edited)
        .bind(item)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("{} item {}", family, item)));
        }
        debug!("Marked {} item {} edited={}", family, item, edited);
        Ok(())
    }

    async fn item_counts(&self, task: i64) -> Result<TaskStatus> {
        let mut conn = self.pool.acquire().await?;
        let task = fetch_task(&mut conn, task).await?;

        let (total, edited): (i64, i64) = sqlx::query_as(&format!(
            "SELECT COUNT(*), COALESCE(SUM(edited), 0) FROM {} WHERE task = ?",
            task.family.items_table()
        ))
        .bind(task.id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(TaskStatus {
            edited: edited as u64,
            total: total as u64,
        })
    }

    async fn submit_ranking_result(&self, result: NewRankingResult) -> Result<RankingResult> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO ranking_results (item, user, rank_a, rank_b, rank_c, rank_d)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.item)
        .bind(result.user)
        .bind(i64::from(result.rank_a.get()))
        .bind(i64::from(result.rank_b.get()))
        .bind(i64::from(result.rank_c.get()))
        .bind(i64::from(result.rank_d.get()))
        .execute(&self.pool)
        .await?;

        debug!("User {} ranked item {}", result.user, result.item);
        Ok(RankingResult {
            id: inserted.last_insert_rowid(),
            item: result.item,
            user: result.user,
            rank_a: result.rank_a,
            rank_b: result.rank_b,
            rank_c: result.rank_c,
            rank_d: result.rank_d,
        })
    }

    async fn submit_classification_result(
        &self,
        result: NewClassificationResult,
    ) -> Result<ClassificationResult> {
        let e = result.errors;
        let inserted = sqlx::query(
            r#"
            INSERT INTO classification_results (
                item, user, system,
                missing_content_words, content_words_wrong, wrong_functional_words,
                incorrect_word_forms, incorrect_word_order, incorrect_punctuation,
                other_error, comments
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.item)
        .bind(result.user)
        .bind(result.system.as_str())
        .bind(e.missing_content_words)
        .bind(e.content_words_wrong)
        .bind(e.wrong_functional_words)
        .bind(e.incorrect_word_forms)
        .bind(e.incorrect_word_order)
        .bind(e.incorrect_punctuation)
        .bind(e.other_error)
        .bind(&result.comments)
        .execute(&self.pool)
        .await?;

        debug!(
            "User {} classified system {} of item {}",
            result.user, result.system, result.item
        );
        Ok(ClassificationResult {
            id: inserted.last_insert_rowid(),
            item: result.item,
            user: result.user,
            system: result.system,
            errors: result.errors,
            comments: result.comments,
        })
    }

    async fn submit_editing_result(&self, result: NewEditingResult) -> Result<EditingResult> {
        let system = validate_editing_system(result.system)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        let inserted = sqlx::query(
            "INSERT INTO editing_results (item, user, system, postedited) VALUES (?, ?, ?, ?)",
        )
        .bind(result.item)
        .bind(result.user)
        .bind(system.as_str())
        .bind(&result.postedited)
        .execute(&self.pool)
        .await?;

        debug!("User {} post-edited item {}", result.user, result.item);
        Ok(EditingResult {
            id: inserted.last_insert_rowid(),
            item: result.item,
            user: result.user,
            system,
            postedited: result.postedited,
        })
    }

    async fn submit_lucy_result(&self, result: NewLucyResult) -> Result<LucyResult> {
        let inserted = sqlx::query("INSERT INTO lucy_results (item, user, ranking) VALUES (?, ?, ?)")
            .bind(result.item)
            .bind(result.user)
            .bind(result.ranking.as_str())
            .execute(&self.pool)
            .await?;

        debug!("User {} compared item {}: {}", result.user, result.item, result.ranking);
        Ok(LucyResult {
            id: inserted.last_insert_rowid(),
            item: result.item,
            user: result.user,
            ranking: result.ranking,
        })
    }

    async fn submit_quality_result(&self, result: NewQualityResult) -> Result<QualityResult> {
        let inserted = sqlx::query(
            "INSERT INTO quality_results (item, user, quality, duration) VALUES (?, ?, ?, ?)",
        )
        .bind(result.item)
        .bind(result.user)
        .bind(result.quality.code())
        .bind(result.duration)
        .execute(&self.pool)
        .await?;

        debug!("User {} assessed item {}: {}", result.user, result.item, result.quality);
        Ok(QualityResult {
            id: inserted.last_insert_rowid(),
            item: result.item,
            user: result.user,
            quality: result.quality,
            duration: result.duration,
        })
    }

    async fn classification_results(&self, item: i64) -> Result<Vec<ClassificationResult>> {
        let rows = sqlx::query(
            r#"
            SELECT id, item, user, system,
                   missing_content_words, content_words_wrong, wrong_functional_words,
                   incorrect_word_forms, incorrect_word_order, incorrect_punctuation,
                   other_error, comments
            FROM classification_results
            WHERE item = ?
            ORDER BY id
            "#,
        )
        .bind(item)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(classification_result_from_row).collect()
    }

    async fn editing_results(&self, task: i64) -> Result<Vec<EditingResult>> {
        let rows = sqlx::query(EDITING_RESULTS_FOR_TASK)
            .bind(task)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(editing_result_from_row).collect()
    }

    async fn ranking_snapshot(&self, task: i64) -> Result<TaskSnapshot<RankingResult>> {
        self.load_snapshot(
            task,
            TaskFamily::Ranking,
            RANKING_RESULTS_FOR_TASK,
            ranking_result_from_row,
        )
        .await
    }

    async fn lucy_snapshot(&self, task: i64) -> Result<TaskSnapshot<LucyResult>> {
        self.load_snapshot(task, TaskFamily::Lucy, LUCY_RESULTS_FOR_TASK, lucy_result_from_row)
            .await
    }

    async fn quality_snapshot(&self, task: i64) -> Result<TaskSnapshot<QualityResult>> {
        self.load_snapshot(
            task,
            TaskFamily::Quality,
            QUALITY_RESULTS_FOR_TASK,
            quality_result_from_row,
        )
        .await
    }

    async fn editing_snapshot(&self, task: i64) -> Result<TaskSnapshot<EditingResult>> {
        self.load_snapshot(
            task,
            TaskFamily::Editing,
            EDITING_RESULTS_FOR_TASK,
            editing_result_from_row,
        )
        .await
    }
}
