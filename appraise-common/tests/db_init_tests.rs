//! Tests for on-disk database initialization

use appraise_common::db::{init_database, EvaluationStore, NewTask, SqliteStore, TaskFamily};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("appraise.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("appraise.db");

    let task_id = {
        let store = SqliteStore::open(&db_path).await.unwrap();
        let task = store
            .create_task(NewTask::new(TaskFamily::Quality, "persisted"))
            .await
            .unwrap();
        store.pool().close().await;
        task.task_id
    };

    let store = SqliteStore::open(&db_path).await.unwrap();
    let task = store.find_task(&task_id).await.unwrap();
    assert_eq!(task.shortname, "persisted");

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(versions, 1, "schema version recorded once");
}
