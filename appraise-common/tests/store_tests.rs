//! Integration tests for the SQLite evaluation store
//!
//! Covers task creation and identifier uniqueness, item/result round trips
//! for every family, and aggregation over snapshots read from the store.

use appraise_common::db::*;
use appraise_common::{Error, TaskId, TaskStatus};
use chrono::NaiveTime;

async fn store() -> SqliteStore {
    SqliteStore::in_memory().await.expect("in-memory store")
}

fn ranks(a: u8, b: u8, c: u8, d: u8) -> [Rank; 4] {
    [
        Rank::new(a).unwrap(),
        Rank::new(b).unwrap(),
        Rank::new(c).unwrap(),
        Rank::new(d).unwrap(),
    ]
}

async fn submit_ranks(store: &SqliteStore, item: i64, user: i64, r: [Rank; 4]) {
    store
        .submit_ranking_result(NewRankingResult {
            item,
            user,
            rank_a: r[0],
            rank_b: r[1],
            rank_c: r[2],
            rank_d: r[3],
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_each_task_gets_a_fresh_identifier() {
    let store = store().await;

    let mut seen = std::collections::HashSet::new();
    for (i, family) in TaskFamily::ALL.iter().cycle().take(12).enumerate() {
        let task = store
            .create_task(NewTask::new(*family, format!("task-{}", i)))
            .await
            .unwrap();
        assert_eq!(task.task_id.as_str().len(), 32);
        assert!(seen.insert(task.task_id.clone()), "identifier reused");
    }

    assert_eq!(store.task_ids().await.unwrap(), seen);
}

#[tokio::test]
async fn test_duplicate_supplied_identifier_is_rejected() {
    let store = store().await;
    let id = TaskId::parse("0123456789abcdef0123456789abcdef").unwrap();

    let first = store
        .create_task(NewTask::new(TaskFamily::Ranking, "first").task_id(id.clone()))
        .await
        .unwrap();
    assert_eq!(first.task_id, id);

    // Uniqueness spans families
    let second = store
        .create_task(NewTask::new(TaskFamily::Quality, "second").task_id(id.clone()))
        .await;
    match second {
        Err(Error::DuplicateTaskId(dup)) => assert_eq!(dup, id.to_string()),
        other => panic!("expected DuplicateTaskId, got {:?}", other),
    }

    assert_eq!(store.list_tasks(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_task_lookup_update_and_users() {
    let store = store().await;
    let task = store
        .create_task(NewTask::new(TaskFamily::Editing, "wmt-edit").description("post-editing batch"))
        .await
        .unwrap();

    let found = store.find_task(&task.task_id).await.unwrap();
    assert_eq!(found, task);

    let mut renamed = found.clone();
    renamed.shortname = "wmt-edit-2".to_string();
    store.update_task(&renamed).await.unwrap();
    assert_eq!(store.get_task(task.id).await.unwrap().shortname, "wmt-edit-2");

    let too_long = Task {
        shortname: "x".repeat(SHORTNAME_MAX_LEN + 1),
        ..renamed
    };
    assert!(matches!(store.update_task(&too_long).await, Err(Error::InvalidInput(_))));

    let alice = store.create_user("alice").await.unwrap();
    let bob = store.create_user("bob").await.unwrap();
    assert!(store.create_user("alice").await.is_err());
    assert_eq!(store.find_user("bob").await.unwrap(), Some(bob.clone()));
    assert_eq!(store.find_user("carol").await.unwrap(), None);

    store.authorize_user(task.id, bob.id).await.unwrap();
    store.authorize_user(task.id, alice.id).await.unwrap();
    store.authorize_user(task.id, alice.id).await.unwrap();
    let users = store.task_users(task.id).await.unwrap();
    assert_eq!(users, vec![alice, bob]);

    assert!(matches!(store.get_task(9999).await, Err(Error::NotFound(_))));
    assert_eq!(
        store.list_tasks(Some(TaskFamily::Editing)).await.unwrap().len(),
        1
    );
    assert!(store.list_tasks(Some(TaskFamily::Lucy)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_items_must_match_task_family() {
    let store = store().await;
    let lucy = store
        .create_task(NewTask::new(TaskFamily::Lucy, "lucy"))
        .await
        .unwrap();

    let wrong = store
        .add_ranking_item(lucy.id, NewRankingItem::default())
        .await;
    assert!(matches!(wrong, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_ranking_aggregation_through_store() {
    let store = store().await;
    let user = store.create_user("annotator").await.unwrap();
    let task = store
        .create_task(NewTask::new(TaskFamily::Ranking, "rank"))
        .await
        .unwrap();

    let mut items = Vec::new();
    for i in 0..3 {
        let item = store
            .add_ranking_item(
                task.id,
                NewRankingItem {
                    source: format!("source {}", i),
                    system_a: "a".into(),
                    system_b: "b".into(),
                    system_c: "c".into(),
                    system_d: "d".into(),
                },
            )
            .await
            .unwrap();
        items.push(item);
    }

    // No edited items yet
    let snapshot = store.ranking_snapshot(task.id).await.unwrap();
    assert_eq!(snapshot.average_rank(SystemSlot::A), None);
    assert_eq!(snapshot.status(), TaskStatus { edited: 0, total: 3 });

    submit_ranks(&store, items[0].id, user.id, ranks(1, 2, 3, 4)).await;
    submit_ranks(&store, items[1].id, user.id, ranks(1, 4, 2, 3)).await;
    // Result on an item that never gets flagged edited
    submit_ranks(&store, items[2].id, user.id, ranks(4, 4, 4, 4)).await;

    store.set_item_edited(TaskFamily::Ranking, items[0].id, true).await.unwrap();
    store.set_item_edited(TaskFamily::Ranking, items[1].id, true).await.unwrap();

    let snapshot = store.ranking_snapshot(task.id).await.unwrap();
    assert_eq!(snapshot.status(), TaskStatus { edited: 2, total: 3 });
    assert_eq!(store.item_counts(task.id).await.unwrap(), snapshot.status());
    assert!(!snapshot.completed());
    assert_eq!(snapshot.average_rank(SystemSlot::A), Some(1.0));
    assert_eq!(snapshot.average_rank(SystemSlot::B), Some(3.0));
    assert_eq!(snapshot.average_rank(SystemSlot::C), Some(2.5));

    store.set_item_edited(TaskFamily::Ranking, items[2].id, true).await.unwrap();
    assert!(store.ranking_snapshot(task.id).await.unwrap().completed());

    let listed = store.ranking_items(task.id).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|item| item.edited));
}

#[tokio::test]
async fn test_classification_results_attach_to_ranking_items() {
    let store = store().await;
    let user = store.create_user("annotator").await.unwrap();
    let task = store
        .create_task(NewTask::new(TaskFamily::Ranking, "rank"))
        .await
        .unwrap();
    let item = store
        .add_ranking_item(task.id, NewRankingItem::default())
        .await
        .unwrap();

    let saved = store
        .submit_classification_result(NewClassificationResult {
            item: item.id,
            user: user.id,
            system: SystemSlot::C,
            errors: ErrorCategories {
                incorrect_word_order: true,
                other_error: true,
                ..Default::default()
            },
            comments: "verb misplaced".to_string(),
        })
        .await
        .unwrap();

    let loaded = store.classification_results(item.id).await.unwrap();
    assert_eq!(loaded, vec![saved]);
    assert!(loaded[0].errors.any());
    assert!(!loaded[0].errors.missing_content_words);
}

#[tokio::test]
async fn test_editing_results_round_trip() {
    let store = store().await;
    let user = store.create_user("editor").await.unwrap();
    let task = store
        .create_task(NewTask::new(TaskFamily::Editing, "edit"))
        .await
        .unwrap();
    let item = store
        .add_editing_item(
            task.id,
            NewEditingItem {
                source: "Das ist gut.".into(),
                system_a: "That is good.".into(),
                system_b: "This is good.".into(),
                system_c: "It good.".into(),
            },
        )
        .await
        .unwrap();

    let rejected = store
        .submit_editing_result(NewEditingResult {
            item: item.id,
            user: user.id,
            system: SystemSlot::D,
            postedited: "n/a".into(),
        })
        .await;
    assert!(matches!(rejected, Err(Error::InvalidInput(_))));

    let saved = store
        .submit_editing_result(NewEditingResult {
            item: item.id,
            user: user.id,
            system: SystemSlot::C,
            postedited: "It is good.".into(),
        })
        .await
        .unwrap();
    store.set_item_edited(TaskFamily::Editing, item.id, true).await.unwrap();

    assert_eq!(store.editing_results(task.id).await.unwrap(), vec![saved]);
    let snapshot = store.editing_snapshot(task.id).await.unwrap();
    assert!(snapshot.completed());
    assert_eq!(snapshot.items[0].results.len(), 1);
}

#[tokio::test]
async fn test_lucy_distribution_through_store() {
    let store = store().await;
    let task = store
        .create_task(NewTask::new(TaskFamily::Lucy, "lucy"))
        .await
        .unwrap();
    let item = store
        .add_lucy_item(
            task.id,
            NewLucyItem {
                source: "src".into(),
                reference: "ref".into(),
                system_a: "a".into(),
                system_b: "b".into(),
            },
        )
        .await
        .unwrap();

    let labels = [
        LucyRanking::MuchBetter,
        LucyRanking::Better,
        LucyRanking::Equal,
        LucyRanking::Equal,
        LucyRanking::MuchWorse,
    ];
    for (i, label) in labels.iter().enumerate() {
        let user = store.create_user(&format!("user{}", i)).await.unwrap();
        store
            .submit_lucy_result(NewLucyResult {
                item: item.id,
                user: user.id,
                ranking: *label,
            })
            .await
            .unwrap();
    }

    let dist = store.lucy_snapshot(task.id).await.unwrap().lucy_distribution();
    assert_eq!(dist.as_tuple(), (1, 0, 2, 1, 1, 5));
}

#[tokio::test]
async fn test_unknown_stored_label_is_fatal() {
    let store = store().await;
    let user = store.create_user("annotator").await.unwrap();
    let task = store
        .create_task(NewTask::new(TaskFamily::Lucy, "lucy"))
        .await
        .unwrap();
    let item = store
        .add_lucy_item(task.id, NewLucyItem::default())
        .await
        .unwrap();

    // Simulates a broken import writing around the store
    sqlx::query("INSERT INTO lucy_results (item, user, ranking) VALUES (?, ?, 'B+++')")
        .bind(item.id)
        .bind(user.id)
        .execute(store.pool())
        .await
        .unwrap();

    match store.lucy_snapshot(task.id).await {
        Err(Error::UnknownLabel { field, value }) => {
            assert_eq!(field, "lucy ranking");
            assert_eq!(value, "B+++");
        }
        other => panic!("expected UnknownLabel, got {:?}", other.map(|s| s.items.len())),
    }
}

#[tokio::test]
async fn test_quality_statistics_through_store() {
    let store = store().await;
    let user = store.create_user("rater").await.unwrap();
    let task = store
        .create_task(NewTask::new(TaskFamily::Quality, "quality"))
        .await
        .unwrap();

    let labels = [
        QualityLabel::Acceptable,
        QualityLabel::Acceptable,
        QualityLabel::Acceptable,
        QualityLabel::CanBeFixed,
    ];
    let durations = [
        NaiveTime::from_hms_opt(0, 0, 10),
        NaiveTime::from_hms_opt(0, 0, 20),
        None,
        NaiveTime::from_hms_micro_opt(0, 1, 0, 250_000),
    ];

    for (label, duration) in labels.iter().zip(durations) {
        let item = store
            .add_quality_item(
                task.id,
                NewQualityItem {
                    source: "Quelle".into(),
                    translation: "source".into(),
                    context: String::new(),
                },
            )
            .await
            .unwrap();
        let saved = store
            .submit_quality_result(NewQualityResult {
                item: item.id,
                user: user.id,
                quality: *label,
                duration,
            })
            .await
            .unwrap();
        assert_eq!(saved.duration, duration);
        store.set_item_edited(TaskFamily::Quality, item.id, true).await.unwrap();
    }

    let snapshot = store.quality_snapshot(task.id).await.unwrap();
    let acceptable = snapshot.quality_breakdown(QualityLabel::Acceptable);
    assert_eq!(acceptable.count, 3);
    assert_eq!(acceptable.percentage, 75.0);
    assert_eq!(snapshot.can_be_fixed().count, 1);
    assert_eq!(snapshot.none_of_both().count, 0);

    let avg = snapshot.average_duration().unwrap();
    assert!((avg - 30.083_333_333).abs() < 1e-6, "got {}", avg);
    assert!(snapshot.completed());

    let items = store.quality_items(task.id).await.unwrap();
    assert_eq!(items.len(), 4);
}

#[tokio::test]
async fn test_set_edited_on_missing_item() {
    let store = store().await;
    let result = store.set_item_edited(TaskFamily::Quality, 42, true).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}
