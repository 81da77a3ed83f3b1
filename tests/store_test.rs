// tests/store_test.rs
// Structured record, prompt, and message persistence against in-memory SQLite.


use curio::prompt::{PromptPurpose, PromptTemplate};
use curio::record::{FieldValue, RecordKind};
use curio::storage::{MessageStore, PromptStore, RecordStore, SqliteStore, VisitStore};

use test_helpers::{create_test_store, memory_record, persona_record, seed_prior_conversations};

#[tokio::test]
async fn test_record_round_trip_and_upsert() {
    let store = create_test_store().await;

    assert!(
        store
            .get_record(RecordKind::UserPersona, "learner-1")
            .await
            .unwrap()
            .is_none()
    );

    store
        .save_record("learner-1", &persona_record("curious about space"))
        .await
        .unwrap();
    let loaded = store
        .get_record(RecordKind::UserPersona, "learner-1")
        .await
        .unwrap()
        .expect("persona stored");
    assert_eq!(
        loaded.get("persona"),
        Some(&FieldValue::Text("curious about space".to_string()))
    );

    // Regeneration overwrites in place.
    store
        .save_record("learner-1", &persona_record("now into dinosaurs"))
        .await
        .unwrap();
    let reloaded = store
        .get_record(RecordKind::UserPersona, "learner-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        reloaded.get("persona"),
        Some(&FieldValue::Text("now into dinosaurs".to_string()))
    );
}

#[tokio::test]
async fn test_latest_memory_follows_visit_order() {
    let store = create_test_store().await;

    store.insert_visit("learner-2", "conv-1", 1).await.unwrap();
    store.insert_visit("learner-2", "conv-2", 2).await.unwrap();
    store
        .save_record("conv-1", &memory_record(&["rocks"]))
        .await
        .unwrap();
    store
        .save_record("conv-2", &memory_record(&["rivers"]))
        .await
        .unwrap();

    let latest = store
        .latest_memory_for_user("learner-2")
        .await
        .unwrap()
        .expect("memory exists");
    assert_eq!(
        latest.get("main_topics"),
        Some(&FieldValue::List(vec![
            "rivers".to_string(),
            "follow-ups".to_string()
        ]))
    );
}

#[tokio::test]
async fn test_memory_coverage_counts_only_this_user() {
    let store = create_test_store().await;

    seed_prior_conversations(store.as_ref(), "learner-3", 3, true).await;
    seed_prior_conversations(store.as_ref(), "learner-4", 2, true).await;
    // a conversation without a generated memory does not count
    store.insert_visit("learner-3", "conv-no-memory", 4).await.unwrap();

    assert_eq!(store.memory_coverage_for_user("learner-3").await.unwrap(), 3);
    assert_eq!(store.memory_coverage_for_user("learner-4").await.unwrap(), 2);
    assert_eq!(store.memory_coverage_for_user("learner-5").await.unwrap(), 0);
}

#[tokio::test]
async fn test_active_template_selection() {
    let store = create_test_store().await;

    assert!(
        store
            .active_template(PromptPurpose::Visit1)
            .await
            .unwrap()
            .is_none()
    );

    store
        .save_template(&PromptTemplate::new(
            "welcome-v1",
            PromptPurpose::Visit1,
            "Hello!",
        ))
        .await
        .unwrap();

    let mut retired = PromptTemplate::new("welcome-old", PromptPurpose::Visit1, "Greetings!");
    retired.is_active = false;
    store.save_template(&retired).await.unwrap();

    let active = store
        .active_template(PromptPurpose::Visit1)
        .await
        .unwrap()
        .expect("active template");
    assert_eq!(active.name, "welcome-v1");
    assert_eq!(active.content, "Hello!");
    assert_eq!(active.purpose, PromptPurpose::Visit1);
}

#[tokio::test]
async fn test_newest_active_template_wins() {
    let store = create_test_store().await;

    store
        .save_template(&PromptTemplate::new("v1", PromptPurpose::General, "old text"))
        .await
        .unwrap();
    store
        .save_template(&PromptTemplate::new("v2", PromptPurpose::General, "new text"))
        .await
        .unwrap();

    let active = store
        .active_template(PromptPurpose::General)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.name, "v2");
}

#[tokio::test]
async fn test_connect_migrates_a_fresh_database_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("curio.db");
    let url = format!("sqlite:{}?mode=rwc", db_path.display());

    let store = SqliteStore::connect(&url, 1).await.expect("connect and migrate");
    store.save_message("conv-1", "user", "hi there").await.unwrap();

    assert_eq!(store.recent_messages("conv-1", 10).await.unwrap().len(), 1);
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_messages_come_back_oldest_first() {
    let store = create_test_store().await;

    for content in ["one", "two", "three"] {
        store.save_message("conv-1", "user", content).await.unwrap();
    }
    store.save_message("conv-other", "user", "elsewhere").await.unwrap();

    let recent = store.recent_messages("conv-1", 2).await.unwrap();
    let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["two", "three"]);
    assert!(recent.iter().all(|m| m.conversation_id == "conv-1"));
}
