use anamnesis_core::models::intake::Intake;
use anamnesis_core::models::session::{InterviewStep, Session, SessionPatch, SessionStatus};
use anamnesis_storage::{FileSessionStore, MemorySessionStore, SessionStore};
use uuid::Uuid;

fn session(complaint: &str) -> Session {
    Session::new(Intake {
        name: "Ada".to_string(),
        age: "52".to_string(),
        gender: "Female".to_string(),
        complaint: complaint.to_string(),
    })
}

async fn exercise(store: &dyn SessionStore) {
    let first = session("back pain");
    let second = session("rash");

    store.save(&first).await.unwrap();
    store.save(&second).await.unwrap();

    let loaded = store.get_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(loaded, first);
    assert!(store.get_by_id(Uuid::new_v4()).await.unwrap().is_none());

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|s| s.id == first.id));
    assert!(all.iter().any(|s| s.id == second.id));

    let applied = store
        .update(first.id, SessionPatch::status(SessionStatus::Abandoned))
        .await
        .unwrap();
    assert!(applied);
    let updated = store.get_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(updated.status, SessionStatus::Abandoned);
    assert_eq!(updated.step, InterviewStep::Initial);
    assert!(updated.updated_at >= first.updated_at);

    let missing = store
        .update(Uuid::new_v4(), SessionPatch::status(SessionStatus::Completed))
        .await
        .unwrap();
    assert!(!missing);

    store.delete(first.id).await.unwrap();
    store.delete(first.id).await.unwrap();
    assert!(store.get_by_id(first.id).await.unwrap().is_none());
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn memory_store_contract() {
    let store = MemorySessionStore::new();
    exercise(&store).await;
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn file_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("sessions"));
    exercise(&store).await;
}

#[tokio::test]
async fn file_store_lists_nothing_before_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("never-created"));
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn file_store_ignores_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&session("fever")).await.unwrap();
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}
