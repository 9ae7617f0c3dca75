//! Integration tests for the sled-backed Completion Record Store

use article_gen::error::StorageError;
use article_gen::model::{
    CompletionError, CompletionErrorKind, CompletionInput, CompletionPrompts, CompletionRecord,
};
use article_gen::store::{CompletionStore, SledCompletionStore};
use tempfile::TempDir;

fn record(key: &str, errors: Vec<CompletionError>) -> CompletionRecord {
    let mut record = CompletionRecord::new(
        CompletionInput::new(key, "equipment"),
        CompletionPrompts {
            content: format!("content {key}"),
            meta_desc: format!("desc {key}"),
            meta_title: format!("title {key}"),
        },
    );
    record.title = Some(key.to_string());
    record.set_content("Primera línea\r\nCuerpo con ñ y acentos".to_string());
    record.set_errors(errors);
    record
}

#[test]
fn test_round_trip_preserves_every_field_and_error_order() {
    let store_dir = TempDir::new().unwrap();
    let store = SledCompletionStore::new(store_dir.path()).unwrap();
    let original = record(
        "bolas",
        vec![
            CompletionError::new(CompletionErrorKind::MetaDesc, "timeout"),
            CompletionError::new(CompletionErrorKind::Content, "rate limited"),
            CompletionError::new(CompletionErrorKind::Img, "No img url found"),
        ],
    );
    store.insert(&original).unwrap();

    let loaded = store.find_by_key("bolas").unwrap().unwrap();
    assert_eq!(loaded, original);
    assert_eq!(loaded.cleaned_content.as_deref(), Some("Cuerpo con ñ y acentos"));
}

#[test]
fn test_duplicate_insert_is_rejected_and_original_kept() {
    let store_dir = TempDir::new().unwrap();
    let store = SledCompletionStore::new(store_dir.path()).unwrap();
    let first = record("bolas", vec![]);
    store.insert(&first).unwrap();

    let mut second = first.clone();
    second.title = Some("changed".to_string());
    assert!(matches!(
        store.insert(&second),
        Err(StorageError::DuplicateKey(ref key)) if key == "bolas"
    ));
    assert_eq!(store.find_by_key("bolas").unwrap().unwrap(), first);
}

#[test]
fn test_failed_and_succeeded_partition_the_store() {
    let store_dir = TempDir::new().unwrap();
    let store = SledCompletionStore::new(store_dir.path()).unwrap();
    store.insert(&record("a", vec![])).unwrap();
    store
        .insert(&record(
            "b",
            vec![CompletionError::new(CompletionErrorKind::Img, "x")],
        ))
        .unwrap();
    store.insert(&record("c", vec![])).unwrap();

    let failed: Vec<String> = store
        .find_failed()
        .unwrap()
        .into_iter()
        .map(|r| r.input.key)
        .collect();
    let mut succeeded: Vec<String> = store
        .find_succeeded()
        .unwrap()
        .into_iter()
        .map(|r| r.input.key)
        .collect();
    succeeded.sort();
    assert_eq!(failed, vec!["b".to_string()]);
    assert_eq!(succeeded, vec!["a".to_string(), "c".to_string()]);
}

#[test]
fn test_update_clearing_errors_moves_record_to_succeeded() {
    let store_dir = TempDir::new().unwrap();
    let store = SledCompletionStore::new(store_dir.path()).unwrap();
    let mut failed = record(
        "bolas",
        vec![CompletionError::new(CompletionErrorKind::Content, "x")],
    );
    store.insert(&failed).unwrap();

    failed.set_errors(vec![]);
    store.update_by_key("bolas", &failed).unwrap();
    assert!(store.find_failed().unwrap().is_empty());
    assert_eq!(store.find_succeeded().unwrap().len(), 1);

    let ghost = record("missing", vec![]);
    assert!(matches!(
        store.update_by_key("missing", &ghost),
        Err(StorageError::RecordNotFound(_))
    ));
    assert!(matches!(
        store.update_by_key("missing", &failed),
        Err(StorageError::KeyMismatch { .. })
    ));
}
