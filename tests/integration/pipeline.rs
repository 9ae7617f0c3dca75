//! End-to-end pipeline: CSV inputs through generation, regeneration and export.

use super::test_utils::{build_generator, MockCompletions, MockImages};
use article_gen::export::{export_succeeded, EXPORT_HEADER};
use article_gen::generation::ItemStatus;
use article_gen::loaders::load_inputs;
use article_gen::model::CompletionErrorKind;
use article_gen::store::{CompletionStore, SledCompletionStore};
use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

fn write_keywords(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("keywords.csv");
    fs::write(
        &path,
        "keyword,category\nbolas de petanca,equipment\nreglas de petanca,rules\nterreno,rules\n",
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_generation_regeneration_and_export() {
    let temp = TempDir::new().unwrap();
    let inputs = load_inputs(&write_keywords(&temp)).unwrap();
    let store = Arc::new(SledCompletionStore::new(temp.path().join("store")).unwrap());
    let completions = MockCompletions::new();
    let images = MockImages::new();
    let generator = build_generator(completions.clone(), images.clone(), store.clone());

    // content fails for one keyword, images fail for all
    completions.fail_on("CONTENT about terreno");
    images.failing.store(true, Ordering::SeqCst);
    let report = generator.start_generation(inputs.clone()).await;
    assert_eq!(report.total(), 3);
    assert_eq!(report.failed, 3);

    let terreno = store.find_by_key("terreno").unwrap().unwrap();
    let kinds: Vec<_> = terreno.errors.as_ref().unwrap().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![CompletionErrorKind::Content, CompletionErrorKind::Img]);
    assert!(terreno.meta_title.is_some());
    assert!(terreno.raw_content.is_none());
    let img_error = &terreno.errors.as_ref().unwrap()[1];
    assert!(img_error.reason.contains("Bad request"));

    // nothing exportable yet
    let export_path = temp.path().join("generated").join("generated.csv");
    assert_eq!(export_succeeded(store.as_ref(), &export_path).unwrap(), 0);

    // a second generation pass is a no-op
    let calls = completions.calls.load(Ordering::SeqCst);
    let report = generator.start_generation(inputs).await;
    assert_eq!(report.skipped, 3);
    assert_eq!(completions.calls.load(Ordering::SeqCst), calls);

    // images recover; content for terreno still fails
    images.failing.store(false, Ordering::SeqCst);
    let report = generator.regenerate_articles().await.unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    let terreno_outcome = report
        .outcomes
        .iter()
        .find(|o| o.key == "terreno")
        .unwrap();
    assert_eq!(
        terreno_outcome.status,
        ItemStatus::Failed {
            kinds: vec![CompletionErrorKind::Content]
        }
    );

    // everything recovers
    completions.heal();
    let report = generator.regenerate_articles().await.unwrap();
    assert_eq!(report.total(), 1);
    assert_eq!(report.succeeded, 1);
    assert!(store.find_failed().unwrap().is_empty());

    let terreno = store.find_by_key("terreno").unwrap().unwrap();
    assert_eq!(terreno.cleaned_content.as_deref(), Some("Texto de 3711 tokens"));
    assert_eq!(
        terreno.image_url.as_deref(),
        Some("https://images.test/petanque-game")
    );

    assert_eq!(export_succeeded(store.as_ref(), &export_path).unwrap(), 3);
    let mut reader = csv::Reader::from_path(&export_path).unwrap();
    assert_eq!(
        reader.headers().unwrap().iter().collect::<Vec<_>>(),
        EXPORT_HEADER.to_vec()
    );
    assert_eq!(reader.records().count(), 3);
}

#[tokio::test]
async fn test_records_survive_reopen_between_runs() {
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("store");
    let inputs = load_inputs(&write_keywords(&temp)).unwrap();

    {
        let store = Arc::new(SledCompletionStore::new(&store_path).unwrap());
        let completions = MockCompletions::new();
        completions.fail_on("META_DESC");
        let generator = build_generator(completions, MockImages::new(), store.clone());
        generator.start_generation(inputs).await;
        store.flush().unwrap();
    }

    let store = Arc::new(SledCompletionStore::new(&store_path).unwrap());
    assert_eq!(store.find_failed().unwrap().len(), 3);

    let generator = build_generator(MockCompletions::new(), MockImages::new(), store.clone());
    let report = generator.regenerate_articles().await.unwrap();
    assert_eq!(report.succeeded, 3);
    for record in store.find_succeeded().unwrap() {
        assert!(record.meta_desc.is_some());
        assert_eq!(
            record.used_prompts.meta_desc,
            format!("META_DESC about {}", record.input.key)
        );
    }
}

#[tokio::test]
async fn test_bounded_concurrency_still_processes_every_item() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(SledCompletionStore::new(temp.path().join("store")).unwrap());
    let generator = build_generator(MockCompletions::new(), MockImages::new(), store.clone())
        .with_max_concurrent_items(2);

    let inputs = (0..10)
        .map(|i| article_gen::model::CompletionInput::new(format!("kw {i}"), "equipment"))
        .collect();
    let report = generator.start_generation(inputs).await;
    assert_eq!(report.succeeded, 10);
    assert_eq!(store.len(), 10);
}
