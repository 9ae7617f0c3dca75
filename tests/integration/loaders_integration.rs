//! Integration tests for the CSV loaders

use article_gen::loaders::{load_category_map, load_inputs};
use article_gen::model::CompletionInput;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_files_from_disk() {
    let temp = TempDir::new().unwrap();
    let keywords = temp.path().join("keywords.csv");
    let categories = temp.path().join("categories.csv");
    fs::write(&keywords, "keyword,category\r\nbolas,equipment\r\nreglas,rules\r\n").unwrap();
    fs::write(&categories, "category,query\nequipment,petanque balls\n").unwrap();

    let inputs = load_inputs(&keywords).unwrap();
    assert_eq!(
        inputs,
        vec![
            CompletionInput::new("bolas", "equipment"),
            CompletionInput::new("reglas", "rules"),
        ]
    );

    let map = load_category_map(&categories).unwrap();
    assert_eq!(map.get("equipment").map(String::as_str), Some("petanque balls"));
    assert!(map.get("rules").is_none());
}

#[test]
fn test_missing_file_is_a_csv_error() {
    let temp = TempDir::new().unwrap();
    let err = load_inputs(&temp.path().join("absent.csv")).unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
}
