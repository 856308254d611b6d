//! Categorizer Integration Tests
//!
//! Exhaustiveness, exclusivity, first-match-wins, and order preservation.

use serde_json::json;
use zotlit::{categorize_items, LibraryItem, LiteratureCategory, UNCATEGORIZED};

fn item(key: &str, title: &str, tags: &[&str]) -> LibraryItem {
    serde_json::from_value(json!({
        "key": key,
        "title": title,
        "tags": tags,
    }))
    .unwrap()
}

fn corpus() -> Vec<LibraryItem> {
    vec![
        item("K1", "Neural network training", &["ml"]),
        item("K2", "Database indexing", &["storage"]),
        item("K3", "Neural architecture search", &[]),
        item("K4", "Garden maintenance", &[]),
        item("K5", "", &[]),
    ]
}

fn categories() -> Vec<LiteratureCategory> {
    vec![
        LiteratureCategory::new("ML").with_keywords(["neural"]),
        LiteratureCategory::new("Systems").with_keywords(["database", "storage"]),
    ]
}

#[test]
fn test_every_item_lands_in_exactly_one_category() {
    let items = corpus();
    let result = categorize_items(&items, &categories()).unwrap();

    let total: usize = result.iter().map(|c| c.len()).sum();
    assert_eq!(total, items.len());

    for original in &items {
        let holders = result
            .iter()
            .filter(|c| c.items.iter().any(|i| i.key == original.key))
            .count();
        assert_eq!(holders, 1, "item {} in {} categories", original.key, holders);
    }
}

#[test]
fn test_fallback_bucket_is_appended_last() {
    let result = categorize_items(&corpus(), &categories()).unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result[0].name, "ML");
    assert_eq!(result[1].name, "Systems");
    assert_eq!(result[2].name, UNCATEGORIZED);
    // K4 has no keyword hit; K5 has no text at all.
    assert_eq!(
        result[2].items.iter().map(|i| i.key.as_str()).collect::<Vec<_>>(),
        vec!["K4", "K5"]
    );
}

#[test]
fn test_first_match_wins_over_later_categories() {
    let cats = vec![
        LiteratureCategory::new("A").with_keywords(["neural"]),
        LiteratureCategory::new("B").with_keywords(["neural", "training"]),
    ];
    let items = vec![item("K1", "Neural network training", &[])];

    let result = categorize_items(&items, &cats).unwrap();
    assert_eq!(result[0].len(), 1);
    assert!(result[1].is_empty());
}

#[test]
fn test_keyword_match_is_case_insensitive_and_sees_tags() {
    let cats = vec![LiteratureCategory::new("ML").with_keywords(["NEURAL"])];
    let items = vec![item("K1", "Untitled", &["Neural-Symbolic"])];

    let result = categorize_items(&items, &cats).unwrap();
    assert_eq!(result[0].len(), 1);
}

#[test]
fn test_input_order_preserved_within_category() {
    let cats = vec![LiteratureCategory::new("ML").with_keywords(["neural"])];
    let items = vec![
        item("K3", "Neural architecture search", &[]),
        item("K1", "Neural network training", &[]),
    ];

    let result = categorize_items(&items, &cats).unwrap();
    let keys: Vec<_> = result[0].items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["K3", "K1"]);
}

#[test]
fn test_reserved_category_name_rejected() {
    let cats = vec![LiteratureCategory::new(UNCATEGORIZED).with_keywords(["x"])];
    assert!(categorize_items(&corpus(), &cats).is_err());
}
