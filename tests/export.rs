//! Exporter Integration Tests
//!
//! File layout, directory creation, JSON round-trips, and citation output.

use serde_json::json;
use tempfile::TempDir;
use zotlit::{ContentExporter, ContextType, ExportFormat, LibraryItem, LiteratureCategory};

fn sample_item() -> LibraryItem {
    serde_json::from_value(json!({
        "key": "ABCD1234",
        "title": "A Study of Things",
        "authors": ["A", "B", "C", "D"],
        "abstract": "We study things. Results follow.",
        "year": 2020,
        "journal": "Journal of Things",
        "volume": "12",
        "pages": "1-20",
        "doi": "10.1000/xyz",
        "url": "https://example.org/paper",
        "tags": ["things", "studies"],
        "collections": ["Main"],
        "item_type": "journalArticle",
        "date_added": "2024-01-01T00:00:00Z",
        "extra": "note",
    }))
    .unwrap()
}

#[tokio::test]
async fn test_export_both_encodings_and_roundtrip() {
    let temp = TempDir::new().unwrap();
    let exporter = ContentExporter::new(temp.path().join("out"));

    let items = vec![sample_item()];
    let files = exporter
        .export_items(&items, ExportFormat::Both, "literature")
        .await
        .unwrap();

    let json_path = files.json.unwrap();
    let md_path = files.markdown.unwrap();
    assert_eq!(json_path.file_name().unwrap(), "literature.json");
    assert_eq!(md_path.file_name().unwrap(), "literature.md");

    // The machine-readable encoding round-trips with identical fields.
    let content = std::fs::read_to_string(&json_path).unwrap();
    let parsed: Vec<LibraryItem> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, items);

    let markdown = std::fs::read_to_string(&md_path).unwrap();
    assert!(markdown.contains("### A Study of Things"));
    assert!(markdown.contains(
        "- Citation: A, B, C et al.. (2020). \"A Study of Things\". Journal of Things"
    ));
}

#[tokio::test]
async fn test_json_only_writes_single_file() {
    let temp = TempDir::new().unwrap();
    let exporter = ContentExporter::new(temp.path());

    let files = exporter
        .export_items(&[sample_item()], ExportFormat::Json, "only")
        .await
        .unwrap();

    assert!(files.json.is_some());
    assert!(files.markdown.is_none());
    assert!(!temp.path().join("only.md").exists());
}

#[tokio::test]
async fn test_output_directory_created_if_absent() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");
    let exporter = ContentExporter::new(&nested);

    exporter
        .export_items(&[sample_item()], ExportFormat::Markdown, "x")
        .await
        .unwrap();

    assert!(nested.join("x.md").exists());
}

#[tokio::test]
async fn test_categorized_export_roundtrip() {
    let temp = TempDir::new().unwrap();
    let exporter = ContentExporter::new(temp.path());

    let mut cat = LiteratureCategory::new("Things")
        .with_description("About things")
        .with_keywords(["thing"]);
    cat.add_item(sample_item());

    let files = exporter
        .export_categorized(&[cat.clone()], ExportFormat::Both, "categorized")
        .await
        .unwrap();

    let content = std::fs::read_to_string(files.json.unwrap()).unwrap();
    let parsed: Vec<LiteratureCategory> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, vec![cat]);

    let markdown = std::fs::read_to_string(files.markdown.unwrap()).unwrap();
    assert!(markdown.contains("## Things (1 items)"));
    assert!(markdown.contains("About things"));
}

#[tokio::test]
async fn test_llm_context_filenames_fixed_per_type() {
    let temp = TempDir::new().unwrap();
    let exporter = ContentExporter::new(temp.path());

    let mut cat = LiteratureCategory::new("Things");
    cat.add_item(sample_item());
    let categories = vec![cat];

    let related = exporter
        .export_llm_context(&categories, ContextType::RelatedWorks)
        .await
        .unwrap();
    let review = exporter
        .export_llm_context(&categories, ContextType::LiteratureReview)
        .await
        .unwrap();

    assert_eq!(related.file_name().unwrap(), "related_works.md");
    assert_eq!(review.file_name().unwrap(), "literature_review.md");

    let related_text = std::fs::read_to_string(&related).unwrap();
    assert!(related_text.contains("- A, B, C et al.. (2020)"));
    assert!(related_text.contains("We study things."));
    assert!(!related_text.contains("Results follow."));

    let review_text = std::fs::read_to_string(&review).unwrap();
    assert!(review_text.contains("We study things. Results follow."));
}

#[tokio::test]
async fn test_failed_encoding_does_not_block_the_other() {
    let temp = TempDir::new().unwrap();
    let exporter = ContentExporter::new(temp.path());

    // A directory squatting on the JSON path makes that write fail.
    std::fs::create_dir_all(temp.path().join("blocked.json")).unwrap();

    let result = exporter
        .export_items(&[sample_item()], ExportFormat::Both, "blocked")
        .await;

    assert!(result.is_err());
    // The Markdown encoding was still attempted and written.
    let markdown = std::fs::read_to_string(temp.path().join("blocked.md")).unwrap();
    assert!(markdown.contains("### A Study of Things"));
}

#[tokio::test]
async fn test_bibtex_included_when_present() {
    let temp = TempDir::new().unwrap();
    let exporter = ContentExporter::new(temp.path());

    let mut item = sample_item();
    item.bibtex = Some("@article{abcd1234, title={A Study of Things}}".to_string());

    let files = exporter
        .export_items(&[item], ExportFormat::Markdown, "bib")
        .await
        .unwrap();

    let markdown = std::fs::read_to_string(files.markdown.unwrap()).unwrap();
    assert!(markdown.contains("```bibtex"));
    assert!(markdown.contains("@article{abcd1234"));
}
