//! LLM context rendering.
//!
//! Both variants are derived deterministically from item fields; there is no
//! generative text. `RelatedWorks` is a compact per-category bullet list,
//! `LiteratureReview` a longer narrative that an agent can draw on while
//! composing a review.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::LiteratureCategory;

/// Which context document to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    RelatedWorks,
    LiteratureReview,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::RelatedWorks => "related_works",
            ContextType::LiteratureReview => "literature_review",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "related_works" => Ok(ContextType::RelatedWorks),
            "literature_review" => Ok(ContextType::LiteratureReview),
            other => anyhow::bail!(
                "Invalid context type '{}' (expected related_works or literature_review)",
                other
            ),
        }
    }
}

/// Render the context document for categorized items.
pub fn render_context(categories: &[LiteratureCategory], context_type: ContextType) -> String {
    match context_type {
        ContextType::RelatedWorks => render_related_works(categories),
        ContextType::LiteratureReview => render_literature_review(categories),
    }
}

fn render_related_works(categories: &[LiteratureCategory]) -> String {
    let mut out = String::new();
    writeln!(out, "# Related Works").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Generated: {}", Utc::now().to_rfc3339()).unwrap();

    for category in categories {
        if category.is_empty() {
            continue;
        }

        writeln!(out).unwrap();
        writeln!(out, "## {}", category.name).unwrap();
        if let Some(description) = &category.description {
            writeln!(out).unwrap();
            writeln!(out, "{}", description).unwrap();
        }
        writeln!(out).unwrap();

        for item in &category.items {
            match first_sentence(item.abstract_text.as_deref()) {
                Some(summary) => writeln!(out, "- {} — {}", item.citation(), summary).unwrap(),
                None => writeln!(out, "- {}", item.citation()).unwrap(),
            }
        }
    }

    out
}

fn render_literature_review(categories: &[LiteratureCategory]) -> String {
    let mut out = String::new();
    writeln!(out, "# Literature Review Context").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Generated: {}", Utc::now().to_rfc3339()).unwrap();

    for category in categories {
        if category.is_empty() {
            continue;
        }

        writeln!(out).unwrap();
        writeln!(out, "## {}", category.name).unwrap();
        writeln!(out).unwrap();

        let intro = match &category.description {
            Some(description) => format!(
                "{} This category covers {} work(s).",
                description,
                category.len()
            ),
            None => format!("This category covers {} work(s).", category.len()),
        };
        writeln!(out, "{}", intro).unwrap();

        for item in &category.items {
            writeln!(out).unwrap();
            writeln!(out, "### {}", item.citation()).unwrap();
            writeln!(out).unwrap();
            match &item.abstract_text {
                Some(abstract_text) => writeln!(out, "{}", abstract_text).unwrap(),
                None => writeln!(out, "No abstract available.").unwrap(),
            }
            if !item.tags.is_empty() {
                writeln!(out).unwrap();
                writeln!(out, "Tags: {}", item.tags.join(", ")).unwrap();
            }
        }
    }

    out
}

/// First sentence of an abstract, for compact bullets.
fn first_sentence(abstract_text: Option<&str>) -> Option<String> {
    let text = abstract_text?.trim();
    if text.is_empty() {
        return None;
    }
    match text.find(". ") {
        Some(idx) => Some(text[..idx + 1].to_string()),
        None => Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LibraryItem;

    fn category_with_item() -> LiteratureCategory {
        let item: LibraryItem = serde_json::from_value(serde_json::json!({
            "key": "K1",
            "title": "T",
            "authors": ["A"],
            "year": 2020,
            "abstract": "First sentence. Second sentence.",
            "tags": ["x"],
        }))
        .unwrap();

        let mut cat = LiteratureCategory::new("Methods").with_description("Method papers");
        cat.add_item(item);
        cat
    }

    #[test]
    fn test_related_works_bullets() {
        let text = render_context(&[category_with_item()], ContextType::RelatedWorks);
        assert!(text.contains("# Related Works"));
        assert!(text.contains("## Methods"));
        assert!(text.contains("- A. (2020). \"T\" — First sentence."));
        assert!(!text.contains("Second sentence"));
    }

    #[test]
    fn test_literature_review_prose() {
        let text = render_context(&[category_with_item()], ContextType::LiteratureReview);
        assert!(text.contains("# Literature Review Context"));
        assert!(text.contains("Method papers This category covers 1 work(s)."));
        assert!(text.contains("First sentence. Second sentence."));
        assert!(text.contains("Tags: x"));
    }

    #[test]
    fn test_empty_categories_skipped() {
        let empty = LiteratureCategory::new("Empty");
        let text = render_context(&[empty], ContextType::RelatedWorks);
        assert!(!text.contains("## Empty"));
    }

    #[test]
    fn test_context_type_parse() {
        assert_eq!(
            ContextType::parse("related_works").unwrap(),
            ContextType::RelatedWorks
        );
        assert!(ContextType::parse("summary").is_err());
    }
}
