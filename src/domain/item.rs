//! Normalized bibliographic items.
//!
//! A `LibraryItem` is built once from a raw Zotero API item and not mutated
//! afterwards, except for `collections`, which is filled in a second pass once
//! the collection name table is known, and reconstruction when an item crosses
//! the MCP boundary as JSON.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item_type::ItemType;

/// Why a raw API item could not be converted.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The source item carried no key; nothing stable to identify it by.
    #[error("item has no key")]
    MissingKey,
}

/// A normalized bibliographic entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Stable identifier from Zotero. Never empty once constructed.
    pub key: String,

    /// Title. Required field, but may be the empty string.
    pub title: String,

    /// Author display names, in source order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Abstract text, if any.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,

    /// Publication year, extracted from the free-text date field.
    pub year: Option<i32>,

    /// Venue name (publication title).
    pub journal: Option<String>,

    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,

    /// Tag strings. Semantically a set, stored in source order.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Names of collections this item belongs to. Populated post-hoc.
    #[serde(default)]
    pub collections: Vec<String>,

    /// Item type as spelled by the source. Canonicalization happens at
    /// comparison time so the original spelling survives a round-trip.
    #[serde(default)]
    pub item_type: String,

    /// Pre-rendered BibTeX citation, if fetched.
    pub bibtex: Option<String>,

    /// Opaque source timestamps, passed through untouched.
    pub date_added: Option<String>,
    pub date_modified: Option<String>,

    /// Free-text "extra" field.
    pub extra: Option<String>,
}

impl LibraryItem {
    /// The canonical item type, if the source spelling is in the vocabulary.
    pub fn canonical_type(&self) -> Option<ItemType> {
        ItemType::from_source_name(&self.item_type)
    }

    /// Render a basic citation string.
    ///
    /// Authors are joined by ", " up to the first three, with " et al."
    /// appended when more exist; year in parentheses, title in quotes, venue
    /// last; non-empty parts joined with ". ".
    pub fn citation(&self) -> String {
        let mut authors_str = self
            .authors
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if self.authors.len() > 3 {
            authors_str.push_str(" et al.");
        }

        let mut parts = Vec::new();
        if !authors_str.is_empty() {
            parts.push(authors_str);
        }
        if let Some(year) = self.year {
            parts.push(format!("({})", year));
        }
        if !self.title.is_empty() {
            parts.push(format!("\"{}\"", self.title));
        }
        if let Some(journal) = self.journal.as_deref().filter(|j| !j.is_empty()) {
            parts.push(journal.to_string());
        }

        parts.join(". ")
    }

    /// Text the categorizer classifies on: title, abstract, and tags,
    /// lowercased.
    pub fn classification_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.abstract_text.as_deref().unwrap_or(""),
            self.tags.join(" ")
        )
        .to_lowercase()
    }
}

/// Extract a 4-digit publication year from a free-text date field.
///
/// Takes the first `19xx`/`20xx` substring; no match leaves the year unset.
pub fn extract_year(date: &str) -> Option<i32> {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    let re = YEAR_RE.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid year regex"));

    re.find(date).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_authors(authors: &[&str]) -> LibraryItem {
        LibraryItem {
            key: "ABCD1234".to_string(),
            title: "T".to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            abstract_text: None,
            year: Some(2020),
            journal: Some("V".to_string()),
            volume: None,
            issue: None,
            pages: None,
            doi: None,
            url: None,
            tags: Vec::new(),
            collections: Vec::new(),
            item_type: "journalArticle".to_string(),
            bibtex: None,
            date_added: None,
            date_modified: None,
            extra: None,
        }
    }

    #[test]
    fn test_citation_four_authors() {
        let item = item_with_authors(&["A", "B", "C", "D"]);
        assert_eq!(item.citation(), "A, B, C et al.. (2020). \"T\". V");
    }

    #[test]
    fn test_citation_omits_empty_parts() {
        let mut item = item_with_authors(&[]);
        item.year = None;
        item.journal = None;
        assert_eq!(item.citation(), "\"T\"");

        item.title = String::new();
        assert_eq!(item.citation(), "");
    }

    #[test]
    fn test_citation_three_authors_no_et_al() {
        let item = item_with_authors(&["A", "B", "C"]);
        assert_eq!(item.citation(), "A, B, C. (2020). \"T\". V");
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2021-05-03"), Some(2021));
        assert_eq!(extract_year("March 1998"), Some(1998));
        assert_eq!(extract_year("1998/2004"), Some(1998));
        assert_eq!(extract_year("n.d."), None);
        assert_eq!(extract_year("12345"), None);
        assert_eq!(extract_year(""), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut item = item_with_authors(&["A", "B"]);
        item.abstract_text = Some("An abstract.".to_string());
        item.tags = vec!["ml".to_string(), "hci".to_string()];
        item.doi = Some("10.1000/xyz".to_string());

        let json = serde_json::to_string(&item).unwrap();
        let parsed: LibraryItem = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.key, item.key);
        assert_eq!(parsed.authors, item.authors);
        assert_eq!(parsed.abstract_text, item.abstract_text);
        assert_eq!(parsed.tags, item.tags);
        assert_eq!(parsed.year, item.year);
        assert_eq!(parsed.doi, item.doi);
        assert_eq!(parsed.item_type, item.item_type);
    }

    #[test]
    fn test_classification_text() {
        let mut item = item_with_authors(&[]);
        item.title = "Deep Learning".to_string();
        item.abstract_text = Some("A Survey".to_string());
        item.tags = vec!["Neural".to_string()];
        assert_eq!(item.classification_text(), "deep learning a survey neural");
    }
}
