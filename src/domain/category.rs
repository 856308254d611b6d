//! Literature categories for keyword classification.

use serde::{Deserialize, Serialize};

use super::item::LibraryItem;

/// A named grouping of items assigned by keyword classification.
///
/// `keywords` drive classification only; `items` is append-only and holds at
/// most one item per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteratureCategory {
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub items: Vec<LibraryItem>,
}

impl LiteratureCategory {
    /// Create an empty category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            keywords: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the classification keywords.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Append an item unless one with the same key is already present.
    pub fn add_item(&mut self, item: LibraryItem) {
        if !self.items.iter().any(|i| i.key == item.key) {
            self.items.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str) -> LibraryItem {
        serde_json::from_value(serde_json::json!({
            "key": key,
            "title": "Title",
        }))
        .unwrap()
    }

    #[test]
    fn test_add_item_dedups_by_key() {
        let mut cat = LiteratureCategory::new("Methods").with_keywords(["method"]);

        cat.add_item(item("K1"));
        cat.add_item(item("K1"));
        cat.add_item(item("K2"));

        assert_eq!(cat.len(), 2);
    }

    #[test]
    fn test_builder() {
        let cat = LiteratureCategory::new("Surveys")
            .with_description("Survey papers")
            .with_keywords(["survey", "review"]);

        assert_eq!(cat.name, "Surveys");
        assert_eq!(cat.description.as_deref(), Some("Survey papers"));
        assert_eq!(cat.keywords, vec!["survey", "review"]);
        assert!(cat.is_empty());
    }
}
