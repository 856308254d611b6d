//! First-match-wins keyword classification of items into categories.

use anyhow::Result;

use crate::domain::{LibraryItem, LiteratureCategory};

/// Reserved name for the fallback bucket.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Assign each item to exactly one category.
///
/// Categories are scanned in caller order; an item goes to the first one with
/// a case-insensitive keyword substring hit on its title/abstract/tags text,
/// otherwise to the reserved `Uncategorized` bucket appended at the end.
/// Item order within a category follows input order. A caller-supplied
/// category named `Uncategorized` is rejected.
pub fn categorize_items(
    items: &[LibraryItem],
    categories: &[LiteratureCategory],
) -> Result<Vec<LiteratureCategory>> {
    if categories.iter().any(|c| c.name == UNCATEGORIZED) {
        anyhow::bail!("Category name '{}' is reserved", UNCATEGORIZED);
    }

    let mut buckets: Vec<LiteratureCategory> = categories
        .iter()
        .map(|c| LiteratureCategory {
            name: c.name.clone(),
            description: c.description.clone(),
            keywords: c.keywords.clone(),
            items: Vec::new(),
        })
        .collect();

    let mut fallback = LiteratureCategory::new(UNCATEGORIZED)
        .with_description("Items that don't match any specified category");

    for item in items {
        let text = item.classification_text();

        let target = buckets
            .iter_mut()
            .find(|cat| cat.keywords.iter().any(|k| text.contains(&k.to_lowercase())));

        match target {
            Some(cat) => cat.add_item(item.clone()),
            None => fallback.add_item(item.clone()),
        }
    }

    buckets.push(fallback);
    Ok(buckets)
}
