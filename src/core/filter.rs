//! Conjunctive filtering of items against a `FilterCriteria`.
//!
//! Every set predicate must hold; matching is plain substring/equality with
//! no stemming or tokenization. The `collections` field is not a predicate
//! here; the analyzer resolves it at fetch time.

use crate::domain::{FilterCriteria, LibraryItem};

/// Keep the items satisfying all set predicates.
pub fn apply_filters(items: Vec<LibraryItem>, criteria: &FilterCriteria) -> Vec<LibraryItem> {
    items
        .into_iter()
        .filter(|item| matches(item, criteria))
        .collect()
}

/// Does a single item satisfy the criteria?
pub fn matches(item: &LibraryItem, criteria: &FilterCriteria) -> bool {
    // Tags: any-of, case-sensitive exact.
    if let Some(tags) = &criteria.tags {
        if !tags.iter().any(|t| item.tags.iter().any(|it| it == t)) {
            return false;
        }
    }

    // Item types: compared on the canonical value, post-collapsing.
    if let Some(types) = &criteria.item_types {
        match item.canonical_type() {
            Some(t) if types.contains(&t) => {}
            _ => return false,
        }
    }

    // Authors: every criterion substring must appear in some author name.
    if let Some(authors) = &criteria.authors {
        let item_authors: Vec<String> = item.authors.iter().map(|a| a.to_lowercase()).collect();
        let all_found = authors.iter().all(|wanted| {
            let wanted = wanted.to_lowercase();
            item_authors.iter().any(|a| a.contains(&wanted))
        });
        if !all_found {
            return false;
        }
    }

    // Date range: inclusive both ends; no year never matches.
    if let Some((start, end)) = criteria.date_range {
        match item.year {
            Some(year) if start <= year && year <= end => {}
            _ => return false,
        }
    }

    if let Some(needle) = &criteria.title_contains {
        if !item.title.to_lowercase().contains(&needle.to_lowercase()) {
            return false;
        }
    }

    // Keywords: any-of against title + " " + abstract.
    if let Some(keywords) = &criteria.keywords {
        let haystack = format!(
            "{} {}",
            item.title,
            item.abstract_text.as_deref().unwrap_or("")
        )
        .to_lowercase();
        if !keywords.iter().any(|k| haystack.contains(&k.to_lowercase())) {
            return false;
        }
    }

    true
}
