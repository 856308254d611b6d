//! Filter criteria for narrowing a fetched item set.

use serde::{Deserialize, Serialize};

use super::item_type::ItemType;

/// An optional-field predicate bundle. Unset fields impose no constraint;
/// all set fields must hold for an item to pass.
///
/// `collections` is resolved at fetch time (it selects which collections to
/// page through) rather than as a post-fetch predicate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Any-of, case-sensitive exact tag match.
    pub tags: Option<Vec<String>>,

    /// Collection names to fetch from instead of the whole library.
    pub collections: Option<Vec<String>>,

    /// Any-of match on the canonical item type.
    pub item_types: Option<Vec<ItemType>>,

    /// Every entry must be contained (case-insensitive) in some author name.
    pub authors: Option<Vec<String>>,

    /// Inclusive (start, end) year range. Items without a year never match.
    pub date_range: Option<(i32, i32)>,

    /// Any-of, case-insensitive substring match against title + abstract.
    pub keywords: Option<Vec<String>>,

    /// Case-insensitive substring match on the title.
    pub title_contains: Option<String>,
}

impl FilterCriteria {
    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.tags.is_none()
            && self.collections.is_none()
            && self.item_types.is_none()
            && self.authors.is_none()
            && self.date_range.is_none()
            && self.keywords.is_none()
            && self.title_contains.is_none()
    }
}
