//! Pipeline logic: pagination, filtering, categorization, and the analyzer
//! that composes them around the Zotero client.

pub mod analyzer;
pub mod categorize;
pub mod filter;
pub mod paginate;

pub use analyzer::Analyzer;
pub use categorize::{categorize_items, UNCATEGORIZED};
pub use filter::apply_filters;
pub use paginate::{fetch_all, PAGE_SIZE};
