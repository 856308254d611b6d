//! Domain types for library items, filters, and categories.

pub mod category;
pub mod filter;
pub mod item;
pub mod item_type;

pub use category::LiteratureCategory;
pub use filter::FilterCriteria;
pub use item::{ItemError, LibraryItem};
pub use item_type::ItemType;
