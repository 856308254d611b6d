//! Adapter interfaces for external systems.
//!
//! The only external collaborator is the Zotero Web API; this module holds
//! its client plus the paging seam the fetch loop consumes.

pub mod zotero;

use anyhow::Result;
use async_trait::async_trait;

pub use zotero::{LibraryType, RawItem, ZoteroClient};

/// A source of raw items that can be read one bounded page at a time.
///
/// `start` is the offset of the first item, `count` the maximum number to
/// return. A short or empty page signals that the source is exhausted.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn page(&self, start: usize, count: usize) -> Result<Vec<RawItem>>;
}

/// Pages through a library's top-level items.
pub struct TopItems<'a>(pub &'a ZoteroClient);

#[async_trait]
impl PageSource for TopItems<'_> {
    async fn page(&self, start: usize, count: usize) -> Result<Vec<RawItem>> {
        self.0.items_page(start, count).await
    }
}

/// Pages through the top-level items of a single collection.
pub struct CollectionItems<'a> {
    pub client: &'a ZoteroClient,
    pub collection_key: String,
}

#[async_trait]
impl PageSource for CollectionItems<'_> {
    async fn page(&self, start: usize, count: usize) -> Result<Vec<RawItem>> {
        self.client
            .collection_items_page(&self.collection_key, start, count)
            .await
    }
}
