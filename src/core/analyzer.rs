//! Analyzer: composes client, paginator, filter, and enrichment for one
//! library.
//!
//! Collection and tag lookups are cached after the first fetch; a fetch
//! failure substitutes an empty cache so the rest of the pipeline keeps
//! working in degraded form. Caches are plain `&mut self` state; callers
//! (CLI, MCP loop) access the analyzer strictly one request at a time.

use std::collections::HashMap;

use tracing::{error, warn};

use crate::adapters::{CollectionItems, RawItem, TopItems, ZoteroClient};
use crate::domain::{FilterCriteria, LibraryItem};

use super::filter::apply_filters;
use super::paginate::fetch_all;

pub struct Analyzer {
    client: ZoteroClient,
    /// Collection name -> collection key.
    collections_cache: Option<HashMap<String, String>>,
    tags_cache: Option<Vec<String>>,
}

impl Analyzer {
    pub fn new(client: ZoteroClient) -> Self {
        Self {
            client,
            collections_cache: None,
            tags_cache: None,
        }
    }

    /// Collection name -> key table, fetched once and cached.
    ///
    /// On fetch failure the cache becomes empty rather than the error
    /// propagating; `refresh` forces a refetch.
    pub async fn get_collections(&mut self, refresh: bool) -> HashMap<String, String> {
        if self.collections_cache.is_none() || refresh {
            let table = match self.client.collections().await {
                Ok(collections) => collections
                    .into_iter()
                    .map(|c| (c.data.name, c.key))
                    .collect(),
                Err(e) => {
                    error!(error = %e, "Failed to fetch collections");
                    HashMap::new()
                }
            };
            self.collections_cache = Some(table);
        }

        self.collections_cache.clone().unwrap_or_default()
    }

    /// All tag names in the library, fetched once and cached.
    pub async fn get_tags(&mut self, refresh: bool) -> Vec<String> {
        if self.tags_cache.is_none() || refresh {
            let tags = match self.client.tags().await {
                Ok(tags) => tags.into_iter().map(|t| t.tag).collect(),
                Err(e) => {
                    error!(error = %e, "Failed to fetch tags");
                    Vec::new()
                }
            };
            self.tags_cache = Some(tags);
        }

        self.tags_cache.clone().unwrap_or_default()
    }

    /// Fetch items with optional filtering and an optional overall limit.
    ///
    /// When the criteria name collections, items come from those collections'
    /// pages (unknown names are skipped with a warning); otherwise from the
    /// library top. Items that fail conversion are skipped individually.
    pub async fn fetch_items(
        &mut self,
        criteria: Option<&FilterCriteria>,
        limit: Option<usize>,
    ) -> Vec<LibraryItem> {
        let collections_map = self.get_collections(false).await;

        let raw_items = match criteria.and_then(|c| c.collections.as_ref()) {
            Some(names) => {
                let mut raw_items = Vec::new();
                for name in names {
                    match collections_map.get(name) {
                        Some(key) => {
                            let source = CollectionItems {
                                client: &self.client,
                                collection_key: key.clone(),
                            };
                            raw_items.extend(fetch_all(&source, limit).await);
                        }
                        None => {
                            warn!(collection = %name, "Unknown collection, skipping");
                        }
                    }
                }
                raw_items
            }
            None => fetch_all(&TopItems(&self.client), limit).await,
        };

        let mut items = convert_items(raw_items, Some(&collections_map));

        if let Some(criteria) = criteria {
            items = apply_filters(items, criteria);
        }

        items
    }

    /// Search the library. Ranking is the service's; failure degrades to an
    /// empty result set.
    pub async fn search_items(&self, query: &str, limit: Option<usize>) -> Vec<LibraryItem> {
        let raw_items = match self.client.search(query, limit).await {
            Ok(raw_items) => raw_items,
            Err(e) => {
                error!(query, error = %e, "Search failed");
                return Vec::new();
            }
        };

        convert_items(raw_items, None)
    }

    /// BibTeX per item key. A failed key stores an empty string and warns;
    /// the batch never aborts.
    pub async fn get_bibtex(&self, keys: &[String]) -> HashMap<String, String> {
        let mut bibtex = HashMap::new();
        for key in keys {
            match self.client.item_bibtex(key).await {
                Ok(entry) => {
                    bibtex.insert(key.clone(), entry);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Failed to fetch BibTeX");
                    bibtex.insert(key.clone(), String::new());
                }
            }
        }
        bibtex
    }
}

/// Fold raw items into normalized ones, skipping failures with a warning.
///
/// When a collection table is given, each item's collection keys resolve to
/// names (sorted, so the output is stable across the table's map order).
fn convert_items(
    raw_items: Vec<RawItem>,
    collections_map: Option<&HashMap<String, String>>,
) -> Vec<LibraryItem> {
    let mut items = Vec::with_capacity(raw_items.len());

    for raw in raw_items {
        let collection_keys = raw.data.collections.clone();
        let source_key = raw.key.clone();

        let mut item = match raw.into_item() {
            Ok(item) => item,
            Err(e) => {
                warn!(key = %source_key, error = %e, "Skipping unconvertible item");
                continue;
            }
        };

        if let Some(map) = collections_map {
            if !collection_keys.is_empty() {
                let mut names: Vec<String> = map
                    .iter()
                    .filter(|(_, key)| collection_keys.contains(key))
                    .map(|(name, _)| name.clone())
                    .collect();
                names.sort();
                item.collections = names;
            }
        }

        items.push(item);
    }

    items
}
