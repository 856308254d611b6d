//! Paginated retrieval from a page source.
//!
//! The Zotero API caps a single request at 100 items, so anything larger is
//! assembled from consecutive pages. A failed page aborts the loop and the
//! caller gets whatever was accumulated; a degraded fetch is not a failure.

use tracing::{debug, info, warn};

use crate::adapters::{PageSource, RawItem};

/// Zotero's maximum page size per request.
pub const PAGE_SIZE: usize = 100;

/// Fetch up to `limit` items from `source` (all of them when `None`).
///
/// Stops on an empty page, a short page (the source is exhausted and a
/// further request would return nothing), or when the limit is reached. The
/// last request before the limit is shrunk to the remainder.
pub async fn fetch_all(source: &dyn PageSource, limit: Option<usize>) -> Vec<RawItem> {
    let mut all_items: Vec<RawItem> = Vec::new();
    let mut start = 0;

    debug!(?limit, "Starting paginated fetch");

    loop {
        let count = match limit {
            Some(limit) => {
                let remaining = limit.saturating_sub(all_items.len());
                if remaining == 0 {
                    break;
                }
                remaining.min(PAGE_SIZE)
            }
            None => PAGE_SIZE,
        };

        let batch = match source.page(start, count).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(start, error = %e, "Page fetch failed, returning partial results");
                break;
            }
        };

        if batch.is_empty() {
            debug!(total = all_items.len(), "No more items");
            break;
        }

        let fetched = batch.len();
        start += fetched;
        all_items.extend(batch);
        debug!(batch = fetched, total = all_items.len(), "Fetched page");

        // A short page means the library is exhausted; don't issue another
        // request just to get an empty page back.
        if fetched < count {
            break;
        }
    }

    info!(total = all_items.len(), "Pagination complete");
    all_items
}
