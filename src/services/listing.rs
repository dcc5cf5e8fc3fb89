//! Prefix listing: one store page in, one shaped page out.
//!
//! The store does the delimiter grouping; this service types the
//! results (folder vs file), orders folders first, and passes the
//! continuation cursor through unmodified. It never buffers or joins
//! multiple pages.

use crate::{
    models::listing::{ListingEntry, ListingPage},
    services::store_client::{RawPage, StoreClient, StoreError, StoreResult},
};
use std::collections::BTreeSet;
use tracing::warn;

pub const SEPARATOR: char = '/';

#[derive(Clone)]
pub struct ListingService {
    store: StoreClient,
}

impl ListingService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// List direct children of `prefix`. The cursor must come from a
    /// previous page for the same prefix; if the store rejects it
    /// (expired or mismatched), the listing restarts once from the
    /// beginning instead of surfacing the raw rejection.
    pub async fn list(&self, prefix: &str, cursor: Option<&str>) -> StoreResult<ListingPage> {
        let raw = match self.store.list_page(prefix, cursor).await {
            Err(StoreError::InvalidCursor) if cursor.is_some() => {
                warn!(prefix, "continuation token rejected, restarting listing");
                self.store.list_page(prefix, None).await?
            }
            other => other?,
        };
        Ok(shape_page(raw))
    }
}

/// Shape a raw page: deduplicated folders first, then files in store
/// order. Keys ending in the separator are folder markers, not files,
/// and are dropped (the requested prefix's own marker among them).
fn shape_page(raw: RawPage) -> ListingPage {
    let folders: BTreeSet<String> = raw.common_prefixes.into_iter().collect();

    let mut files: Vec<ListingEntry> = folders
        .into_iter()
        .map(|key| ListingEntry::Folder { key })
        .collect();

    for obj in raw.objects {
        if obj.key.ends_with(SEPARATOR) {
            continue;
        }
        files.push(ListingEntry::File {
            key: obj.key,
            size: obj.size,
            last_modified: obj.last_modified,
        });
    }

    ListingPage {
        files,
        next_cursor: raw.next_cursor,
    }
}
