//! Folder emulation over a flat key space.
//!
//! A "folder" is a zero-byte marker object whose key ends in the
//! separator. Creating one does not create intermediate parents; a
//! prefix with descendants but no marker is indistinguishable from a
//! nonexistent folder except by listing it.

use crate::services::{
    listing::SEPARATOR,
    store_client::{StoreClient, StoreError, StoreResult},
};
use tracing::info;

#[derive(Clone)]
pub struct FolderService {
    store: StoreClient,
}

impl FolderService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Create the marker object for `prefix + name + "/"`. Idempotent:
    /// re-creating an existing folder overwrites the same marker.
    pub async fn create_folder(&self, prefix: &str, name: &str) -> StoreResult<String> {
        let key = folder_key(prefix, name)?;
        info!(key = %key, "creating folder marker");
        self.store.put_marker(&key).await?;
        Ok(key)
    }
}

/// Compute the marker key for a folder. Rejects empty names.
pub fn folder_key(prefix: &str, name: &str) -> StoreResult<String> {
    if name.is_empty() {
        return Err(StoreError::InvalidKey);
    }
    Ok(format!("{prefix}{name}{SEPARATOR}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_folder_key_is_name_plus_separator() {
        assert_eq!(folder_key("", "Reports").unwrap(), "Reports/");
    }

    #[test]
    fn nested_folder_key_appends_to_prefix() {
        assert_eq!(folder_key("Reports/", "2026").unwrap(), "Reports/2026/");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(folder_key("Reports/", ""), Err(StoreError::InvalidKey)));
    }
}
