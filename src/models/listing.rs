//! Entries and pages produced by prefix listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in a listing: either a stored object or a virtual
/// folder derived from delimiter grouping.
///
/// Folder keys always end with the `/` separator and carry no size or
/// timestamp; a folder is a lexical grouping, not a stored entity
/// (beyond an optional zero-byte marker object sharing its key).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum ListingEntry {
    File {
        key: String,
        /// Size in bytes.
        size: i64,
        last_modified: Option<DateTime<Utc>>,
    },
    Folder {
        key: String,
    },
}

impl ListingEntry {
    pub fn key(&self) -> &str {
        match self {
            ListingEntry::File { key, .. } | ListingEntry::Folder { key } => key,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, ListingEntry::Folder { .. })
    }
}

/// One page of listing results plus the store's opaque continuation
/// token. The token is round-tripped byte-for-byte; it has no
/// client-interpretable structure and no guaranteed lifetime.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// Folders first, then files in store-returned order.
    pub files: Vec<ListingEntry>,

    /// Absent when pagination is exhausted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_serialize_with_type_tag() {
        let folder = ListingEntry::Folder {
            key: "Reports/".into(),
        };
        let json = serde_json::to_value(&folder).unwrap();
        assert_eq!(json["type"], "folder");
        assert_eq!(json["key"], "Reports/");
        assert!(json.get("size").is_none());

        let file = ListingEntry::File {
            key: "Reports/a.pdf".into(),
            size: 42,
            last_modified: None,
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["size"], 42);
        assert!(json.as_object().unwrap().contains_key("lastModified"));
    }

    #[test]
    fn exhausted_page_omits_cursor() {
        let page = ListingPage {
            files: vec![],
            next_cursor: None,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("nextCursor").is_none());
    }
}
