//! Listing controller: the state machine behind the infinite-scroll
//! file table.
//!
//! The controller owns no I/O. It hands out tagged `FetchRequest`s and
//! the embedding UI performs the HTTP call, feeding the outcome back
//! through `complete`. Tagging makes two correctness properties cheap
//! to enforce:
//!
//! - at most one fetch is in flight per prefix, so rapid scrolling can
//!   never append the same page twice;
//! - a completion for a superseded request (the user navigated away or
//!   refreshed) is discarded instead of overwriting current state.
//!
//! Deletes are optimistic: the entry leaves local state immediately and
//! is reinstated at its original position if the server refuses.

use crate::models::listing::{ListingEntry, ListingPage};
use std::collections::HashMap;

/// Controller lifecycle. `Loaded` re-enters `Loading` on prefix change,
/// refresh, or scroll continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// A fetch the UI should perform. `seq` identifies the request
/// generation; `prefix` and `cursor` are passed to the list endpoint
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub prefix: String,
    pub cursor: Option<String>,
}

pub struct ListingController {
    prefix: String,
    entries: Vec<ListingEntry>,
    cursor: Option<String>,
    exhausted: bool,
    phase: Phase,
    in_flight: Option<u64>,
    next_seq: u64,
    pending_deletes: HashMap<String, (usize, ListingEntry)>,
    last_error: Option<String>,
}

impl ListingController {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: Vec::new(),
            cursor: None,
            exhausted: false,
            phase: Phase::Idle,
            in_flight: None,
            next_seq: 0,
            pending_deletes: HashMap::new(),
            last_error: None,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Navigate to a new prefix: accumulated entries and cursor are
    /// discarded and a fresh fetch is issued. Any in-flight request is
    /// superseded; its completion will be ignored on arrival.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> FetchRequest {
        self.prefix = prefix.into();
        self.restart()
    }

    /// External refresh signal: restart the current prefix from empty.
    pub fn refresh(&mut self) -> FetchRequest {
        self.restart()
    }

    /// The viewport neared the end of the list. Issues a continuation
    /// fetch only when loaded, not exhausted, and nothing is in flight.
    pub fn near_end(&mut self) -> Option<FetchRequest> {
        if self.phase != Phase::Loaded || self.in_flight.is_some() || self.exhausted {
            return None;
        }
        let cursor = self.cursor.clone()?;
        Some(self.issue(Some(cursor)))
    }

    /// Re-issue the failed fetch, keeping accumulated entries.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if self.phase != Phase::Failed {
            return None;
        }
        Some(self.issue(self.cursor.clone()))
    }

    /// Feed back the outcome of a fetch. Results for requests that are
    /// no longer current (superseded seq or a different prefix) are
    /// dropped without touching state.
    pub fn complete(&mut self, request: &FetchRequest, outcome: Result<ListingPage, String>) {
        if self.in_flight != Some(request.seq) || request.prefix != self.prefix {
            return;
        }
        self.in_flight = None;
        match outcome {
            Ok(page) => {
                if request.cursor.is_none() {
                    self.entries = page.files;
                } else {
                    self.entries.extend(page.files);
                }
                self.exhausted = page.next_cursor.is_none();
                self.cursor = page.next_cursor;
                self.phase = Phase::Loaded;
                self.last_error = None;
            }
            Err(message) => {
                self.phase = Phase::Failed;
                self.last_error = Some(message);
            }
        }
    }

    /// Optimistically remove `key` from local state, remembering where
    /// it sat. Returns false when the key is not present.
    pub fn delete(&mut self, key: &str) -> bool {
        let Some(position) = self.entries.iter().position(|e| e.key() == key) else {
            return false;
        };
        let entry = self.entries.remove(position);
        self.pending_deletes.insert(key.to_string(), (position, entry));
        true
    }

    /// Server verdict for an optimistic delete. On failure the entry is
    /// reinstated at the position it occupied before removal.
    pub fn resolve_delete(&mut self, key: &str, deleted: bool) {
        let Some((position, entry)) = self.pending_deletes.remove(key) else {
            return;
        };
        if !deleted {
            let position = position.min(self.entries.len());
            self.entries.insert(position, entry);
            self.last_error = Some(format!("failed to delete {key}"));
        }
    }

    fn restart(&mut self) -> FetchRequest {
        self.entries.clear();
        self.cursor = None;
        self.exhausted = false;
        self.pending_deletes.clear();
        self.last_error = None;
        self.issue(None)
    }

    fn issue(&mut self, cursor: Option<String>) -> FetchRequest {
        self.next_seq += 1;
        self.phase = Phase::Loading;
        self.in_flight = Some(self.next_seq);
        FetchRequest {
            seq: self.next_seq,
            prefix: self.prefix.clone(),
            cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(key: &str) -> ListingEntry {
        ListingEntry::File {
            key: key.into(),
            size: 1,
            last_modified: None,
        }
    }

    fn folder(key: &str) -> ListingEntry {
        ListingEntry::Folder { key: key.into() }
    }

    fn page(files: Vec<ListingEntry>, next_cursor: Option<&str>) -> ListingPage {
        ListingPage {
            files,
            next_cursor: next_cursor.map(String::from),
        }
    }

    fn loaded_controller(entries: Vec<ListingEntry>) -> ListingController {
        let mut ctrl = ListingController::new("");
        let req = ctrl.refresh();
        ctrl.complete(&req, Ok(page(entries, None)));
        ctrl
    }

    #[test]
    fn pages_append_until_cursor_is_exhausted() {
        let mut ctrl = ListingController::new("");
        let first = ctrl.refresh();
        assert_eq!(ctrl.phase(), Phase::Loading);

        ctrl.complete(&first, Ok(page(vec![file("a"), file("b")], Some("c1"))));
        assert_eq!(ctrl.phase(), Phase::Loaded);
        assert!(!ctrl.is_exhausted());

        let second = ctrl.near_end().expect("cursor present, fetch expected");
        assert_eq!(second.cursor.as_deref(), Some("c1"));
        ctrl.complete(&second, Ok(page(vec![file("c")], None)));

        let keys: Vec<&str> = ctrl.entries().iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert!(ctrl.is_exhausted());
        assert!(ctrl.near_end().is_none());
    }

    #[test]
    fn at_most_one_fetch_in_flight() {
        let mut ctrl = ListingController::new("");
        let first = ctrl.refresh();
        ctrl.complete(&first, Ok(page(vec![file("a")], Some("c1"))));

        let second = ctrl.near_end().expect("continuation issued");
        // Rapid scrolling: nothing new while `second` is outstanding.
        assert!(ctrl.near_end().is_none());

        ctrl.complete(&second, Ok(page(vec![file("b")], Some("c2"))));
        assert!(ctrl.near_end().is_some());
    }

    #[test]
    fn stale_results_do_not_overwrite_current_prefix() {
        let mut ctrl = ListingController::new("Reports/");
        let stale = ctrl.refresh();

        // User navigates away before the first fetch lands.
        let current = ctrl.set_prefix("Archive/");
        ctrl.complete(&stale, Ok(page(vec![file("Reports/old.pdf")], None)));

        assert!(ctrl.entries().is_empty());
        assert_eq!(ctrl.phase(), Phase::Loading);

        ctrl.complete(&current, Ok(page(vec![file("Archive/new.pdf")], None)));
        assert_eq!(ctrl.entries().len(), 1);
        assert_eq!(ctrl.entries()[0].key(), "Archive/new.pdf");
    }

    #[test]
    fn prefix_change_discards_accumulated_state() {
        let mut ctrl = ListingController::new("");
        let req = ctrl.refresh();
        ctrl.complete(&req, Ok(page(vec![file("a")], Some("c1"))));

        let req = ctrl.set_prefix("Reports/");
        assert!(req.cursor.is_none());
        assert!(ctrl.entries().is_empty());
    }

    #[test]
    fn failed_fetch_offers_retry() {
        let mut ctrl = ListingController::new("");
        let req = ctrl.refresh();
        ctrl.complete(&req, Err("listing failed".into()));

        assert_eq!(ctrl.phase(), Phase::Failed);
        assert_eq!(ctrl.last_error(), Some("listing failed"));
        assert!(ctrl.near_end().is_none());

        let retry = ctrl.retry().expect("retry from failed state");
        ctrl.complete(&retry, Ok(page(vec![file("a")], None)));
        assert_eq!(ctrl.phase(), Phase::Loaded);
        assert!(ctrl.last_error().is_none());
    }

    #[test]
    fn optimistic_delete_commits_on_success() {
        let mut ctrl = loaded_controller(vec![folder("Reports/"), file("a"), file("b")]);

        assert!(ctrl.delete("a"));
        assert_eq!(ctrl.entries().len(), 2);

        ctrl.resolve_delete("a", true);
        assert_eq!(ctrl.entries().len(), 2);
        assert!(ctrl.last_error().is_none());
    }

    #[test]
    fn failed_delete_reinstates_entry_in_place() {
        let mut ctrl = loaded_controller(vec![folder("Reports/"), file("a"), file("b")]);

        assert!(ctrl.delete("a"));
        ctrl.resolve_delete("a", false);

        let keys: Vec<&str> = ctrl.entries().iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["Reports/", "a", "b"]);
        assert!(ctrl.last_error().is_some());
    }

    #[test]
    fn deleting_an_unknown_key_is_a_no_op() {
        let mut ctrl = loaded_controller(vec![file("a")]);
        assert!(!ctrl.delete("missing"));
        assert_eq!(ctrl.entries().len(), 1);
    }
}
