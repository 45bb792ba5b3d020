//! Update history: most-recent-first, unique by id, write-through to the store.
//!
//! The snapshot is an `Arc<Vec<Update>>` that is swapped whole on every
//! mutation, so readers never observe a partially applied change.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::normalizer::normalize_update;
use crate::store::{KeyValueStore, HISTORY_KEY};
use crate::types::Update;

pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    snapshot: Mutex<Arc<Vec<Update>>>,
}

impl HistoryStore {
    /// Load persisted history. Missing, unreadable, or corrupt data yields an
    /// empty history.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.read(HISTORY_KEY) {
            Ok(Some(raw)) => decode_history(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("History unavailable, starting empty: {}", e);
                Vec::new()
            }
        };
        log::debug!("Loaded {} stored updates", entries.len());
        Self {
            store,
            snapshot: Mutex::new(Arc::new(entries)),
        }
    }

    /// Latest committed snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Update>> {
        self.snapshot.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Update> {
        self.snapshot().iter().find(|u| u.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Replace the entry with the same id in place, or prepend a new one.
    /// Persists and returns the new snapshot.
    ///
    /// The write happens under the snapshot lock so the stored history never
    /// lags behind a newer in-memory snapshot.
    pub fn upsert(&self, update: Update) -> Arc<Vec<Update>> {
        let mut guard = self.snapshot.lock();
        let next = Arc::new(upsert_into(&guard, update));
        *guard = next.clone();
        self.save(&next);
        next
    }

    /// Best-effort write-through. An empty snapshot is never written so an
    /// empty session cannot clobber a previously stored history.
    pub fn save(&self, snapshot: &[Update]) {
        if snapshot.is_empty() {
            return;
        }
        let encoded = match serde_json::to_string(snapshot) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("Failed to encode history: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.write(HISTORY_KEY, &encoded) {
            log::warn!("Failed to persist history: {}", e);
        }
    }

    /// Drop every entry and remove the stored key.
    pub fn clear(&self) {
        let mut guard = self.snapshot.lock();
        *guard = Arc::new(Vec::new());
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            log::warn!("Failed to remove stored history: {}", e);
        }
    }
}

/// Pure merge rule: same id replaces at its position, new id goes first.
pub fn upsert_into(entries: &[Update], update: Update) -> Vec<Update> {
    match entries.iter().position(|u| u.id == update.id) {
        Some(index) => {
            let mut next = entries.to_vec();
            next[index] = update;
            next
        }
        None => {
            let mut next = Vec::with_capacity(entries.len() + 1);
            next.push(update);
            next.extend_from_slice(entries);
            next
        }
    }
}

/// Decode a stored history. Non-array data yields an empty history; each
/// element goes through the normalizer so older or hand-edited entries still
/// load with every field present.
pub fn decode_history(raw: &str) -> Vec<Update> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| normalize_update(item, ""))
            .collect(),
        Ok(_) => {
            log::warn!("Stored history is not a list, ignoring");
            Vec::new()
        }
        Err(e) => {
            log::warn!("Stored history is corrupt, ignoring: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn update(id: &str, project: &str) -> Update {
        normalize_update(
            &json!({"update_id": id, "generated_at": "2026-02-24T10:30:00Z", "project_name": project}),
            "",
        )
    }

    #[test]
    fn test_upsert_new_id_is_prepended() {
        let entries = vec![update("a", "A"), update("b", "B")];
        let next = upsert_into(&entries, update("c", "C"));
        let ids: Vec<&str> = next.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_upsert_existing_id_keeps_position_and_length() {
        let entries = vec![update("a", "A"), update("b", "B"), update("c", "C")];
        let next = upsert_into(&entries, update("b", "B2"));
        assert_eq!(next.len(), 3);
        assert_eq!(next[1].id, "b");
        assert_eq!(next[1].project_name, "B2");
        assert_eq!(next[0], entries[0]);
        assert_eq!(next[2], entries[2]);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let entries = vec![update("a", "A"), update("b", "B")];
        let once = upsert_into(&entries, update("a", "A1"));
        let twice = upsert_into(&once, update("a", "A1"));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_load_ignores_corrupt_and_non_list_data() {
        for raw in ["{not json", "{\"update_id\":\"x\"}", "42"] {
            let store = Arc::new(MemoryStore::with_entry(HISTORY_KEY, raw));
            assert!(HistoryStore::load(store).is_empty(), "raw: {raw}");
        }
    }

    #[test]
    fn test_load_survives_failing_store() {
        let store = Arc::new(MemoryStore::with_entry(HISTORY_KEY, "[]"));
        store.set_failing(true);
        let history = HistoryStore::load(store);
        assert!(history.is_empty());
    }

    #[test]
    fn test_upsert_writes_through() {
        let store = Arc::new(MemoryStore::new());
        let history = HistoryStore::load(store.clone());
        history.upsert(update("a", "A"));

        let reloaded = HistoryStore::load(store);
        assert_eq!(reloaded.snapshot().as_slice(), history.snapshot().as_slice());
    }

    #[test]
    fn test_empty_snapshot_is_never_written() {
        let store = Arc::new(MemoryStore::with_entry(HISTORY_KEY, "[{\"update_id\":\"keep\"}]"));
        let history = HistoryStore::load(store.clone());
        history.save(&[]);
        assert_eq!(
            store.peek(HISTORY_KEY).as_deref(),
            Some("[{\"update_id\":\"keep\"}]")
        );
    }

    #[test]
    fn test_write_failure_keeps_memory_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let history = HistoryStore::load(store.clone());
        store.set_failing(true);
        let snapshot = history.upsert(update("a", "A"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(history.get("a").map(|u| u.project_name), Some("A".to_string()));
    }

    #[test]
    fn test_clear_removes_stored_key() {
        let store = Arc::new(MemoryStore::new());
        let history = HistoryStore::load(store.clone());
        history.upsert(update("a", "A"));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(store.peek(HISTORY_KEY), None);
    }

    #[test]
    fn test_concurrent_upserts_persist_latest_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let history = Arc::new(HistoryStore::load(store.clone()));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let history = history.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        history.upsert(update(&format!("t{t}-{i}"), "P"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("upsert thread");
        }

        let stored = decode_history(&store.peek(HISTORY_KEY).expect("history stored"));
        assert_eq!(stored.len(), 200);
        assert_eq!(stored.as_slice(), history.snapshot().as_slice());
    }

    #[test]
    fn test_previous_snapshot_is_not_mutated() {
        let history = HistoryStore::load(Arc::new(MemoryStore::new()));
        history.upsert(update("a", "A"));
        let before = history.snapshot();
        history.upsert(update("a", "A2"));
        assert_eq!(before[0].project_name, "A");
        assert_eq!(history.snapshot()[0].project_name, "A2");
    }
}
