//! Persisted store layer.
//!
//! Each store is a plain record kept in memory and mirrored to a
//! [`SnapshotStorage`] key as JSON. The in-memory copy is authoritative: a
//! missing or unreadable snapshot starts the store from its default, and a
//! failed write is logged and otherwise ignored.
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::SnapshotStorage;
use crate::constants::{
    STORE_KEY_HINTS, STORE_KEY_INVENTORY, STORE_KEY_PROGRESSION, STORE_KEY_UI_FLAGS,
};
use crate::flags::{HintUsage, UiFlags};
use crate::inventory::Inventory;
use crate::progression::ProgressionState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot for {key} could not be encoded: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("snapshot for {key} is corrupt: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("snapshot for {key} parsed but breaks its invariants")]
    Inconsistent { key: &'static str },
    #[error("snapshot transport failed for {key}: {message}")]
    Transport { key: &'static str, message: String },
}

/// A record that can be mirrored to storage.
///
/// `is_consistent` is checked after a snapshot parses; a record that fails it
/// is treated like a corrupt one.
pub trait SnapshotRecord: Serialize + DeserializeOwned + Default + Clone + PartialEq {
    fn is_consistent(&self) -> bool {
        true
    }
}

impl SnapshotRecord for ProgressionState {}

impl SnapshotRecord for HintUsage {}

impl SnapshotRecord for UiFlags {}

impl SnapshotRecord for Inventory {
    fn is_consistent(&self) -> bool {
        self.is_well_formed()
    }
}

/// A record plus the storage key it is mirrored under.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedStore<T> {
    key: &'static str,
    state: T,
}

impl<T: SnapshotRecord> PersistedStore<T> {
    /// In-memory store that has not been read from storage.
    #[must_use]
    pub fn detached(key: &'static str) -> Self {
        Self {
            key,
            state: T::default(),
        }
    }

    /// Read the snapshot under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] when storage cannot be read,
    /// [`StoreError::Decode`] when the snapshot does not parse and
    /// [`StoreError::Inconsistent`] when it parses into an invalid record.
    pub fn read_snapshot<S: SnapshotStorage>(
        key: &'static str,
        storage: &S,
    ) -> Result<Option<T>, StoreError> {
        let raw = storage.read(key).map_err(|e| StoreError::Transport {
            key,
            message: e.to_string(),
        })?;
        let Some(json) = raw else {
            return Ok(None);
        };
        let state: T =
            serde_json::from_str(&json).map_err(|source| StoreError::Decode { key, source })?;
        if !state.is_consistent() {
            return Err(StoreError::Inconsistent { key });
        }
        Ok(Some(state))
    }

    /// Restore from storage, falling back to the default record.
    pub fn load<S: SnapshotStorage>(key: &'static str, storage: &S) -> Self {
        let state = match Self::read_snapshot(key, storage) {
            Ok(Some(state)) => state,
            Ok(None) => T::default(),
            Err(err) => {
                log::warn!("{err}; starting from a fresh record");
                T::default()
            }
        };
        Self { key, state }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub const fn get(&self) -> &T {
        &self.state
    }

    /// Write the current record to storage.
    ///
    /// # Errors
    ///
    /// Returns an error when the record cannot be encoded or written.
    pub fn save<S: SnapshotStorage>(&self, storage: &S) -> Result<(), StoreError> {
        let key = self.key;
        let json = serde_json::to_string(&self.state)
            .map_err(|source| StoreError::Encode { key, source })?;
        storage.write(key, &json).map_err(|e| StoreError::Transport {
            key,
            message: e.to_string(),
        })
    }

    /// Swap in a new record and persist it. Unchanged records are not written.
    pub fn replace<S: SnapshotStorage>(&mut self, storage: &S, next: T) {
        if next == self.state {
            return;
        }
        self.state = next;
        if let Err(err) = self.save(storage) {
            log::warn!("{err}; keeping in-memory state");
        }
    }

    /// Copy-on-write mutation: `f` edits a clone which then replaces the
    /// record as a whole.
    pub fn update<S, R>(&mut self, storage: &S, f: impl FnOnce(&mut T) -> R) -> R
    where
        S: SnapshotStorage,
    {
        let mut next = self.state.clone();
        let out = f(&mut next);
        self.replace(storage, next);
        out
    }

    /// Drop the record and its snapshot.
    pub fn clear<S: SnapshotStorage>(&mut self, storage: &S) {
        self.state = T::default();
        if let Err(err) = storage.remove(self.key) {
            log::warn!("snapshot for {} could not be removed: {err}", self.key);
        }
    }
}

/// The four persisted records a session owns.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStores {
    pub progression: PersistedStore<ProgressionState>,
    pub inventory: PersistedStore<Inventory>,
    pub hints: PersistedStore<HintUsage>,
    pub ui_flags: PersistedStore<UiFlags>,
}

impl GameStores {
    pub fn load<S: SnapshotStorage>(storage: &S) -> Self {
        Self {
            progression: PersistedStore::load(STORE_KEY_PROGRESSION, storage),
            inventory: PersistedStore::load(STORE_KEY_INVENTORY, storage),
            hints: PersistedStore::load(STORE_KEY_HINTS, storage),
            ui_flags: PersistedStore::load(STORE_KEY_UI_FLAGS, storage),
        }
    }

    #[must_use]
    pub fn detached() -> Self {
        Self {
            progression: PersistedStore::detached(STORE_KEY_PROGRESSION),
            inventory: PersistedStore::detached(STORE_KEY_INVENTORY),
            hints: PersistedStore::detached(STORE_KEY_HINTS),
            ui_flags: PersistedStore::detached(STORE_KEY_UI_FLAGS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{RaftPieceId, StepId};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Debug, Error)]
    #[error("storage offline")]
    struct Offline;

    #[derive(Clone, Default)]
    struct MemoryStorage {
        entries: Rc<RefCell<HashMap<String, String>>>,
        offline: bool,
    }

    impl SnapshotStorage for MemoryStorage {
        type Error = Offline;

        fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
            if self.offline {
                return Err(Offline);
            }
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
            if self.offline {
                return Err(Offline);
            }
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), Self::Error> {
            self.entries.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn update_writes_snapshot() {
        let storage = MemoryStorage::default();
        let mut store: PersistedStore<Inventory> =
            PersistedStore::load(STORE_KEY_INVENTORY, &storage);
        let added = store.update(&storage, |inv| inv.add_piece(RaftPieceId::from("p1")));
        assert!(added);
        let raw = storage.entries.borrow().get(STORE_KEY_INVENTORY).cloned().unwrap();
        assert!(raw.contains("\"p1\""));

        let restored: PersistedStore<Inventory> =
            PersistedStore::load(STORE_KEY_INVENTORY, &storage);
        assert_eq!(restored.get(), store.get());
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_default() {
        let storage = MemoryStorage::default();
        storage
            .entries
            .borrow_mut()
            .insert(STORE_KEY_PROGRESSION.to_string(), "{not json".to_string());
        assert!(matches!(
            PersistedStore::<ProgressionState>::read_snapshot(STORE_KEY_PROGRESSION, &storage),
            Err(StoreError::Decode { .. })
        ));
        let store: PersistedStore<ProgressionState> =
            PersistedStore::load(STORE_KEY_PROGRESSION, &storage);
        assert_eq!(store.get(), &ProgressionState::default());
    }

    #[test]
    fn inconsistent_inventory_is_replaced() {
        let storage = MemoryStorage::default();
        storage.entries.borrow_mut().insert(
            STORE_KEY_INVENTORY.to_string(),
            r#"{"collected_pieces":["a","b","c"],"fused_pieces":["fused-1"],"fused_count":0}"#
                .to_string(),
        );
        assert!(matches!(
            PersistedStore::<Inventory>::read_snapshot(STORE_KEY_INVENTORY, &storage),
            Err(StoreError::Inconsistent { .. })
        ));
        let store: PersistedStore<Inventory> =
            PersistedStore::load(STORE_KEY_INVENTORY, &storage);
        assert_eq!(store.get(), &Inventory::default());
    }

    #[test]
    fn failed_write_keeps_memory_state() {
        let storage = MemoryStorage {
            offline: true,
            ..MemoryStorage::default()
        };
        let mut store: PersistedStore<HintUsage> = PersistedStore::load(STORE_KEY_HINTS, &storage);
        store.update(&storage, |h| h.mark_hint_as_used(StepId::from("mission-1-step-1")));
        assert!(store.get().is_hint_used("mission-1-step-1"));
        assert!(storage.entries.borrow().is_empty());
    }

    #[test]
    fn clear_removes_snapshot() {
        let storage = MemoryStorage::default();
        let mut stores = GameStores::load(&storage);
        stores
            .ui_flags
            .update(&storage, UiFlags::mark_raft_as_viewed);
        assert!(storage.entries.borrow().contains_key(STORE_KEY_UI_FLAGS));
        stores.ui_flags.clear(&storage);
        assert!(!storage.entries.borrow().contains_key(STORE_KEY_UI_FLAGS));
        assert!(!stores.ui_flags.get().raft_viewed);
    }
}
