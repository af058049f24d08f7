//! In-process document store.
//!
//! Mirrors the MongoDB backend's observable behavior (null/absent matching,
//! implicit `_id_` index, absence errors on drop) and counts every call so
//! callers can assert what a run did and did not touch.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tourney_core::index::{index_name, IndexKey};
use tourney_core::maintenance::ID_INDEX_NAME;
use tourney_core::selector::Selector;
use tourney_core::types::Document;

use crate::error::StoreError;
use crate::store::{validate_uri, ConnectOptions, DocumentStore, StoreConnector};

/// Per-operation call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub find_calls: usize,
    pub delete_calls: usize,
    pub list_index_calls: usize,
    pub drop_index_calls: usize,
    pub disconnects: usize,
}

impl MemoryStats {
    /// Calls that read or changed collection data.
    pub fn data_calls(&self) -> usize {
        self.find_calls + self.delete_calls + self.list_index_calls + self.drop_index_calls
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: BTreeMap<String, Vec<Document>>,
    indexes: BTreeMap<String, BTreeSet<String>>,
    stats: MemoryStats,
    failure: Option<String>,
}

impl MemoryState {
    fn ensure_collection(&mut self, collection: &str) {
        self.collections.entry(collection.to_string()).or_default();
        self.indexes
            .entry(collection.to_string())
            .or_default()
            .insert(ID_INDEX_NAME.to_string());
    }

    fn check_failure(&self, collection: &str) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::operation(collection, message)),
            None => Ok(()),
        }
    }
}

/// Shared handle to an in-process store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append documents to a collection, creating it if needed.
    pub fn insert_many(&self, collection: &str, docs: impl IntoIterator<Item = Document>) {
        let mut state = self.lock();
        state.ensure_collection(collection);
        if let Some(existing) = state.collections.get_mut(collection) {
            existing.extend(docs);
        }
    }

    /// Create an index for the key pattern, returning its default name.
    pub fn create_index(&self, collection: &str, keys: &[IndexKey]) -> String {
        let name = index_name(keys);
        self.create_named_index(collection, &name);
        name
    }

    /// Create an index under an explicit name (custom, text, geospatial...).
    pub fn create_named_index(&self, collection: &str, name: &str) {
        let mut state = self.lock();
        state.ensure_collection(collection);
        if let Some(indexes) = state.indexes.get_mut(collection) {
            indexes.insert(name.to_string());
        }
    }

    /// Snapshot of a collection's documents.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every subsequent data operation fail with `message`.
    pub fn fail_operations_with(&self, message: impl Into<String>) {
        self.lock().failure = Some(message.into());
    }

    pub fn stats(&self) -> MemoryStats {
        self.lock().stats
    }
}

impl DocumentStore for MemoryStore {
    async fn find_matching(
        &self,
        collection: &str,
        selector: &Selector,
    ) -> Result<Vec<Document>, StoreError> {
        selector.validate()?;
        let mut state = self.lock();
        state.stats.find_calls += 1;
        state.check_failure(collection)?;
        Ok(state
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| selector.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_matching(
        &self,
        collection: &str,
        selector: &Selector,
    ) -> Result<u64, StoreError> {
        selector.validate()?;
        let mut state = self.lock();
        state.stats.delete_calls += 1;
        state.check_failure(collection)?;
        let Some(docs) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !selector.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn list_index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let mut state = self.lock();
        state.stats.list_index_calls += 1;
        state.check_failure(collection)?;
        Ok(state
            .indexes
            .get(collection)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn drop_index(&self, collection: &str, index: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.stats.drop_index_calls += 1;
        state.check_failure(collection)?;
        let removed = state
            .indexes
            .get_mut(collection)
            .is_some_and(|names| names.remove(index));
        if removed {
            Ok(())
        } else {
            Err(StoreError::IndexNotFound {
                collection: collection.to_string(),
                index: index.to_string(),
            })
        }
    }

    async fn disconnect(self) {
        self.lock().stats.disconnects += 1;
    }
}

/// Hands out clones of one [`MemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    store: MemoryStore,
    unreachable: bool,
    attempts: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            unreachable: false,
            attempts: Arc::default(),
        }
    }

    /// A connector whose every attempt fails as if the server were down.
    pub fn unreachable(store: MemoryStore) -> Self {
        Self {
            unreachable: true,
            ..Self::new(store)
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl StoreConnector for MemoryConnector {
    type Store = MemoryStore;

    async fn connect(&self, options: &ConnectOptions) -> Result<MemoryStore, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        validate_uri(&options.uri)?;
        if self.unreachable {
            return Err(StoreError::Connection(format!(
                "Server selection timed out after {}s",
                options.server_selection_timeout.as_secs()
            )));
        }
        Ok(self.store.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
