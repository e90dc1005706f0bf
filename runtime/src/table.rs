//! Per-key request status table.
//!
//! The table stores five fields per request type and derives everything else.
//! A key with no entry reads exactly like a key that was never touched.
//!
//! Aggregations come in two flavors:
//! - `any_*`: logical OR over every key the table knows about
//! - `any_of_*`: logical OR over a caller-supplied list of keys
//!
//! Reads are pure; mutators are synchronous and perform no I/O. Publishing
//! changes to subscribers is the store's job, not the table's.

use std::collections::HashMap;

use loading_store_core::{ErrorInstance, RequestError, RequestStatus, RequestType};

/// Recorded status of one request type
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct StatusEntry {
    /// At least one attempt completed
    pub requested: bool,

    /// An attempt is executing
    pub loading: bool,

    /// Succeeded at least once (sticky until reset)
    pub loaded_once: bool,

    /// Failure of the last completed attempt
    pub error: Option<RequestError>,

    /// Failed at least once (sticky until reset)
    pub error_once: bool,
}

impl StatusEntry {
    /// Requested, not loading, and the last attempt did not fail
    #[must_use]
    pub const fn loaded(&self) -> bool {
        self.requested && !self.loading && self.error.is_none()
    }

    /// Snapshot of this entry
    #[must_use]
    pub const fn status(&self) -> RequestStatus {
        RequestStatus {
            requested: self.requested,
            loading: self.loading,
            loaded: self.loaded(),
            loaded_once: self.loaded_once,
            error: self.error.is_some(),
            error_once: self.error_once,
        }
    }
}

/// Status of every request type touched so far
#[derive(Debug, Clone)]
pub struct StatusTable<K: RequestType> {
    entries: HashMap<K, StatusEntry>,
}

impl<K: RequestType> Default for StatusTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RequestType> StatusTable<K> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Entry for a key, if it was ever touched
    #[must_use]
    pub fn entry(&self, key: &K) -> Option<&StatusEntry> {
        self.entries.get(key)
    }

    /// Keys with a recorded entry
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Number of keys with a recorded entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no key was ever touched (or everything was reset)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, key: &K) -> &mut StatusEntry {
        self.entries.entry(key.clone()).or_default()
    }

    fn read<T>(&self, key: &K, f: impl FnOnce(&StatusEntry) -> T) -> Option<T> {
        self.entries.get(key).map(f)
    }

    fn any(&self, f: impl Fn(&StatusEntry) -> bool) -> bool {
        self.entries.values().any(f)
    }

    fn any_of(&self, keys: &[K], f: impl Fn(&StatusEntry) -> bool) -> bool {
        keys.iter()
            .filter_map(|key| self.entries.get(key))
            .any(f)
    }

    // Mutators

    /// Set whether the key completed at least one attempt
    pub fn set_requested(&mut self, key: &K, requested: bool) {
        self.entry_mut(key).requested = requested;
    }

    /// Set whether an attempt for the key is executing
    pub fn set_loading(&mut self, key: &K, loading: bool) {
        self.entry_mut(key).loading = loading;
    }

    /// Set the sticky success flag
    pub fn set_loaded_once(&mut self, key: &K, loaded_once: bool) {
        self.entry_mut(key).loaded_once = loaded_once;
    }

    /// Record or clear the failure of the last attempt
    pub fn set_error(&mut self, key: &K, error: Option<RequestError>) {
        self.entry_mut(key).error = error;
    }

    /// Set the sticky failure flag
    pub fn set_error_once(&mut self, key: &K, error_once: bool) {
        self.entry_mut(key).error_once = error_once;
    }

    /// Apply a successful attempt's outcome in one step
    pub fn record_success(&mut self, key: &K) {
        let entry = self.entry_mut(key);
        entry.requested = true;
        entry.loading = false;
        entry.loaded_once = true;
        entry.error = None;
    }

    /// Apply a failed attempt's outcome in one step
    pub fn record_failure(&mut self, key: &K, error: RequestError) {
        let entry = self.entry_mut(key);
        entry.requested = true;
        entry.loading = false;
        entry.error = Some(error);
        entry.error_once = true;
    }

    /// Clear recorded status
    ///
    /// An empty slice clears the whole table. Otherwise only the listed keys
    /// are cleared and every other key keeps its status.
    pub fn reset(&mut self, keys: &[K]) {
        if keys.is_empty() {
            self.entries.clear();
        } else {
            for key in keys {
                self.entries.remove(key);
            }
        }
    }

    // Per-key reads

    /// At least one attempt completed
    #[must_use]
    pub fn requested(&self, key: &K) -> bool {
        self.read(key, |e| e.requested).unwrap_or(false)
    }

    /// An attempt is executing
    #[must_use]
    pub fn loading(&self, key: &K) -> bool {
        self.read(key, |e| e.loading).unwrap_or(false)
    }

    /// Requested, not loading, and the last attempt did not fail
    #[must_use]
    pub fn loaded(&self, key: &K) -> bool {
        self.read(key, StatusEntry::loaded).unwrap_or(false)
    }

    /// Succeeded at least once
    #[must_use]
    pub fn loaded_once(&self, key: &K) -> bool {
        self.read(key, |e| e.loaded_once).unwrap_or(false)
    }

    /// The last completed attempt failed
    #[must_use]
    pub fn error(&self, key: &K) -> bool {
        self.read(key, |e| e.error.is_some()).unwrap_or(false)
    }

    /// Failed at least once
    #[must_use]
    pub fn error_once(&self, key: &K) -> bool {
        self.read(key, |e| e.error_once).unwrap_or(false)
    }

    /// Recorded failure of the last attempt
    #[must_use]
    pub fn request_error(&self, key: &K) -> Option<&RequestError> {
        self.entries.get(key)?.error.as_ref()
    }

    /// Original failure value of the last attempt
    #[must_use]
    pub fn error_instance(&self, key: &K) -> Option<&ErrorInstance> {
        self.request_error(key).map(|error| &error.instance)
    }

    /// Classification code of the last attempt's failure
    #[must_use]
    pub fn error_code(&self, key: &K) -> Option<i64> {
        self.request_error(key).map(|error| error.code)
    }

    /// Snapshot of one key
    #[must_use]
    pub fn request_status(&self, key: &K) -> RequestStatus {
        self.read(key, StatusEntry::status).unwrap_or_default()
    }

    // Aggregations over all keys

    /// Any key completed an attempt
    #[must_use]
    pub fn any_requested(&self) -> bool {
        self.any(|e| e.requested)
    }

    /// Any key is loading
    #[must_use]
    pub fn any_loading(&self) -> bool {
        self.any(|e| e.loading)
    }

    /// Any key is loaded
    #[must_use]
    pub fn any_loaded(&self) -> bool {
        self.any(StatusEntry::loaded)
    }

    /// Any key succeeded at least once
    #[must_use]
    pub fn any_loaded_once(&self) -> bool {
        self.any(|e| e.loaded_once)
    }

    /// Any key's last attempt failed
    #[must_use]
    pub fn any_error(&self) -> bool {
        self.any(|e| e.error.is_some())
    }

    /// Any key failed at least once
    #[must_use]
    pub fn any_error_once(&self) -> bool {
        self.any(|e| e.error_once)
    }

    /// Aggregate snapshot over all keys
    #[must_use]
    pub fn request_any_status(&self) -> RequestStatus {
        RequestStatus {
            requested: self.any_requested(),
            loading: self.any_loading(),
            loaded: self.any_loaded(),
            loaded_once: self.any_loaded_once(),
            error: self.any_error(),
            error_once: self.any_error_once(),
        }
    }

    // Aggregations over a subset of keys

    /// Any listed key completed an attempt
    #[must_use]
    pub fn any_of_requested(&self, keys: &[K]) -> bool {
        self.any_of(keys, |e| e.requested)
    }

    /// Any listed key is loading
    #[must_use]
    pub fn any_of_loading(&self, keys: &[K]) -> bool {
        self.any_of(keys, |e| e.loading)
    }

    /// Any listed key is loaded
    #[must_use]
    pub fn any_of_loaded(&self, keys: &[K]) -> bool {
        self.any_of(keys, StatusEntry::loaded)
    }

    /// Any listed key succeeded at least once
    #[must_use]
    pub fn any_of_loaded_once(&self, keys: &[K]) -> bool {
        self.any_of(keys, |e| e.loaded_once)
    }

    /// Any listed key's last attempt failed
    #[must_use]
    pub fn any_of_error(&self, keys: &[K]) -> bool {
        self.any_of(keys, |e| e.error.is_some())
    }

    /// Any listed key failed at least once
    #[must_use]
    pub fn any_of_error_once(&self, keys: &[K]) -> bool {
        self.any_of(keys, |e| e.error_once)
    }

    /// Aggregate snapshot over the listed keys
    #[must_use]
    pub fn request_any_of_status(&self, keys: &[K]) -> RequestStatus {
        RequestStatus {
            requested: self.any_of_requested(keys),
            loading: self.any_of_loading(keys),
            loaded: self.any_of_loaded(keys),
            loaded_once: self.any_of_loaded_once(keys),
            error: self.any_of_error(keys),
            error_once: self.any_of_error_once(keys),
        }
    }
}
