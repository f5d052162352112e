//! MemoryStore: in-memory record store
//!
//! Implements both collaborator traits of the codec:
//! - [`FetchContext`]: decode passes resolve references against it
//! - [`BatchCollector`]: encode passes can write straight into it
//!
//! # Design Notes
//!
//! - `BTreeMap<Identifier, Record>` so iteration is ordered by type, then name
//! - One `parking_lot::RwLock` over records and indices; a batch is applied
//!   under a single write lock, so readers see all of it or none of it
//! - `AtomicU64` fetch counter, read by tests to check that no fetch happened

use crate::index::{CascadeIndex, TypeIndex};
use flatrec_core::{BatchCollector, FetchContext, FetchError, Identifier, Record};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<Identifier, Record>,
    types: TypeIndex,
    cascades: CascadeIndex,
}

impl Inner {
    fn insert(&mut self, record: Record) -> Option<Record> {
        let id = record.id().clone();
        let previous = self.records.remove(&id);
        if let Some(old) = &previous {
            self.cascades.remove(old);
        }
        self.types.insert(&id);
        self.cascades.insert(&record);
        self.records.insert(id, record);
        previous
    }

    fn remove(&mut self, id: &Identifier) -> Option<Record> {
        let record = self.records.remove(id)?;
        self.types.remove(id);
        self.cascades.remove(&record);
        Some(record)
    }
}

/// Thread-safe in-memory record store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    fetches: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one record
    ///
    /// Returns the record previously stored under the same identifier.
    pub fn insert(&self, record: Record) -> Option<Record> {
        self.inner.write().insert(record)
    }

    /// Clone of the stored record
    pub fn get(&self, id: &Identifier) -> Option<Record> {
        self.inner.read().records.get(id).cloned()
    }

    /// True if a record with this identifier is stored
    pub fn contains(&self, id: &Identifier) -> bool {
        self.inner.read().records.contains_key(id)
    }

    /// Remove one record, leaving records that reference it alone
    pub fn remove(&self, id: &Identifier) -> Option<Record> {
        self.inner.write().remove(id)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// All records of one type, ordered by name
    pub fn scan_by_type(&self, record_type: &str) -> Vec<Record> {
        let inner = self.inner.read();
        inner
            .types
            .get(record_type)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.records.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Write every record of a batch under one lock
    ///
    /// Returns the number of records written.
    pub fn apply(&self, batch: impl IntoIterator<Item = Record>) -> usize {
        let mut inner = self.inner.write();
        let mut written = 0;
        for record in batch {
            inner.insert(record);
            written += 1;
        }
        debug!(target: "flatrec::store", records = written, "Batch applied");
        written
    }

    /// Remove a record and, transitively, every record whose parent link
    /// cascades from a removed record
    ///
    /// Returns the removed identifiers, the requested one first. Nothing is
    /// removed if `id` is not stored.
    pub fn delete_cascade(&self, id: &Identifier) -> Vec<Identifier> {
        let mut inner = self.inner.write();
        let mut removed = Vec::new();
        let mut pending = vec![id.clone()];
        while let Some(next) = pending.pop() {
            let children: Vec<Identifier> = inner.cascades.children(&next).cloned().collect();
            if inner.remove(&next).is_some() {
                removed.push(next);
                pending.extend(children);
            }
        }
        debug!(target: "flatrec::store", root = %id, removed = removed.len(), "Cascade delete");
        removed
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl FetchContext for MemoryStore {
    fn fetch(&self, id: &Identifier) -> Result<Record, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        trace!(target: "flatrec::store", id = %id, "Fetch");
        self.get(id).ok_or_else(|| FetchError::NotFound(id.clone()))
    }
}

impl BatchCollector for MemoryStore {
    fn register(&mut self, record: Record) {
        self.inner.get_mut().insert(record);
    }
}
