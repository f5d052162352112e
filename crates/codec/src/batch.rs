//! Write batch keyed by identifier
//!
//! [`RecordBatch`] is the default [`BatchCollector`]: it keeps records in
//! registration order and replaces, rather than appends, a record whose
//! identifier was already registered. The replaced record keeps the position
//! of its first registration.

use flatrec_core::{BatchCollector, Identifier, Record};
use rustc_hash::FxHashMap;

/// Ordered, de-duplicated set of records produced by encode passes
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    records: Vec<Record>,
    index: FxHashMap<Identifier, usize>,
}

impl RecordBatch {
    /// Empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing was registered
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by identifier
    pub fn get(&self, id: &Identifier) -> Option<&Record> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    /// True if a record with this identifier was registered
    pub fn contains(&self, id: &Identifier) -> bool {
        self.index.contains_key(id)
    }

    /// Records in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Identifiers in registration order
    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.records.iter().map(Record::id)
    }

    /// Remove a record; later records move up one position
    pub fn remove(&mut self, id: &Identifier) -> Option<Record> {
        let pos = self.index.remove(id)?;
        let record = self.records.remove(pos);
        for later in self.index.values_mut() {
            if *later > pos {
                *later -= 1;
            }
        }
        Some(record)
    }

    /// Take the records out, in registration order
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl BatchCollector for RecordBatch {
    fn register(&mut self, record: Record) {
        match self.index.get(record.id()) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.index.insert(record.id().clone(), self.records.len());
                self.records.push(record);
            }
        }
    }
}

impl IntoIterator for RecordBatch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordBatch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
