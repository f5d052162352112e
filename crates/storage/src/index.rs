//! Secondary indices kept alongside the record map
//!
//! - TypeIndex: record type → identifiers, for type-scoped scans
//! - CascadeIndex: parent identifier → records that are deleted with it
//!
//! Both are updated under the same write lock as the records themselves.

use flatrec_core::{Identifier, Record, ReferenceAction};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Secondary index: record type → identifiers
#[derive(Debug, Default)]
pub struct TypeIndex {
    index: FxHashMap<String, BTreeSet<Identifier>>,
}

impl TypeIndex {
    /// Create a new empty TypeIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier under its record type
    pub fn insert(&mut self, id: &Identifier) {
        self.index
            .entry(id.record_type().to_string())
            .or_default()
            .insert(id.clone());
    }

    /// Remove an identifier; empty type entries are dropped
    pub fn remove(&mut self, id: &Identifier) {
        if let Some(ids) = self.index.get_mut(id.record_type()) {
            ids.remove(id);
            if ids.is_empty() {
                self.index.remove(id.record_type());
            }
        }
    }

    /// Identifiers of one record type, in order
    pub fn get(&self, record_type: &str) -> Option<&BTreeSet<Identifier>> {
        self.index.get(record_type)
    }

    /// Number of record types present
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if no record is indexed
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Secondary index: parent → cascade children
///
/// Only parent links with [`ReferenceAction::DeleteSelf`] are indexed.
#[derive(Debug, Default)]
pub struct CascadeIndex {
    index: FxHashMap<Identifier, BTreeSet<Identifier>>,
}

impl CascadeIndex {
    /// Create a new empty CascadeIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the record's parent link, if it cascades
    pub fn insert(&mut self, record: &Record) {
        if let Some(parent) = cascade_parent(record) {
            self.index
                .entry(parent.clone())
                .or_default()
                .insert(record.id().clone());
        }
    }

    /// Drop the record's parent link, if it cascades
    pub fn remove(&mut self, record: &Record) {
        if let Some(parent) = cascade_parent(record) {
            if let Some(children) = self.index.get_mut(parent) {
                children.remove(record.id());
                if children.is_empty() {
                    self.index.remove(parent);
                }
            }
        }
    }

    /// Records deleted together with `parent`
    pub fn children(&self, parent: &Identifier) -> impl Iterator<Item = &Identifier> {
        self.index.get(parent).into_iter().flatten()
    }

    /// Number of parents with cascade children
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if no cascade link is indexed
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn cascade_parent(record: &Record) -> Option<&Identifier> {
    record
        .parent()
        .filter(|p| p.action == ReferenceAction::DeleteSelf)
        .map(|p| &p.identifier)
}
