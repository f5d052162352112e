//! Record store for flatrec
//!
//! This crate provides the in-memory reference store used by tests and
//! embedders:
//! - MemoryStore: BTreeMap-based storage behind a single RwLock
//! - Secondary indices (type index, cascade index)
//! - Cascade delete following `DeleteSelf` parent links

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod memory;

pub use index::{CascadeIndex, TypeIndex};
pub use memory::MemoryStore;
