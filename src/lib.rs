//! flatrec - flat keyed records from recursively structured values
//!
//! flatrec converts an application value (a tree of named fields whose leaves
//! are scalars, embedded composites or collections) into flat records, one per
//! identified composite, linked by references. Decoding walks the same shape
//! back, fetching referenced records from a store on demand.
//!
//! # Quick Start
//!
//! ```
//! use flatrec::{decode, encode, recordable, CodecOptions, Identifier, MemoryStore};
//!
//! #[derive(Debug, PartialEq)]
//! struct Person {
//!     id: String,
//!     name: String,
//!     friends: Vec<Person>,
//! }
//!
//! recordable! { Person as "Person" { id, name, friends } }
//!
//! let alice = Person {
//!     id: "001".into(),
//!     name: "Alice".into(),
//!     friends: vec![Person { id: "002".into(), name: "Bob".into(), friends: vec![] }],
//! };
//!
//! let options = CodecOptions::default();
//! let mut store = MemoryStore::new();
//! let root = encode(&alice, &mut store, &options)?;
//! assert_eq!(store.len(), 2);
//!
//! let record = store.get(&root).unwrap();
//! let back: Person = decode(&record, &store, &options)?;
//! assert_eq!(back, alice);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - `flatrec-core`: identifiers, records, values, errors, collaborator traits
//! - `flatrec-codec`: classifier, container stack, encode/decode engines, options
//! - `flatrec-storage`: in-memory store implementing both collaborator traits

pub use flatrec_codec::*;
pub use flatrec_codec::recordable;
pub use flatrec_core::{
    fetch_fn, Asset, FetchFn, GeoPoint, IdentifierError, PathSegment, ReferenceAction,
};
pub use flatrec_storage::MemoryStore;
