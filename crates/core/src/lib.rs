//! Core types for flatrec
//!
//! This crate defines the flat record model shared by the codec and by
//! record stores:
//! - Identifier: (record type, name) pair naming one record
//! - Identity: conversion between application ids and identifiers
//! - Value: every shape a record field can hold (the wire contract)
//! - Record: flat, identity-tagged field map
//! - Reference, Asset, GeoPoint: special value payloads
//! - FieldPath: location of a value inside an encoded tree
//! - Error types: EncodeError, DecodeError, FetchError
//! - Traits: FetchContext, BatchCollector (store collaborators)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod identifier;
pub mod path;
pub mod record;
pub mod traits;
pub mod value;

pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult, FetchError};
pub use identifier::{Identifier, IdentifierError, Identity};
pub use path::{FieldPath, PathSegment};
pub use record::{Asset, GeoPoint, Record, Reference, ReferenceAction};
pub use traits::{fetch_fn, BatchCollector, FetchContext, FetchFn};
pub use value::Value;
