//! Field wrappers that pick a classification other than the inner type's
//!
//! - [`Blob`]: bytes stored as one binary value instead of a list of integers
//! - [`Ref`]: an [`Identity`](flatrec_core::Identity) stored as a bare reference
//! - [`Plain`]: any serde value without identity, flattened through its
//!   generic tree form

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Binary blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    /// Take the bytes out
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Identity stored as a reference; decoding never fetches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref<T>(pub T);

impl<T> Ref<T> {
    /// Take the identity out
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Ref<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Serde value flattened through its generic tree form
///
/// Scalars and lists of scalars flatten; anything map- or struct-shaped has
/// no flat representation and fails to encode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plain<T>(pub T);

impl<T> Plain<T> {
    /// Take the value out
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Plain<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Plain<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
