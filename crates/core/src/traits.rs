//! Collaborator traits
//!
//! The codec never talks to a store directly. It consumes two narrow
//! interfaces instead:
//!
//! - [`FetchContext`]: resolves an identifier to its record during decode
//! - [`BatchCollector`]: receives the records produced by one encode pass

use crate::error::FetchError;
use crate::identifier::Identifier;
use crate::record::Record;

/// Resolves identifiers to records during a decode pass
///
/// `fetch` may block on disk or network I/O. The decoder calls it strictly in
/// field-declaration order and never concurrently.
///
/// Implementations must report a missing record as [`FetchError::NotFound`]
/// so optional references can decode to `None`.
pub trait FetchContext {
    /// Fetch one record
    ///
    /// # Errors
    ///
    /// `NotFound` if the store has no such record, `Transport` for anything else.
    fn fetch(&self, id: &Identifier) -> Result<Record, FetchError>;
}

impl<F: FetchContext + ?Sized> FetchContext for &F {
    fn fetch(&self, id: &Identifier) -> Result<Record, FetchError> {
        (**self).fetch(id)
    }
}

/// Fetch context backed by a closure
pub struct FetchFn<F>(F);

/// Wrap a closure as a [`FetchContext`]
///
/// # Example
///
/// ```
/// use flatrec_core::{fetch_fn, FetchContext, FetchError, Identifier};
///
/// let empty = fetch_fn(|id: &Identifier| Err(FetchError::NotFound(id.clone())));
/// assert!(empty.fetch(&Identifier::new("Person", "001")).is_err());
/// ```
pub fn fetch_fn<F>(f: F) -> FetchFn<F>
where
    F: Fn(&Identifier) -> Result<Record, FetchError>,
{
    FetchFn(f)
}

impl<F> FetchContext for FetchFn<F>
where
    F: Fn(&Identifier) -> Result<Record, FetchError>,
{
    fn fetch(&self, id: &Identifier) -> Result<Record, FetchError> {
        (self.0)(id)
    }
}

/// Receives records produced by an encode pass
///
/// Registering a record whose identifier was already registered replaces the
/// earlier one rather than adding a second entry.
pub trait BatchCollector {
    /// Register one finished record
    fn register(&mut self, record: Record);
}

impl<C: BatchCollector + ?Sized> BatchCollector for &mut C {
    fn register(&mut self, record: Record) {
        (**self).register(record)
    }
}
