//! Decode engine
//!
//! Rebuilds a [`Recordable`] value from its root record. Fields are requested
//! in declaration order by [`Recordable::decode_fields`]; each one is read
//! through a single-value slot pushed on the container stack, lists through a
//! cursor frame.
//!
//! Composite references are resolved with the [`FetchContext`]. The fetch is
//! a blocking call made in field order, and the fetched record is decoded on a
//! fresh stack before the next field is requested. The chain of records being
//! decoded is tracked so a reference back into the chain fails with
//! `CycleDetected` instead of recursing forever.

use crate::field::Field;
use crate::native::Mismatch;
use crate::options::CodecOptions;
use crate::recordable::Recordable;
use crate::stack::ContainerStack;
use flatrec_core::{
    DecodeError, DecodeResult, FetchContext, FieldPath, Identifier, Record, Reference, Value,
};
use tracing::{debug, trace, warn};

#[derive(Debug)]
enum DecodeFrame<'r> {
    Record(&'r Record),
    Slot(Option<&'r Value>),
    List { items: &'r [Value], cursor: usize },
}

/// State of one record's decode
///
/// Handed to [`Recordable::decode_fields`] and [`Field::decode`]. Inside
/// [`Field::decode`] the current slot holds the stored value of the field
/// being decoded, if any.
pub struct Decoder<'s, 'r> {
    fetch: &'s dyn FetchContext,
    options: &'s CodecOptions,
    ancestors: Vec<Identifier>,
    stack: ContainerStack<DecodeFrame<'r>>,
    path: FieldPath,
    record: &'r Record,
}

impl<'s, 'r> Decoder<'s, 'r> {
    fn new(
        fetch: &'s dyn FetchContext,
        options: &'s CodecOptions,
        mut ancestors: Vec<Identifier>,
        path: FieldPath,
        record: &'r Record,
    ) -> Self {
        ancestors.push(record.id().clone());
        Self {
            fetch,
            options,
            ancestors,
            stack: ContainerStack::new(),
            path,
            record,
        }
    }

    /// Options of the running pass
    pub fn options(&self) -> &CodecOptions {
        self.options
    }

    /// Path of the value being decoded
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Identifier of the record being decoded
    pub fn record_id(&self) -> &Identifier {
        self.record.id()
    }

    /// Decode one named field of the current record
    ///
    /// The identity field is synthesized from the record's identifier;
    /// anything else is read from the stored fields. Extra stored fields are
    /// never looked at.
    pub fn field<T: Field>(&mut self, name: &str) -> DecodeResult<T> {
        let record = match self.stack.top() {
            Some(&DecodeFrame::Record(record)) => record,
            _ => {
                return Err(DecodeError::custom(format!(
                    "field '{}' decoded outside a record at {}",
                    name, self.path
                )))
            }
        };
        self.path.push_field(name);
        let result = if self.options.identifier_key().matches(name) {
            let id = record.id();
            T::decode_identity(id).ok_or_else(|| DecodeError::InvalidIdentifier {
                path: self.path.clone(),
                identifier: id.clone(),
            })
        } else {
            self.decode_slot(record.get(name))
        };
        self.path.pop();
        result
    }

    fn decode_slot<T: Field>(&mut self, value: Option<&'r Value>) -> DecodeResult<T> {
        self.stack.push(DecodeFrame::Slot(value));
        let result = T::decode(self);
        self.stack.pop();
        result
    }

    /// Stored value of the current slot; `None` if absent or null
    pub fn value(&self) -> Option<&'r Value> {
        match self.stack.top() {
            Some(&DecodeFrame::Slot(value)) => value.filter(|v| !v.is_null()),
            _ => None,
        }
    }

    /// Stored value of the current slot, failing with `ValueMissing`
    pub fn require(&self) -> DecodeResult<&'r Value> {
        self.value().ok_or_else(|| DecodeError::ValueMissing {
            path: self.path.clone(),
        })
    }

    /// Read the current slot with a boxing rule
    pub fn unbox<T>(
        &self,
        rule: impl FnOnce(&'r Value) -> Result<T, Mismatch>,
    ) -> DecodeResult<T> {
        let value = self.require()?;
        rule(value).map_err(|m| self.mismatch(m.expected, m.found))
    }

    /// `TypeMismatch` at the current path
    pub fn mismatch(&self, expected: &'static str, found: impl Into<String>) -> DecodeError {
        DecodeError::TypeMismatch {
            path: self.path.clone(),
            expected,
            found: found.into(),
        }
    }

    /// Read the current slot as a reference
    pub fn reference(&self) -> DecodeResult<&'r Reference> {
        let value = self.require()?;
        value
            .as_reference()
            .ok_or_else(|| self.mismatch("Reference", value.type_name()))
    }

    /// Walk the list stored in the current slot
    ///
    /// `f` pulls elements with [`Decoder::next_element`].
    pub fn list<U>(&mut self, f: impl FnOnce(&mut Self) -> DecodeResult<U>) -> DecodeResult<U> {
        let value = self.require()?;
        let items = value
            .as_list()
            .ok_or_else(|| self.mismatch("List", value.type_name()))?;
        self.stack.push(DecodeFrame::List { items, cursor: 0 });
        let result = f(self);
        self.stack.pop();
        result
    }

    /// Decode every element of the list stored in the current slot
    pub fn decode_list<T: Field>(&mut self) -> DecodeResult<Vec<T>> {
        self.list(|d| {
            let mut out = Vec::with_capacity(d.remaining());
            while d.remaining() > 0 {
                out.push(d.next_element()?);
            }
            Ok(out)
        })
    }

    /// Elements not yet consumed in the current list
    pub fn remaining(&self) -> usize {
        match self.stack.top() {
            Some(DecodeFrame::List { items, cursor }) => items.len().saturating_sub(*cursor),
            _ => 0,
        }
    }

    /// Decode the element under the cursor and advance
    ///
    /// Fails with `UnexpectedEnd` past the last stored element.
    pub fn next_element<T: Field>(&mut self) -> DecodeResult<T> {
        let (item, index) = match self.stack.top_mut() {
            Some(DecodeFrame::List { items, cursor }) => {
                let items: &'r [Value] = *items;
                let index = *cursor;
                *cursor += 1;
                (items.get(index), index)
            }
            _ => {
                return Err(DecodeError::custom(format!(
                    "element requested outside a list at {}",
                    self.path
                )))
            }
        };
        let Some(item) = item else {
            return Err(DecodeError::UnexpectedEnd {
                path: self.path.clone(),
                index,
            });
        };
        self.path.push_index(index);
        let result = self.decode_slot(Some(item));
        self.path.pop();
        result
    }

    /// Fetch the record referenced by the current slot and decode it
    pub fn decode_composite<R: Recordable>(&mut self) -> DecodeResult<R> {
        let reference = self.reference()?;
        let id = &reference.identifier;

        if self.options.cycle_guard() && self.ancestors.contains(id) {
            warn!(target: "flatrec::decode", path = %self.path, id = %id, "Reference cycle rejected");
            return Err(DecodeError::CycleDetected {
                path: self.path.clone(),
                identifier: id.clone(),
            });
        }
        let limit = self.options.max_depth();
        if self.ancestors.len() >= limit {
            return Err(DecodeError::DepthExceeded {
                path: self.path.clone(),
                limit,
            });
        }

        trace!(target: "flatrec::decode", path = %self.path, id = %id, "Fetching referenced record");
        let fetched = self
            .fetch
            .fetch(id)
            .map_err(|source| DecodeError::FetchFailed {
                path: self.path.clone(),
                source,
            })?;

        let mut nested = Decoder::new(
            self.fetch,
            self.options,
            self.ancestors.clone(),
            self.path.clone(),
            &fetched,
        );
        nested.decode_record()
    }

    fn decode_record<R: Recordable>(&mut self) -> DecodeResult<R> {
        let record = self.record;
        if record.record_type() != R::RECORD_TYPE {
            return Err(self.mismatch(R::RECORD_TYPE, record.record_type()));
        }
        self.stack.push(DecodeFrame::Record(record));
        let result = R::decode_fields(self);
        self.stack.pop();
        result
    }
}

/// Decode a value from its root record
///
/// Composite references are resolved through `fetch`, in field order.
///
/// # Example
///
/// ```
/// use flatrec_codec::{decode, recordable, CodecOptions, Identifier, Record};
/// use flatrec_core::{fetch_fn, FetchError};
///
/// #[derive(Debug, PartialEq)]
/// struct Tag {
///     id: String,
///     label: String,
/// }
///
/// recordable! { Tag as "Tag" { id, label } }
///
/// let mut record = Record::new(Identifier::new("Tag", "red"));
/// record.set("label", "Red");
///
/// let no_store = fetch_fn(|id: &Identifier| Err(FetchError::NotFound(id.clone())));
/// let tag: Tag = decode(&record, &no_store, &CodecOptions::default()).unwrap();
/// assert_eq!(tag, Tag { id: "red".into(), label: "Red".into() });
/// ```
pub fn decode<R, F>(record: &Record, fetch: &F, options: &CodecOptions) -> DecodeResult<R>
where
    R: Recordable,
    F: FetchContext,
{
    let result = Decoder::new(fetch, options, Vec::new(), FieldPath::root(), record)
        .decode_record();
    match &result {
        Ok(_) => debug!(target: "flatrec::decode", root = %record.id(), "Decode pass finished"),
        Err(e) => debug!(target: "flatrec::decode", root = %record.id(), error = %e, "Decode pass failed"),
    }
    result
}
