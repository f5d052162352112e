//! Encode engine
//!
//! Flattens a [`Recordable`] value into one root record plus one record per
//! distinct embedded composite. Fields are visited in declaration order by
//! [`Recordable::encode_fields`]; each field is encoded into a fresh
//! single-value slot on the container stack and folded into the enclosing
//! record frame when the slot pops.
//!
//! ## Atomicity
//!
//! Records are staged in a private [`RecordBatch`] and flushed to the caller's
//! collector only after the whole pass succeeded. A failure at any depth
//! registers nothing.
//!
//! ## Registration order
//!
//! Embedded composites are staged when their enclosing record finishes, after
//! the parent strategy has linked them (the enclosing identity may come from a
//! field declared after the composite). Children therefore precede their
//! parents and the root is registered last.

use crate::batch::RecordBatch;
use crate::field::Field;
use crate::options::{Attachable, CodecOptions};
use crate::recordable::Recordable;
use crate::stack::{ContainerStack, Slot};
use flatrec_core::{
    BatchCollector, EncodeError, EncodeResult, FieldPath, Identifier, Record, Reference, Value,
};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Record under construction
#[derive(Debug)]
struct RecordFrame {
    record_type: &'static str,
    name: Option<String>,
    fields: BTreeMap<String, Value>,
}

#[derive(Debug)]
enum EncodeFrame {
    Record(RecordFrame),
    Slot(Slot<Value>),
    List(Vec<Value>),
}

/// State of one record's encode
///
/// Handed to [`Recordable::encode_fields`] and [`Field::encode`]. A field
/// implementation writes exactly one value with one of the `emit*` methods,
/// or nothing at all to leave the field unset.
pub struct Encoder<'a> {
    options: &'a CodecOptions,
    staged: &'a mut RecordBatch,
    stack: ContainerStack<EncodeFrame>,
    path: FieldPath,
    children: Vec<(FieldPath, Record)>,
}

impl<'a> Encoder<'a> {
    fn new(options: &'a CodecOptions, staged: &'a mut RecordBatch, path: FieldPath) -> Self {
        Self {
            options,
            staged,
            stack: ContainerStack::new(),
            path,
            children: Vec::new(),
        }
    }

    /// Options of the running pass
    pub fn options(&self) -> &CodecOptions {
        self.options
    }

    /// Path of the value being encoded
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Encode one named field of the current record
    ///
    /// The identity field (per the identifier-key strategy) becomes the
    /// record's name and is never stored as an ordinary field. A field whose
    /// value emits nothing (an absent optional) is left unset.
    pub fn field<T: Field>(&mut self, name: &str, value: &T) -> EncodeResult<()> {
        if !matches!(self.stack.top(), Some(EncodeFrame::Record(_))) {
            return Err(EncodeError::custom(format!(
                "field '{}' encoded outside a record at {}",
                name, self.path
            )));
        }
        self.path.push_field(name);
        let result = if self.options.identifier_key().matches(name) {
            self.capture_identity(value)
        } else {
            self.encode_field(name, value)
        };
        self.path.pop();
        result
    }

    fn encode_field<T: Field>(&mut self, name: &str, value: &T) -> EncodeResult<()> {
        let Some(boxed) = self.encode_slot(value)? else {
            return Ok(());
        };
        match self.stack.top_mut() {
            Some(EncodeFrame::Record(frame)) => {
                frame.fields.insert(name.to_string(), boxed);
                Ok(())
            }
            _ => Err(self.unbalanced()),
        }
    }

    fn capture_identity<T: Field>(&mut self, value: &T) -> EncodeResult<()> {
        let name = match self.encode_slot(value)? {
            Some(Value::String(s)) => s,
            Some(Value::Int(i)) => i.to_string(),
            Some(Value::UInt(u)) => u.to_string(),
            Some(Value::Reference(r)) => r.identifier.name().to_string(),
            Some(other) => {
                return Err(EncodeError::InvalidIdentifier {
                    path: self.path.clone(),
                    reason: format!("{} cannot name a record", other.type_name()),
                })
            }
            None => {
                return Err(EncodeError::InvalidIdentifier {
                    path: self.path.clone(),
                    reason: "identity field is empty".to_string(),
                })
            }
        };
        match self.stack.top_mut() {
            Some(EncodeFrame::Record(frame)) => {
                frame.name = Some(name);
                Ok(())
            }
            _ => Err(self.unbalanced()),
        }
    }

    /// Encode `value` into a fresh slot and return what it emitted
    fn encode_slot<T: Field>(&mut self, value: &T) -> EncodeResult<Option<Value>> {
        self.stack.push(EncodeFrame::Slot(Slot::empty()));
        value.encode(self)?;
        match self.stack.pop() {
            Some(EncodeFrame::Slot(slot)) => Ok(slot.into_inner()),
            _ => Err(self.unbalanced()),
        }
    }

    /// Write a boxed value into the current slot or list
    pub fn emit(&mut self, value: Value) -> EncodeResult<()> {
        match self.stack.top_mut() {
            Some(EncodeFrame::Slot(slot)) => slot.write(value).map_err(|_| {
                EncodeError::custom(format!("value at {} written twice", self.path))
            }),
            Some(EncodeFrame::List(items)) => {
                if value.is_list() {
                    return Err(EncodeError::UnsupportedNestedValue {
                        path: self.path.clone(),
                        kind: "nested list",
                    });
                }
                items.push(value);
                Ok(())
            }
            _ => Err(EncodeError::custom(format!(
                "value emitted outside a field at {}",
                self.path
            ))),
        }
    }

    /// Box a URL or path through the attachment strategy
    pub fn emit_attachment(&mut self, item: Attachable<'_>) -> EncodeResult<()> {
        let boxed = self.options.attachments().apply(&item);
        self.emit(boxed)
    }

    /// Write a bare reference; no record is produced
    pub fn emit_reference(&mut self, id: Identifier) -> EncodeResult<()> {
        self.emit(Value::Reference(Reference::new(id)))
    }

    /// Encode a list of elements
    ///
    /// Elements that emit nothing are stored as `Null` so positions survive.
    /// A list inside a list has no flat representation, and every non-null
    /// element must box to the same variant.
    pub fn emit_list<'v, T, I>(&mut self, items: I) -> EncodeResult<()>
    where
        T: Field + 'v,
        I: IntoIterator<Item = &'v T>,
    {
        if matches!(self.stack.top(), Some(EncodeFrame::List(_))) {
            return Err(EncodeError::UnsupportedNestedValue {
                path: self.path.clone(),
                kind: "nested list",
            });
        }
        self.stack.push(EncodeFrame::List(Vec::new()));
        for (index, item) in items.into_iter().enumerate() {
            self.path.push_index(index);
            item.encode(self)?;
            if let Some(EncodeFrame::List(list)) = self.stack.top_mut() {
                if list.len() == index {
                    list.push(Value::Null);
                }
            }
            self.path.pop();
        }
        match self.stack.pop() {
            Some(EncodeFrame::List(mut list)) => {
                if unify_elements(&mut list).is_err() {
                    return Err(EncodeError::UnsupportedNestedValue {
                        path: self.path.clone(),
                        kind: "heterogeneous list",
                    });
                }
                self.emit(Value::List(list))
            }
            _ => Err(self.unbalanced()),
        }
    }

    /// Encode an embedded composite as a record of its own
    ///
    /// The nested record is built on a fresh stack and staged when the
    /// current record finishes; the current slot receives a reference to it.
    pub fn emit_composite<R: Recordable>(&mut self, value: &R) -> EncodeResult<()> {
        let record = {
            let mut nested = Encoder::new(self.options, &mut *self.staged, self.path.clone());
            nested.encode_record(value)?
        };
        let id = record.id().clone();
        trace!(target: "flatrec::encode", path = %self.path, child = %id, "Embedded composite");
        self.children.push((self.path.clone(), record));
        self.emit_reference(id)
    }

    fn encode_record<R: Recordable>(&mut self, value: &R) -> EncodeResult<Record> {
        self.stack.push(EncodeFrame::Record(RecordFrame {
            record_type: R::RECORD_TYPE,
            name: None,
            fields: BTreeMap::new(),
        }));
        value.encode_fields(self)?;
        let frame = match self.stack.pop() {
            Some(EncodeFrame::Record(frame)) => frame,
            _ => return Err(self.unbalanced()),
        };

        let name = frame.name.ok_or_else(|| EncodeError::InvalidIdentifier {
            path: self.path.clone(),
            reason: format!("{} has no identity field", frame.record_type),
        })?;
        let id = Identifier::try_new(frame.record_type, name).map_err(|e| {
            EncodeError::InvalidIdentifier {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut record = Record::new(id.clone());
        for (field, value) in frame.fields {
            record.set(field, value);
        }

        for (path, mut child) in self.children.drain(..) {
            if let Some(parent) = self.options.parent().parent_for(&path, child.id(), &id) {
                child.set_parent(Some(Reference::cascade(parent)));
            }
            self.staged.register(child);
        }
        Ok(record)
    }

    fn unbalanced(&self) -> EncodeError {
        EncodeError::custom(format!("unbalanced container stack at {}", self.path))
    }
}

/// Bring a finished list to one element variant
///
/// `Null` holes are allowed. A list mixing `Int` and `UInt` is settled once for
/// the whole list: `Int` when every element fits, `UInt` when none is negative.
fn unify_elements(items: &mut [Value]) -> Result<(), ()> {
    let has_int = items.iter().any(|v| matches!(v, Value::Int(_)));
    let has_uint = items.iter().any(|v| matches!(v, Value::UInt(_)));
    if has_int && has_uint {
        let fits_int = items
            .iter()
            .all(|v| !matches!(v, Value::UInt(u) if i64::try_from(*u).is_err()));
        let non_negative = items.iter().all(|v| !matches!(v, Value::Int(i) if *i < 0));
        for item in items.iter_mut() {
            let settled = match item {
                Value::UInt(u) if fits_int => Value::Int(*u as i64),
                Value::Int(i) if !fits_int && non_negative => Value::UInt(*i as u64),
                _ => continue,
            };
            *item = settled;
        }
        if !fits_int && !non_negative {
            return Err(());
        }
    }

    let mut present = items.iter().filter(|v| !v.is_null());
    match present.next() {
        Some(first) => {
            let kind = std::mem::discriminant(first);
            if present.all(|v| std::mem::discriminant(v) == kind) {
                Ok(())
            } else {
                Err(())
            }
        }
        None => Ok(()),
    }
}

/// Encode `value` and register every produced record with `batch`
///
/// Returns the root record's identifier. On error nothing is registered.
///
/// # Example
///
/// ```
/// use flatrec_codec::{encode, recordable, CodecOptions, RecordBatch};
///
/// struct Tag {
///     id: String,
///     label: String,
/// }
///
/// recordable! { Tag as "Tag" { id, label } }
///
/// let mut batch = RecordBatch::new();
/// let tag = Tag { id: "red".into(), label: "Red".into() };
/// let id = encode(&tag, &mut batch, &CodecOptions::default()).unwrap();
///
/// assert_eq!(id.to_string(), "Tag/red");
/// assert_eq!(batch.len(), 1);
/// assert!(!batch.get(&id).unwrap().contains("id"));
/// ```
pub fn encode<R, C>(value: &R, batch: &mut C, options: &CodecOptions) -> EncodeResult<Identifier>
where
    R: Recordable,
    C: BatchCollector + ?Sized,
{
    let mut staged = RecordBatch::new();
    let root = Encoder::new(options, &mut staged, FieldPath::root()).encode_record(value)?;
    let id = root.id().clone();
    // a descendant may share the root's identity; the root still goes last
    staged.remove(&id);
    staged.register(root);

    debug!(
        target: "flatrec::encode",
        root = %id,
        records = staged.len(),
        "Encode pass finished"
    );
    for record in staged {
        batch.register(record);
    }
    Ok(id)
}
