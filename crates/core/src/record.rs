//! Record types
//!
//! This module defines:
//! - Record: one flat, identity-tagged unit of storage
//! - Reference: a pointer from one record to another
//! - Asset: an attachment held outside the record body
//! - GeoPoint: a latitude/longitude pair

use crate::identifier::Identifier;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// What happens to the holder of a reference when its target is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceAction {
    /// Deleting the target leaves the holder alone
    #[default]
    None,
    /// Deleting the target deletes the holder (cascade)
    DeleteSelf,
}

/// Cross-record reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Target record
    pub identifier: Identifier,
    /// Linkage policy
    pub action: ReferenceAction,
}

impl Reference {
    /// Plain reference with no linkage policy
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            action: ReferenceAction::None,
        }
    }

    /// Reference whose holder is deleted together with the target
    pub fn cascade(identifier: Identifier) -> Self {
        Self {
            identifier,
            action: ReferenceAction::DeleteSelf,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "->{}", self.identifier)
    }
}

/// Attachment stored outside the record body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// Local file uploaded by the store
    File(PathBuf),
    /// Remote resource
    Url(String),
    /// Opaque large binary
    Data(Vec<u8>),
}

/// Geographic coordinate in degrees
///
/// Deserialization applies the same range check as [`GeoPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    /// Latitude, -90..=90
    pub latitude: f64,
    /// Longitude, -180..=180
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point, returning `None` when a coordinate is out of range or NaN
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = String;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude).ok_or_else(|| {
            format!(
                "coordinate out of range: latitude {}, longitude {}",
                raw.latitude, raw.longitude
            )
        })
    }
}

/// Flat unit of storage: field name to [`Value`], tagged with an [`Identifier`]
///
/// Field order carries no meaning; fields are kept sorted for deterministic
/// iteration and comparison.
///
/// # Example
///
/// ```
/// use flatrec_core::{Identifier, Record, Value};
///
/// let mut record = Record::new(Identifier::new("Person", "001"));
/// record.set("name", "Coleman");
/// record.set("gender", Value::Int(0));
///
/// assert_eq!(record.record_type(), "Person");
/// assert_eq!(record.get("name"), Some(&Value::String("Coleman".into())));
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Reference>,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            parent: None,
            fields: BTreeMap::new(),
        }
    }

    /// Identifier of this record
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Record-type tag (shorthand for `id().record_type()`)
    pub fn record_type(&self) -> &str {
        self.id.record_type()
    }

    /// Parent linkage, if any
    pub fn parent(&self) -> Option<&Reference> {
        self.parent.as_ref()
    }

    /// Set or clear the parent linkage
    pub fn set_parent(&mut self, parent: Option<Reference>) {
        self.parent = parent;
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Check whether a field is set
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no fields are set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in name order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// All outgoing references, including those held in lists
    ///
    /// The parent linkage is not included.
    pub fn references(&self) -> Vec<&Reference> {
        let mut out = Vec::new();
        for value in self.fields.values() {
            match value {
                Value::Reference(r) => out.push(r),
                Value::List(items) => out.extend(items.iter().filter_map(Value::as_reference)),
                _ => {}
            }
        }
        out
    }
}
