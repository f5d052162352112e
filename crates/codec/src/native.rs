//! Boxing rules for special native types
//!
//! Each special native kind has one encoding into a [`Value`] and one decoding
//! rule back. These are pure functions so they can be tested without an
//! encoder or decoder. Decoding failures return [`Mismatch`], which the
//! decoder turns into a `TypeMismatch` at the current field path.
//!
//! URLs and paths box through the configured
//! [`AttachmentStrategy`](crate::AttachmentStrategy); decoding accepts every
//! form the strategies can produce, so a round trip does not depend on the
//! strategy in use.

use chrono::{DateTime, Timelike, Utc};
use flatrec_core::{Asset, GeoPoint, Value};
use std::path::PathBuf;
use url::Url;
use uuid::Uuid;

/// Decoding failure: the stored variant cannot produce the requested type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Requested shape
    pub expected: &'static str,
    /// Stored shape
    pub found: String,
}

impl Mismatch {
    fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: value.type_name().to_string(),
        }
    }
}

/// Timestamps are stored at microsecond precision
pub fn box_timestamp(t: DateTime<Utc>) -> Value {
    // never fails: the reduced nanosecond value is below the original
    let truncated = t
        .with_nanosecond(t.nanosecond() / 1_000 * 1_000)
        .unwrap_or(t);
    Value::Timestamp(truncated)
}

/// Read a timestamp
pub fn unbox_timestamp(value: &Value) -> Result<DateTime<Utc>, Mismatch> {
    value
        .as_timestamp()
        .ok_or_else(|| Mismatch::new("Timestamp", value))
}

/// UUIDs are stored as lowercase hyphenated strings
pub fn box_uuid(id: &Uuid) -> Value {
    Value::String(id.hyphenated().to_string())
}

/// Read a UUID from its string form
pub fn unbox_uuid(value: &Value) -> Result<Uuid, Mismatch> {
    let s = value
        .as_str()
        .ok_or_else(|| Mismatch::new("UUID string", value))?;
    Uuid::parse_str(s).map_err(|_| Mismatch {
        expected: "UUID string",
        found: format!("String({:?})", s),
    })
}

/// Read a URL from a string or an asset
pub fn unbox_url(value: &Value) -> Result<Url, Mismatch> {
    let parsed = match value {
        Value::String(s) | Value::Asset(Asset::Url(s)) => Url::parse(s).ok(),
        Value::Asset(Asset::File(path)) => Url::from_file_path(path).ok(),
        _ => return Err(Mismatch::new("URL", value)),
    };
    parsed.ok_or_else(|| Mismatch {
        expected: "URL",
        found: format!("unparseable {}", value.type_name()),
    })
}

/// Read a filesystem path from a string or an asset
pub fn unbox_path(value: &Value) -> Result<PathBuf, Mismatch> {
    match value {
        Value::String(s) => Ok(PathBuf::from(s)),
        Value::Asset(Asset::File(path)) => Ok(path.clone()),
        Value::Asset(Asset::Url(s)) => Url::parse(s)
            .ok()
            .and_then(|u| u.to_file_path().ok())
            .ok_or_else(|| Mismatch {
                expected: "file path",
                found: format!("non-file URL {:?}", s),
            }),
        _ => Err(Mismatch::new("file path", value)),
    }
}

/// Binary blobs are stored inline as bytes
pub fn box_blob(bytes: &[u8]) -> Value {
    Value::Bytes(bytes.to_vec())
}

/// Read a blob from inline bytes or a data asset
pub fn unbox_blob(value: &Value) -> Result<Vec<u8>, Mismatch> {
    match value {
        Value::Bytes(b) | Value::Asset(Asset::Data(b)) => Ok(b.clone()),
        _ => Err(Mismatch::new("Bytes", value)),
    }
}

/// Geo-points are stored as locations
pub fn box_geo_point(point: GeoPoint) -> Value {
    Value::Location(point)
}

/// Read a geo-point
pub fn unbox_geo_point(value: &Value) -> Result<GeoPoint, Mismatch> {
    match value {
        Value::Location(p) => GeoPoint::new(p.latitude, p.longitude).ok_or_else(|| Mismatch {
            expected: "Location",
            found: format!("out-of-range Location({}, {})", p.latitude, p.longitude),
        }),
        _ => Err(Mismatch::new("Location", value)),
    }
}
