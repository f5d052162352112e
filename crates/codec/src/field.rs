//! Field types
//!
//! [`Field`] is implemented by every type that can appear as a field of a
//! [`Recordable`]. Its associated [`Field::CLASS`] fixes how the engines treat
//! the field; the methods do the boxing for that class.
//!
//! ## Implementations
//!
//! - Native scalars: `bool`, `i8`..`i64`, `u8`..`u64`, `usize`, `f32`, `f64`,
//!   `String`
//! - Special natives: `DateTime<Utc>`, `Uuid`, `Url`, `PathBuf`, [`Blob`],
//!   [`GeoPoint`]
//! - Identity: [`Identifier`], [`Ref<T>`] for any [`Identity`]
//! - Composite: every [`Recordable`]
//! - Plain containers: `Vec<T>`, `[T; N]`, `serde_json::Value`, [`Plain<T>`]
//! - `Option<T>`: same class as `T`; `None` leaves the field unset
//!
//! Integers decode from either integer variant as long as the value fits;
//! floats decode from `Float` only.

use crate::classify::{ContainerKind, FieldClass, ScalarKind, SpecialKind};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::native;
use crate::options::Attachable;
use crate::recordable::Recordable;
use crate::wrappers::{Blob, Plain, Ref};
use chrono::{DateTime, Utc};
use flatrec_core::{
    DecodeResult, EncodeError, EncodeResult, GeoPoint, Identifier, Identity, Value,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// A type that can be a field of a record
pub trait Field: Sized {
    /// Static classification of the type
    const CLASS: FieldClass;

    /// Emit this value into the encoder's current slot
    ///
    /// Emitting nothing leaves the field unset.
    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()>;

    /// Read a value from the decoder's current slot
    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self>;

    /// Build the value of an identity field from the record's identifier
    ///
    /// Types that cannot name a record return `None`.
    fn decode_identity(id: &Identifier) -> Option<Self> {
        let _ = id;
        None
    }
}

// ============================================================================
// Composites and optionals
// ============================================================================

impl<R: Recordable> Field for R {
    const CLASS: FieldClass = FieldClass::CompositeType;

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit_composite(self)
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.decode_composite()
    }
}

impl<T: Field> Field for Option<T> {
    const CLASS: FieldClass = T::CLASS;

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        match self {
            Some(value) => value.encode(encoder),
            None => Ok(()),
        }
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        if decoder.value().is_none() {
            return Ok(None);
        }
        match T::decode(decoder) {
            Ok(value) => Ok(Some(value)),
            // Only the fetch of this very reference; a missing record deeper
            // in the fetched graph still fails the pass.
            Err(err)
                if T::CLASS.requires_fetch()
                    && err.is_not_found()
                    && err.path() == Some(decoder.path()) =>
            {
                debug!(target: "flatrec::decode", path = %decoder.path(), "Optional reference target missing");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn decode_identity(id: &Identifier) -> Option<Self> {
        T::decode_identity(id).map(Some)
    }
}

// ============================================================================
// Native scalars
// ============================================================================

macro_rules! signed_fields {
    ($($t:ty),*) => {$(
        impl Field for $t {
            const CLASS: FieldClass = FieldClass::NativeScalar(ScalarKind::Int);

            fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
                encoder.emit(Value::Int(i64::from(*self)))
            }

            fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
                let value = decoder.require()?;
                let wide = value
                    .as_i64()
                    .ok_or_else(|| decoder.mismatch(stringify!($t), value.type_name()))?;
                <$t>::try_from(wide)
                    .map_err(|_| decoder.mismatch(stringify!($t), format!("Int({})", wide)))
            }

            fn decode_identity(id: &Identifier) -> Option<Self> {
                id.name().parse().ok()
            }
        }
    )*};
}

macro_rules! unsigned_fields {
    ($($t:ty),*) => {$(
        impl Field for $t {
            const CLASS: FieldClass = FieldClass::NativeScalar(ScalarKind::UInt);

            fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
                encoder.emit(Value::UInt(u64::from(*self)))
            }

            fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
                let value = decoder.require()?;
                let wide = value
                    .as_u64()
                    .ok_or_else(|| decoder.mismatch(stringify!($t), value.type_name()))?;
                <$t>::try_from(wide)
                    .map_err(|_| decoder.mismatch(stringify!($t), format!("UInt({})", wide)))
            }

            fn decode_identity(id: &Identifier) -> Option<Self> {
                id.name().parse().ok()
            }
        }
    )*};
}

signed_fields!(i8, i16, i32, i64);
unsigned_fields!(u8, u16, u32, u64);

impl Field for usize {
    const CLASS: FieldClass = FieldClass::NativeScalar(ScalarKind::UInt);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        let wide = u64::try_from(*self)
            .map_err(|_| EncodeError::custom(format!("usize at {} exceeds u64", encoder.path())))?;
        encoder.emit(Value::UInt(wide))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        let value = decoder.require()?;
        let wide = value
            .as_u64()
            .ok_or_else(|| decoder.mismatch("usize", value.type_name()))?;
        usize::try_from(wide).map_err(|_| decoder.mismatch("usize", format!("UInt({})", wide)))
    }

    fn decode_identity(id: &Identifier) -> Option<Self> {
        id.name().parse().ok()
    }
}

impl Field for f64 {
    const CLASS: FieldClass = FieldClass::NativeScalar(ScalarKind::Float);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit(Value::Float(*self))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        let value = decoder.require()?;
        value
            .as_float()
            .ok_or_else(|| decoder.mismatch("f64", value.type_name()))
    }
}

impl Field for f32 {
    const CLASS: FieldClass = FieldClass::NativeScalar(ScalarKind::Float);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit(Value::Float(f64::from(*self)))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        let value = decoder.require()?;
        let f = value
            .as_float()
            .ok_or_else(|| decoder.mismatch("f32", value.type_name()))?;
        if f.is_finite() && f.abs() > f64::from(f32::MAX) {
            return Err(decoder.mismatch("f32", format!("Float({})", f)));
        }
        Ok(f as f32)
    }
}

impl Field for bool {
    const CLASS: FieldClass = FieldClass::NativeScalar(ScalarKind::Bool);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit(Value::Bool(*self))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        let value = decoder.require()?;
        value
            .as_bool()
            .ok_or_else(|| decoder.mismatch("Bool", value.type_name()))
    }
}

impl Field for String {
    const CLASS: FieldClass = FieldClass::NativeScalar(ScalarKind::String);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit(Value::String(self.clone()))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        let value = decoder.require()?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| decoder.mismatch("String", value.type_name()))
    }

    fn decode_identity(id: &Identifier) -> Option<Self> {
        Some(id.name().to_string())
    }
}

// ============================================================================
// Special natives
// ============================================================================

impl Field for DateTime<Utc> {
    const CLASS: FieldClass = FieldClass::SpecialNative(SpecialKind::Timestamp);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit(native::box_timestamp(*self))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.unbox(native::unbox_timestamp)
    }
}

impl Field for Uuid {
    const CLASS: FieldClass = FieldClass::SpecialNative(SpecialKind::Uuid);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit(native::box_uuid(self))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.unbox(native::unbox_uuid)
    }

    fn decode_identity(id: &Identifier) -> Option<Self> {
        Uuid::parse_str(id.name()).ok()
    }
}

impl Field for Url {
    const CLASS: FieldClass = FieldClass::SpecialNative(SpecialKind::Url);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit_attachment(Attachable::Url(self))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.unbox(native::unbox_url)
    }
}

impl Field for PathBuf {
    const CLASS: FieldClass = FieldClass::SpecialNative(SpecialKind::Path);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit_attachment(Attachable::Path(self.as_path()))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.unbox(native::unbox_path)
    }
}

impl Field for Blob {
    const CLASS: FieldClass = FieldClass::SpecialNative(SpecialKind::Binary);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit(native::box_blob(&self.0))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.unbox(native::unbox_blob).map(Blob)
    }
}

impl Field for GeoPoint {
    const CLASS: FieldClass = FieldClass::SpecialNative(SpecialKind::GeoPoint);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit(native::box_geo_point(*self))
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.unbox(native::unbox_geo_point)
    }
}

// ============================================================================
// Identity types
// ============================================================================

impl Field for Identifier {
    const CLASS: FieldClass = FieldClass::IdentityType;

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit_reference(self.clone())
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        Ok(decoder.reference()?.identifier.clone())
    }

    fn decode_identity(id: &Identifier) -> Option<Self> {
        Some(id.clone())
    }
}

impl<T: Identity> Field for Ref<T> {
    const CLASS: FieldClass = FieldClass::IdentityType;

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit_reference(self.0.to_identifier())
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        let reference = decoder.reference()?;
        T::from_identifier(&reference.identifier)
            .map(Ref)
            .ok_or_else(|| {
                decoder.mismatch(
                    std::any::type_name::<T>(),
                    format!("Reference({})", reference.identifier),
                )
            })
    }

    fn decode_identity(id: &Identifier) -> Option<Self> {
        T::from_identifier(id).map(Ref)
    }
}

// ============================================================================
// Plain containers
// ============================================================================

impl<T: Field> Field for Vec<T> {
    const CLASS: FieldClass = FieldClass::PlainContainer(ContainerKind::List);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit_list(self.iter())
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.decode_list()
    }
}

impl<T: Field, const N: usize> Field for [T; N] {
    const CLASS: FieldClass = FieldClass::PlainContainer(ContainerKind::List);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        encoder.emit_list(self.iter())
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        decoder.list(|d| {
            let mut items = Vec::with_capacity(N);
            for _ in 0..N {
                items.push(d.next_element()?);
            }
            let extra = d.remaining();
            if extra > 0 {
                return Err(d.mismatch("fixed-size list", format!("List of {}", N + extra)));
            }
            items
                .try_into()
                .map_err(|_: Vec<T>| d.mismatch("fixed-size list", "short list"))
        })
    }
}

fn number_value(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::UInt(u)
    } else {
        n.as_f64().map(Value::Float).unwrap_or(Value::Null)
    }
}

impl Field for serde_json::Value {
    const CLASS: FieldClass = FieldClass::PlainContainer(ContainerKind::Tree);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        use serde_json::Value as Json;
        match self {
            Json::Null => encoder.emit(Value::Null),
            Json::Bool(b) => encoder.emit(Value::Bool(*b)),
            Json::Number(n) => encoder.emit(number_value(n)),
            Json::String(s) => encoder.emit(Value::String(s.clone())),
            Json::Array(items) => encoder.emit_list(items.iter()),
            Json::Object(_) => Err(EncodeError::UnsupportedNestedValue {
                path: encoder.path().clone(),
                kind: "object",
            }),
        }
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        match decoder.value() {
            None => Ok(serde_json::Value::Null),
            Some(Value::List(_)) => Ok(serde_json::Value::Array(decoder.decode_list()?)),
            Some(other) => Ok(serde_json::Value::from(other.clone())),
        }
    }
}

impl<T: Serialize + DeserializeOwned> Field for Plain<T> {
    const CLASS: FieldClass = FieldClass::PlainContainer(ContainerKind::Tree);

    fn encode(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()> {
        let tree = serde_json::to_value(&self.0).map_err(|e| {
            EncodeError::custom(format!("cannot serialize value at {}: {}", encoder.path(), e))
        })?;
        if tree.is_object() {
            return Err(EncodeError::UnsupportedNestedValue {
                path: encoder.path().clone(),
                kind: "struct or map without identity",
            });
        }
        tree.encode(encoder)
    }

    fn decode(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self> {
        let tree = serde_json::Value::decode(decoder)?;
        serde_json::from_value(tree)
            .map(Plain)
            .map_err(|e| decoder.mismatch(std::any::type_name::<T>(), e.to_string()))
    }
}
