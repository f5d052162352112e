//! Whole-record types
//!
//! A [`Recordable`] type is a composite with its own identity: it encodes
//! into a record of its own and, when embedded in another value, into a
//! reference to that record. Every `Recordable` is automatically a
//! [`Field`](crate::Field) of class `CompositeType`.
//!
//! Implementations list their fields in declaration order. The
//! [`recordable!`](crate::recordable) macro writes both directions from one
//! field list.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use flatrec_core::{DecodeResult, EncodeResult};

/// Composite with its own identity
pub trait Recordable: Sized {
    /// Record-type tag of the produced record
    const RECORD_TYPE: &'static str;

    /// Encode every field, in declaration order, with [`Encoder::field`]
    fn encode_fields(&self, encoder: &mut Encoder<'_>) -> EncodeResult<()>;

    /// Decode every field, in declaration order, with [`Decoder::field`]
    fn decode_fields(decoder: &mut Decoder<'_, '_>) -> DecodeResult<Self>;
}

/// Implement [`Recordable`] for a struct from its field list
///
/// Fields are encoded and decoded in the listed order. Every field of the
/// struct must be listed, and every listed type must implement
/// [`Field`](crate::Field). The identity field is listed like any other; the
/// identifier-key strategy picks it out.
///
/// # Example
///
/// ```
/// use flatrec_codec::recordable;
///
/// struct Person {
///     id: String,
///     name: String,
///     friends: Vec<Person>,
/// }
///
/// recordable! { Person as "Person" { id, name, friends } }
/// ```
#[macro_export]
macro_rules! recordable {
    ($ty:ty as $record_type:literal { $($field:ident),* $(,)? }) => {
        impl $crate::Recordable for $ty {
            const RECORD_TYPE: &'static str = $record_type;

            fn encode_fields(
                &self,
                encoder: &mut $crate::Encoder<'_>,
            ) -> $crate::EncodeResult<()> {
                $(encoder.field(stringify!($field), &self.$field)?;)*
                Ok(())
            }

            fn decode_fields(
                decoder: &mut $crate::Decoder<'_, '_>,
            ) -> $crate::DecodeResult<Self> {
                Ok(Self {
                    $($field: decoder.field(stringify!($field))?,)*
                })
            }
        }
    };
}
