//! Field classification
//!
//! Every [`Field`](crate::Field) type declares its [`FieldClass`] as an
//! associated constant. The engines branch on that constant, never on the
//! runtime shape of a value, so the handling of a field is fixed by its
//! declared type.
//!
//! | Class | Encodes as | Decode |
//! |-------|------------|--------|
//! | `NativeScalar` | Bool/Int/UInt/Float/String | unbox |
//! | `SpecialNative` | Timestamp/String/Asset/Bytes/Location | fixed rule in [`native`](crate::native) |
//! | `IdentityType` | bare Reference | `from_identifier`, no fetch |
//! | `CompositeType` | own record + Reference | fetch and recurse |
//! | `PlainContainer` | List, or scalars of a generic tree | walk frames |

use crate::field::Field;

/// Primitive kinds stored directly in a record value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// Signed integers of any width
    Int,
    /// Unsigned integers of any width
    UInt,
    /// `f32` / `f64`
    Float,
    /// `String`
    String,
}

/// Native types with a fixed encoding of their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    /// UTC point in time
    Timestamp,
    /// UUID, stored in canonical string form
    Uuid,
    /// URL, stored as a string or an asset
    Url,
    /// Binary blob
    Binary,
    /// Latitude/longitude
    GeoPoint,
    /// Filesystem path, stored as a string or an asset
    Path,
}

/// Structural containers walked through stack frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Ordered homogeneous sequence
    List,
    /// Generic tree value (JSON-like); only its scalar and list shapes flatten
    Tree,
}

/// Classification of a field's declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldClass {
    /// Directly representable primitive
    NativeScalar(ScalarKind),
    /// Native type with a fixed encoding
    SpecialNative(SpecialKind),
    /// Type that only names a record
    IdentityType,
    /// Type that is a whole record of its own
    CompositeType,
    /// Anything walked structurally
    PlainContainer(ContainerKind),
}

impl FieldClass {
    /// True if values of this class are stored as references
    pub const fn is_reference(&self) -> bool {
        matches!(self, FieldClass::IdentityType | FieldClass::CompositeType)
    }

    /// True if decoding this class goes through the fetch collaborator
    pub const fn requires_fetch(&self) -> bool {
        matches!(self, FieldClass::CompositeType)
    }

    /// True if values of this class encode as a list
    pub const fn is_list(&self) -> bool {
        matches!(self, FieldClass::PlainContainer(ContainerKind::List))
    }

    /// Short label for logs and errors
    pub const fn label(&self) -> &'static str {
        match self {
            FieldClass::NativeScalar(_) => "native scalar",
            FieldClass::SpecialNative(_) => "special native",
            FieldClass::IdentityType => "identity",
            FieldClass::CompositeType => "composite",
            FieldClass::PlainContainer(_) => "plain container",
        }
    }
}

/// Classify a declared field type
///
/// # Example
///
/// ```
/// use flatrec_codec::classify::{classify, FieldClass, ScalarKind, ContainerKind};
/// use flatrec_codec::Identifier;
///
/// assert_eq!(classify::<u8>(), FieldClass::NativeScalar(ScalarKind::UInt));
/// assert_eq!(classify::<Option<String>>(), FieldClass::NativeScalar(ScalarKind::String));
/// assert_eq!(classify::<Vec<i32>>(), FieldClass::PlainContainer(ContainerKind::List));
/// assert_eq!(classify::<Identifier>(), FieldClass::IdentityType);
/// ```
pub const fn classify<T: Field>() -> FieldClass {
    T::CLASS
}
