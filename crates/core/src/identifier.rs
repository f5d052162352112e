//! Record identity
//!
//! Every record in the store is named by an [`Identifier`]: a record-type tag
//! plus a name that is unique within that type. Application identity types
//! convert to and from identifiers through the [`Identity`] trait.
//!
//! ## Contract
//!
//! - The record type must not be empty, must not contain `/` or NUL
//! - The name must not be empty, must not contain NUL
//! - The textual form is `record_type/name`; the name may contain `/`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between record type and name in the textual form
pub const SEPARATOR: char = '/';

/// Unique name of one record across the whole store
///
/// Ordering is record type first, then name, so all records of one type
/// sort together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    record_type: String,
    name: String,
}

impl Identifier {
    /// Create an identifier without validation
    ///
    /// Use [`Identifier::parse`] or [`Identifier::try_new`] for untrusted input.
    pub fn new(record_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            name: name.into(),
        }
    }

    /// Create an identifier, validating both parts
    pub fn try_new(
        record_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, IdentifierError> {
        let id = Self::new(record_type, name);
        id.validate()?;
        Ok(id)
    }

    /// Parse the `record_type/name` form
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let (record_type, name) = s
            .split_once(SEPARATOR)
            .ok_or(IdentifierError::MissingSeparator)?;
        Self::try_new(record_type, name)
    }

    /// Record-type tag
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Name within the record type
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same name, different record type
    pub fn with_record_type(&self, record_type: impl Into<String>) -> Self {
        Self::new(record_type, self.name.clone())
    }

    /// Check the identifier rules
    pub fn validate(&self) -> Result<(), IdentifierError> {
        if self.record_type.is_empty() {
            return Err(IdentifierError::EmptyRecordType);
        }
        if self.record_type.contains(SEPARATOR) {
            return Err(IdentifierError::SeparatorInRecordType);
        }
        if self.name.is_empty() {
            return Err(IdentifierError::EmptyName);
        }
        if self.record_type.contains('\x00') || self.name.contains('\x00') {
            return Err(IdentifierError::ContainsNul);
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.record_type, SEPARATOR, self.name)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

/// Identifier validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    /// Record type is empty
    #[error("record type cannot be empty")]
    EmptyRecordType,

    /// Record type contains the separator
    #[error("record type cannot contain '{}'", SEPARATOR)]
    SeparatorInRecordType,

    /// Name is empty
    #[error("record name cannot be empty")]
    EmptyName,

    /// Either part contains a NUL byte
    #[error("identifier cannot contain NUL bytes")]
    ContainsNul,

    /// Textual form has no separator
    #[error("identifier must have the form 'type{}name'", SEPARATOR)]
    MissingSeparator,
}

/// Two-way conversion between an application identity type and an [`Identifier`]
///
/// `from_identifier` returns `None` when the identifier does not name a valid
/// value of the type (wrong record type, malformed name).
///
/// # Example
///
/// ```
/// use flatrec_core::{Identifier, Identity};
///
/// #[derive(Debug, PartialEq)]
/// struct OrderId(u64);
///
/// impl Identity for OrderId {
///     fn to_identifier(&self) -> Identifier {
///         Identifier::new("Order", self.0.to_string())
///     }
///
///     fn from_identifier(id: &Identifier) -> Option<Self> {
///         if id.record_type() != "Order" {
///             return None;
///         }
///         id.name().parse().ok().map(OrderId)
///     }
/// }
///
/// let id = OrderId(7).to_identifier();
/// assert_eq!(id.to_string(), "Order/7");
/// assert_eq!(OrderId::from_identifier(&id), Some(OrderId(7)));
/// ```
pub trait Identity: Sized {
    /// Convert to the store identifier
    fn to_identifier(&self) -> Identifier;

    /// Convert back from a store identifier
    fn from_identifier(id: &Identifier) -> Option<Self>;
}

impl Identity for Identifier {
    fn to_identifier(&self) -> Identifier {
        self.clone()
    }

    fn from_identifier(id: &Identifier) -> Option<Self> {
        Some(id.clone())
    }
}
