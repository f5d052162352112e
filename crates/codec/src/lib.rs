//! Encode and decode engines for flatrec
//!
//! This crate turns a recursively structured value into a set of flat
//! records (one per identified composite) and back:
//!
//! - [`encode`]: value → root record + embedded records, registered with a
//!   [`BatchCollector`]
//! - [`decode`]: root record + [`FetchContext`] → value
//!
//! Field handling is fixed per declared type by [`Field::CLASS`]; policies
//! come from [`CodecOptions`], built in code or loaded from a
//! [`CodecConfig`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod classify;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod field;
pub mod native;
pub mod options;
pub mod recordable;
pub mod stack;
pub mod wrappers;

pub use batch::RecordBatch;
pub use classify::{classify, ContainerKind, FieldClass, ScalarKind, SpecialKind};
pub use config::{CodecConfig, ConfigError, ConfigResult, CONFIG_FILE_NAME};
pub use decoder::{decode, Decoder};
pub use encoder::{encode, Encoder};
pub use field::Field;
pub use options::{
    Attachable, AttachmentStrategy, Boxing, CodecOptions, CodecOptionsBuilder,
    IdentifierKeyStrategy, ParentStrategy, DEFAULT_IDENTIFIER_KEY, DEFAULT_MAX_DEPTH,
};
pub use recordable::Recordable;
pub use wrappers::{Blob, Plain, Ref};

pub use flatrec_core::{
    BatchCollector, DecodeError, DecodeResult, EncodeError, EncodeResult, FetchContext,
    FetchError, FieldPath, Identifier, Identity, Record, Reference, Value,
};
