//! Codec policies
//!
//! [`CodecOptions`] bundles every caller-pluggable decision the engines make.
//! It is built once before a pass and only read during it; encode and decode
//! of the same data must use the same options for a round trip to be stable.
//!
//! # Example
//!
//! ```
//! use flatrec_codec::{CodecOptions, IdentifierKeyStrategy, ParentStrategy};
//!
//! let options = CodecOptions::builder()
//!     .identifier_key(IdentifierKeyStrategy::named("uuid"))
//!     .parent(ParentStrategy::Nested)
//!     .max_depth(16)
//!     .build();
//!
//! assert!(options.identifier_key().matches("uuid"));
//! assert!(!options.identifier_key().matches("id"));
//! ```

use flatrec_core::{Asset, FieldPath, Identifier, Value};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Default name of the identity field
pub const DEFAULT_IDENTIFIER_KEY: &str = "id";

/// Default bound on reference-chain depth during decode
pub const DEFAULT_MAX_DEPTH: usize = 64;

// ============================================================================
// Identifier key
// ============================================================================

/// Decides which field supplies a record's identity
#[derive(Clone)]
pub struct IdentifierKeyStrategy(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl IdentifierKeyStrategy {
    /// Match one field name exactly
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self(Arc::new(move |field: &str| field == name))
    }

    /// Match any of several field names
    pub fn any_of(names: &[&str]) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        Self(Arc::new(move |field: &str| names.iter().any(|n| n == field)))
    }

    /// Caller-supplied predicate
    pub fn custom(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// True if `field` is the identity field
    pub fn matches(&self, field: &str) -> bool {
        (self.0)(field)
    }
}

impl Default for IdentifierKeyStrategy {
    fn default() -> Self {
        Self::named(DEFAULT_IDENTIFIER_KEY)
    }
}

impl fmt::Debug for IdentifierKeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentifierKeyStrategy(..)")
    }
}

// ============================================================================
// Attachments
// ============================================================================

/// Loose file-like value handed to the attachment strategy
#[derive(Debug, Clone, Copy)]
pub enum Attachable<'a> {
    /// URL field
    Url(&'a Url),
    /// Filesystem path field
    Path(&'a Path),
}

/// Outcome of the attachment strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boxing {
    /// Store as an attachment
    Asset(Asset),
    /// Store as a plain string
    Plain(String),
}

impl From<Boxing> for Value {
    fn from(b: Boxing) -> Self {
        match b {
            Boxing::Asset(asset) => Value::Asset(asset),
            Boxing::Plain(s) => Value::String(s),
        }
    }
}

type AttachFn = dyn Fn(&Attachable<'_>) -> Boxing + Send + Sync;

/// Decides how URLs and paths are stored
#[derive(Clone)]
pub struct AttachmentStrategy(Arc<AttachFn>);

impl AttachmentStrategy {
    /// Local files become file assets, everything else a plain string
    pub fn local_files() -> Self {
        Self(Arc::new(box_local_files))
    }

    /// Never produce assets
    pub fn strings_only() -> Self {
        Self(Arc::new(box_strings_only))
    }

    /// Caller-supplied strategy
    pub fn custom(f: impl Fn(&Attachable<'_>) -> Boxing + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Box one attachable value
    pub fn apply(&self, item: &Attachable<'_>) -> Value {
        (self.0)(item).into()
    }
}

fn box_local_files(item: &Attachable<'_>) -> Boxing {
    match item {
        Attachable::Path(path) => Boxing::Asset(Asset::File(path.to_path_buf())),
        Attachable::Url(url) if url.scheme() == "file" => match url.to_file_path() {
            Ok(path) => Boxing::Asset(Asset::File(path)),
            Err(()) => Boxing::Plain(url.to_string()),
        },
        Attachable::Url(url) => Boxing::Plain(url.to_string()),
    }
}

fn box_strings_only(item: &Attachable<'_>) -> Boxing {
    match item {
        Attachable::Path(path) => Boxing::Plain(path.to_string_lossy().into_owned()),
        Attachable::Url(url) => Boxing::Plain(url.to_string()),
    }
}

impl Default for AttachmentStrategy {
    fn default() -> Self {
        Self::local_files()
    }
}

impl fmt::Debug for AttachmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AttachmentStrategy(..)")
    }
}

// ============================================================================
// Parent linkage
// ============================================================================

type ParentFn = dyn Fn(&FieldPath, &Identifier) -> Option<Identifier> + Send + Sync;

/// How embedded composite records are linked to the record that embeds them
#[derive(Clone, Default)]
pub enum ParentStrategy {
    /// Leave linkage alone
    #[default]
    None,
    /// Every embedded composite becomes a cascade-delete child of its encloser
    Nested,
    /// `(field path, child id) -> parent id`; `None` leaves the child unlinked
    Custom(Arc<ParentFn>),
}

impl ParentStrategy {
    /// Caller-supplied linkage
    pub fn custom(
        f: impl Fn(&FieldPath, &Identifier) -> Option<Identifier> + Send + Sync + 'static,
    ) -> Self {
        ParentStrategy::Custom(Arc::new(f))
    }

    /// Parent for a child embedded at `path` inside `enclosing`
    pub fn parent_for(
        &self,
        path: &FieldPath,
        child: &Identifier,
        enclosing: &Identifier,
    ) -> Option<Identifier> {
        match self {
            ParentStrategy::None => None,
            ParentStrategy::Nested => Some(enclosing.clone()),
            ParentStrategy::Custom(f) => f(path, child),
        }
    }
}

impl fmt::Debug for ParentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentStrategy::None => f.write_str("None"),
            ParentStrategy::Nested => f.write_str("Nested"),
            ParentStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Immutable policy set shared by the encode and decode engines
///
/// # Defaults
///
/// - identity field: `"id"`
/// - attachments: local files become assets
/// - parent linkage: none
/// - cycle guard: on
/// - max reference depth: 64
#[derive(Debug, Clone)]
pub struct CodecOptions {
    identifier_key: IdentifierKeyStrategy,
    attachments: AttachmentStrategy,
    parent: ParentStrategy,
    cycle_guard: bool,
    max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            identifier_key: IdentifierKeyStrategy::default(),
            attachments: AttachmentStrategy::default(),
            parent: ParentStrategy::default(),
            cycle_guard: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecOptions {
    /// Start from the defaults
    pub fn builder() -> CodecOptionsBuilder {
        CodecOptionsBuilder::new()
    }

    /// Identity field predicate
    pub fn identifier_key(&self) -> &IdentifierKeyStrategy {
        &self.identifier_key
    }

    /// Attachment boxing
    pub fn attachments(&self) -> &AttachmentStrategy {
        &self.attachments
    }

    /// Parent linkage
    pub fn parent(&self) -> &ParentStrategy {
        &self.parent
    }

    /// Whether decode rejects reference cycles
    pub fn cycle_guard(&self) -> bool {
        self.cycle_guard
    }

    /// Deepest reference chain decode will follow
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Builder for [`CodecOptions`]
#[derive(Debug, Clone, Default)]
pub struct CodecOptionsBuilder {
    options: CodecOptions,
}

impl CodecOptionsBuilder {
    /// Create a builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity field strategy
    pub fn identifier_key(mut self, strategy: IdentifierKeyStrategy) -> Self {
        self.options.identifier_key = strategy;
        self
    }

    /// Set the attachment strategy
    pub fn attachments(mut self, strategy: AttachmentStrategy) -> Self {
        self.options.attachments = strategy;
        self
    }

    /// Set the parent linkage strategy
    pub fn parent(mut self, strategy: ParentStrategy) -> Self {
        self.options.parent = strategy;
        self
    }

    /// Enable or disable the decode cycle guard
    pub fn cycle_guard(mut self, enabled: bool) -> Self {
        self.options.cycle_guard = enabled;
        self
    }

    /// Bound the reference-chain depth followed by decode
    ///
    /// Values below 1 are raised to 1 (the root alone).
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth.max(1);
        self
    }

    /// Finish building
    pub fn build(self) -> CodecOptions {
        self.options
    }
}
