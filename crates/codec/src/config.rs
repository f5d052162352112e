//! Codec configuration via `flatrec.toml`
//!
//! The declarative subset of [`CodecOptions`]: the identity field name, the
//! built-in parent and attachment strategies and the decode guards. Custom
//! strategies are closures and can only be set through the builder.

use crate::options::{
    AttachmentStrategy, CodecOptions, IdentifierKeyStrategy, ParentStrategy,
    DEFAULT_IDENTIFIER_KEY, DEFAULT_MAX_DEPTH,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "flatrec.toml";

/// Result type alias for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("config file '{path}': {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting has an unsupported value
    #[error("invalid value for '{key}': {message}")]
    Invalid {
        /// Setting name
        key: &'static str,
        /// What was wrong
        message: String,
    },
}

/// Codec configuration loaded from `flatrec.toml`
///
/// # Example
///
/// ```toml
/// identifier_key = "id"
/// parent_linkage = "nested"
/// attachments = "strings"
/// cycle_guard = true
/// max_depth = 32
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Name of the identity field
    #[serde(default = "default_identifier_key")]
    pub identifier_key: String,
    /// `"none"` or `"nested"`
    #[serde(default = "default_parent_linkage")]
    pub parent_linkage: String,
    /// `"auto"` (local files become assets) or `"strings"`
    #[serde(default = "default_attachments")]
    pub attachments: String,
    /// Reject reference cycles during decode
    #[serde(default = "default_cycle_guard")]
    pub cycle_guard: bool,
    /// Deepest reference chain decode follows
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_identifier_key() -> String {
    DEFAULT_IDENTIFIER_KEY.to_string()
}

fn default_parent_linkage() -> String {
    "none".to_string()
}

fn default_attachments() -> String {
    "auto".to_string()
}

fn default_cycle_guard() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            identifier_key: default_identifier_key(),
            parent_linkage: default_parent_linkage(),
            attachments: default_attachments(),
            cycle_guard: default_cycle_guard(),
            max_depth: default_max_depth(),
        }
    }
}

impl CodecConfig {
    /// Parse and validate config text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: CodecConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Serialize this config and write it to `path`
    pub fn write_to_file(&self, path: &Path) -> ConfigResult<()> {
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            key: "config",
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# flatrec codec configuration
#
# Field that supplies a record's identity (default: "id")
identifier_key = "id"

# Linkage of embedded composite records: "none" (default) or "nested"
#   "nested" = every embedded record is deleted together with its encloser
parent_linkage = "none"

# Boxing of URLs and paths: "auto" (default) or "strings"
#   "auto"    = local files become file assets, other URLs plain strings
#   "strings" = always plain strings
attachments = "auto"

# Reject reference cycles during decode (default: true)
cycle_guard = true

# Deepest reference chain followed during decode (default: 64)
max_depth = 64
"#
    }

    /// Check every setting
    pub fn validate(&self) -> ConfigResult<()> {
        if self.identifier_key.is_empty() {
            return Err(ConfigError::Invalid {
                key: "identifier_key",
                message: "cannot be empty".to_string(),
            });
        }
        self.parent_strategy()?;
        self.attachment_strategy()?;
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                key: "max_depth",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn parent_strategy(&self) -> ConfigResult<ParentStrategy> {
        match self.parent_linkage.as_str() {
            "none" => Ok(ParentStrategy::None),
            "nested" => Ok(ParentStrategy::Nested),
            other => Err(ConfigError::Invalid {
                key: "parent_linkage",
                message: format!("'{}', expected \"none\" or \"nested\"", other),
            }),
        }
    }

    fn attachment_strategy(&self) -> ConfigResult<AttachmentStrategy> {
        match self.attachments.as_str() {
            "auto" => Ok(AttachmentStrategy::local_files()),
            "strings" => Ok(AttachmentStrategy::strings_only()),
            other => Err(ConfigError::Invalid {
                key: "attachments",
                message: format!("'{}', expected \"auto\" or \"strings\"", other),
            }),
        }
    }

    /// Build the options this config describes
    pub fn into_options(self) -> ConfigResult<CodecOptions> {
        self.validate()?;
        Ok(CodecOptions::builder()
            .identifier_key(IdentifierKeyStrategy::named(self.identifier_key.clone()))
            .parent(self.parent_strategy()?)
            .attachments(self.attachment_strategy()?)
            .cycle_guard(self.cycle_guard)
            .max_depth(self.max_depth)
            .build())
    }
}
