//! Domain types for tagsync.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::{io_err, SyncError};

/// The top-level field that is synchronized from trial to work files.
pub const TAG_FIELD: &str = "tag";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The client a work repository belongs to. Used in branch and commit names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientName(pub String);

impl fmt::Display for ClientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ClientName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The service whose tag is being updated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceName(pub String);

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ServiceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// ConfigDocument
// ---------------------------------------------------------------------------

/// A parsed YAML mapping together with the file it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    pub path: PathBuf,
    pub mapping: Mapping,
}

impl ConfigDocument {
    /// Read and parse `path`. Always reads from disk; nothing is cached.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        Self::parse(path, &contents)
    }

    /// Parse `contents` as the document stored at `path`.
    ///
    /// Empty documents and non-mapping roots are [`SyncError::NotMapping`].
    pub fn parse(path: &Path, contents: &str) -> Result<Self, SyncError> {
        if contents.trim().is_empty() {
            return Err(SyncError::NotMapping {
                path: path.to_path_buf(),
            });
        }
        let value: Value = serde_yaml::from_str(contents).map_err(|e| SyncError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        match value {
            Value::Mapping(mapping) => Ok(Self {
                path: path.to_path_buf(),
                mapping,
            }),
            _ => Err(SyncError::NotMapping {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Top-level value for `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.mapping.get(field)
    }

    pub fn tag(&self) -> Option<&Value> {
        self.get(TAG_FIELD)
    }

    /// Replace `tag` in place, keeping its position when the key exists.
    pub fn set_tag(&mut self, value: Value) {
        self.mapping
            .insert(Value::String(TAG_FIELD.to_owned()), value);
    }

    /// Block-style YAML for the whole mapping.
    pub fn to_yaml(&self) -> Result<String, SyncError> {
        serde_yaml::to_string(&self.mapping).map_err(|e| SyncError::Serialize {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Render a YAML scalar for log lines and error messages.
///
/// Strings are shown bare; everything else as its YAML form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}
