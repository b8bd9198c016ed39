//! Error types for tagsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a directory scan.
///
/// Unparsable files only surface here when the scan runs in strict mode;
/// otherwise they are recorded as skipped.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root (or an entry under it) could not be walked.
    #[error("cannot walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A candidate file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A candidate file is not valid YAML.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors from loading, comparing and rewriting a work/trial pair.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; carries line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed, but its top level is not a mapping.
    #[error("{path} is not a YAML mapping")]
    NotMapping { path: PathBuf },

    /// The trial side has no value to copy.
    #[error("{path} has no top-level '{field}' field")]
    MissingField { path: PathBuf, field: String },

    /// YAML serialization error on the write path.
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Which side of a work/trial pairing an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Work,
    Trial,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Work => f.write_str("work"),
            Side::Trial => f.write_str("trial"),
        }
    }
}

/// Errors from keyed pairing.
#[derive(Debug, Error)]
pub enum PairingError {
    /// A document could not be loaded to read its key.
    #[error(transparent)]
    Load(#[from] SyncError),

    #[error("{side} file {path} has no top-level '{field}' to pair on")]
    MissingKey {
        side: Side,
        path: PathBuf,
        field: String,
    },

    #[error("{side} files {first} and {second} share the key '{key}'")]
    DuplicateKey {
        side: Side,
        key: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{side} file {path} (key '{key}') has no counterpart")]
    Unmatched {
        side: Side,
        key: String,
        path: PathBuf,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
