//! Config scanner — find YAML files whose top-level mapping carries `tag`.
//!
//! The walk is recursive and sorted by file name within each directory, so the
//! order of [`ScanReport::matches`] is stable across platforms. Positional
//! pairing depends on that order. `.git` directories are never entered.
//!
//! Candidates that do not qualify are not errors. Each one is recorded in
//! [`ScanReport::skipped`] with the reason, so a file that failed to parse can
//! be told apart from one that simply has no `tag`. Set
//! [`ScanOptions::strict`] to turn read and parse failures into hard errors.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use walkdir::{DirEntry, WalkDir};

use crate::error::ScanError;
use crate::types::TAG_FIELD;

/// Extension filter used when none is configured.
pub const DEFAULT_EXTENSION: &str = ".yaml";

/// Scan configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// File name suffix a candidate must end with (e.g. `.yaml`).
    pub extension: String,
    /// Fail on the first unreadable or unparsable candidate.
    pub strict: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_owned(),
            strict: false,
        }
    }
}

impl ScanOptions {
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..Self::default()
        }
    }
}

/// Why a candidate file was left out of the scan result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Could not be read (permissions, not UTF-8, ...).
    Unreadable(String),
    /// Not valid YAML.
    Unparsable(String),
    /// Valid YAML, but empty or not a mapping at the top level.
    NotMapping,
    /// A mapping without a top-level `tag`.
    MissingTag,
}

/// A candidate file that did not make it into the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of scanning one directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Files carrying a top-level `tag`, in traversal order.
    pub matches: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

impl ScanReport {
    /// Skipped files that failed to read or parse, as opposed to files that
    /// were valid but not applicable.
    pub fn failures(&self) -> impl Iterator<Item = &SkippedFile> {
        self.skipped.iter().filter(|s| {
            matches!(
                s.reason,
                SkipReason::Unreadable(_) | SkipReason::Unparsable(_)
            )
        })
    }
}

/// Walk `root` and classify every file ending with `options.extension`.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanReport, ScanError> {
    let mut report = ScanReport::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_git_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    root: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!("skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };

        if !is_candidate(&entry) || !has_extension(&entry, &options.extension) {
            continue;
        }

        let path = entry.into_path();
        match inspect(&path) {
            Ok(None) => {
                tracing::debug!("tag found: {}", path.display());
                report.matches.push(path);
            }
            Ok(Some(reason)) => {
                tracing::debug!("skipped {}: {:?}", path.display(), reason);
                report.skipped.push(SkippedFile { path, reason });
            }
            Err(e) if options.strict => return Err(e),
            Err(e) => {
                tracing::warn!("skipped {}", e);
                let reason = match &e {
                    ScanError::Parse { source, .. } => SkipReason::Unparsable(source.to_string()),
                    ScanError::Io { source, .. } => SkipReason::Unreadable(source.to_string()),
                    ScanError::Walk { source, .. } => SkipReason::Unreadable(source.to_string()),
                };
                report.skipped.push(SkippedFile { path, reason });
            }
        }
    }

    tracing::debug!(
        "scanned {}: {} matched, {} skipped",
        root.display(),
        report.matches.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Paths under `root` with `extension` whose YAML has a top-level `tag`.
///
/// Unparsable files are skipped.
pub fn tag_paths(root: &Path, extension: &str) -> Result<Vec<PathBuf>, ScanError> {
    Ok(scan(root, &ScanOptions::with_extension(extension))?.matches)
}

/// `Ok(None)` when the file qualifies, `Ok(Some(reason))` when it is valid but
/// not applicable, `Err` when it cannot be read or parsed.
fn inspect(path: &Path) -> Result<Option<SkipReason>, ScanError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if contents.trim().is_empty() {
        return Ok(Some(SkipReason::NotMapping));
    }
    let value: Value = serde_yaml::from_str(&contents).map_err(|e| ScanError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(match value.as_mapping() {
        Some(mapping) if mapping.contains_key(TAG_FIELD) => None,
        Some(_) => Some(SkipReason::MissingTag),
        None => Some(SkipReason::NotMapping),
    })
}

/// Regular files, plus symlinks unless they point at a directory. A dangling
/// link is still a candidate so it shows up as unreadable.
fn is_candidate(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        return !entry.path().is_dir();
    }
    file_type.is_file()
}

fn has_extension(entry: &DirEntry, extension: &str) -> bool {
    entry.file_name().to_string_lossy().ends_with(extension)
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == ".git"
}
