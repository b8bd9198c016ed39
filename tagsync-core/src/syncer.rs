//! Tag syncer — copy the trial `tag` into a work file when they differ.
//!
//! ## Rewrite protocol
//!
//! 1. Parse both files fresh from disk.
//! 2. Compare `tag` by exact parsed value (no type coercion).
//! 3. Equal → return [`SyncOutcome::Unchanged`], nothing touches the disk.
//! 4. Set the work `tag`, serialize the whole mapping as block YAML behind
//!    [`UPDATE_HEADER`].
//! 5. Write to `<path>.tagsync.tmp`, copy the work file's permissions onto
//!    it, then rename over the work file. A symlinked work file is resolved
//!    first so the link survives and its target is rewritten.
//!
//! The rewrite drops the work file's comments and formatting.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{io_err, SyncError};
use crate::types::{display_value, ConfigDocument, TAG_FIELD};

/// First line of every rewritten work file.
pub const UPDATE_HEADER: &str = "# Updated the version based on trial.yaml";

/// Options for a single sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compare only; report [`SyncOutcome::WouldUpdate`] instead of writing.
    pub dry_run: bool,
}

/// Outcome of syncing one work/trial pair.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Tags already matched.
    Unchanged { path: PathBuf },
    /// Work file rewritten with the trial tag.
    Updated {
        path: PathBuf,
        from: Option<Value>,
        to: Value,
    },
    /// Dry run: the work file *would* have been rewritten.
    WouldUpdate {
        path: PathBuf,
        from: Option<Value>,
        to: Value,
    },
}

impl SyncOutcome {
    /// Whether the work file was changed on disk.
    pub fn changed(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            SyncOutcome::Unchanged { path }
            | SyncOutcome::Updated { path, .. }
            | SyncOutcome::WouldUpdate { path, .. } => path,
        }
    }
}

/// Sync `tag` from `trial_path` into `work_path`.
pub fn sync_tag(work_path: &Path, trial_path: &Path) -> Result<SyncOutcome, SyncError> {
    sync_tag_with(work_path, trial_path, &SyncOptions::default())
}

/// [`sync_tag`] with explicit options.
///
/// A missing work `tag` compares as absent. A missing trial `tag` is only an
/// error when the work side has one, since there is nothing to copy.
pub fn sync_tag_with(
    work_path: &Path,
    trial_path: &Path,
    options: &SyncOptions,
) -> Result<SyncOutcome, SyncError> {
    let mut work = ConfigDocument::load(work_path)?;
    let trial = ConfigDocument::load(trial_path)?;

    if work.tag() == trial.tag() {
        tracing::debug!("unchanged: {}", work_path.display());
        return Ok(SyncOutcome::Unchanged {
            path: work_path.to_path_buf(),
        });
    }

    let to = trial.tag().cloned().ok_or_else(|| SyncError::MissingField {
        path: trial_path.to_path_buf(),
        field: TAG_FIELD.to_owned(),
    })?;
    let from = work.tag().cloned();

    if options.dry_run {
        tracing::info!(
            "[dry-run] would update {}: {} -> {}",
            work_path.display(),
            from.as_ref().map(display_value).unwrap_or_else(|| "<none>".into()),
            display_value(&to)
        );
        return Ok(SyncOutcome::WouldUpdate {
            path: work_path.to_path_buf(),
            from,
            to,
        });
    }

    work.set_tag(to.clone());
    write_document(&work)?;

    tracing::info!(
        "updated {}: {} -> {}",
        work_path.display(),
        from.as_ref().map(display_value).unwrap_or_else(|| "<none>".into()),
        display_value(&to)
    );
    Ok(SyncOutcome::Updated {
        path: work_path.to_path_buf(),
        from,
        to,
    })
}

/// Overwrite `doc.path` with the header line plus block YAML.
pub(crate) fn write_document(doc: &ConfigDocument) -> Result<(), SyncError> {
    let target = resolve_target(&doc.path)?;
    let tmp = PathBuf::from(format!("{}.tagsync.tmp", target.display()));
    write_document_with_tmp(doc, &target, &tmp)
}

/// The file a write to `path` must land on: `path` itself, or the file a
/// symlink at `path` points to.
fn resolve_target(path: &Path) -> Result<PathBuf, SyncError> {
    let meta = std::fs::symlink_metadata(path).map_err(|e| io_err(path, e))?;
    if meta.file_type().is_symlink() {
        std::fs::canonicalize(path).map_err(|e| io_err(path, e))
    } else {
        Ok(path.to_path_buf())
    }
}

fn write_document_with_tmp(
    doc: &ConfigDocument,
    target: &Path,
    tmp: &Path,
) -> Result<(), SyncError> {
    let content = format!("{UPDATE_HEADER}\n{}", doc.to_yaml()?);
    let permissions = std::fs::metadata(target)
        .map_err(|e| io_err(target, e))?
        .permissions();

    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    let replaced = std::fs::set_permissions(tmp, permissions)
        .and_then(|()| std::fs::rename(tmp, target));
    if let Err(e) = replaced {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(target, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pair(dir: &TempDir, work: &str, trial: &str) -> (PathBuf, PathBuf) {
        let w = dir.path().join("work.yaml");
        let t = dir.path().join("trial.yaml");
        fs::write(&w, work).unwrap();
        fs::write(&t, trial).unwrap();
        (w, t)
    }

    #[test]
    fn differing_tag_rewrites_work_file() {
        let tmp = TempDir::new().unwrap();
        let (w, t) = pair(&tmp, "name: svc\ntag: v1\n", "name: svc\ntag: v2\n");

        let outcome = sync_tag(&w, &t).unwrap();
        assert!(outcome.changed());
        assert_eq!(
            fs::read_to_string(&w).unwrap(),
            "# Updated the version based on trial.yaml\nname: svc\ntag: v2\n"
        );
    }

    #[test]
    fn equal_tags_do_not_touch_the_file() {
        let tmp = TempDir::new().unwrap();
        let original = "# keep me\ntag: v2\n";
        let (w, t) = pair(&tmp, original, "tag: v2\n");

        let outcome = sync_tag(&w, &t).unwrap();
        assert!(matches!(outcome, SyncOutcome::Unchanged { .. }));
        assert_eq!(fs::read_to_string(&w).unwrap(), original);
    }

    #[test]
    fn missing_work_tag_is_filled_in() {
        let tmp = TempDir::new().unwrap();
        let (w, t) = pair(&tmp, "name: svc\n", "tag: v9\n");

        match sync_tag(&w, &t).unwrap() {
            SyncOutcome::Updated { from, to, .. } => {
                assert_eq!(from, None);
                assert_eq!(to, Value::String("v9".into()));
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[test]
    fn missing_trial_tag_is_an_error_when_work_has_one() {
        let tmp = TempDir::new().unwrap();
        let (w, t) = pair(&tmp, "tag: v1\n", "name: svc\n");

        let err = sync_tag(&w, &t).unwrap_err();
        assert!(matches!(err, SyncError::MissingField { ref field, .. } if field == "tag"));
        assert_eq!(fs::read_to_string(&w).unwrap(), "tag: v1\n");
    }

    #[test]
    fn both_tags_missing_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let (w, t) = pair(&tmp, "name: a\n", "name: b\n");
        assert!(!sync_tag(&w, &t).unwrap().changed());
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let tmp = TempDir::new().unwrap();
        let (w, t) = pair(&tmp, "tag: v1\n", "tag: v2\n");

        let outcome = sync_tag_with(&w, &t, &SyncOptions { dry_run: true }).unwrap();
        assert!(matches!(outcome, SyncOutcome::WouldUpdate { .. }));
        assert!(!outcome.changed());
        assert_eq!(fs::read_to_string(&w).unwrap(), "tag: v1\n");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let (w, t) = pair(&tmp, "tag: v1\n", "tag: v2\n");
        sync_tag(&w, &t).unwrap();
        let tmp_path = PathBuf::from(format!("{}.tagsync.tmp", w.display()));
        assert!(!tmp_path.exists(), ".tagsync.tmp must be cleaned up");
    }

    #[test]
    #[cfg(unix)]
    fn rewrite_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let (w, t) = pair(&tmp, "tag: v1\n", "tag: v2\n");
        fs::set_permissions(&w, fs::Permissions::from_mode(0o600)).unwrap();

        sync_tag(&w, &t).unwrap();
        let mode = fs::metadata(&w).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(fs::read_to_string(&w).unwrap().contains("tag: v2"));
    }

    #[test]
    #[cfg(unix)]
    fn symlinked_work_file_rewrites_target_and_keeps_link() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real.yaml");
        fs::write(&real, "tag: v1\n").unwrap();
        let link = tmp.path().join("work.yaml");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let t = tmp.path().join("trial.yaml");
        fs::write(&t, "tag: v2\n").unwrap();

        assert!(sync_tag(&link, &t).unwrap().changed());
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(&real).unwrap(),
            "# Updated the version based on trial.yaml\ntag: v2\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();
        let path = readonly_dir.join("svc.yaml");
        fs::write(&path, "tag: v1\n").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("svc.yaml.tagsync.tmp");

        let mut doc = ConfigDocument::load(&path).unwrap();
        doc.set_tag(Value::String("v2".into()));
        let result = write_document_with_tmp(&doc, &path, &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Running as root bypasses directory permissions; only check cleanup then.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "tag: v1\n");
        }
        assert!(!tmp_path.exists(), ".tagsync.tmp should be cleaned up");
    }
}
