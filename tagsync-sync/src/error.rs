//! Error types for tagsync-sync.

use thiserror::Error;

use tagsync_core::{PairingError, ScanError, SyncError};
use tagsync_publish::PublishError;

/// All errors that can abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("scan of {tree} tree failed: {source}")]
    Scan {
        tree: &'static str,
        #[source]
        source: ScanError,
    },

    #[error("pairing error: {0}")]
    Pairing(#[from] PairingError),

    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("publish error: {0}")]
    Publish(#[from] PublishError),
}
