//! tagsync core library — YAML config documents, scanning, tag sync, pairing.
//!
//! Public API surface:
//! - [`types`] — [`ConfigDocument`] and the client/service newtypes
//! - [`error`] — [`ScanError`], [`SyncError`], [`PairingError`]
//! - [`scanner`] — find YAML files carrying a top-level `tag`
//! - [`syncer`] — copy a trial `tag` into a work file
//! - [`pairing`] — correlate work and trial files

pub mod error;
pub mod pairing;
pub mod scanner;
pub mod syncer;
pub mod types;

pub use error::{PairingError, ScanError, Side, SyncError};
pub use pairing::{Pair, Pairing, PairingMode};
pub use scanner::{ScanOptions, ScanReport, SkipReason, SkippedFile};
pub use syncer::{sync_tag, sync_tag_with, SyncOptions, SyncOutcome};
pub use types::{ClientName, ConfigDocument, ServiceName, TAG_FIELD};
