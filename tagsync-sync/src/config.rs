//! Run configuration.
//!
//! Every value has a literal fallback so a bare `tagsync` invocation is a
//! well-defined (if useless) run. The binary fills this from flags, the
//! environment and `.env`.

use std::path::PathBuf;

use secrecy::SecretString;
use tagsync_core::{ClientName, PairingMode, ScanOptions, ServiceName};
use tagsync_publish::{github::DEFAULT_API_URL, publisher::DEFAULT_BASE_BRANCH, PublishRequest};

pub const DEFAULT_WORK_REPO: &str = "path/to/work/repo";
pub const DEFAULT_TRIAL_REPO: &str = "path/to/trial/repo";
pub const DEFAULT_TOKEN: &str = "fake_token_for_local_test";
pub const DEFAULT_CLIENT: &str = "client-name";
pub const DEFAULT_SERVICE: &str = "service-name";

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Working copy whose files are rewritten and published.
    pub work_repo: PathBuf,
    /// Tree the tag values are taken from.
    pub trial_repo: PathBuf,
    /// Hosting API token, only exposed when the request header is built.
    pub token: SecretString,
    pub client: ClientName,
    pub service: ServiceName,
    /// Sync files but never publish.
    pub testing: bool,
    /// Report what would change; write and publish nothing.
    pub dry_run: bool,
    /// Applied to both trees.
    pub scan: ScanOptions,
    pub pairing: PairingMode,
    pub base_branch: String,
    pub api_url: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            work_repo: PathBuf::from(DEFAULT_WORK_REPO),
            trial_repo: PathBuf::from(DEFAULT_TRIAL_REPO),
            token: SecretString::new(DEFAULT_TOKEN.into()),
            client: ClientName::from(DEFAULT_CLIENT),
            service: ServiceName::from(DEFAULT_SERVICE),
            testing: false,
            dry_run: false,
            scan: ScanOptions::default(),
            pairing: PairingMode::Positional,
            base_branch: DEFAULT_BASE_BRANCH.to_owned(),
            api_url: DEFAULT_API_URL.to_owned(),
        }
    }
}

impl RunConfig {
    /// Whether a changed run should reach the publisher.
    pub fn publishes(&self) -> bool {
        !self.testing && !self.dry_run
    }

    pub fn publish_request(&self) -> PublishRequest {
        PublishRequest {
            client: self.client.clone(),
            service: self.service.clone(),
            base: self.base_branch.clone(),
        }
    }
}
