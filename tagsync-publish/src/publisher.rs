//! Change publishing — branch, commit, push, pull request.
//!
//! ## `publish` — 7-step protocol
//!
//! 1. Create and check out `chore/<client>-update-<service>`.
//! 2. Stage all working-tree changes.
//! 3. Commit `chore(<client>): updated <service> tag`.
//! 4. Push the branch to `origin` with upstream tracking.
//! 5. Authenticate against the hosting API.
//! 6. Derive the repository name from the `origin` URL.
//! 7. Open the pull request `head = branch`, `base = request.base`.
//!
//! A failing step aborts the sequence. Earlier steps are not undone, so a
//! failure after step 4 leaves a pushed branch without a pull request, and
//! re-running with the same names fails at step 1.

use tagsync_core::{ClientName, ServiceName};

use crate::error::PublishError;
use crate::git::VersionControl;
use crate::github::{PullRequest, PullRequestHost, PullRequestSpec};
use crate::remote::{repository_name, ORIGIN};

/// Base branch pull requests target unless configured otherwise.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Pull request description.
pub const PR_BODY: &str = "Automated PR to sync tag values.";

/// What to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub client: ClientName,
    pub service: ServiceName,
    pub base: String,
}

impl PublishRequest {
    pub fn new(client: impl Into<ClientName>, service: impl Into<ServiceName>) -> Self {
        Self {
            client: client.into(),
            service: service.into(),
            base: DEFAULT_BASE_BRANCH.to_owned(),
        }
    }

    /// `chore/<client>-update-<service>`
    pub fn branch_name(&self) -> String {
        format!("chore/{}-update-{}", self.client, self.service)
    }

    /// `chore(<client>): updated <service> tag`, used as commit message and PR title.
    pub fn commit_message(&self) -> String {
        format!("chore({}): updated {} tag", self.client, self.service)
    }
}

/// Run the publish sequence against `vcs` and `host`.
pub fn publish(
    vcs: &dyn VersionControl,
    host: &dyn PullRequestHost,
    request: &PublishRequest,
) -> Result<PullRequest, PublishError> {
    let branch = request.branch_name();
    let message = request.commit_message();

    tracing::info!("creating branch {branch}");
    vcs.create_branch(&branch)?;
    vcs.stage_all()?;
    tracing::info!("committing: {message}");
    vcs.commit(&message)?;
    tracing::info!("pushing {branch} to {ORIGIN}");
    vcs.push(&branch)?;

    let owner = host.authenticate()?;
    let repo = repository_name(&vcs.remote_url(ORIGIN)?)?;
    tracing::info!("opening pull request on {owner}/{repo}: {branch} -> {}", request.base);

    let pr = host.create_pull_request(&PullRequestSpec {
        owner,
        repo,
        title: message,
        body: PR_BODY.to_owned(),
        head: branch,
        base: request.base.clone(),
    })?;
    tracing::info!("pull request #{} created: {}", pr.number, pr.html_url);
    Ok(pr)
}

/// Anything that can publish a change set. The orchestrator depends on this
/// rather than on git and GitHub directly.
pub trait ChangePublisher {
    fn publish(&self, request: &PublishRequest) -> Result<PullRequest, PublishError>;
}

/// [`ChangePublisher`] over a concrete version-control and hosting pair.
#[derive(Debug)]
pub struct Publisher<V, H> {
    vcs: V,
    host: H,
}

impl<V: VersionControl, H: PullRequestHost> Publisher<V, H> {
    pub fn new(vcs: V, host: H) -> Self {
        Self { vcs, host }
    }
}

impl<V: VersionControl, H: PullRequestHost> ChangePublisher for Publisher<V, H> {
    fn publish(&self, request: &PublishRequest) -> Result<PullRequest, PublishError> {
        publish(&self.vcs, &self.host, request)
    }
}
