//! Git plumbing behind the [`VersionControl`] trait.
//!
//! [`GitCli`] shells out to the `git` executable in the repository working
//! directory, so credentials, hooks and signing follow the user's own git
//! configuration.

use std::path::PathBuf;
use std::process::Command;

use crate::error::PublishError;
use crate::remote::ORIGIN;

/// The version-control operations the publisher needs, in the order it
/// calls them.
pub trait VersionControl {
    /// Create `branch` from the current HEAD and check it out.
    fn create_branch(&self, branch: &str) -> Result<(), PublishError>;
    /// Stage every working-tree change, including deletions.
    fn stage_all(&self) -> Result<(), PublishError>;
    fn commit(&self, message: &str) -> Result<(), PublishError>;
    /// Push `branch` to `origin` and set it as upstream.
    fn push(&self, branch: &str) -> Result<(), PublishError>;
    /// Fetch URL of `remote`.
    fn remote_url(&self, remote: &str) -> Result<String, PublishError>;
}

/// [`VersionControl`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    /// Run `git <args>` in the repository, returning trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String, PublishError> {
        let command = format!("git {}", args.join(" "));
        tracing::debug!("{} (in {})", command, self.repo.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .map_err(|e| PublishError::Spawn {
                command: command.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PublishError::Git { command, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl VersionControl for GitCli {
    fn create_branch(&self, branch: &str) -> Result<(), PublishError> {
        self.run(&["checkout", "-b", branch]).map(drop)
    }

    fn stage_all(&self) -> Result<(), PublishError> {
        self.run(&["add", "-A"]).map(drop)
    }

    fn commit(&self, message: &str) -> Result<(), PublishError> {
        self.run(&["commit", "-m", message]).map(drop)
    }

    fn push(&self, branch: &str) -> Result<(), PublishError> {
        self.run(&["push", "--set-upstream", ORIGIN, branch]).map(drop)
    }

    fn remote_url(&self, remote: &str) -> Result<String, PublishError> {
        self.run(&["remote", "get-url", remote])
    }
}
