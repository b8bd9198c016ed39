//! # tagsync-publish
//!
//! Branch, commit, push and pull-request creation for a batch of tag updates.
//!
//! [`publish`] drives the sequence against two collaborators:
//! [`VersionControl`] (implemented by [`GitCli`]) and [`PullRequestHost`]
//! (implemented by [`GitHubClient`]). Nothing is rolled back when a step
//! fails.

pub mod error;
pub mod git;
pub mod github;
pub mod publisher;
pub mod remote;

pub use error::PublishError;
pub use git::{GitCli, VersionControl};
pub use github::{GitHubClient, PullRequest, PullRequestHost, PullRequestSpec};
pub use publisher::{publish, ChangePublisher, PublishRequest, Publisher};
