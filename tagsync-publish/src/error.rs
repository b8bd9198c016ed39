//! Error types for tagsync-publish.

use thiserror::Error;

/// All errors that can arise while publishing a change set.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The `git` executable could not be started.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully.
    #[error("{command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// No repository name could be derived from the remote URL.
    #[error("cannot derive repository name from remote URL '{url}'")]
    RemoteUrl { url: String },

    /// The hosting API answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The request never got an HTTP answer (DNS, TLS, timeout, ...).
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// The response body was not the JSON we expected.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}
