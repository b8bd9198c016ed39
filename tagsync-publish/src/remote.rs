//! Remote URL helpers.

use crate::error::PublishError;

/// Remote that branches are pushed to and the repository name is read from.
pub const ORIGIN: &str = "origin";

/// Repository name from a git remote URL: the last path segment, without a
/// trailing `.git`.
///
/// Handles `https://host/owner/repo(.git)`, `ssh://git@host/owner/repo.git`
/// and scp-style `git@host:owner/repo.git`.
pub fn repository_name(url: &str) -> Result<String, PublishError> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let name = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();

    if name.is_empty() || name.contains('@') {
        return Err(PublishError::RemoteUrl {
            url: url.to_owned(),
        });
    }
    Ok(name.to_owned())
}
