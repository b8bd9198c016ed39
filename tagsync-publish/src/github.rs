//! Pull-request creation behind the [`PullRequestHost`] trait.
//!
//! [`GitHubClient`] is a blocking REST client. Pull requests are opened on
//! `<login>/<repo>`, where `<login>` is the account the token belongs to.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::PublishError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything needed to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSpec {
    /// Owner of the repository (the authenticated login).
    pub owner: String,
    pub repo: String,
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// A created pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// A remote hosting service that can open pull requests.
pub trait PullRequestHost {
    /// Verify the credential and return the login it belongs to.
    fn authenticate(&self) -> Result<String, PublishError>;
    fn create_pull_request(&self, spec: &PullRequestSpec) -> Result<PullRequest, PublishError>;
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

#[derive(Debug, Serialize)]
struct CreatePull<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

/// GitHub REST API client.
#[derive(Debug)]
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    token: SecretString,
}

impl GitHubClient {
    /// Client for `api_url` (e.g. [`DEFAULT_API_URL`] or a GitHub Enterprise
    /// `https://host/api/v3`).
    pub fn new(api_url: impl Into<String>, token: SecretString) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .user_agent(concat!("tagsync/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn request(&self, method: &'static str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token.expose_secret()))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }
}

impl PullRequestHost for GitHubClient {
    fn authenticate(&self) -> Result<String, PublishError> {
        let url = self.url("/user");
        let response = self.request("GET", &url).call();
        let user: User = decode(check("GET", &url, response)?, &url)?;
        Ok(user.login)
    }

    fn create_pull_request(&self, spec: &PullRequestSpec) -> Result<PullRequest, PublishError> {
        let url = self.url(&format!("/repos/{}/{}/pulls", spec.owner, spec.repo));
        let payload = CreatePull {
            title: &spec.title,
            body: &spec.body,
            head: &spec.head,
            base: &spec.base,
        };
        let response = self.request("POST", &url).send_json(&payload);
        decode(check("POST", &url, response)?, &url)
    }
}

/// Split a ureq result into success, HTTP error or transport error.
fn check(
    method: &'static str,
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, PublishError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, response)) => Err(PublishError::Http {
            method,
            url: url.to_owned(),
            status,
            body: response.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Transport(transport)) => Err(PublishError::Transport {
            method,
            url: url.to_owned(),
            source: Box::new(transport),
        }),
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    response: ureq::Response,
    url: &str,
) -> Result<T, PublishError> {
    response.into_json().map_err(|e| PublishError::Decode {
        url: url.to_owned(),
        source: e,
    })
}
