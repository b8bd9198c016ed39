//! tagsync — copy `tag` values from trial YAML configs into work configs and
//! open a pull request with the result.
//!
//! # Usage
//!
//! ```text
//! tagsync [--work-repo <PATH>] [--trial-repo <PATH>] [--client <NAME>] [--service <NAME>]
//!         [--token <TOKEN>] [--testing] [--dry-run] [--extension <EXT>] [--strict]
//!         [--pair-by <FIELD>] [--base-branch <BRANCH>] [--api-url <URL>]
//! ```
//!
//! Every flag can also be set through the environment (`WORK_REPO`,
//! `TRIAL_REPO`, `GITHUB_TOKEN`, `CLIENT_NAME`, `SERVICE_NAME`, `TAGSYNC_*`,
//! `GITHUB_API_URL`) or a `.env` file in the current directory.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use secrecy::SecretString;

use tagsync_core::{scanner::DEFAULT_EXTENSION, PairingMode, ScanOptions};
use tagsync_publish::{
    github::DEFAULT_API_URL, publisher::DEFAULT_BASE_BRANCH, GitCli, GitHubClient, Publisher,
};
use tagsync_sync::{
    config::{DEFAULT_CLIENT, DEFAULT_SERVICE, DEFAULT_TOKEN, DEFAULT_TRIAL_REPO, DEFAULT_WORK_REPO},
    pipeline, RunConfig,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tagsync",
    version,
    about = "Sync `tag` values from trial YAML configs into work configs and open a pull request",
    long_about = None,
)]
struct Cli {
    /// Repository whose YAML files are rewritten and published.
    #[arg(long, env = "WORK_REPO", default_value = DEFAULT_WORK_REPO)]
    work_repo: PathBuf,

    /// Tree the tag values are copied from.
    #[arg(long, env = "TRIAL_REPO", default_value = DEFAULT_TRIAL_REPO)]
    trial_repo: PathBuf,

    /// Token for the hosting API.
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        default_value = DEFAULT_TOKEN,
        hide_env_values = true,
        hide_default_value = true
    )]
    token: String,

    /// Client name used in the branch, commit and pull request title.
    #[arg(long, env = "CLIENT_NAME", default_value = DEFAULT_CLIENT)]
    client: String,

    /// Service name used in the branch, commit and pull request title.
    #[arg(long, env = "SERVICE_NAME", default_value = DEFAULT_SERVICE)]
    service: String,

    /// Sync files but skip branch, push and pull request creation.
    #[arg(long, env = "TAGSYNC_TESTING", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    testing: bool,

    /// Show what would change without writing files or publishing.
    #[arg(long, env = "TAGSYNC_DRY_RUN", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    dry_run: bool,

    /// File name suffix of the config files to scan.
    #[arg(long, env = "TAGSYNC_EXTENSION", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Fail on unreadable or unparsable config files instead of skipping them.
    #[arg(long, env = "TAGSYNC_STRICT", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    strict: bool,

    /// Pair work and trial files by this top-level field instead of by position.
    #[arg(long = "pair-by", env = "TAGSYNC_PAIR_BY", value_name = "FIELD")]
    pair_by: Option<String>,

    /// Branch the pull request targets.
    #[arg(long, env = "TAGSYNC_BASE_BRANCH", default_value = DEFAULT_BASE_BRANCH)]
    base_branch: String,

    /// Hosting API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            work_repo: self.work_repo,
            trial_repo: self.trial_repo,
            token: SecretString::new(self.token.into()),
            client: self.client.into(),
            service: self.service.into(),
            testing: self.testing,
            dry_run: self.dry_run,
            scan: ScanOptions {
                extension: self.extension,
                strict: self.strict,
            },
            pairing: match self.pair_by {
                Some(field) => PairingMode::Keyed { field },
                None => PairingMode::Positional,
            },
            base_branch: self.base_branch,
            api_url: self.api_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Cli::parse().into_config();
    tracing::debug!(?config, "starting run");

    let report = pipeline::sync_with_progress(&config, &mut |pair, outcome| {
        output::print_outcome(pair, outcome, config.dry_run)
    })
    .context("tag sync failed")?;
    output::print_sync_summary(&report, config.dry_run);

    let publisher = Publisher::new(
        GitCli::new(&config.work_repo),
        GitHubClient::new(&config.api_url, config.token.clone()),
    );
    let publication = pipeline::publish(&config, &report, &publisher)
        .with_context(|| format!("publishing changes in '{}' failed", config.work_repo.display()))?;
    output::print_publication(&publication);
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
