//! Shared run pipeline used by the CLI.
//!
//! Phase one ([`sync`]) scans both trees, pairs the results and syncs every
//! pair. Phase two ([`publish`]) calls the publisher at most once for the
//! whole batch. A run stops at the first error in either phase.

use tagsync_core::{
    pairing, scanner, sync_tag_with, Pair, Pairing, ScanReport, SyncOptions, SyncOutcome,
};
use tagsync_publish::{ChangePublisher, PullRequest};

use crate::config::RunConfig;
use crate::error::PipelineError;

/// Result of the scan/pair/sync phase.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub work_scan: ScanReport,
    pub trial_scan: ScanReport,
    pub pairing: Pairing,
    /// One outcome per entry of `pairing.pairs`, same order.
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    /// Pairs whose work file was (or in a dry run would be) rewritten.
    pub fn changes(&self) -> impl Iterator<Item = (&Pair, &SyncOutcome)> {
        self.pairing
            .pairs
            .iter()
            .zip(&self.outcomes)
            .filter(|(_, o)| !matches!(o, SyncOutcome::Unchanged { .. }))
    }

    pub fn has_changes(&self) -> bool {
        self.changes().next().is_some()
    }
}

/// What happened in the publish phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    Created(PullRequest),
    /// Files were synced but testing mode kept the publisher from running.
    SkippedTesting,
    SkippedDryRun,
    NothingChanged,
}

/// Both phases of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub sync: SyncReport,
    pub publication: Publication,
}

/// Scan, pair and sync.
pub fn sync(config: &RunConfig) -> Result<SyncReport, PipelineError> {
    sync_with_progress(config, &mut |_, _| {})
}

/// [`sync`], calling `on_outcome` for every pair as soon as it is synced.
///
/// Pairs synced before a failing one stay rewritten.
pub fn sync_with_progress(
    config: &RunConfig,
    on_outcome: &mut dyn FnMut(&Pair, &SyncOutcome),
) -> Result<SyncReport, PipelineError> {
    let work_scan = scanner::scan(&config.work_repo, &config.scan).map_err(|e| {
        PipelineError::Scan {
            tree: "work",
            source: e,
        }
    })?;
    let trial_scan = scanner::scan(&config.trial_repo, &config.scan).map_err(|e| {
        PipelineError::Scan {
            tree: "trial",
            source: e,
        }
    })?;
    tracing::info!(
        "found {} work and {} trial files with a tag",
        work_scan.matches.len(),
        trial_scan.matches.len()
    );

    let pairing = pairing::pair(
        &config.pairing,
        work_scan.matches.clone(),
        trial_scan.matches.clone(),
    )?;

    let options = SyncOptions {
        dry_run: config.dry_run,
    };
    let mut outcomes = Vec::with_capacity(pairing.pairs.len());
    for pair in &pairing.pairs {
        let outcome = sync_tag_with(&pair.work, &pair.trial, &options)?;
        on_outcome(pair, &outcome);
        outcomes.push(outcome);
    }

    Ok(SyncReport {
        work_scan,
        trial_scan,
        pairing,
        outcomes,
    })
}

/// Publish the change set in `report`, if there is one and the config allows.
pub fn publish(
    config: &RunConfig,
    report: &SyncReport,
    publisher: &dyn ChangePublisher,
) -> Result<Publication, PipelineError> {
    if !report.has_changes() {
        tracing::info!("no tag changes; nothing to publish");
        return Ok(Publication::NothingChanged);
    }
    if config.dry_run {
        return Ok(Publication::SkippedDryRun);
    }
    if config.testing {
        tracing::info!("testing mode: pull request creation skipped");
        return Ok(Publication::SkippedTesting);
    }

    let pr = publisher.publish(&config.publish_request())?;
    Ok(Publication::Created(pr))
}

/// Run both phases.
pub fn run(config: &RunConfig, publisher: &dyn ChangePublisher) -> Result<RunReport, PipelineError> {
    let sync = sync(config)?;
    let publication = publish(config, &sync, publisher)?;
    Ok(RunReport { sync, publication })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};

    use tagsync_core::{PairingError, PairingMode};
    use tagsync_publish::{PublishError, PublishRequest};
    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct FakePublisher {
        requests: RefCell<Vec<PublishRequest>>,
        fail: bool,
    }

    impl ChangePublisher for FakePublisher {
        fn publish(&self, request: &PublishRequest) -> Result<PullRequest, PublishError> {
            self.requests.borrow_mut().push(request.clone());
            if self.fail {
                return Err(PublishError::Git {
                    command: "git checkout -b".into(),
                    stderr: "already exists".into(),
                });
            }
            Ok(PullRequest {
                number: 1,
                html_url: "https://github.com/octo/work/pull/1".into(),
            })
        }
    }

    struct Trees {
        work: TempDir,
        trial: TempDir,
    }

    impl Trees {
        fn new() -> Self {
            Self {
                work: TempDir::new().expect("work"),
                trial: TempDir::new().expect("trial"),
            }
        }

        fn work(&self, name: &str, content: &str) -> PathBuf {
            write(self.work.path(), name, content)
        }

        fn trial(&self, name: &str, content: &str) -> PathBuf {
            write(self.trial.path(), name, content)
        }

        fn config(&self) -> RunConfig {
            RunConfig {
                work_repo: self.work.path().to_path_buf(),
                trial_repo: self.trial.path().to_path_buf(),
                client: "acme".into(),
                service: "api".into(),
                ..RunConfig::default()
            }
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn changed_run_publishes_exactly_once() {
        let t = Trees::new();
        t.work("a.yaml", "tag: a1\n");
        t.work("b.yaml", "tag: b1\n");
        t.trial("a.yaml", "tag: a2\n");
        t.trial("b.yaml", "tag: b2\n");

        let publisher = FakePublisher::default();
        let report = run(&t.config(), &publisher).expect("run");

        assert_eq!(report.sync.changes().count(), 2);
        assert_eq!(publisher.requests.borrow().len(), 1);
        assert_eq!(
            publisher.requests.borrow()[0].branch_name(),
            "chore/acme-update-api"
        );
        assert!(matches!(report.publication, Publication::Created(ref pr) if pr.number == 1));
    }

    #[test]
    fn testing_mode_syncs_but_never_publishes() {
        let t = Trees::new();
        let w = t.work("svc.yaml", "tag: v1\n");
        t.trial("svc.yaml", "tag: v2\n");

        let config = RunConfig {
            testing: true,
            ..t.config()
        };
        let publisher = FakePublisher::default();
        let report = run(&config, &publisher).expect("run");

        assert_eq!(report.publication, Publication::SkippedTesting);
        assert!(publisher.requests.borrow().is_empty());
        assert!(fs::read_to_string(w).unwrap().contains("tag: v2"));
    }

    #[test]
    fn nothing_changed_means_no_publish() {
        let t = Trees::new();
        t.work("svc.yaml", "tag: v2\n");
        t.trial("svc.yaml", "tag: v2\n");

        let publisher = FakePublisher::default();
        let report = run(&t.config(), &publisher).expect("run");

        assert_eq!(report.publication, Publication::NothingChanged);
        assert!(publisher.requests.borrow().is_empty());
    }

    #[test]
    fn dry_run_writes_and_publishes_nothing() {
        let t = Trees::new();
        let w = t.work("svc.yaml", "tag: v1\n");
        t.trial("svc.yaml", "tag: v2\n");

        let config = RunConfig {
            dry_run: true,
            ..t.config()
        };
        let publisher = FakePublisher::default();
        let report = run(&config, &publisher).expect("run");

        assert_eq!(report.publication, Publication::SkippedDryRun);
        assert!(report.sync.has_changes());
        assert!(publisher.requests.borrow().is_empty());
        assert_eq!(fs::read_to_string(w).unwrap(), "tag: v1\n");
    }

    #[test]
    fn extra_work_files_are_dropped_silently() {
        let t = Trees::new();
        t.work("1.yaml", "tag: a1\n");
        t.work("2.yaml", "tag: b1\n");
        let third = t.work("3.yaml", "tag: c1\n");
        t.trial("1.yaml", "tag: a2\n");
        t.trial("2.yaml", "tag: b2\n");

        let config = RunConfig {
            testing: true,
            ..t.config()
        };
        let report = run(&config, &FakePublisher::default()).expect("run");

        assert_eq!(report.sync.outcomes.len(), 2);
        assert_eq!(report.sync.pairing.unpaired_work, vec![third.clone()]);
        assert_eq!(fs::read_to_string(third).unwrap(), "tag: c1\n");
    }

    #[test]
    fn publish_failure_aborts_after_files_were_synced() {
        let t = Trees::new();
        let w = t.work("svc.yaml", "tag: v1\n");
        t.trial("svc.yaml", "tag: v2\n");

        let publisher = FakePublisher {
            fail: true,
            ..FakePublisher::default()
        };
        let err = run(&t.config(), &publisher).unwrap_err();

        assert!(matches!(err, PipelineError::Publish(_)));
        assert!(fs::read_to_string(w).unwrap().contains("tag: v2"));
    }

    #[test]
    fn outcomes_are_reported_before_a_later_pair_fails() {
        let t = Trees::new();
        let first = t.work("1.yaml", "tag: a1\n");
        t.work("2.yaml", "tag: b1\n");
        t.trial("1.yaml", "tag: a2\n");
        t.trial("2.yaml", "tag: b2\n");
        fs::create_dir(t.work.path().join("2.yaml.tagsync.tmp")).unwrap();

        let mut seen = Vec::new();
        let err = sync_with_progress(&t.config(), &mut |pair, outcome| {
            seen.push((pair.work.clone(), outcome.changed()));
        })
        .unwrap_err();

        assert!(matches!(err, PipelineError::Sync(_)));
        assert_eq!(seen, vec![(first.clone(), true)]);
        assert!(fs::read_to_string(first).unwrap().contains("tag: a2"));
    }

    #[test]
    fn trial_files_without_tag_are_not_paired() {
        let t = Trees::new();
        let w = t.work("svc.yaml", "tag: v1\n");
        t.trial("svc.yaml", "name: svc\n");

        let report = run(&t.config(), &FakePublisher::default()).expect("run");

        assert!(report.sync.pairing.pairs.is_empty());
        assert_eq!(report.sync.pairing.unpaired_work, vec![w.clone()]);
        assert_eq!(fs::read_to_string(w).unwrap(), "tag: v1\n");
    }

    #[test]
    fn keyed_pairing_matches_by_name() {
        let t = Trees::new();
        let api = t.work("a.yaml", "name: api\ntag: 1\n");
        let web = t.work("b.yaml", "name: web\ntag: 1\n");
        t.trial("a.yaml", "name: web\ntag: 3\n");
        t.trial("b.yaml", "name: api\ntag: 2\n");

        let config = RunConfig {
            testing: true,
            pairing: PairingMode::Keyed {
                field: "name".into(),
            },
            ..t.config()
        };
        run(&config, &FakePublisher::default()).expect("run");

        assert!(fs::read_to_string(api).unwrap().contains("tag: 2"));
        assert!(fs::read_to_string(web).unwrap().contains("tag: 3"));
    }

    #[test]
    fn keyed_pairing_rejects_count_mismatch() {
        let t = Trees::new();
        t.work("a.yaml", "name: api\ntag: 1\n");
        t.work("b.yaml", "name: web\ntag: 1\n");
        t.trial("a.yaml", "name: api\ntag: 2\n");

        let config = RunConfig {
            pairing: PairingMode::Keyed {
                field: "name".into(),
            },
            ..t.config()
        };
        let err = run(&config, &FakePublisher::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Pairing(PairingError::Unmatched { .. })
        ));
    }

    #[test]
    fn missing_work_tree_is_a_scan_error() {
        let t = Trees::new();
        let config = RunConfig {
            work_repo: t.work.path().join("missing"),
            ..t.config()
        };
        let err = run(&config, &FakePublisher::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Scan { tree: "work", .. }));
    }
}
