//! Progress and result lines printed to stdout.

use colored::Colorize;

use tagsync_core::{Pair, SyncOutcome};
use tagsync_sync::{Publication, SyncReport};

fn prefix(dry_run: bool) -> &'static str {
    if dry_run {
        "[dry-run] "
    } else {
        ""
    }
}

/// One line per changed pair, printed as soon as the pair is synced.
pub fn print_outcome(pair: &Pair, outcome: &SyncOutcome, dry_run: bool) {
    let prefix = prefix(dry_run);
    match outcome {
        SyncOutcome::Updated { .. } => println!(
            "{prefix}{} Updated {} with new tag from {}.",
            "✎".green(),
            pair.work.display(),
            pair.trial.display()
        ),
        SyncOutcome::WouldUpdate { .. } => println!(
            "{prefix}{} Would update {} with new tag from {}.",
            "~".yellow(),
            pair.work.display(),
            pair.trial.display()
        ),
        SyncOutcome::Unchanged { .. } => {}
    }
}

/// Files the sync phase left alone for reasons worth knowing about.
pub fn print_sync_summary(report: &SyncReport, dry_run: bool) {
    let prefix = prefix(dry_run);

    for skipped in report
        .work_scan
        .failures()
        .chain(report.trial_scan.failures())
    {
        println!(
            "{prefix}{} Skipped {}: could not be read or parsed",
            "!".yellow(),
            skipped.path.display()
        );
    }

    if !report.pairing.is_complete() {
        let unpaired = report.pairing.unpaired_work.len() + report.pairing.unpaired_trial.len();
        println!(
            "{prefix}{} {unpaired} file(s) left unpaired and not synced",
            "!".yellow()
        );
    }
}

pub fn print_publication(publication: &Publication) {
    match publication {
        Publication::Created(pr) => {
            println!("{} Pull Request created: {}", "✓".green(), pr.html_url)
        }
        Publication::SkippedTesting => println!(
            "{} Tag values synced, but PR creation skipped for testing.",
            "·".dimmed()
        ),
        Publication::SkippedDryRun => {
            println!("[dry-run] {} no files written, no pull request opened", "·".dimmed())
        }
        Publication::NothingChanged => {
            println!("{} All tags already in sync, nothing to do", "✓".green())
        }
    }
}
