//! Work/trial pairing.
//!
//! [`PairingMode::Positional`] zips the two scan results: the Nth work match
//! is assumed to be the same service as the Nth trial match, and whatever is
//! left over on the longer side is reported in [`Pairing`] but not synced.
//!
//! [`PairingMode::Keyed`] pairs documents by a declared top-level field (for
//! example `name`). Every document must carry the field, keys must be unique
//! per side, and every key must appear on both sides.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_yaml::Value;

use crate::error::{PairingError, Side};
use crate::types::{display_value, ConfigDocument};

/// How work and trial files are correlated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PairingMode {
    /// Match by position in traversal order; truncate to the shorter side.
    #[default]
    Positional,
    /// Match by equal values of a top-level field.
    Keyed { field: String },
}

/// A work file and the trial file its tag is taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub work: PathBuf,
    pub trial: PathBuf,
}

/// Result of pairing two scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    pub pairs: Vec<Pair>,
    /// Work files beyond the end of the trial sequence (positional only).
    pub unpaired_work: Vec<PathBuf>,
    /// Trial files beyond the end of the work sequence (positional only).
    pub unpaired_trial: Vec<PathBuf>,
}

impl Pairing {
    pub fn is_complete(&self) -> bool {
        self.unpaired_work.is_empty() && self.unpaired_trial.is_empty()
    }
}

/// Pair `work` with `trial` according to `mode`.
pub fn pair(
    mode: &PairingMode,
    work: Vec<PathBuf>,
    trial: Vec<PathBuf>,
) -> Result<Pairing, PairingError> {
    match mode {
        PairingMode::Positional => Ok(pair_positional(work, trial)),
        PairingMode::Keyed { field } => pair_by_key(work, trial, field),
    }
}

/// Zip the two sequences. Never fails.
pub fn pair_positional(mut work: Vec<PathBuf>, mut trial: Vec<PathBuf>) -> Pairing {
    let n = work.len().min(trial.len());
    let unpaired_work = work.split_off(n);
    let unpaired_trial = trial.split_off(n);

    let pairing = Pairing {
        pairs: work
            .into_iter()
            .zip(trial)
            .map(|(work, trial)| Pair { work, trial })
            .collect(),
        unpaired_work,
        unpaired_trial,
    };
    for path in &pairing.unpaired_work {
        tracing::warn!("no trial file left to pair with {}", path.display());
    }
    for path in &pairing.unpaired_trial {
        tracing::warn!("no work file left to pair with {}", path.display());
    }
    pairing
}

/// Pair by the value of `field`. Output follows work order.
pub fn pair_by_key(
    work: Vec<PathBuf>,
    trial: Vec<PathBuf>,
    field: &str,
) -> Result<Pairing, PairingError> {
    let work_keys = keyed(Side::Work, work, field)?;
    let mut trial_keys: HashMap<Value, PathBuf> = HashMap::new();
    let mut trial_order = Vec::new();
    for (key, path) in keyed(Side::Trial, trial, field)? {
        trial_order.push(key.clone());
        trial_keys.insert(key, path);
    }

    let mut pairs = Vec::with_capacity(work_keys.len());
    for (key, work_path) in work_keys {
        let trial_path = trial_keys
            .remove(&key)
            .ok_or_else(|| PairingError::Unmatched {
                side: Side::Work,
                key: display_value(&key),
                path: work_path.clone(),
            })?;
        pairs.push(Pair {
            work: work_path,
            trial: trial_path,
        });
    }

    // Report leftovers in trial traversal order.
    for key in trial_order {
        if let Some(path) = trial_keys.remove(&key) {
            return Err(PairingError::Unmatched {
                side: Side::Trial,
                key: display_value(&key),
                path,
            });
        }
    }

    Ok(Pairing {
        pairs,
        ..Pairing::default()
    })
}

/// Load each path and read its key, rejecting missing and duplicate keys.
fn keyed(
    side: Side,
    paths: Vec<PathBuf>,
    field: &str,
) -> Result<Vec<(Value, PathBuf)>, PairingError> {
    let mut seen: HashMap<Value, PathBuf> = HashMap::new();
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let doc = ConfigDocument::load(&path)?;
        let key = doc
            .get(field)
            .cloned()
            .ok_or_else(|| PairingError::MissingKey {
                side,
                path: path.clone(),
                field: field.to_owned(),
            })?;
        if let Some(first) = seen.get(&key) {
            return Err(PairingError::DuplicateKey {
                side,
                key: display_value(&key),
                first: first.clone(),
                second: path,
            });
        }
        seen.insert(key.clone(), path.clone());
        out.push((key, path));
    }
    Ok(out)
}
