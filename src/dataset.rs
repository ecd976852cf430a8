use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::features::{FeatureRow, build_features, write_features};
use crate::match_log::MatchRecord;
use crate::roster::Roster;

const DEFAULT_ROSTER: &str = "data/pokemon.csv";
const DEFAULT_COMBATS: &str = "data/combats.csv";
const DEFAULT_HELDOUT: &str = "data/tests.csv";
const DEFAULT_TRAIN_OUT: &str = "data/pokemon_combat_classifier - train.csv";
const DEFAULT_SCORING_OUT: &str = "data/pokemon_combat_classifier - test.csv";
const DEFAULT_WIN_RATE_OUT: &str = "data/pokemon_win_rate_regressor - train.csv";

/// Input tables and output locations for the offline jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub roster: PathBuf,
    pub combats: PathBuf,
    pub heldout: PathBuf,
    pub train_out: PathBuf,
    pub scoring_out: PathBuf,
    pub win_rate_out: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            roster: PathBuf::from(DEFAULT_ROSTER),
            combats: PathBuf::from(DEFAULT_COMBATS),
            heldout: PathBuf::from(DEFAULT_HELDOUT),
            train_out: PathBuf::from(DEFAULT_TRAIN_OUT),
            scoring_out: PathBuf::from(DEFAULT_SCORING_OUT),
            win_rate_out: PathBuf::from(DEFAULT_WIN_RATE_OUT),
        }
    }
}

impl DataPaths {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let path = |key: &str, fallback: PathBuf| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(fallback)
        };
        Self {
            roster: path("ROSTER_PATH", defaults.roster),
            combats: path("COMBATS_PATH", defaults.combats),
            heldout: path("HELDOUT_PATH", defaults.heldout),
            train_out: path("TRAIN_OUT_PATH", defaults.train_out),
            scoring_out: path("SCORING_OUT_PATH", defaults.scoring_out),
            win_rate_out: path("WIN_RATE_OUT_PATH", defaults.win_rate_out),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDatasets {
    /// Labeled rows, one per historical match.
    pub training: Vec<FeatureRow>,
    /// Unlabeled rows, one per held-out match.
    pub scoring: Vec<FeatureRow>,
}

#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub train_path: PathBuf,
    pub scoring_path: PathBuf,
    pub training_rows: usize,
    pub scoring_rows: usize,
}

/// Builds labeled training rows from `match_log` and unlabeled scoring rows
/// from `test_log` against the same roster.
pub fn assemble(
    roster: &Roster,
    match_log: &[MatchRecord],
    test_log: &[MatchRecord],
) -> crate::Result<AssembledDatasets> {
    let (training, scoring) = rayon::join(
        || build_features(match_log, roster, true),
        || build_features(test_log, roster, false),
    );
    let datasets = AssembledDatasets {
        training: training?,
        scoring: scoring?,
    };
    info!(
        training = datasets.training.len(),
        scoring = datasets.scoring.len(),
        "assembled datasets"
    );
    Ok(datasets)
}

/// Writes both tables, replacing whatever was at the target paths.
pub fn write_datasets(
    datasets: &AssembledDatasets,
    train_path: &Path,
    scoring_path: &Path,
) -> Result<DatasetReport> {
    write_table(train_path, &datasets.training, true)?;
    write_table(scoring_path, &datasets.scoring, false)?;
    Ok(DatasetReport {
        train_path: train_path.to_path_buf(),
        scoring_path: scoring_path.to_path_buf(),
        training_rows: datasets.training.len(),
        scoring_rows: datasets.scoring.len(),
    })
}

fn write_table(path: &Path, rows: &[FeatureRow], labeled: bool) -> Result<()> {
    write_atomically(path, |file| {
        write_features(file, rows, labeled).map_err(anyhow::Error::from)
    })?;
    info!(path = %path.display(), rows = rows.len(), labeled, "wrote feature table");
    Ok(())
}

/// Writes through a sibling temp file and renames it over `path`.
pub(crate) fn write_atomically(
    path: &Path,
    write: impl FnOnce(&mut fs::File) -> Result<()>,
) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = path.with_extension("csv.tmp");
    let mut file =
        fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    write(&mut file).with_context(|| format!("write {}", tmp.display()))?;
    drop(file);
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn paths_fall_back_to_defaults() {
        let env = HashMap::from([
            ("ROSTER_PATH", "/tmp/roster.csv"),
            ("COMBATS_PATH", "   "),
        ]);
        let paths = DataPaths::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(paths.roster, PathBuf::from("/tmp/roster.csv"));
        assert_eq!(paths.combats, PathBuf::from(DEFAULT_COMBATS));
        assert_eq!(paths.train_out, PathBuf::from(DEFAULT_TRAIN_OUT));
    }
}
