use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// A pairing of two roster identifiers, with the winner for historical rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "First_pokemon")]
    pub first: u32,
    #[serde(rename = "Second_pokemon")]
    pub second: u32,
    #[serde(rename = "Winner", default)]
    pub winner: Option<u32>,
}

impl MatchRecord {
    pub fn unscored(first: u32, second: u32) -> Self {
        Self {
            first,
            second,
            winner: None,
        }
    }

    pub fn first_won(&self) -> Option<bool> {
        self.winner.map(|w| w == self.first)
    }
}

pub fn load_match_log(path: &Path) -> Result<Vec<MatchRecord>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("open match log {}", path.display()))?;
    let rows = read_match_log(file).with_context(|| format!("read match log {}", path.display()))?;
    info!(path = %path.display(), matches = rows.len(), "loaded match log");
    Ok(rows)
}

pub fn read_match_log<R: Read>(reader: R) -> Result<Vec<MatchRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<MatchRecord>().enumerate() {
        out.push(row.with_context(|| format!("parse match row {}", idx + 1))?);
    }
    Ok(out)
}
