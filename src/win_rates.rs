//! Per-creature appearance and win-rate table for the regression model.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::dataset::write_atomically;
use crate::match_log::MatchRecord;
use crate::roster::{Creature, Roster, STAT_NAMES};

const ABSENT_TYPE_CELL: &str = "Not Applicable";

#[derive(Debug, Clone, PartialEq)]
pub struct WinRateRow {
    pub creature: Creature,
    pub first_combats: u32,
    pub second_combats: u32,
    pub wins: u32,
    /// Wins over total matches, as a percentage rounded to two decimals.
    /// `None` when the creature never fought.
    pub winning_percentage: Option<f64>,
}

impl WinRateRow {
    pub fn total_combats(&self) -> u32 {
        self.first_combats + self.second_combats
    }

    /// Stat columns use the same snake_case names as the feature table, and
    /// `id` is kept so rows can be joined back to the roster.
    pub fn header() -> Vec<String> {
        let mut cols: Vec<String> = ["id", "name", "type_1", "type_2"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        cols.extend(STAT_NAMES.iter().map(|s| s.to_string()));
        cols.extend(
            [
                "generation",
                "legendary",
                "FirstCombat",
                "SecondCombat",
                "Multi_Type",
                "winning_percentage",
            ]
            .iter()
            .map(|c| c.to_string()),
        );
        cols
    }

    pub fn record(&self) -> Vec<String> {
        let c = &self.creature;
        let mut cells = vec![
            c.id.to_string(),
            c.name.clone(),
            c.type_1.clone(),
            c.type_2
                .clone()
                .unwrap_or_else(|| ABSENT_TYPE_CELL.to_string()),
        ];
        cells.extend(c.stats.as_array().iter().map(i32::to_string));
        cells.push(c.generation.to_string());
        cells.push(title_bool(c.legendary));
        cells.push(self.first_combats.to_string());
        cells.push(self.second_combats.to_string());
        cells.push(title_bool(c.multi_type()));
        cells.push(
            self.winning_percentage
                .map(|p| format!("{p:.2}"))
                .unwrap_or_default(),
        );
        cells
    }
}

fn title_bool(flag: bool) -> String {
    String::from(if flag { "True" } else { "False" })
}

#[derive(Default, Clone, Copy)]
struct Tally {
    first: u32,
    second: u32,
    wins: u32,
}

/// One row per roster creature, in roster order. Winner-less rows count as
/// appearances without a win.
pub fn win_rates(roster: &Roster, match_log: &[MatchRecord]) -> Vec<WinRateRow> {
    let mut tallies: HashMap<u32, Tally> = HashMap::new();
    for m in match_log {
        tallies.entry(m.first).or_default().first += 1;
        tallies.entry(m.second).or_default().second += 1;
        if let Some(winner) = m.winner
            && (winner == m.first || winner == m.second)
        {
            tallies.entry(winner).or_default().wins += 1;
        }
    }

    roster
        .creatures()
        .iter()
        .map(|creature| {
            let tally = tallies.get(&creature.id).copied().unwrap_or_default();
            let total = tally.first + tally.second;
            let winning_percentage = (total > 0).then(|| {
                let pct = f64::from(tally.wins) / f64::from(total) * 100.0;
                (pct * 100.0).round() / 100.0
            });
            WinRateRow {
                creature: creature.clone(),
                first_combats: tally.first,
                second_combats: tally.second,
                wins: tally.wins,
                winning_percentage,
            }
        })
        .collect()
}

pub fn write_win_rates(path: &Path, rows: &[WinRateRow]) -> Result<()> {
    write_atomically(path, |file| {
        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(WinRateRow::header())?;
        for row in rows {
            wtr.write_record(row.record())?;
        }
        wtr.flush()?;
        Ok(())
    })?;
    info!(path = %path.display(), rows = rows.len(), "wrote win-rate table");
    Ok(())
}
