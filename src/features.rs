//! Joins roster attributes onto matchups and derives the model inputs.

use std::io::Write;

use tracing::debug;

use crate::error::{BattleError, Result};
use crate::match_log::MatchRecord;
use crate::roster::{BaseStats, Creature, Roster, STAT_NAMES};
use crate::type_advantage::{NO_TYPE, advantage};

const ABSENT_TYPE_CELL: &str = "None";

/// One side of a matchup. `id` is `None` for a user-authored creature.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub id: Option<u32>,
    pub name: String,
    pub type_1: String,
    pub type_2: Option<String>,
    pub stats: BaseStats,
    pub generation: u32,
    pub legendary: bool,
}

impl Combatant {
    pub fn multi_type(&self) -> bool {
        self.type_2.is_some()
    }
}

impl From<&Creature> for Combatant {
    fn from(c: &Creature) -> Self {
        Combatant {
            id: Some(c.id),
            name: c.name.clone(),
            type_1: c.type_1.clone(),
            type_2: c.type_2.clone(),
            stats: c.stats,
            generation: c.generation,
            legendary: c.legendary,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub first: Combatant,
    pub second: Combatant,
    /// `first - second` per base stat.
    pub net: BaseStats,
    pub type_advantage: u8,
    pub winner: Option<u32>,
    pub first_won: Option<bool>,
}

impl FeatureRow {
    /// Unlabeled row for `first` against `second`.
    pub fn new(first: Combatant, second: Combatant) -> Self {
        let net = first.stats.net(&second.stats);
        let type_advantage = advantage(
            &first.type_1,
            first.type_2.as_deref().unwrap_or(NO_TYPE),
            &second.type_1,
            second.type_2.as_deref().unwrap_or(NO_TYPE),
        );
        FeatureRow {
            first,
            second,
            net,
            type_advantage,
            winner: None,
            first_won: None,
        }
    }

    fn labeled(mut self, winner: u32) -> Self {
        self.first_won = Some(self.first.id == Some(winner));
        self.winner = Some(winner);
        self
    }

    pub fn is_labeled(&self) -> bool {
        self.first_won.is_some()
    }

    pub fn header(labeled: bool) -> Vec<String> {
        let mut cols = vec!["First_pokemon".to_string(), "Second_pokemon".to_string()];
        if labeled {
            cols.push("Winner".to_string());
        }
        for role in 1..=2 {
            let p = |field: &str| format!("pokemon_{role}_{field}");
            cols.extend([p("name"), p("type_1"), p("type_2")]);
            cols.extend(STAT_NAMES.iter().map(|&stat| p(stat)));
            cols.extend([p("generation"), p("legendary"), p("Multi_Type")]);
        }
        cols.extend(STAT_NAMES.iter().map(|stat| format!("net_{stat}")));
        if labeled {
            cols.push("pokemon_1_won".to_string());
        }
        cols.push("type_advantage".to_string());
        cols
    }

    /// Cells in [`FeatureRow::header`] order.
    pub fn record(&self, labeled: bool) -> Vec<String> {
        let mut cells = vec![opt_cell(self.first.id), opt_cell(self.second.id)];
        if labeled {
            cells.push(opt_cell(self.winner));
        }
        for side in [&self.first, &self.second] {
            cells.push(side.name.clone());
            cells.push(side.type_1.clone());
            cells.push(
                side.type_2
                    .clone()
                    .unwrap_or_else(|| ABSENT_TYPE_CELL.to_string()),
            );
            cells.extend(side.stats.as_array().iter().map(i32::to_string));
            cells.push(side.generation.to_string());
            cells.push(bool_cell(side.legendary).to_string());
            cells.push(bool_cell(side.multi_type()).to_string());
        }
        cells.extend(self.net.as_array().iter().map(i32::to_string));
        if labeled {
            cells.push(self.first_won.map(bool_cell).unwrap_or_default().to_string());
        }
        cells.push(self.type_advantage.to_string());
        cells
    }
}

fn opt_cell(id: Option<u32>) -> String {
    id.map(|v| v.to_string()).unwrap_or_default()
}

fn bool_cell(flag: bool) -> &'static str {
    if flag { "True" } else { "False" }
}

/// One feature row per match, in input order.
///
/// Fails on the first identifier missing from the roster without returning
/// any rows. In labeled mode every match must carry a winner.
pub fn build_features(
    matches: &[MatchRecord],
    roster: &Roster,
    labeled: bool,
) -> Result<Vec<FeatureRow>> {
    let lookup = |id: u32| roster.get(id).ok_or(BattleError::UnknownId { id });

    let rows = matches
        .iter()
        .enumerate()
        .map(|(idx, m)| -> Result<FeatureRow> {
            let first = lookup(m.first)?;
            let second = lookup(m.second)?;
            let row = FeatureRow::new(first.into(), second.into());
            if !labeled {
                return Ok(row);
            }
            let winner = m.winner.ok_or(BattleError::MissingWinner { row: idx + 1 })?;
            Ok(row.labeled(winner))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(rows = rows.len(), labeled, "built feature rows");
    Ok(rows)
}

/// Writes a header plus one line per row.
pub fn write_features<W: Write>(writer: W, rows: &[FeatureRow], labeled: bool) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(FeatureRow::header(labeled))?;
    for row in rows {
        wtr.write_record(row.record(labeled))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Stages rows as an in-memory CSV document for submission.
pub fn features_to_csv(rows: &[FeatureRow], labeled: bool) -> Result<String> {
    let mut buf = Vec::new();
    write_features(&mut buf, rows, labeled)?;
    String::from_utf8(buf).map_err(|err| {
        BattleError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}
