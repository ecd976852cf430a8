//! Single-matchup requests: build one feature row, score it, pick a winner.

use tracing::{info, warn};

use crate::error::{BattleError, Result};
use crate::features::{Combatant, FeatureRow, build_features};
use crate::match_log::MatchRecord;
use crate::roster::{BaseStats, Creature, Roster};
use crate::scoring::{Explanation, RowPrediction, ScoringService};
use crate::type_advantage::{NO_TYPE, is_known_type};

pub const EXPLANATION_SLOTS: usize = 3;

/// User-authored stand-in for the first combatant.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomCombatant {
    pub name: String,
    pub type_1: String,
    /// Blank or `None` means single-typed.
    pub type_2: Option<String>,
    pub generation: u32,
    pub legendary: bool,
    pub stats: BaseStats,
}

impl CustomCombatant {
    /// Named creature with roster-median stats, generation 1, not legendary.
    pub fn with_median_stats(name: &str, type_1: &str, roster: &Roster) -> Self {
        Self {
            name: name.to_string(),
            type_1: type_1.to_string(),
            type_2: None,
            generation: 1,
            legendary: false,
            stats: roster.median_stats(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BattleError::InvalidCustom("name is empty".to_string()));
        }
        let type_1 = self.type_1.trim();
        if type_1.is_empty() || type_1.eq_ignore_ascii_case(NO_TYPE) {
            return Err(BattleError::InvalidCustom(
                "primary type is required".to_string(),
            ));
        }
        if self.generation == 0 {
            return Err(BattleError::InvalidCustom(
                "generation must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn secondary_type(&self) -> Option<String> {
        self.type_2
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(NO_TYPE))
            .map(str::to_string)
    }

    pub fn to_combatant(&self) -> Result<Combatant> {
        self.validate()?;
        let combatant = Combatant {
            id: None,
            name: self.name.trim().to_string(),
            type_1: self.type_1.trim().to_string(),
            type_2: self.secondary_type(),
            stats: self.stats,
            generation: self.generation,
            legendary: self.legendary,
        };
        for t in std::iter::once(combatant.type_1.as_str()).chain(combatant.type_2.as_deref()) {
            if !is_known_type(t) {
                warn!(type_name = t, "custom creature has an unrecognized type");
            }
        }
        Ok(combatant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Strictly above 0.5 goes to the first creature. An exact 0.5 is a tie
    /// and is awarded to the second creature.
    pub fn from_probability(p_first: f64) -> Self {
        if p_first > 0.5 {
            Side::First
        } else {
            Side::Second
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Win probability of the first creature.
    pub probability: f64,
    pub explanations: [Explanation; EXPLANATION_SLOTS],
}

impl Prediction {
    /// Keeps the first three explanations in service order, padding with
    /// placeholders when fewer came back.
    pub fn from_row(row: RowPrediction) -> Self {
        let returned = row.explanations.len();
        let mut it = row.explanations.into_iter();
        let explanations = std::array::from_fn(|_| it.next().unwrap_or_default());
        if returned < EXPLANATION_SLOTS {
            warn!(returned, "scoring service returned fewer explanations than requested");
        }
        Prediction {
            probability: row.value,
            explanations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleReport {
    pub features: FeatureRow,
    pub prediction: Prediction,
    pub winner: Side,
}

impl BattleReport {
    pub fn first_name(&self) -> &str {
        &self.features.first.name
    }

    pub fn second_name(&self) -> &str {
        &self.features.second.name
    }

    pub fn winner_name(&self) -> &str {
        match self.winner {
            Side::First => self.first_name(),
            Side::Second => self.second_name(),
        }
    }
}

fn resolve<'a>(roster: &'a Roster, name: &str) -> Result<&'a Creature> {
    roster
        .find_by_name(name)
        .ok_or_else(|| BattleError::UnknownName {
            name: name.to_string(),
        })
}

/// Feature row for two roster creatures looked up by exact name.
pub fn matchup_by_name(roster: &Roster, first: &str, second: &str) -> Result<FeatureRow> {
    let a = resolve(roster, first)?;
    let b = resolve(roster, second)?;
    let record = MatchRecord::unscored(a.id, b.id);
    build_features(&[record], roster, false)?
        .pop()
        .ok_or(BattleError::UnknownId { id: record.first })
}

/// Feature row for a custom creature against a roster opponent.
pub fn matchup_with_custom(
    roster: &Roster,
    opponent: &str,
    custom: &CustomCombatant,
) -> Result<FeatureRow> {
    let first = custom.to_combatant()?;
    let second = resolve(roster, opponent)?;
    Ok(FeatureRow::new(first, second.into()))
}

pub fn battle_by_name(
    roster: &Roster,
    first: &str,
    second: &str,
    scorer: &dyn ScoringService,
) -> Result<BattleReport> {
    let features = matchup_by_name(roster, first, second)?;
    run_battle(features, scorer)
}

pub fn battle_with_custom(
    roster: &Roster,
    opponent: &str,
    custom: &CustomCombatant,
    scorer: &dyn ScoringService,
) -> Result<BattleReport> {
    let features = matchup_with_custom(roster, opponent, custom)?;
    run_battle(features, scorer)
}

fn run_battle(features: FeatureRow, scorer: &dyn ScoringService) -> Result<BattleReport> {
    let mut rows = scorer.score(std::slice::from_ref(&features), EXPLANATION_SLOTS)?;
    if rows.is_empty() {
        return Err(BattleError::MalformedResponse(
            "no prediction rows returned".to_string(),
        ));
    }
    let prediction = Prediction::from_row(rows.swap_remove(0));
    let winner = Side::from_probability(prediction.probability);

    let report = BattleReport {
        features,
        prediction,
        winner,
    };
    info!(
        first = report.first_name(),
        second = report.second_name(),
        probability = report.prediction.probability,
        winner = report.winner_name(),
        "battle scored"
    );
    Ok(report)
}
