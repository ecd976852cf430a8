use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::error::BattleError;
use crate::type_advantage::is_known_type;

/// Six base stats in feature order.
pub const STAT_NAMES: [&str; 6] = ["hp", "attack", "defense", "sp_attack", "sp_defense", "speed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaseStats {
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub sp_attack: i32,
    pub sp_defense: i32,
    pub speed: i32,
}

impl BaseStats {
    /// Values in [`STAT_NAMES`] order.
    pub fn as_array(&self) -> [i32; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_attack,
            self.sp_defense,
            self.speed,
        ]
    }

    pub fn from_array(values: [i32; 6]) -> Self {
        let [hp, attack, defense, sp_attack, sp_defense, speed] = values;
        Self {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        }
    }

    /// Per-stat `self - other`.
    pub fn net(&self, other: &BaseStats) -> BaseStats {
        let a = self.as_array();
        let b = other.as_array();
        BaseStats::from_array(std::array::from_fn(|idx| a[idx] - b[idx]))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    pub id: u32,
    pub name: String,
    pub type_1: String,
    pub type_2: Option<String>,
    pub stats: BaseStats,
    pub generation: u32,
    pub legendary: bool,
}

impl Creature {
    pub fn multi_type(&self) -> bool {
        self.type_2.is_some()
    }
}

// Columns are read by position; the source header names vary ("#", "Sp. Atk", ...).
#[derive(Debug, Deserialize)]
struct RosterRow {
    id: u32,
    name: String,
    type_1: String,
    type_2: Option<String>,
    hp: i32,
    attack: i32,
    defense: i32,
    sp_attack: i32,
    sp_defense: i32,
    speed: i32,
    generation: u32,
    #[serde(deserialize_with = "deserialize_flag")]
    legendary: bool,
}

impl From<RosterRow> for Creature {
    fn from(row: RosterRow) -> Self {
        let type_2 = row
            .type_2
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Creature {
            id: row.id,
            name: row.name,
            type_1: row.type_1.trim().to_string(),
            type_2,
            stats: BaseStats {
                hp: row.hp,
                attack: row.attack,
                defense: row.defense,
                sp_attack: row.sp_attack,
                sp_defense: row.sp_defense,
                speed: row.speed,
            },
            generation: row.generation,
            legendary: row.legendary,
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid legendary flag {other:?}"
        ))),
    }
}

/// Immutable creature reference table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    creatures: Vec<Creature>,
    by_id: HashMap<u32, usize>,
}

impl Roster {
    /// Ids must be unique. A repeated id is rejected rather than resolved,
    /// since name lookups and id lookups would otherwise disagree.
    pub fn new(creatures: Vec<Creature>) -> crate::Result<Self> {
        let mut by_id = HashMap::with_capacity(creatures.len());
        for (idx, creature) in creatures.iter().enumerate() {
            if by_id.insert(creature.id, idx).is_some() {
                return Err(BattleError::DuplicateId { id: creature.id });
            }
        }
        Ok(Self { creatures, by_id })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open roster {}", path.display()))?;
        let roster =
            Self::from_reader(file).with_context(|| format!("read roster {}", path.display()))?;
        info!(
            path = %path.display(),
            creatures = roster.len(),
            "loaded roster"
        );
        Ok(roster)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Fields)
            .from_reader(reader);
        let mut creatures = Vec::new();
        for (idx, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("roster row {}", idx + 1))?;
            let row: RosterRow = record
                .deserialize(None)
                .with_context(|| format!("parse roster row {}", idx + 1))?;
            creatures.push(Creature::from(row));
        }

        for creature in &creatures {
            let unknown = std::iter::once(creature.type_1.as_str())
                .chain(creature.type_2.as_deref())
                .filter(|t| !is_known_type(t))
                .collect::<Vec<_>>();
            if !unknown.is_empty() {
                warn!(
                    id = creature.id,
                    name = %creature.name,
                    types = ?unknown,
                    "unrecognized type, it will carry no advantages"
                );
            }
        }

        Ok(Self::new(creatures)?)
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn get(&self, id: u32) -> Option<&Creature> {
        self.by_id.get(&id).and_then(|idx| self.creatures.get(*idx))
    }

    /// Exact, case-sensitive name match. With duplicate names the first row
    /// in roster order wins.
    pub fn find_by_name(&self, name: &str) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.creatures.iter().map(|c| c.name.as_str())
    }

    /// Distinct primary types in first-seen order.
    pub fn primary_types(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for creature in &self.creatures {
            if !out.contains(&creature.type_1.as_str()) {
                out.push(creature.type_1.as_str());
            }
        }
        out
    }

    /// Per-stat median, truncated to an integer. Zeroes for an empty roster.
    pub fn median_stats(&self) -> BaseStats {
        if self.creatures.is_empty() {
            return BaseStats::default();
        }
        let mut columns: [Vec<i32>; 6] = Default::default();
        for creature in &self.creatures {
            for (idx, value) in creature.stats.as_array().into_iter().enumerate() {
                columns[idx].push(value);
            }
        }
        BaseStats::from_array(columns.map(|mut values| median(&mut values)))
    }
}

fn median(values: &mut [i32]) -> i32 {
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        // Midpoint of the two middle values, truncated toward zero.
        let sum = i64::from(values[mid - 1]) + i64::from(values[mid]);
        (sum / 2) as i32
    }
}
