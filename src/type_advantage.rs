//! Hand-authored type matchup heuristic.
//!
//! The score starts at [`NEUTRAL_SCORE`], gains a point for each defender
//! type the attacker is strong against and loses a point for each attacker
//! type the defender is strong against, so it always lands in `1..=5`.

/// Sentinel used for an absent secondary type.
pub const NO_TYPE: &str = "none";

pub const NEUTRAL_SCORE: u8 = 3;

const TYPE_ADVANTAGES: &[(&str, &[&str])] = &[
    ("fire", &["grass", "ice", "bug", "steel", "fairy"]),
    ("grass", &["water", "ground", "rock"]),
    ("water", &["fire", "ground", "rock"]),
    ("electric", &["water", "flying"]),
    ("ice", &["grass", "ground", "flying", "dragon"]),
    ("psychic", &["poison", "fighting"]),
    ("fighting", &["normal", "ice", "rock", "dark", "steel"]),
    ("normal", &[]),
    ("poison", &["grass", "fairy"]),
    ("bug", &["grass", "psychic", "dark"]),
    ("dragon", &["dragon"]),
    ("dark", &["psychic", "ghost"]),
    ("fairy", &["fighting", "dragon", "dark"]),
    ("rock", &["fire", "ice", "flying", "bug"]),
    ("ghost", &["ghost", "psychic"]),
    ("steel", &["ice", "rock", "fairy"]),
    ("ground", &["rock", "fire", "electric", "poison"]),
    ("flying", &["grass", "fighting", "bug"]),
    (NO_TYPE, &[]),
];

/// Types that `type_name` is strong against. Unknown names get an empty set.
pub fn strong_against(type_name: &str) -> &'static [&'static str] {
    let folded = fold(type_name);
    TYPE_ADVANTAGES
        .iter()
        .find(|(name, _)| *name == folded)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

pub fn is_known_type(type_name: &str) -> bool {
    let folded = fold(type_name);
    TYPE_ADVANTAGES.iter().any(|(name, _)| *name == folded)
}

/// Case-folds a type slot and maps a missing or blank slot to [`NO_TYPE`].
pub fn normalize_type(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => NO_TYPE.to_string(),
    }
}

/// Advantage of combatant A (types `h`, `i`) over combatant B (types `j`, `k`).
///
/// Total over all inputs: unrecognized names contribute nothing.
pub fn advantage(h: &str, i: &str, j: &str, k: &str) -> u8 {
    let (h, i, j, k) = (fold(h), fold(i), fold(j), fold(k));
    let a_strong = |t: &str| hits(&h, t) || hits(&i, t);
    let b_strong = |t: &str| hits(&j, t) || hits(&k, t);

    let mut score = NEUTRAL_SCORE;
    for target in [j.as_str(), k.as_str()] {
        if a_strong(target) {
            score += 1;
        }
    }
    for target in [h.as_str(), i.as_str()] {
        if b_strong(target) {
            score -= 1;
        }
    }
    score
}

fn hits(attacker: &str, defender: &str) -> bool {
    strong_against(attacker).iter().any(|t| *t == defender)
}

fn fold(raw: &str) -> String {
    normalize_type(Some(raw))
}
