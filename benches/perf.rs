use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use battle_sim::dataset::assemble;
use battle_sim::features::{build_features, features_to_csv};
use battle_sim::match_log::MatchRecord;
use battle_sim::roster::{BaseStats, Creature, Roster};
use battle_sim::type_advantage::advantage;

const TYPES: &[&str] = &[
    "Fire", "Water", "Grass", "Electric", "Psychic", "Dragon", "Ghost", "Steel", "Fairy", "Normal",
];

fn sample_roster(n: u32) -> Roster {
    let creatures = (1..=n)
        .map(|id| {
            let idx = id as usize;
            let base = (id % 97) as i32 + 20;
            Creature {
                id,
                name: format!("Creature {id}"),
                type_1: TYPES[idx % TYPES.len()].to_string(),
                type_2: if id % 3 == 0 {
                    Some(TYPES[(idx / 3) % TYPES.len()].to_string())
                } else {
                    None
                },
                stats: BaseStats::from_array([
                    base,
                    base + 5,
                    base + 10,
                    base + 3,
                    base + 7,
                    base + 1,
                ]),
                generation: id % 6 + 1,
                legendary: id % 50 == 0,
            }
        })
        .collect();
    Roster::new(creatures).expect("synthetic ids are unique")
}

fn sample_log(n: u32, roster_size: u32) -> Vec<MatchRecord> {
    (0..n)
        .map(|i| {
            let first = i % roster_size + 1;
            let second = (i * 7 + 3) % roster_size + 1;
            MatchRecord {
                first,
                second,
                winner: Some(if i % 2 == 0 { first } else { second }),
            }
        })
        .collect()
}

fn bench_advantage(c: &mut Criterion) {
    c.bench_function("type_advantage", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for h in TYPES {
                for j in TYPES {
                    total += u32::from(advantage(
                        black_box(h),
                        black_box("none"),
                        black_box(j),
                        black_box("flying"),
                    ));
                }
            }
            black_box(total);
        })
    });
}

fn bench_build_features(c: &mut Criterion) {
    let roster = sample_roster(800);
    let log = sample_log(50_000, 800);
    c.bench_function("build_features_50k", |b| {
        b.iter(|| {
            let rows = build_features(black_box(&log), &roster, true).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_assemble(c: &mut Criterion) {
    let roster = sample_roster(800);
    let log = sample_log(50_000, 800);
    let heldout: Vec<MatchRecord> = sample_log(10_000, 800)
        .into_iter()
        .map(|m| MatchRecord::unscored(m.first, m.second))
        .collect();
    c.bench_function("assemble_50k_10k", |b| {
        b.iter(|| {
            let datasets = assemble(&roster, black_box(&log), black_box(&heldout)).unwrap();
            black_box(datasets.training.len() + datasets.scoring.len());
        })
    });
}

fn bench_stage_single_row(c: &mut Criterion) {
    let roster = sample_roster(10);
    let rows = build_features(&[MatchRecord::unscored(1, 2)], &roster, false).unwrap();
    c.bench_function("stage_single_row_csv", |b| {
        b.iter(|| {
            let csv = features_to_csv(black_box(&rows), false).unwrap();
            black_box(csv.len());
        })
    });
}

criterion_group!(
    benches,
    bench_advantage,
    bench_build_features,
    bench_assemble,
    bench_stage_single_row
);
criterion_main!(benches);
