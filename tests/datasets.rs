use std::fs;
use std::path::PathBuf;

use battle_sim::BattleError;
use battle_sim::dataset::{assemble, write_datasets};
use battle_sim::features::FeatureRow;
use battle_sim::match_log::{MatchRecord, load_match_log};
use battle_sim::roster::Roster;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn load_inputs() -> (Roster, Vec<MatchRecord>, Vec<MatchRecord>) {
    let roster = Roster::load(&fixture_path("roster.csv")).expect("roster should load");
    let combats = load_match_log(&fixture_path("combats.csv")).expect("combats should load");
    let heldout = load_match_log(&fixture_path("tests.csv")).expect("heldout should load");
    (roster, combats, heldout)
}

#[test]
fn assemble_produces_one_row_per_match() {
    let (roster, combats, heldout) = load_inputs();
    let datasets = assemble(&roster, &combats, &heldout).unwrap();
    assert_eq!(datasets.training.len(), combats.len());
    assert_eq!(datasets.scoring.len(), heldout.len());
    assert!(datasets.training.iter().all(FeatureRow::is_labeled));
    assert!(datasets.scoring.iter().all(|r| !r.is_labeled()));
}

#[test]
fn assemble_rejects_dangling_ids_in_either_log() {
    let (roster, combats, _) = load_inputs();
    let bad = vec![MatchRecord::unscored(26, 4242)];
    let err = assemble(&roster, &combats, &bad).unwrap_err();
    assert!(matches!(err, BattleError::UnknownId { id: 4242 }));
}

#[test]
fn written_tables_have_matching_headers_and_no_blank_nets() {
    let (roster, combats, heldout) = load_inputs();
    let datasets = assemble(&roster, &combats, &heldout).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let train = dir.path().join("out").join("train.csv");
    let scoring = dir.path().join("out").join("test.csv");

    let report = write_datasets(&datasets, &train, &scoring).unwrap();
    assert_eq!(report.training_rows, 6);
    assert_eq!(report.scoring_rows, 3);

    let mut rdr = csv::Reader::from_path(&train).unwrap();
    let header: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(header, FeatureRow::header(true));
    let net_cols: Vec<usize> = header
        .iter()
        .enumerate()
        .filter(|(_, c)| c.starts_with("net_"))
        .map(|(idx, _)| idx)
        .collect();
    assert_eq!(net_cols.len(), 6);
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 6);
    for record in &records {
        for idx in &net_cols {
            assert!(record[*idx].parse::<i32>().is_ok());
        }
    }

    let mut rdr = csv::Reader::from_path(&scoring).unwrap();
    let header: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(header, FeatureRow::header(false));
    assert_eq!(rdr.records().count(), 3);
}

#[test]
fn rerun_overwrites_previous_outputs() {
    let (roster, combats, heldout) = load_inputs();
    let dir = tempfile::tempdir().unwrap();
    let train = dir.path().join("train.csv");
    let scoring = dir.path().join("test.csv");

    let full = assemble(&roster, &combats, &heldout).unwrap();
    write_datasets(&full, &train, &scoring).unwrap();

    let smaller = assemble(&roster, &combats[..2], &heldout[..1]).unwrap();
    write_datasets(&smaller, &train, &scoring).unwrap();

    let train_lines = fs::read_to_string(&train).unwrap().lines().count();
    let scoring_lines = fs::read_to_string(&scoring).unwrap().lines().count();
    assert_eq!(train_lines, 3);
    assert_eq!(scoring_lines, 2);
    assert!(!dir.path().join("train.csv.tmp").exists());
}
