use std::fs;
use std::path::PathBuf;

use battle_sim::battle::Prediction;
use battle_sim::scoring::parse_prediction_response;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_full_prediction_fixture() {
    let raw = read_fixture("prediction_full.json");
    let rows = parse_prediction_response(&raw, Some("True")).expect("fixture should parse");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_id, 0);
    assert!((rows[0].value - 0.8123).abs() < 1e-12);
    assert_eq!(rows[0].explanations.len(), 4);
    assert_eq!(rows[0].explanations[0].feature, "net_speed");
    assert_eq!(rows[0].explanations[0].feature_value.as_deref(), Some("25"));
    assert_eq!(rows[0].explanations[3].feature_value.as_deref(), Some("False"));
    assert_eq!(rows[0].explanations[2].strength, Some(-0.1));

    let prediction = Prediction::from_row(rows[0].clone());
    let labels: Vec<String> = prediction.explanations.iter().map(|e| e.label()).collect();
    assert_eq!(labels, vec!["NET SPEED +++", "TYPE ADVANTAGE ++", "NET ATTACK -"]);
}

#[test]
fn null_and_missing_explanations_are_empty() {
    let raw = read_fixture("prediction_sparse.json");
    let rows = parse_prediction_response(&raw, None).expect("fixture should parse");
    assert_eq!(rows.len(), 2);
    assert!(rows[0].explanations.is_empty());
    assert!(rows[1].explanations.is_empty());
    assert_eq!(rows[1].row_id, 1);

    let prediction = Prediction::from_row(rows[0].clone());
    assert!(prediction.explanations.iter().all(|e| e.label().is_empty()));
}

#[test]
fn empty_data_yields_no_rows() {
    assert!(parse_prediction_response(r#"{"data":[]}"#, None).unwrap().is_empty());
    assert!(parse_prediction_response("{}", None).unwrap().is_empty());
}

#[test]
fn row_without_values_is_rejected() {
    let raw = r#"{"data":[{"rowId":0,"predictionValues":[]}]}"#;
    assert!(parse_prediction_response(raw, None).is_err());
}
