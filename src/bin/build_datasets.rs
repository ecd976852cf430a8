use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing::info;
use tracing_subscriber::EnvFilter;

use battle_sim::dataset::{self, DataPaths};
use battle_sim::match_log::load_match_log;
use battle_sim::roster::Roster;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut paths = DataPaths::from_env();
    if let Some(p) = parse_path_arg("roster") {
        paths.roster = p;
    }
    if let Some(p) = parse_path_arg("combats") {
        paths.combats = p;
    }
    if let Some(p) = parse_path_arg("heldout") {
        paths.heldout = p;
    }
    if let Some(p) = parse_path_arg("train-out") {
        paths.train_out = p;
    }
    if let Some(p) = parse_path_arg("scoring-out") {
        paths.scoring_out = p;
    }

    info!("reading data");
    let roster = Roster::load(&paths.roster)?;
    if roster.is_empty() {
        return Err(anyhow!("roster {} has no rows", paths.roster.display()));
    }
    let combats = load_match_log(&paths.combats)?;
    let heldout = load_match_log(&paths.heldout)?;

    info!("processing matches");
    let datasets = dataset::assemble(&roster, &combats, &heldout)?;

    info!("saving data");
    let report = dataset::write_datasets(&datasets, &paths.train_out, &paths.scoring_out)?;

    println!("Dataset build complete");
    println!("Roster: {} creatures", roster.len());
    println!(
        "Training: {} rows -> {}",
        report.training_rows,
        report.train_path.display()
    );
    println!(
        "Scoring: {} rows -> {}",
        report.scoring_rows,
        report.scoring_path.display()
    );

    Ok(())
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if *arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
