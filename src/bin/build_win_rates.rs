use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use battle_sim::dataset::DataPaths;
use battle_sim::match_log::load_match_log;
use battle_sim::roster::Roster;
use battle_sim::win_rates::{win_rates, write_win_rates};

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
    if let Some(p) = parse_path_arg("out") {
        paths.win_rate_out = p;
    }

    info!("reading data");
    let roster = Roster::load(&paths.roster)?;
    let combats = load_match_log(&paths.combats)?;

    info!("merging tables");
    let rows = win_rates(&roster, &combats);
    let never_fought = rows.iter().filter(|r| r.total_combats() == 0).count();

    info!("saving modeling table");
    write_win_rates(&paths.win_rate_out, &rows)?;

    println!("Win-rate table complete");
    println!("Rows: {} -> {}", rows.len(), paths.win_rate_out.display());
    if never_fought > 0 {
        println!("Creatures without matches: {never_fought}");
    }

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
