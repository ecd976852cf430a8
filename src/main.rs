use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use battle_sim::battle::{self, BattleReport, CustomCombatant};
use battle_sim::dataset::DataPaths;
use battle_sim::features::{FeatureRow, features_to_csv};
use battle_sim::roster::{BaseStats, Roster};
use battle_sim::scoring::{HttpScoringClient, ScoringConfig};

#[derive(Debug, Parser)]
#[command(name = "battle_sim", about = "Predict creature battle winners with a hosted model")]
struct Cli {
    /// Roster CSV (defaults to ROSTER_PATH or data/pokemon.csv).
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Battle two roster creatures by exact name.
    Battle {
        first: String,
        second: String,
        /// Also write the staged feature row to this CSV file.
        #[arg(long)]
        dump_features: Option<PathBuf>,
    },
    /// Battle a user-defined creature against a roster creature.
    Custom(CustomArgs),
    /// List roster names, or distinct primary types with --types.
    Roster {
        #[arg(long)]
        types: bool,
    },
}

#[derive(Debug, Args)]
struct CustomArgs {
    #[arg(long)]
    opponent: String,
    #[arg(long, default_value = "Brettasaurus")]
    name: String,
    #[arg(long)]
    type1: String,
    #[arg(long)]
    type2: Option<String>,
    #[arg(long, default_value_t = 7)]
    generation: u32,
    #[arg(long)]
    legendary: bool,
    #[arg(long, allow_negative_numbers = true)]
    hp: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    attack: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    defense: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    sp_attack: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    sp_defense: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<i32>,
    #[arg(long)]
    dump_features: Option<PathBuf>,
}

impl CustomArgs {
    fn to_custom(&self, medians: BaseStats) -> CustomCombatant {
        CustomCombatant {
            name: self.name.clone(),
            type_1: self.type1.clone(),
            type_2: self.type2.clone(),
            generation: self.generation,
            legendary: self.legendary,
            stats: BaseStats {
                hp: self.hp.unwrap_or(medians.hp),
                attack: self.attack.unwrap_or(medians.attack),
                defense: self.defense.unwrap_or(medians.defense),
                sp_attack: self.sp_attack.unwrap_or(medians.sp_attack),
                sp_defense: self.sp_defense.unwrap_or(medians.sp_defense),
                speed: self.speed.unwrap_or(medians.speed),
            },
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let cli = Cli::parse();
    let roster_path = cli.roster.unwrap_or_else(|| DataPaths::from_env().roster);
    let roster = Roster::load(&roster_path)?;

    match cli.command {
        Command::Roster { types } => {
            if types {
                for t in roster.primary_types() {
                    println!("{t}");
                }
            } else {
                for name in roster.names() {
                    println!("{name}");
                }
            }
        }
        Command::Battle {
            first,
            second,
            dump_features,
        } => {
            if let Some(path) = dump_features.as_deref() {
                let row = battle::matchup_by_name(&roster, &first, &second)?;
                dump_row(path, &row)?;
            }
            let client = scoring_client()?;
            let report = battle::battle_by_name(&roster, &first, &second, &client)?;
            print_report(&report);
        }
        Command::Custom(args) => {
            let custom = args.to_custom(roster.median_stats());
            if let Some(path) = args.dump_features.as_deref() {
                let row = battle::matchup_with_custom(&roster, &args.opponent, &custom)?;
                dump_row(path, &row)?;
            }
            let client = scoring_client()?;
            let report = battle::battle_with_custom(&roster, &args.opponent, &custom, &client)?;
            print_report(&report);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn scoring_client() -> Result<HttpScoringClient> {
    HttpScoringClient::new(ScoringConfig::from_env()).context("configure scoring client")
}

fn dump_row(path: &Path, row: &FeatureRow) -> Result<()> {
    let csv = features_to_csv(std::slice::from_ref(row), false)?;
    std::fs::write(path, csv).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn print_report(report: &BattleReport) {
    println!(
        "And the winner between {} and {} is: {}!",
        report.first_name(),
        report.second_name(),
        report.winner_name()
    );
    println!(
        "P({} wins) = {:.1}%",
        report.first_name(),
        report.prediction.probability * 100.0
    );
    println!("Primary drivers:");
    for exp in &report.prediction.explanations {
        let label = exp.label();
        if label.is_empty() {
            println!("  -");
        } else {
            println!("  {label}");
        }
    }
}
