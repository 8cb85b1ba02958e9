//! `squad` - manage a fantasy roster, pick lineups and review trades.

mod commands;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{Env, LineupArgs, TradeArgs};
use serde::Serialize;
use squad_core::{EngineConfig, FileRosterStore, SquadError};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "squad")]
#[command(about = "Fantasy squad engine: roster, lineup and trade suggestions", long_about = None)]
struct Cli {
    /// Engine config YAML (falls back to SQUAD_CONFIG_PATH, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Roster owner
    #[arg(long, global = true, default_value = "default")]
    user: String,

    /// Catalog cache built by catalog_builder
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Prediction CSV (player_id,matchday,predicted_score,confidence)
    #[arg(long, global = true)]
    scores: Option<PathBuf>,

    /// Overrides `store_dir` from the config
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add catalog players to the roster
    Add {
        #[arg(required = true)]
        ids: Vec<u32>,
    },

    /// Remove players from the roster
    Remove {
        #[arg(required = true)]
        ids: Vec<u32>,
    },

    /// Show the roster and role quotas
    Show,

    /// Allocate starters and bench
    Lineup {
        /// Formation such as 4-3-3; remembered for later runs
        #[arg(long)]
        formation: Option<String>,

        /// Try every league formation and keep the best
        #[arg(long)]
        best: bool,

        #[arg(long, default_value_t = 1)]
        matchday: u32,

        /// Average predictions over this many matchdays
        #[arg(long, default_value_t = 1)]
        horizon: u32,
    },

    /// Suggest role-matched upgrades within a budget
    Trades {
        #[arg(long)]
        budget: Option<f64>,

        #[arg(long)]
        max_transfers: Option<usize>,

        #[arg(long)]
        min_improvement: Option<f64>,

        #[arg(long, default_value_t = 1)]
        matchday: u32,

        #[arg(long, default_value_t = 1)]
        horizon: u32,

        /// Execute the suggested plan
        #[arg(long)]
        apply: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    Ok(match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env()?,
    })
}

fn emit<T: Serialize>(json: bool, view: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", text(view));
    }
    Ok(())
}

/// Exit status: 2 when a data source failed, 1 when the request was rejected.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SquadError>() {
        Some(e) if e.is_external() => 2,
        _ => 1,
    }
}

fn run(cli: Cli, config: EngineConfig) -> Result<()> {
    let store_dir = cli.store_dir.clone().unwrap_or_else(|| config.store_dir.clone());
    let mut env = Env {
        config,
        store: FileRosterStore::new(store_dir),
        catalog_path: cli.catalog,
        scores_path: cli.scores,
    };
    let user = cli.user.as_str();

    match cli.command {
        Commands::Add { ids } => emit(cli.json, &commands::add(&mut env, user, &ids)?, output::roster),
        Commands::Remove { ids } => {
            emit(cli.json, &commands::remove(&mut env, user, &ids)?, output::roster)
        }
        Commands::Show => emit(cli.json, &commands::show(&env, user)?, output::roster),
        Commands::Lineup { formation, best, matchday, horizon } => {
            let args = LineupArgs { formation, best, matchday, horizon };
            emit(cli.json, &commands::lineup(&mut env, user, &args)?, output::lineup)
        }
        Commands::Trades { budget, max_transfers, min_improvement, matchday, horizon, apply } => {
            let args =
                TradeArgs { budget, max_transfers, min_improvement, matchday, horizon, apply };
            emit(cli.json, &commands::trades(&mut env, user, &args)?, output::trades)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            std::process::exit(1);
        }
    };

    logging::init(&config.logging, cli.verbose);

    if let Err(e) = run(cli, config) {
        let code = exit_code(&e);
        error!(error = %format!("{e:#}"), code, "command failed");
        if code == 2 {
            eprintln!("✗ data source unavailable: {e:#}");
        } else {
            eprintln!("✗ {e:#}");
        }
        std::process::exit(code);
    }
}
