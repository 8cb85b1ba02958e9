//! Subcommand handlers.
//!
//! Each handler opens the user's session from the file store, performs one
//! operation and persists only when the roster or formation changed.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use squad_core::{
    EngineConfig, FileRosterStore, InMemoryCatalog, InMemoryScores, Lineup, LineupStatus, Player,
    PlayerId, Role, SquadSession, TradeOptions, TradeSuggestion, TradeSummary,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// Collaborators resolved once per invocation.
pub struct Env {
    pub config: EngineConfig,
    pub store: FileRosterStore,
    pub catalog_path: Option<PathBuf>,
    pub scores_path: Option<PathBuf>,
}

impl Env {
    fn catalog(&self) -> Result<InMemoryCatalog> {
        let path = self.catalog_path.as_ref().context("--catalog is required for this command")?;
        let index = catalog_builder::load_catalog_cache(path)?;
        info!(players = index.len(), schema = %index.schema_version, "catalog loaded");
        index.into_catalog()
    }

    fn scores(&self) -> Result<Option<InMemoryScores>> {
        let Some(path) = self.scores_path.as_ref() else {
            return Ok(None);
        };
        let (scores, stats) =
            catalog_builder::parse_scores_csv(path, self.config.default_confidence)?;
        if stats.failed > 0 {
            warn!(failed = stats.failed, "some prediction rows were skipped");
        }
        Ok(Some(scores))
    }

    fn open(&self, user: &str) -> Result<SquadSession> {
        Ok(SquadSession::open(&self.store, user, self.config.clone())?)
    }

    fn load_scores(&self, session: &mut SquadSession, matchday: u32, horizon: u32) -> Result<()> {
        match self.scores()? {
            Some(provider) => session.load_scores(&provider, matchday, horizon)?,
            None => warn!("no --scores file given, every player is expected to score 0"),
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RosterView {
    pub user: String,
    pub players: Vec<Player>,
    pub counts: Vec<(Role, usize, usize)>,
    pub total_value: f64,
}

#[derive(Debug, Serialize)]
pub struct LineupView {
    pub formation: String,
    pub starters: Vec<(Role, Vec<Player>)>,
    pub bench: Vec<(Role, Vec<Player>)>,
    pub expected_score: f64,
    pub status: LineupStatus,
}

#[derive(Debug, Serialize)]
pub struct TradesView {
    pub suggestions: Vec<TradeSuggestion>,
    pub summary: TradeSummary,
    pub applied: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LineupArgs {
    pub formation: Option<String>,
    pub best: bool,
    pub matchday: u32,
    pub horizon: u32,
}

#[derive(Debug, Clone, Default)]
pub struct TradeArgs {
    pub budget: Option<f64>,
    pub max_transfers: Option<usize>,
    pub min_improvement: Option<f64>,
    pub matchday: u32,
    pub horizon: u32,
    pub apply: bool,
}

pub fn add(env: &mut Env, user: &str, ids: &[u32]) -> Result<RosterView> {
    let catalog = env.catalog()?;
    let mut session = env.open(user)?;
    let mut changed = false;
    for &id in ids {
        if session.add_from_catalog(&catalog, PlayerId(id))? {
            changed = true;
        } else {
            warn!(player = id, "already on the roster");
        }
    }
    if changed {
        session.persist(&mut env.store)?;
    }
    Ok(roster_view(&session))
}

pub fn remove(env: &mut Env, user: &str, ids: &[u32]) -> Result<RosterView> {
    let mut session = env.open(user)?;
    let mut changed = false;
    for &id in ids {
        match session.remove_player(PlayerId(id)) {
            Some(player) => {
                info!(player = id, name = %player.name, "removed");
                changed = true;
            }
            None => warn!(player = id, "not on the roster"),
        }
    }
    if changed {
        session.persist(&mut env.store)?;
    }
    Ok(roster_view(&session))
}

pub fn show(env: &Env, user: &str) -> Result<RosterView> {
    Ok(roster_view(&env.open(user)?))
}

pub fn lineup(env: &mut Env, user: &str, args: &LineupArgs) -> Result<LineupView> {
    if args.best && args.formation.is_some() {
        bail!("--best and --formation are mutually exclusive");
    }
    let mut session = env.open(user)?;
    env.load_scores(&mut session, args.matchday, args.horizon)?;

    let before = session.formation();
    if let Some(token) = &args.formation {
        session.set_formation_token(token)?;
    } else if args.best {
        session.optimize_best_formation();
    } else {
        session.optimize();
    }
    if session.formation() != before {
        session.persist(&mut env.store)?;
    }
    Ok(lineup_view(&session))
}

pub fn trades(env: &mut Env, user: &str, args: &TradeArgs) -> Result<TradesView> {
    let catalog = env.catalog()?;
    let mut session = env.open(user)?;
    env.load_scores(&mut session, args.matchday, args.horizon)?;
    session.optimize();

    let defaults = &env.config.trades;
    let options = TradeOptions {
        budget: args.budget.unwrap_or(defaults.budget),
        max_transfers: args.max_transfers.unwrap_or(defaults.max_transfers),
        min_improvement: args.min_improvement.unwrap_or(defaults.min_improvement),
    };
    let suggestions = session.recommend_trades(&catalog, Some(&options))?;
    let summary = TradeSummary::of(&suggestions);

    let applied = args.apply && !suggestions.is_empty();
    if applied {
        session.apply_trades(&suggestions)?;
        session.persist(&mut env.store)?;
        info!(transfers = summary.transfers, "trades applied");
    }
    Ok(TradesView { suggestions, summary, applied })
}

fn roster_view(session: &SquadSession) -> RosterView {
    let roster = session.roster();
    RosterView {
        user: session.user_id().to_string(),
        players: roster.to_players(),
        counts: Role::ALL
            .iter()
            .map(|&role| (role, roster.count_by_role(role), roster.limits().limit(role)))
            .collect(),
        total_value: roster.total_value(),
    }
}

fn lineup_view(session: &SquadSession) -> LineupView {
    let lineup: &Lineup = session.lineup();
    let resolve = |ids: &[PlayerId]| -> Vec<Player> {
        ids.iter().filter_map(|id| session.roster().get(*id).cloned()).collect()
    };
    LineupView {
        formation: lineup.formation().to_string(),
        starters: Role::ALL.iter().map(|&r| (r, resolve(lineup.starters(r)))).collect(),
        bench: Role::ALL.iter().map(|&r| (r, resolve(lineup.bench(r)))).collect(),
        expected_score: session.expected_score(),
        status: session.status(),
    }
}
