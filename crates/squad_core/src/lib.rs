//! # squad_core - Deterministic Fantasy Squad Engine
//!
//! Builds a user's roster under per-role quotas, allocates a starting eleven
//! and bench for a formation from per-fixture predicted scores, validates
//! bench/starter swaps and suggests budget-bounded trades.
//!
//! ## Features
//! - Role quotas GK 3 / DEF 8 / MID 8 / FWD 6 (configurable)
//! - The seven league formations, 3-4-3 through 5-4-1
//! - Deterministic allocation: same inputs, same lineup
//! - Greedy trade search against a read-only catalog
//! - Checksummed, versioned roster saves

pub mod catalog;
pub mod config;
pub mod error;
pub mod lineup;
pub mod models;
pub mod roster;
pub mod session;
pub mod store;
pub mod swap;
pub mod trades;

pub use catalog::{horizon_scores, Catalog, InMemoryCatalog, InMemoryScores, ScoreProvider};
pub use config::{EngineConfig, LoggingConfig, CONFIG_PATH_ENV};
pub use error::{Result, SquadError};
pub use lineup::{allocate, best_formation, rank_by_score, Lineup, LineupStatus, Shortfall};
pub use models::{
    FixtureScore, Formation, Player, PlayerId, Role, RoleLimits, RoleStats, ScoreSheet,
    DEFAULT_CONFIDENCE,
};
pub use roster::Roster;
pub use session::SquadSession;
pub use store::{FileRosterStore, MemoryRosterStore, RosterSave, RosterStore, StoreError};
pub use swap::Swap;
pub use trades::{recommend, TradeOptions, TradeSuggestion, TradeSummary};
