//! Per-user squad session.
//!
//! Owns one user's roster, chosen formation, current score sheet and lineup.
//! Collaborator calls (catalog, score provider, store) are resolved before any
//! state changes, so a failed call leaves the last-known-good state in place.
//! Callers serialize mutations per user; the session does no locking.

use crate::catalog::{horizon_scores, Catalog, ScoreProvider};
use crate::config::EngineConfig;
use crate::error::{Result, SquadError};
use crate::lineup::{allocate, best_formation, Lineup, LineupStatus};
use crate::models::{Formation, Player, PlayerId, ScoreSheet};
use crate::roster::Roster;
use crate::store::{RosterSave, RosterStore, StoreError};
use crate::swap::Swap;
use crate::trades::{recommend, TradeOptions, TradeSuggestion};

#[derive(Debug, Clone)]
pub struct SquadSession {
    user_id: String,
    config: EngineConfig,
    roster: Roster,
    formation: Formation,
    scores: ScoreSheet,
    lineup: Lineup,
}

impl SquadSession {
    /// Fresh session with an empty roster (user onboarding).
    pub fn new(user_id: impl Into<String>, config: EngineConfig) -> Self {
        let roster = Roster::with_limits(config.role_limits.clone());
        let formation = config.default_formation;
        Self::from_parts(user_id.into(), config, roster, formation)
    }

    fn from_parts(
        user_id: String,
        config: EngineConfig,
        roster: Roster,
        formation: Formation,
    ) -> Self {
        let scores = ScoreSheet::default();
        let lineup = allocate(&roster, formation, &scores);
        Self { user_id, config, roster, formation, scores, lineup }
    }

    /// Load the user's stored roster, or start empty if none exists.
    pub fn open<S: RosterStore + ?Sized>(
        store: &S,
        user_id: &str,
        config: EngineConfig,
    ) -> Result<Self> {
        match store.load(user_id) {
            Ok(save) => {
                let formation = save.formation.unwrap_or(config.default_formation);
                let roster = Roster::from_players(config.role_limits.clone(), save.players)
                    .map_err(|e| SquadError::Unavailable(format!("stored roster invalid: {e}")))?;
                log::info!("Opened roster for {} ({} players)", user_id, roster.len());
                Ok(Self::from_parts(user_id.to_string(), config, roster, formation))
            }
            Err(StoreError::NotFound { .. }) => {
                log::info!("No stored roster for {}, starting empty", user_id);
                Ok(Self::new(user_id, config))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn persist<S: RosterStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let mut save = RosterSave::from_roster(self.user_id.clone(), &self.roster);
        save.formation = Some(self.formation);
        store.save(&save)?;
        Ok(())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn formation(&self) -> Formation {
        self.formation
    }

    pub fn scores(&self) -> &ScoreSheet {
        &self.scores
    }

    pub fn lineup(&self) -> &Lineup {
        &self.lineup
    }

    pub fn status(&self) -> LineupStatus {
        self.lineup.status()
    }

    pub fn expected_score(&self) -> f64 {
        self.lineup.total_score(&self.scores)
    }

    /// Add to the roster; a new player starts on the bench.
    pub fn add_player(&mut self, player: Player) -> Result<bool> {
        let added = self.roster.add(player.clone())?;
        if added {
            self.lineup.add_to_bench(&player);
        }
        Ok(added)
    }

    pub fn add_from_catalog<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        id: PlayerId,
    ) -> Result<bool> {
        let player = catalog.get_by_id(id)?;
        self.add_player(player)
    }

    /// Remove from the roster; a departing starter is backfilled from the bench.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.roster.remove(id)?;
        if let Some(promoted) = self.lineup.remove_player(id, &self.scores) {
            log::info!("{} replaces departed starter {}", promoted, id);
        }
        Some(removed)
    }

    /// Switch formation and reallocate.
    pub fn set_formation(&mut self, formation: Formation) -> &Lineup {
        self.formation = formation;
        self.optimize()
    }

    pub fn set_formation_token(&mut self, token: &str) -> Result<&Lineup> {
        let formation = Formation::parse(token)?;
        Ok(self.set_formation(formation))
    }

    /// Replace the score sheet, applying the configured confidence floor.
    /// The lineup is left as is until the next optimization.
    pub fn set_scores(&mut self, scores: ScoreSheet) {
        self.scores = match self.config.min_confidence {
            Some(min) => scores.with_min_confidence(min),
            None => scores,
        };
    }

    /// Fetch predictions for `horizon` matchdays from `matchday` (1 = single fixture).
    pub fn load_scores<P: ScoreProvider + ?Sized>(
        &mut self,
        provider: &P,
        matchday: u32,
        horizon: u32,
    ) -> Result<()> {
        let sheet = horizon_scores(provider, matchday, horizon)?;
        self.set_scores(sheet);
        Ok(())
    }

    /// Reallocate under the current formation.
    pub fn optimize(&mut self) -> &Lineup {
        self.lineup = allocate(&self.roster, self.formation, &self.scores);
        &self.lineup
    }

    /// Reallocate under whichever league formation scores highest.
    pub fn optimize_best_formation(&mut self) -> &Lineup {
        self.lineup = best_formation(&self.roster, &self.scores);
        self.formation = self.lineup.formation();
        &self.lineup
    }

    pub fn apply_swap(&mut self, swap: Swap) -> Result<()> {
        self.lineup.apply(swap)
    }

    pub fn bench_to_starter(&mut self, id: PlayerId) -> Result<()> {
        self.lineup.bench_to_starter(id)
    }

    pub fn starter_to_bench(&mut self, id: PlayerId) -> Result<()> {
        self.lineup.starter_to_bench(id)
    }

    /// Trade suggestions with explicit options, or the configured defaults.
    pub fn recommend_trades<C: Catalog + ?Sized>(
        &self,
        catalog: &C,
        options: Option<&TradeOptions>,
    ) -> Result<Vec<TradeSuggestion>> {
        recommend(&self.roster, catalog, &self.scores, options.unwrap_or(&self.config.trades))
    }

    /// Execute trades; each bought player takes the sold player's lineup place.
    pub fn apply_trades(&mut self, trades: &[TradeSuggestion]) -> Result<()> {
        self.roster.apply_trades(trades)?;
        for trade in trades {
            if !self.lineup.replace_player(trade.sell.id, trade.buy.id) {
                self.lineup.add_to_bench(&trade.buy);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, InMemoryScores};
    use crate::models::Role;
    use crate::store::MemoryRosterStore;

    fn player(id: u32, role: Role, price: f64) -> Player {
        Player::new(id, format!("P{id}"), "Club", role, price).unwrap()
    }

    /// 1 GK, 4 DEF, 4 MID, 3 FWD; ids grouped by role.
    fn session() -> SquadSession {
        let mut session = SquadSession::new("alice", EngineConfig::default());
        session.add_player(player(1, Role::GK, 5.0)).unwrap();
        for id in 10..14 {
            session.add_player(player(id, Role::DEF, 5.0)).unwrap();
        }
        for id in 20..24 {
            session.add_player(player(id, Role::MID, 8.0)).unwrap();
        }
        for id in 30..33 {
            session.add_player(player(id, Role::FWD, 10.0)).unwrap();
        }
        session
    }

    fn sheet(matchday: u32) -> ScoreSheet {
        let mut sheet = ScoreSheet::new(matchday);
        for (id, score) in [(1, 5.0), (10, 4.0), (11, 3.0), (12, 2.0), (13, 1.0)] {
            sheet.insert(PlayerId(id), score, 0.9).unwrap();
        }
        for (id, score) in [(20, 6.0), (21, 5.0), (22, 4.0), (23, 3.0)] {
            sheet.insert(PlayerId(id), score, 0.9).unwrap();
        }
        for (id, score) in [(30, 9.0), (31, 8.0), (32, 7.0)] {
            sheet.insert(PlayerId(id), score, 0.9).unwrap();
        }
        sheet
    }

    #[test]
    fn added_players_start_on_bench() {
        let session = session();
        assert_eq!(session.roster().len(), 12);
        assert_eq!(session.lineup().starter_count(), 0);
        assert_eq!(session.lineup().bench_count(), 12);
        assert!(session.lineup().is_consistent_with(session.roster()));
    }

    #[test]
    fn optimize_fills_default_formation() {
        let mut session = session();
        session.set_scores(sheet(1));
        let lineup = session.optimize();
        assert_eq!(lineup.formation(), Formation::F343);
        assert_eq!(lineup.starter_count(), 11);
        assert_eq!(lineup.bench(Role::DEF), &[PlayerId(13)]);
        assert_eq!(session.status(), LineupStatus::Complete);
        // 5 + (4+3+2) + (6+5+4+3) + (9+8+7)
        assert!((session.expected_score() - 56.0).abs() < 1e-9);
    }

    #[test]
    fn formation_token_errors_keep_state() {
        let mut session = session();
        session.set_scores(sheet(1));
        session.optimize();
        let before = session.lineup().clone();

        assert!(matches!(
            session.set_formation_token("4-4-4"),
            Err(SquadError::InvalidFormation(_))
        ));
        assert_eq!(session.lineup(), &before);
        assert_eq!(session.formation(), Formation::F343);

        let lineup = session.set_formation_token("4-4-2").unwrap();
        assert_eq!(lineup.starters(Role::FWD), &[PlayerId(30), PlayerId(31)]);
        assert_eq!(session.formation(), Formation::F442);
    }

    #[test]
    fn best_formation_updates_current_formation() {
        let mut session = session();
        session.set_scores(sheet(1));
        session.optimize_best_formation();
        assert_eq!(session.formation(), session.lineup().formation());
        assert_eq!(session.lineup().starter_count(), 11);
    }

    #[test]
    fn removing_starter_backfills_from_bench() {
        let mut session = session();
        session.set_scores(sheet(1));
        session.optimize();
        let removed = session.remove_player(PlayerId(10)).unwrap();
        assert_eq!(removed.id, PlayerId(10));
        assert!(session.lineup().is_starter(PlayerId(13)));
        assert!(session.lineup().is_consistent_with(session.roster()));
        assert!(session.remove_player(PlayerId(10)).is_none());
    }

    #[test]
    fn capacity_error_leaves_roster_unchanged() {
        let mut session = session();
        session.add_player(player(2, Role::GK, 1.0)).unwrap();
        session.add_player(player(3, Role::GK, 1.0)).unwrap();
        let before = session.roster().clone();
        assert!(matches!(
            session.add_player(player(4, Role::GK, 1.0)),
            Err(SquadError::CapacityExceeded { role: Role::GK, limit: 3 })
        ));
        assert_eq!(session.roster(), &before);
        assert!(!session.add_player(player(2, Role::GK, 1.0)).unwrap());
    }

    #[test]
    fn swaps_go_through_session() {
        let mut session = session();
        session.set_scores(sheet(1));
        session.optimize();
        assert!(matches!(
            session.bench_to_starter(PlayerId(13)),
            Err(SquadError::RoleSlotsFull { role: Role::DEF, slots: 3 })
        ));
        session.starter_to_bench(PlayerId(12)).unwrap();
        session.bench_to_starter(PlayerId(13)).unwrap();
        assert!(session.lineup().is_starter(PlayerId(13)));
        session.apply_swap(Swap::Exchange { bench: PlayerId(12), starter: PlayerId(13) }).unwrap();
        assert!(session.lineup().is_starter(PlayerId(12)));
    }

    #[test]
    fn min_confidence_filters_scores() {
        let config = EngineConfig { min_confidence: Some(0.5), ..EngineConfig::default() };
        let mut session = SquadSession::new("bob", config);
        let mut scores = ScoreSheet::new(1);
        scores.insert(PlayerId(1), 7.0, 0.9).unwrap();
        scores.insert(PlayerId(2), 9.0, 0.2).unwrap();
        session.set_scores(scores);
        assert_eq!(session.scores().predicted(PlayerId(1)), 7.0);
        assert!(session.scores().get(PlayerId(2)).is_none());
    }

    #[test]
    fn horizon_scores_are_averaged() {
        let mut second = ScoreSheet::new(2);
        second.insert(PlayerId(30), 3.0, 0.9).unwrap();
        let provider: InMemoryScores = [sheet(1), second].into_iter().collect();

        let mut session = session();
        session.load_scores(&provider, 1, 2).unwrap();
        assert!((session.scores().predicted(PlayerId(30)) - 6.0).abs() < 1e-9);
        assert!((session.scores().predicted(PlayerId(31)) - 4.0).abs() < 1e-9);

        let before = session.scores().clone();
        assert!(session.load_scores(&provider, 9, 1).is_err());
        assert_eq!(session.scores(), &before);
    }

    #[test]
    fn trades_replace_sold_player_in_lineup() {
        let mut session = session();
        let mut scores = sheet(1);
        scores.insert(PlayerId(40), 12.0, 0.9).unwrap();
        session.set_scores(scores);
        session.optimize();

        let mut catalog = InMemoryCatalog::new();
        catalog.insert(player(40, Role::FWD, 10.0)).unwrap();

        let options = TradeOptions::new(0.0, 1);
        let trades = session.recommend_trades(&catalog, Some(&options)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].sell.id, PlayerId(32));
        assert_eq!(trades[0].buy.id, PlayerId(40));

        session.apply_trades(&trades).unwrap();
        assert!(session.roster().contains(PlayerId(40)));
        assert!(!session.roster().contains(PlayerId(32)));
        assert!(session.lineup().is_starter(PlayerId(40)));
        assert!(session.lineup().is_consistent_with(session.roster()));
    }

    #[test]
    fn add_from_catalog_reports_missing_player() {
        let mut session = session();
        let catalog = InMemoryCatalog::from_players([player(50, Role::MID, 4.0)]).unwrap();
        assert!(session.add_from_catalog(&catalog, PlayerId(50)).unwrap());
        assert!(matches!(
            session.add_from_catalog(&catalog, PlayerId(51)),
            Err(SquadError::NotFound(_))
        ));
        assert!(session.lineup().is_benched(PlayerId(50)));
    }

    #[test]
    fn persist_and_reopen() {
        let mut store = MemoryRosterStore::new();
        let mut session = session();
        session.set_formation(Formation::F433);
        session.persist(&mut store).unwrap();

        let reopened = SquadSession::open(&store, "alice", EngineConfig::default()).unwrap();
        assert_eq!(reopened.roster(), session.roster());
        assert_eq!(reopened.formation(), Formation::F433);

        let fresh = SquadSession::open(&store, "nobody", EngineConfig::default()).unwrap();
        assert!(fresh.roster().is_empty());
        assert_eq!(fresh.user_id(), "nobody");
    }
}
