//! Read-only collaborators: the player catalog and the per-matchday score provider.
//!
//! The engine only sees these traits. Implementations backed by a network or a
//! database report failures as [`SquadError::Unavailable`] and must never return
//! partial data.

use crate::error::{Result, SquadError};
use crate::models::{Player, PlayerId, Role, ScoreSheet};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

pub trait Catalog {
    /// Free-text lookup on name and team; an empty query lists everything.
    fn search(&self, query: &str) -> Result<Vec<Player>>;

    fn get_by_id(&self, id: PlayerId) -> Result<Player>;

    /// Every catalog player of `role`, ascending by id.
    fn by_role(&self, role: Role) -> Result<Vec<Player>> {
        Ok(self.search("")?.into_iter().filter(|p| p.role == role).collect())
    }
}

pub trait ScoreProvider {
    fn scores_for(&self, matchday: u32) -> Result<ScoreSheet>;
}

/// Averaged predictions for `horizon` matchdays starting at `matchday`.
///
/// Matchdays the provider does not know are skipped; at least one must exist.
pub fn horizon_scores<P: ScoreProvider + ?Sized>(
    provider: &P,
    matchday: u32,
    horizon: u32,
) -> Result<ScoreSheet> {
    if horizon <= 1 {
        return provider.scores_for(matchday);
    }

    let mut sheets = Vec::new();
    for day in matchday..matchday.saturating_add(horizon) {
        match provider.scores_for(day) {
            Ok(sheet) => sheets.push(sheet),
            Err(SquadError::NotFound(_)) => log::debug!("No scores for matchday {day}"),
            Err(err) => return Err(err),
        }
    }
    ScoreSheet::averaged(&sheets)
}

/// Catalog held entirely in memory (loaded from a cache file or built in tests).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    players: FxHashMap<PlayerId, Player>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, rejecting the first one that fails validation.
    pub fn from_players(players: impl IntoIterator<Item = Player>) -> Result<Self> {
        let mut catalog = Self::new();
        for player in players {
            catalog.insert(player)?;
        }
        Ok(catalog)
    }

    /// Insert or replace; invalid records (empty name, negative or NaN price,
    /// stats of the wrong kind) are rejected.
    pub fn insert(&mut self, player: Player) -> Result<()> {
        player.validate()?;
        self.players.insert(player.id, player);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn sorted(&self, filter: impl Fn(&Player) -> bool) -> Vec<Player> {
        let mut out: Vec<Player> = self.players.values().filter(|p| filter(p)).cloned().collect();
        out.sort_by_key(|p| p.id);
        out
    }
}

impl Catalog for InMemoryCatalog {
    fn search(&self, query: &str) -> Result<Vec<Player>> {
        Ok(self.sorted(|p| p.matches_query(query)))
    }

    fn get_by_id(&self, id: PlayerId) -> Result<Player> {
        self.players
            .get(&id)
            .cloned()
            .ok_or_else(|| SquadError::NotFound(format!("player {id} not in catalog")))
    }

    fn by_role(&self, role: Role) -> Result<Vec<Player>> {
        Ok(self.sorted(|p| p.role == role))
    }
}

/// Score sheets keyed by matchday.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScores {
    sheets: BTreeMap<u32, ScoreSheet>,
}

impl InMemoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sheet: ScoreSheet) {
        self.sheets.insert(sheet.matchday, sheet);
    }

    pub fn matchdays(&self) -> impl Iterator<Item = u32> + '_ {
        self.sheets.keys().copied()
    }
}

impl FromIterator<ScoreSheet> for InMemoryScores {
    fn from_iter<I: IntoIterator<Item = ScoreSheet>>(iter: I) -> Self {
        let mut scores = Self::new();
        for sheet in iter {
            scores.insert(sheet);
        }
        scores
    }
}

impl ScoreProvider for InMemoryScores {
    fn scores_for(&self, matchday: u32) -> Result<ScoreSheet> {
        self.sheets
            .get(&matchday)
            .cloned()
            .ok_or_else(|| SquadError::NotFound(format!("no scores for matchday {matchday}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_players([
            Player::new(3, "Nicolò Barella", "Inter", Role::MID, 25.0).unwrap(),
            Player::new(1, "Mike Maignan", "Milan", Role::GK, 20.0).unwrap(),
            Player::new(2, "Rafael Leão", "Milan", Role::FWD, 35.0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn insert_rejects_invalid_price() {
        let mut catalog = catalog();
        let mut cheap = Player::new(4, "Ghost", "Nowhere", Role::FWD, 1.0).unwrap();
        cheap.price = -50.0;
        assert!(matches!(catalog.insert(cheap.clone()), Err(SquadError::InvalidPlayer(_))));
        cheap.price = f64::NAN;
        assert!(catalog.insert(cheap).is_err());
        assert_eq!(catalog.len(), 3);
        assert!(InMemoryCatalog::from_players(catalog.search("").unwrap()).is_ok());
    }

    #[test]
    fn search_is_sorted_and_case_insensitive() {
        let hits = catalog().search("milan").unwrap();
        let ids: Vec<_> = hits.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(catalog().search("").unwrap().len(), 3);
    }

    #[test]
    fn get_by_id_reports_not_found() {
        assert_eq!(catalog().get_by_id(PlayerId(2)).unwrap().name, "Rafael Leão");
        assert!(matches!(catalog().get_by_id(PlayerId(9)), Err(SquadError::NotFound(_))));
    }

    #[test]
    fn by_role_filters() {
        let mids = catalog().by_role(Role::MID).unwrap();
        assert_eq!(mids.len(), 1);
        assert_eq!(mids[0].id, PlayerId(3));
    }

    #[test]
    fn horizon_skips_unknown_matchdays() {
        let scores: InMemoryScores = [
            ScoreSheet::new(4).with(1, 6.0).unwrap(),
            ScoreSheet::new(5).with(1, 8.0).unwrap(),
        ]
        .into_iter()
        .collect();

        let sheet = horizon_scores(&scores, 4, 3).unwrap();
        assert!((sheet.predicted(PlayerId(1)) - 7.0).abs() < 1e-9);
        assert_eq!(horizon_scores(&scores, 5, 1).unwrap().predicted(PlayerId(1)), 8.0);
        assert!(horizon_scores(&scores, 20, 2).is_err());
    }
}
