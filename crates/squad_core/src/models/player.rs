use super::role::Role;
use crate::error::{Result, SquadError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of a player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for PlayerId {
    fn from(id: u32) -> Self {
        PlayerId(id)
    }
}

/// Season statistics that only make sense for one side of the goalkeeper line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleStats {
    Goalkeeper { clean_sheets: u16, goals_conceded: u16 },
    Outfield { goals: u16, assists: u16 },
}

impl RoleStats {
    fn fits(&self, role: Role) -> bool {
        matches!(
            (self, role.is_goalkeeper()),
            (RoleStats::Goalkeeper { .. }, true) | (RoleStats::Outfield { .. }, false)
        )
    }
}

/// Catalog player record.
///
/// Immutable once built: rosters and lineups refer to players by [`PlayerId`]
/// and never mutate the record. Per-fixture predictions live in
/// [`ScoreSheet`](super::ScoreSheet), not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub role: Role,
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<RoleStats>,
}

impl Player {
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        team: impl Into<String>,
        role: Role,
        price: f64,
    ) -> Result<Self> {
        let player = Self {
            id: id.into(),
            name: name.into(),
            team: team.into(),
            role,
            price,
            stats: None,
        };
        player.validate()?;
        Ok(player)
    }

    pub fn with_stats(mut self, stats: RoleStats) -> Result<Self> {
        self.stats = Some(stats);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SquadError::InvalidPlayer(format!("{} has an empty name", self.id)));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(SquadError::InvalidPlayer(format!(
                "{} has invalid price {}",
                self.id, self.price
            )));
        }
        if let Some(stats) = &self.stats {
            if !stats.fits(self.role) {
                return Err(SquadError::InvalidPlayer(format!(
                    "{} carries stats that do not match role {}",
                    self.id, self.role
                )));
            }
        }
        Ok(())
    }

    /// Case-insensitive free-text match on name and team.
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty() || self.name.to_lowercase().contains(&q) || self.team.to_lowercase().contains(&q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_price() {
        let err = Player::new(1, "Lautaro", "Inter", Role::FWD, -1.0).unwrap_err();
        assert!(matches!(err, SquadError::InvalidPlayer(_)));
    }

    #[test]
    fn stats_payload_must_match_role() {
        let keeper = Player::new(1, "Maignan", "Milan", Role::GK, 20.0).unwrap();
        assert!(keeper
            .clone()
            .with_stats(RoleStats::Goalkeeper { clean_sheets: 12, goals_conceded: 30 })
            .is_ok());
        assert!(keeper.with_stats(RoleStats::Outfield { goals: 1, assists: 0 }).is_err());
    }

    #[test]
    fn query_matches_name_or_team() {
        let p = Player::new(9, "Victor Osimhen", "Napoli", Role::FWD, 40.0).unwrap();
        assert!(p.matches_query("osim"));
        assert!(p.matches_query("NAPOLI"));
        assert!(p.matches_query(""));
        assert!(!p.matches_query("juventus"));
    }
}
