//! Roster: the players a user owns, bounded by per-role quotas.

use crate::error::{Result, SquadError};
use crate::models::{Player, PlayerId, Role, RoleLimits};
use std::collections::BTreeMap;

/// Set of owned players, unique by id.
///
/// Invariant: `count_by_role(r) <= limits.limit(r)` for every role, after every
/// successful or rejected mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roster {
    players: BTreeMap<PlayerId, Player>,
    limits: RoleLimits,
}

impl Roster {
    pub fn new() -> Self {
        Self::with_limits(RoleLimits::default())
    }

    pub fn with_limits(limits: RoleLimits) -> Self {
        Self { players: BTreeMap::new(), limits }
    }

    /// Rebuild a roster from stored players, rejecting duplicates and quota overflow.
    pub fn from_players(limits: RoleLimits, players: Vec<Player>) -> Result<Self> {
        let mut roster = Self::with_limits(limits);
        for player in players {
            if roster.contains(player.id) {
                return Err(SquadError::InvalidPlayer(format!(
                    "duplicate roster entry {}",
                    player.id
                )));
            }
            roster.add(player)?;
        }
        Ok(roster)
    }

    /// Add a player.
    ///
    /// Returns `Ok(false)` when the id is already owned (no-op), `Ok(true)` when
    /// inserted, `CapacityExceeded` when the role quota is full.
    pub fn add(&mut self, player: Player) -> Result<bool> {
        if self.players.contains_key(&player.id) {
            log::debug!("Roster add ignored: {} already owned", player.id);
            return Ok(false);
        }

        player.validate()?;

        let limit = self.limits.limit(player.role);
        if self.count_by_role(player.role) >= limit {
            return Err(SquadError::CapacityExceeded { role: player.role, limit });
        }

        log::debug!("Roster add: {} {} ({})", player.id, player.name, player.role);
        self.players.insert(player.id, player);
        Ok(true)
    }

    /// Remove a player; `None` when it was not owned.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&id);
        if let Some(player) = &removed {
            log::debug!("Roster remove: {} {} ({})", player.id, player.name, player.role);
        }
        removed
    }

    pub fn count_by_role(&self, role: Role) -> usize {
        self.players.values().filter(|p| p.role == role).count()
    }

    /// Members of `role`, ascending by id.
    pub fn members_by_role(&self, role: Role) -> Vec<&Player> {
        self.players.values().filter(|p| p.role == role).collect()
    }

    pub fn remaining_capacity(&self, role: Role) -> usize {
        self.limits.limit(role).saturating_sub(self.count_by_role(role))
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn limits(&self) -> &RoleLimits {
        &self.limits
    }

    /// All players, ascending by id.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.keys().copied()
    }

    pub fn to_players(&self) -> Vec<Player> {
        self.players.values().cloned().collect()
    }

    /// Sum of member prices.
    pub fn total_value(&self) -> f64 {
        self.players.values().map(|p| p.price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn player(id: u32, role: Role) -> Player {
        Player::new(id, format!("Player {id}"), "Team", role, 10.0).unwrap()
    }

    #[test]
    fn add_respects_role_quota() {
        let mut roster = Roster::new();
        for id in 0..3 {
            assert_eq!(roster.add(player(id, Role::GK)), Ok(true));
        }
        let err = roster.add(player(3, Role::GK)).unwrap_err();
        assert_eq!(err, SquadError::CapacityExceeded { role: Role::GK, limit: 3 });
        assert_eq!(roster.count_by_role(Role::GK), 3);
        assert_eq!(roster.remaining_capacity(Role::GK), 0);
    }

    #[test]
    fn duplicate_add_is_noop_even_when_full() {
        let mut roster = Roster::new();
        for id in 0..3 {
            roster.add(player(id, Role::GK)).unwrap();
        }
        assert_eq!(roster.add(player(1, Role::GK)), Ok(false));
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut roster = Roster::new();
        roster.add(player(1, Role::MID)).unwrap();
        assert!(roster.remove(PlayerId(99)).is_none());
        assert_eq!(roster.len(), 1);
        assert!(roster.remove(PlayerId(1)).is_some());
        assert!(roster.is_empty());
    }

    #[test]
    fn members_by_role_sorted_by_id() {
        let mut roster = Roster::new();
        roster.add(player(7, Role::DEF)).unwrap();
        roster.add(player(2, Role::DEF)).unwrap();
        roster.add(player(5, Role::FWD)).unwrap();
        let ids: Vec<_> = roster.members_by_role(Role::DEF).iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![2, 7]);
    }

    #[test]
    fn from_players_rejects_overflow_and_duplicates() {
        let keepers: Vec<_> = (0..4).map(|id| player(id, Role::GK)).collect();
        assert!(Roster::from_players(RoleLimits::default(), keepers).is_err());

        let dupes = vec![player(1, Role::MID), player(1, Role::MID)];
        assert!(Roster::from_players(RoleLimits::default(), dupes).is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u32, Role),
        Remove(u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let role = prop_oneof![Just(Role::GK), Just(Role::DEF), Just(Role::MID), Just(Role::FWD)];
        prop_oneof![
            (0u32..40, role).prop_map(|(id, r)| Op::Add(id, r)),
            (0u32..40).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn quota_holds_after_any_sequence(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut roster = Roster::new();
            for op in ops {
                match op {
                    Op::Add(id, role) => { let _ = roster.add(player(id, role)); }
                    Op::Remove(id) => { roster.remove(PlayerId(id)); }
                }
                for role in Role::ALL {
                    prop_assert!(roster.count_by_role(role) <= roster.limits().limit(role));
                }
            }
        }
    }
}
