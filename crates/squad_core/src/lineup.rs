//! Lineup allocation: formation-constrained starters plus the bench.
//!
//! Per role, roster members are ranked by predicted score (descending, ties by
//! ascending id) and the top `slot_count(role)` start. Everyone else sits on the
//! bench, so `starters ∪ bench == roster` and the two never overlap.

use crate::models::{Formation, Player, PlayerId, Role, ScoreSheet};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A role whose starters fall short of the formation's slot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub role: Role,
    pub required: usize,
    pub filled: usize,
}

impl Shortfall {
    pub fn missing(&self) -> usize {
        self.required.saturating_sub(self.filled)
    }
}

/// Completeness annotation. `Degraded` is a reportable state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "shortfalls", rename_all = "snake_case")]
pub enum LineupStatus {
    Complete,
    Degraded(Vec<Shortfall>),
}

/// Starting eleven (possibly short) and bench, both keyed by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub(crate) formation: Formation,
    pub(crate) starters: BTreeMap<Role, Vec<PlayerId>>,
    pub(crate) bench: BTreeMap<Role, Vec<PlayerId>>,
}

/// Rank players for a fixture: predicted score descending, id ascending.
pub fn rank_by_score<'a>(players: &[&'a Player], scores: &ScoreSheet) -> Vec<&'a Player> {
    let mut ranked = players.to_vec();
    ranked.sort_by(|a, b| compare_by_score(a.id, b.id, scores));
    ranked
}

fn compare_by_score(a: PlayerId, b: PlayerId, scores: &ScoreSheet) -> Ordering {
    scores.predicted(b).total_cmp(&scores.predicted(a)).then_with(|| a.cmp(&b))
}

/// Select starters and bench for `formation` from `roster`.
///
/// Deterministic: identical inputs always produce an identical lineup.
pub fn allocate(roster: &Roster, formation: Formation, scores: &ScoreSheet) -> Lineup {
    let mut lineup = Lineup::empty(formation);

    for role in Role::ALL {
        let members = roster.members_by_role(role);
        let ranked = rank_by_score(&members, scores);
        let slots = formation.slot_count(role);

        let (start, sit): (Vec<_>, Vec<_>) =
            ranked.iter().enumerate().partition(|(rank, _)| *rank < slots);

        lineup.starters.insert(role, start.into_iter().map(|(_, p)| p.id).collect());
        lineup.bench.insert(role, sit.into_iter().map(|(_, p)| p.id).collect());
    }

    if let LineupStatus::Degraded(shortfalls) = lineup.status() {
        log::debug!("Lineup {} is short: {:?}", formation, shortfalls);
    }
    lineup
}

/// Allocate under every league formation and keep the highest expected total.
///
/// Ties keep the formation that comes first in [`Formation::ALL`].
pub fn best_formation(roster: &Roster, scores: &ScoreSheet) -> Lineup {
    let mut best = allocate(roster, Formation::ALL[0], scores);
    let mut best_score = best.total_score(scores);

    for formation in Formation::ALL.iter().skip(1) {
        let candidate = allocate(roster, *formation, scores);
        let score = candidate.total_score(scores);
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }

    log::debug!("Best formation {} with expected total {:.2}", best.formation, best_score);
    best
}

impl Lineup {
    pub fn empty(formation: Formation) -> Self {
        let buckets: BTreeMap<Role, Vec<PlayerId>> =
            Role::ALL.iter().map(|&r| (r, Vec::new())).collect();
        Self { formation, starters: buckets.clone(), bench: buckets }
    }

    pub fn formation(&self) -> Formation {
        self.formation
    }

    pub fn starters(&self, role: Role) -> &[PlayerId] {
        self.starters.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bench(&self, role: Role) -> &[PlayerId] {
        self.bench.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Starters in role order (GK, DEF, MID, FWD).
    pub fn starter_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.starters.values().flatten().copied()
    }

    /// Bench in role order.
    pub fn bench_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.bench.values().flatten().copied()
    }

    pub fn starter_count(&self) -> usize {
        self.starters.values().map(Vec::len).sum()
    }

    pub fn bench_count(&self) -> usize {
        self.bench.values().map(Vec::len).sum()
    }

    pub fn is_starter(&self, id: PlayerId) -> bool {
        self.starter_role(id).is_some()
    }

    pub fn is_benched(&self, id: PlayerId) -> bool {
        self.bench_role(id).is_some()
    }

    pub(crate) fn starter_role(&self, id: PlayerId) -> Option<Role> {
        self.starters.iter().find(|(_, ids)| ids.contains(&id)).map(|(role, _)| *role)
    }

    pub(crate) fn bench_role(&self, id: PlayerId) -> Option<Role> {
        self.bench.iter().find(|(_, ids)| ids.contains(&id)).map(|(role, _)| *role)
    }

    /// Sum of starters' predicted scores.
    pub fn total_score(&self, scores: &ScoreSheet) -> f64 {
        self.starter_ids().map(|id| scores.predicted(id)).sum()
    }

    pub fn shortfalls(&self) -> Vec<Shortfall> {
        Role::ALL
            .iter()
            .filter_map(|&role| {
                let required = self.formation.slot_count(role);
                let filled = self.starters(role).len();
                (filled < required).then_some(Shortfall { role, required, filled })
            })
            .collect()
    }

    pub fn status(&self) -> LineupStatus {
        let shortfalls = self.shortfalls();
        if shortfalls.is_empty() {
            LineupStatus::Complete
        } else {
            LineupStatus::Degraded(shortfalls)
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.shortfalls().is_empty()
    }

    /// Put a newly acquired roster player on the bench.
    pub fn add_to_bench(&mut self, player: &Player) {
        if self.is_starter(player.id) || self.is_benched(player.id) {
            return;
        }
        self.bench.entry(player.role).or_default().push(player.id);
    }

    /// Drop a player that left the roster.
    ///
    /// A departing starter's slot is backfilled with the best same-role bench
    /// player for `scores`; returns the promoted id, if any.
    pub fn remove_player(&mut self, id: PlayerId, scores: &ScoreSheet) -> Option<PlayerId> {
        if let Some(role) = self.bench_role(id) {
            if let Some(ids) = self.bench.get_mut(&role) {
                ids.retain(|&b| b != id);
            }
            return None;
        }

        let role = self.starter_role(id)?;
        if let Some(ids) = self.starters.get_mut(&role) {
            ids.retain(|&s| s != id);
        }

        let bench = self.bench.entry(role).or_default();
        let best = bench.iter().copied().min_by(|a, b| compare_by_score(*a, *b, scores))?;
        bench.retain(|&b| b != best);
        self.starters.entry(role).or_default().push(best);

        log::debug!("Backfilled {} slot of {} with {}", role, id, best);
        Some(best)
    }

    /// Hand `old`'s place (starting slot or bench) to `new`, same role.
    /// Returns false when `old` is not in the lineup.
    pub fn replace_player(&mut self, old: PlayerId, new: PlayerId) -> bool {
        for bucket in self.starters.values_mut().chain(self.bench.values_mut()) {
            if let Some(slot) = bucket.iter_mut().find(|id| **id == old) {
                *slot = new;
                return true;
            }
        }
        false
    }

    /// True when starters and bench partition exactly the roster's ids, each
    /// player sits in its own role's bucket, and no role exceeds its slots.
    pub fn is_consistent_with(&self, roster: &Roster) -> bool {
        let mut seen = 0usize;
        for role in Role::ALL {
            if self.starters(role).len() > self.formation.slot_count(role) {
                return false;
            }
            for id in self.starters(role).iter().chain(self.bench(role)) {
                match roster.get(*id) {
                    Some(p) if p.role == role => seen += 1,
                    _ => return false,
                }
            }
        }
        let mut all: Vec<PlayerId> = self.starter_ids().chain(self.bench_ids()).collect();
        all.sort();
        all.dedup();
        all.len() == seen && seen == roster.len()
    }
}
