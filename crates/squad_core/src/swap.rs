//! Interactive lineup refinement: bench/starter moves under formation slot counts.
//!
//! Every transition checks all preconditions before touching state, so a
//! rejected move leaves the lineup untouched.

use crate::error::{Result, SquadError};
use crate::lineup::Lineup;
use crate::models::PlayerId;
use serde::{Deserialize, Serialize};

/// A single requested lineup change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "move", rename_all = "snake_case")]
pub enum Swap {
    BenchToStarter { player: PlayerId },
    StarterToBench { player: PlayerId },
    Exchange { bench: PlayerId, starter: PlayerId },
}

impl Lineup {
    pub fn apply(&mut self, swap: Swap) -> Result<()> {
        match swap {
            Swap::BenchToStarter { player } => self.bench_to_starter(player),
            Swap::StarterToBench { player } => self.starter_to_bench(player),
            Swap::Exchange { bench, starter } => self.exchange(bench, starter),
        }
    }

    /// Promote a bench player. Fails with `RoleSlotsFull` when the role's
    /// starters already match the formation.
    pub fn bench_to_starter(&mut self, id: PlayerId) -> Result<()> {
        let role = self.bench_role(id).ok_or(SquadError::NotInLineup(id))?;
        let slots = self.formation.slot_count(role);
        if self.starters(role).len() >= slots {
            return Err(SquadError::RoleSlotsFull { role, slots });
        }

        if let Some(bench) = self.bench.get_mut(&role) {
            bench.retain(|&b| b != id);
        }
        self.starters.entry(role).or_default().push(id);
        log::debug!("Swap: {} bench -> starting {}", id, role);
        Ok(())
    }

    /// Send a starter to the bench. Always succeeds for a current starter.
    pub fn starter_to_bench(&mut self, id: PlayerId) -> Result<()> {
        let role = self.starter_role(id).ok_or(SquadError::NotInLineup(id))?;

        if let Some(starters) = self.starters.get_mut(&role) {
            starters.retain(|&s| s != id);
        }
        self.bench.entry(role).or_default().push(id);
        log::debug!("Swap: {} starting {} -> bench", id, role);
        Ok(())
    }

    /// Swap a bench player with a same-role starter in one step, keeping the
    /// starter's slot position.
    pub fn exchange(&mut self, bench_id: PlayerId, starter_id: PlayerId) -> Result<()> {
        let bench_role = self.bench_role(bench_id).ok_or(SquadError::NotInLineup(bench_id))?;
        let starter_role =
            self.starter_role(starter_id).ok_or(SquadError::NotInLineup(starter_id))?;
        if bench_role != starter_role {
            return Err(SquadError::RoleMismatch { bench: bench_role, starter: starter_role });
        }

        if let Some(slot) = self
            .starters
            .get_mut(&starter_role)
            .and_then(|s| s.iter_mut().find(|s| **s == starter_id))
        {
            *slot = bench_id;
        }
        if let Some(slot) = self
            .bench
            .get_mut(&bench_role)
            .and_then(|b| b.iter_mut().find(|b| **b == bench_id))
        {
            *slot = starter_id;
        }
        log::debug!("Swap: {} <-> {} ({})", bench_id, starter_id, bench_role);
        Ok(())
    }
}
