//! Trade suggestions: role-matched catalog replacements that raise expected score.
//!
//! The search is greedy. Candidates are ranked by improvement and accepted in
//! that order while budget and transfer count allow; a skipped candidate is
//! never revisited. This does not find the knapsack optimum over all sell/buy
//! pairs.

use crate::catalog::Catalog;
use crate::error::{Result, SquadError};
use crate::models::{Player, PlayerId, Role, ScoreSheet};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Absorbs float rounding in cumulative cost checks.
const COST_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeOptions {
    /// Net spend allowed across all accepted trades.
    pub budget: f64,
    /// Upper bound on accepted trades; 0 yields no suggestions.
    pub max_transfers: usize,
    /// A buy must beat the seller by more than this.
    pub min_improvement: f64,
}

impl Default for TradeOptions {
    fn default() -> Self {
        Self { budget: 0.0, max_transfers: 2, min_improvement: 0.0 }
    }
}

impl TradeOptions {
    pub fn new(budget: f64, max_transfers: usize) -> Self {
        Self { budget, max_transfers, ..Self::default() }
    }
}

/// Proposed sell/buy pair for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSuggestion {
    pub sell: Player,
    pub buy: Player,
    /// `buy` predicted score minus `sell` predicted score.
    pub improvement: f64,
    /// `buy.price - sell.price`; negative frees budget.
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeSummary {
    pub transfers: usize,
    pub total_cost: f64,
    pub total_improvement: f64,
}

impl TradeSummary {
    pub fn of(suggestions: &[TradeSuggestion]) -> Self {
        Self {
            transfers: suggestions.len(),
            total_cost: suggestions.iter().map(|s| s.cost).sum(),
            total_improvement: suggestions.iter().map(|s| s.improvement).sum(),
        }
    }
}

/// Best catalog upgrade for `seller`: highest predicted score, then lowest
/// price, then lowest id.
fn best_upgrade<'a>(
    seller: &Player,
    pool: &'a [Player],
    scores: &ScoreSheet,
    min_improvement: f64,
) -> Option<&'a Player> {
    let floor = scores.predicted(seller.id) + min_improvement;
    pool.iter().filter(|q| scores.predicted(q.id) > floor).min_by(|a, b| {
        scores
            .predicted(b.id)
            .total_cmp(&scores.predicted(a.id))
            .then_with(|| a.price.total_cmp(&b.price))
            .then_with(|| a.id.cmp(&b.id))
    })
}

/// Suggest up to `options.max_transfers` upgrades within `options.budget`.
///
/// Output is ordered by improvement descending. A negative budget or zero
/// transfer allowance returns no suggestions without querying the catalog.
/// Each catalog player is bought at most once per plan.
pub fn recommend<C: Catalog + ?Sized>(
    roster: &Roster,
    catalog: &C,
    scores: &ScoreSheet,
    options: &TradeOptions,
) -> Result<Vec<TradeSuggestion>> {
    if options.budget.is_nan() || options.budget < 0.0 || options.max_transfers == 0 {
        return Ok(Vec::new());
    }

    let mut pools: BTreeMap<Role, Vec<Player>> = BTreeMap::new();
    for role in Role::ALL {
        if roster.count_by_role(role) == 0 {
            continue;
        }
        let pool: Vec<Player> = catalog
            .by_role(role)?
            .into_iter()
            .filter(|q| !roster.contains(q.id))
            .filter(|q| match q.validate() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Catalog player {} ignored for trades: {}", q.id, err);
                    false
                }
            })
            .collect();
        pools.insert(role, pool);
    }

    let mut candidates: Vec<TradeSuggestion> = roster
        .iter()
        .filter_map(|seller| {
            let pool = pools.get(&seller.role)?;
            let buy = best_upgrade(seller, pool, scores, options.min_improvement)?;
            Some(TradeSuggestion {
                sell: seller.clone(),
                buy: buy.clone(),
                improvement: scores.predicted(buy.id) - scores.predicted(seller.id),
                cost: buy.price - seller.price,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.improvement.total_cmp(&a.improvement).then_with(|| a.sell.id.cmp(&b.sell.id))
    });

    let mut accepted = Vec::new();
    let mut bought: BTreeSet<PlayerId> = BTreeSet::new();
    let mut spent = 0.0;
    for candidate in candidates {
        if accepted.len() >= options.max_transfers {
            break;
        }
        if bought.contains(&candidate.buy.id) {
            continue;
        }
        if spent + candidate.cost > options.budget + COST_EPSILON {
            continue;
        }
        spent += candidate.cost;
        bought.insert(candidate.buy.id);
        accepted.push(candidate);
    }

    log::debug!(
        "Trade search: {} accepted, net spend {:.2} of budget {:.2}",
        accepted.len(),
        spent,
        options.budget
    );
    Ok(accepted)
}

impl Roster {
    /// Sell then buy in one step; on any failure the roster is unchanged.
    pub fn apply_trade(&mut self, trade: &TradeSuggestion) -> Result<()> {
        let sold_role = self
            .get(trade.sell.id)
            .map(|p| p.role)
            .ok_or_else(|| SquadError::NotFound(format!("{} is not on the roster", trade.sell.id)))?;
        if self.contains(trade.buy.id) {
            return Err(SquadError::InvalidPlayer(format!("{} is already owned", trade.buy.id)));
        }
        if sold_role != trade.buy.role {
            return Err(SquadError::RoleMismatch { bench: trade.buy.role, starter: sold_role });
        }

        trade.buy.validate()?;

        // Same role as the seller, so the freed slot always takes the buy.
        self.remove(trade.sell.id);
        self.add(trade.buy.clone())?;
        log::info!("Trade applied: sold {} bought {}", trade.sell.id, trade.buy.id);
        Ok(())
    }

    /// Apply a whole plan, all or nothing.
    pub fn apply_trades(&mut self, trades: &[TradeSuggestion]) -> Result<()> {
        let mut next = self.clone();
        for trade in trades {
            next.apply_trade(trade)?;
        }
        *self = next;
        Ok(())
    }
}
