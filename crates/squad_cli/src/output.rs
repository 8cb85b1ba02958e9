//! Operator-facing text rendering.

use crate::commands::{LineupView, RosterView, TradesView};
use squad_core::{LineupStatus, Player};
use std::fmt::Write;

const RULE_WIDTH: usize = 56;

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
}

fn player_line(out: &mut String, player: &Player) {
    let _ = writeln!(
        out,
        "  {:<6} {:<4} {:<24} {:<14} {:>7.2}",
        player.id, player.role, player.name, player.team, player.price
    );
}

pub fn roster(view: &RosterView) -> String {
    let mut out = String::new();
    section(&mut out, &format!("Roster of {}", view.user));
    for player in &view.players {
        player_line(&mut out, player);
    }
    let counts: Vec<String> =
        view.counts.iter().map(|(role, n, limit)| format!("{role} {n}/{limit}")).collect();
    let _ = writeln!(out, "{:<14} {}", "Quotas", counts.join("  "));
    let _ = writeln!(out, "{:<14} {:.2}", "Total value", view.total_value);
    out
}

pub fn lineup(view: &LineupView) -> String {
    let mut out = String::new();
    section(&mut out, &format!("Lineup {}", view.formation));
    for (_, players) in &view.starters {
        for player in players {
            player_line(&mut out, player);
        }
    }
    section(&mut out, "Bench");
    for (_, players) in &view.bench {
        for player in players {
            player_line(&mut out, player);
        }
    }
    let _ = writeln!(out, "{:<14} {:.2}", "Expected", view.expected_score);
    if let LineupStatus::Degraded(shortfalls) = &view.status {
        for s in shortfalls {
            let _ = writeln!(out, "⚠ {} short by {} ({}/{})", s.role, s.missing(), s.filled, s.required);
        }
    }
    out
}

pub fn trades(view: &TradesView) -> String {
    let mut out = String::new();
    section(&mut out, "Trade suggestions");
    if view.suggestions.is_empty() {
        let _ = writeln!(out, "No upgrade fits the budget");
        return out;
    }
    for s in &view.suggestions {
        let _ = writeln!(
            out,
            "  sell {} {:<22} buy {} {:<22} +{:.2} pts  cost {:+.2}",
            s.sell.id, s.sell.name, s.buy.id, s.buy.name, s.improvement, s.cost
        );
    }
    let _ = writeln!(
        out,
        "{:<14} {} transfers, +{:.2} pts, net cost {:+.2}",
        "Total", view.summary.transfers, view.summary.total_improvement, view.summary.total_cost
    );
    if view.applied {
        let _ = writeln!(out, "✓ Trades applied");
    }
    out
}
