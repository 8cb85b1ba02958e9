use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Positional category of a player. Closed set; ordering is goal-to-attack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    GK,
    DEF,
    MID,
    FWD,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::GK, Role::DEF, Role::MID, Role::FWD];

    pub fn code(&self) -> &'static str {
        match self {
            Role::GK => "GK",
            Role::DEF => "DEF",
            Role::MID => "MID",
            Role::FWD => "FWD",
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Role::GK)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts the canonical codes plus the Italian single-letter roles
    /// (P/D/C/A) used by fantasy league exports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "P" | "POR" => Ok(Role::GK),
            "DEF" | "D" | "DF" => Ok(Role::DEF),
            "MID" | "C" | "MF" => Ok(Role::MID),
            "FWD" | "A" | "FW" => Ok(Role::FWD),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Per-role roster quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleLimits {
    #[serde(rename = "GK")]
    pub gk: usize,
    #[serde(rename = "DEF")]
    pub def: usize,
    #[serde(rename = "MID")]
    pub mid: usize,
    #[serde(rename = "FWD")]
    pub fwd: usize,
}

impl Default for RoleLimits {
    fn default() -> Self {
        Self { gk: 3, def: 8, mid: 8, fwd: 6 }
    }
}

impl RoleLimits {
    pub fn limit(&self, role: Role) -> usize {
        match role {
            Role::GK => self.gk,
            Role::DEF => self.def,
            Role::MID => self.mid,
            Role::FWD => self.fwd,
        }
    }

    pub fn total(&self) -> usize {
        self.gk + self.def + self.mid + self.fwd
    }
}
