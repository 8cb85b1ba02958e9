use super::role::Role;
use crate::error::{Result, SquadError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outfield players in a starting eleven (goalkeeper is implicit).
pub const OUTFIELD_SLOTS: u8 = 10;

/// Starting-lineup shape: defender/midfielder/forward counts plus one keeper.
///
/// Only the league formations in [`Formation::ALL`] can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Formation {
    def: u8,
    mid: u8,
    fwd: u8,
}

impl Formation {
    pub const F343: Formation = Formation { def: 3, mid: 4, fwd: 3 };
    pub const F352: Formation = Formation { def: 3, mid: 5, fwd: 2 };
    pub const F433: Formation = Formation { def: 4, mid: 3, fwd: 3 };
    pub const F442: Formation = Formation { def: 4, mid: 4, fwd: 2 };
    pub const F451: Formation = Formation { def: 4, mid: 5, fwd: 1 };
    pub const F532: Formation = Formation { def: 5, mid: 3, fwd: 2 };
    pub const F541: Formation = Formation { def: 5, mid: 4, fwd: 1 };

    /// Canonical order; used as the tie-break when searching formations.
    pub const ALL: [Formation; 7] = [
        Formation::F343,
        Formation::F352,
        Formation::F433,
        Formation::F442,
        Formation::F451,
        Formation::F532,
        Formation::F541,
    ];

    /// Parse a `D-M-F` token such as `"4-3-3"`.
    pub fn parse(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.split('-').collect();
        if parts.len() != 3 {
            return Err(SquadError::InvalidFormation(format!("'{token}' is not D-M-F")));
        }

        let mut counts = [0u8; 3];
        for (slot, part) in counts.iter_mut().zip(&parts) {
            let mut chars = part.chars();
            *slot = match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_digit() => c as u8 - b'0',
                _ => {
                    return Err(SquadError::InvalidFormation(format!(
                        "'{token}' segment '{part}' is not a single digit"
                    )))
                }
            };
        }

        let [def, mid, fwd] = counts;
        let outfield = def + mid + fwd;
        if outfield != OUTFIELD_SLOTS {
            return Err(SquadError::InvalidFormation(format!(
                "'{token}' fields {} players with the goalkeeper, expected 11",
                outfield + 1
            )));
        }

        let formation = Formation { def, mid, fwd };
        if !Formation::ALL.contains(&formation) {
            return Err(SquadError::InvalidFormation(format!(
                "'{token}' is not a league formation"
            )));
        }
        Ok(formation)
    }

    pub fn def(&self) -> u8 {
        self.def
    }

    pub fn mid(&self) -> u8 {
        self.mid
    }

    pub fn fwd(&self) -> u8 {
        self.fwd
    }

    /// Starting slots for `role`.
    pub fn slot_count(&self, role: Role) -> usize {
        match role {
            Role::GK => 1,
            Role::DEF => self.def as usize,
            Role::MID => self.mid as usize,
            Role::FWD => self.fwd as usize,
        }
    }

    /// Returns (defenders, midfielders, forwards)
    pub fn get_positions(&self) -> (u8, u8, u8) {
        (self.def, self.mid, self.fwd)
    }

    /// Canonical formation code string (e.g., "4-3-3").
    pub fn code(&self) -> String {
        format!("{}-{}-{}", self.def, self.mid, self.fwd)
    }
}

impl Default for Formation {
    fn default() -> Self {
        Formation::F343
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.def, self.mid, self.fwd)
    }
}

impl FromStr for Formation {
    type Err = SquadError;

    fn from_str(s: &str) -> Result<Self> {
        Formation::parse(s)
    }
}

impl TryFrom<String> for Formation {
    type Error = SquadError;

    fn try_from(value: String) -> Result<Self> {
        Formation::parse(&value)
    }
}

impl From<Formation> for String {
    fn from(value: Formation) -> Self {
        value.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_league_formations() {
        assert_eq!(Formation::parse("4-3-3").unwrap(), Formation::F433);
        for f in Formation::ALL {
            assert_eq!(Formation::parse(&f.code()).unwrap(), f);
            let (d, m, w) = f.get_positions();
            assert_eq!(d + m + w + 1, 11);
        }
    }

    #[test]
    fn rejects_wrong_total() {
        let err = Formation::parse("4-4-4").unwrap_err();
        assert!(matches!(err, SquadError::InvalidFormation(_)));
        assert!(Formation::parse("3-3-3").is_err());
    }

    #[test]
    fn rejects_well_formed_but_unlisted_shapes() {
        // Sums to 11 but is not in the league universe.
        assert!(Formation::parse("6-3-1").is_err());
        assert!(Formation::parse("2-5-3").is_err());
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["", "433", "4-3", "4-3-3-0", "-4-3-3", "4--3-3", "a-b-c", "10-0-0", "4-3-+3"] {
            assert!(Formation::parse(token).is_err(), "accepted {token:?}");
        }
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        for token in [" 4-3-3", "4-3-3\n", " 4-3-3\n", "4 -3-3"] {
            let err = Formation::parse(token).unwrap_err();
            assert!(matches!(err, SquadError::InvalidFormation(_)), "accepted {token:?}");
        }
    }

    #[test]
    fn slot_counts_follow_shape() {
        let f = Formation::F541;
        assert_eq!(f.slot_count(Role::GK), 1);
        assert_eq!(f.slot_count(Role::DEF), 5);
        assert_eq!(f.slot_count(Role::MID), 4);
        assert_eq!(f.slot_count(Role::FWD), 1);
    }

    #[test]
    fn serde_round_trips_through_code() {
        let json = serde_json::to_string(&Formation::F352).unwrap();
        assert_eq!(json, "\"3-5-2\"");
        let back: Formation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Formation::F352);
        assert!(serde_json::from_str::<Formation>("\"4-4-4\"").is_err());
    }
}
