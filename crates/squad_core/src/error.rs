use crate::models::{PlayerId, Role};
use thiserror::Error;

/// Typed outcomes surfaced to callers of the squad engine.
///
/// None of these are fatal: every variant leaves roster and lineup state exactly
/// as it was before the rejected call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SquadError {
    #[error("Role quota full: {role} limit is {limit}")]
    CapacityExceeded { role: Role, limit: usize },

    #[error("Invalid formation: {0}")]
    InvalidFormation(String),

    #[error("No free {role} slot: formation allows {slots}")]
    RoleSlotsFull { role: Role, slots: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Player {0} is not in the expected lineup position")]
    NotInLineup(PlayerId),

    #[error("Role mismatch: bench {bench} cannot replace starter {starter}")]
    RoleMismatch { bench: Role, starter: Role },

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid player: {0}")]
    InvalidPlayer(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl SquadError {
    /// Collaborator failures (catalog/store) as opposed to rule violations.
    pub fn is_external(&self) -> bool {
        matches!(self, SquadError::Unavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, SquadError>;
