pub mod formation;
pub mod player;
pub mod role;
pub mod score;

pub use formation::{Formation, OUTFIELD_SLOTS};
pub use player::{Player, PlayerId, RoleStats};
pub use role::{Role, RoleLimits};
pub use score::{FixtureScore, ScoreSheet, DEFAULT_CONFIDENCE};
