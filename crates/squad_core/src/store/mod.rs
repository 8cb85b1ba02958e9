// Roster persistence
// MessagePack + LZ4 compression with versioning and integrity checks

pub mod error;
pub mod format;
pub mod manager;
pub mod migration;

pub use error::StoreError;
pub use format::{decompress_and_deserialize, serialize_and_compress, RosterSave};
pub use manager::{FileRosterStore, MemoryRosterStore};
pub use migration::migrate_save;

use crate::models::RoleLimits;
use crate::roster::Roster;

pub const ROSTER_SAVE_VERSION: u32 = 2;

/// Persistence collaborator for per-user rosters.
///
/// Each call either completes or fails; implementations never leave a
/// half-written roster visible to `load`.
pub trait RosterStore {
    fn load(&self, user_id: &str) -> Result<RosterSave, StoreError>;

    fn save(&mut self, save: &RosterSave) -> Result<(), StoreError>;

    fn delete(&mut self, user_id: &str) -> Result<(), StoreError>;

    fn exists(&self, user_id: &str) -> bool;

    /// Load and re-validate against `limits`.
    fn load_roster(&self, user_id: &str, limits: RoleLimits) -> Result<Roster, StoreError> {
        let save = self.load(user_id)?;
        Roster::from_players(limits, save.players).map_err(|e| StoreError::Corrupted(e.to_string()))
    }

    fn save_roster(&mut self, user_id: &str, roster: &Roster) -> Result<(), StoreError> {
        self.save(&RosterSave::from_roster(user_id, roster))
    }
}
