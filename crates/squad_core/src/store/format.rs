use super::error::StoreError;
use super::ROSTER_SAVE_VERSION;
use crate::models::{Formation, Player};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use time::OffsetDateTime;

/// Upper bound on stored players; far above any legal roster.
const MAX_STORED_PLAYERS: usize = 1000;

const CHECKSUM_LEN: usize = 32;

/// Persistent form of one user's roster.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RosterSave {
    /// Save format version for migration
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    pub timestamp: u64,

    pub user_id: String,

    pub players: Vec<Player>,

    /// Last formation the user picked
    #[serde(default)]
    pub formation: Option<Formation>,
}

impl RosterSave {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            version: ROSTER_SAVE_VERSION,
            timestamp: current_timestamp(),
            user_id: user_id.into(),
            players: Vec::new(),
            formation: None,
        }
    }

    pub fn from_roster(user_id: impl Into<String>, roster: &Roster) -> Self {
        Self { players: roster.to_players(), ..Self::new(user_id) }
    }

    pub fn update_timestamp(&mut self) {
        self.timestamp = current_timestamp();
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.players.len() > MAX_STORED_PLAYERS {
            return Err(StoreError::DataTooLarge { size: self.players.len() });
        }

        let mut ids = HashSet::new();
        for player in &self.players {
            if !ids.insert(player.id) {
                return Err(StoreError::Corrupted(format!("duplicate player {}", player.id)));
            }
            player.validate().map_err(|e| StoreError::Corrupted(e.to_string()))?;
        }

        Ok(())
    }
}

/// Serialize and compress roster save data
pub fn serialize_and_compress(save: &RosterSave) -> Result<Vec<u8>, StoreError> {
    save.validate()?;

    // 1. Serialize to MessagePack with field names
    let msgpack = to_vec_named(save)?;

    // 2. Compress with LZ4 (size prepended for easy decompression)
    let compressed = compress_prepend_size(&msgpack);

    // 3. Add SHA256 checksum at the end
    let checksum = Sha256::digest(&compressed);

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

/// Verify, decompress and deserialize roster save data.
///
/// Does not migrate; older versions are returned as stored.
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<RosterSave, StoreError> {
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(StoreError::Corrupted(format!("{} bytes is too short", bytes.len())));
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum_bytes {
        return Err(StoreError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| StoreError::Decompression)?;
    let save: RosterSave = from_slice(&msgpack)?;

    if save.version > ROSTER_SAVE_VERSION {
        return Err(StoreError::VersionMismatch {
            found: save.version,
            expected: ROSTER_SAVE_VERSION,
        });
    }

    Ok(save)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
