use super::error::StoreError;
use super::format::{decompress_and_deserialize, serialize_and_compress, RosterSave};
use super::migration::migrate_save;
use super::RosterStore;

use std::collections::HashMap;
use std::fs::{remove_file, rename, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Roster store writing one checksummed file per user under `dir`.
#[derive(Debug, Clone)]
pub struct FileRosterStore {
    dir: PathBuf,
}

impl FileRosterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn validate_user(user_id: &str) -> Result<(), StoreError> {
        let ok = !user_id.is_empty()
            && user_id.len() <= 64
            && user_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !ok {
            return Err(StoreError::InvalidUser { user_id: user_id.to_string() });
        }
        Ok(())
    }

    fn roster_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("roster_{}.dat", user_id))
    }

    fn save_to_path(path: &Path, save: &RosterSave) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serialize_and_compress(save)?;

        // Atomic save: write to temp file, then rename
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, path)?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<RosterSave, StoreError> {
        let data = std::fs::read(path)?;
        let save = migrate_save(decompress_and_deserialize(&data)?)?;
        log::debug!("Loaded {} bytes from {:?}", data.len(), path);
        Ok(save)
    }
}

impl RosterStore for FileRosterStore {
    fn load(&self, user_id: &str) -> Result<RosterSave, StoreError> {
        Self::validate_user(user_id)?;
        let path = self.roster_path(user_id);
        if !path.exists() {
            return Err(StoreError::NotFound { user_id: user_id.to_string() });
        }
        let save = Self::load_from_path(&path)?;
        if save.user_id != user_id {
            return Err(StoreError::Corrupted(format!(
                "file for {} holds roster of {}",
                user_id, save.user_id
            )));
        }
        Ok(save)
    }

    fn save(&mut self, save: &RosterSave) -> Result<(), StoreError> {
        Self::validate_user(&save.user_id)?;
        let mut stamped = save.clone();
        stamped.update_timestamp();
        Self::save_to_path(&self.roster_path(&save.user_id), &stamped)?;
        log::info!("Roster saved for {} ({} players)", save.user_id, save.players.len());
        Ok(())
    }

    fn delete(&mut self, user_id: &str) -> Result<(), StoreError> {
        Self::validate_user(user_id)?;
        let path = self.roster_path(user_id);
        if path.exists() {
            remove_file(&path)?;
            log::info!("Deleted roster for {}", user_id);
        }
        Ok(())
    }

    fn exists(&self, user_id: &str) -> bool {
        Self::validate_user(user_id).is_ok() && self.roster_path(user_id).exists()
    }
}

/// In-process store keeping the encoded bytes, so the same checksum and
/// migration path as the file store is exercised.
#[derive(Debug, Clone, Default)]
pub struct MemoryRosterStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw encoded entry, for corruption tests.
    pub fn raw_mut(&mut self, user_id: &str) -> Option<&mut Vec<u8>> {
        self.entries.get_mut(user_id)
    }
}

impl RosterStore for MemoryRosterStore {
    fn load(&self, user_id: &str) -> Result<RosterSave, StoreError> {
        let bytes = self
            .entries
            .get(user_id)
            .ok_or_else(|| StoreError::NotFound { user_id: user_id.to_string() })?;
        migrate_save(decompress_and_deserialize(bytes)?)
    }

    fn save(&mut self, save: &RosterSave) -> Result<(), StoreError> {
        let bytes = serialize_and_compress(save)?;
        self.entries.insert(save.user_id.clone(), bytes);
        Ok(())
    }

    fn delete(&mut self, user_id: &str) -> Result<(), StoreError> {
        self.entries.remove(user_id);
        Ok(())
    }

    fn exists(&self, user_id: &str) -> bool {
        self.entries.contains_key(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Formation, Player, Role, RoleLimits};
    use crate::roster::Roster;
    use tempfile::TempDir;

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster.add(Player::new(1, "Sommer", "Inter", Role::GK, 14.0).unwrap()).unwrap();
        roster.add(Player::new(2, "Pulisic", "Milan", Role::MID, 22.0).unwrap()).unwrap();
        roster
    }

    #[test]
    fn file_store_saves_and_loads() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileRosterStore::new(temp_dir.path());

        let mut save = RosterSave::from_roster("alice", &roster());
        save.formation = Some(Formation::F442);
        store.save(&save).unwrap();

        assert!(store.exists("alice"));
        let loaded = store.load("alice").unwrap();
        assert_eq!(loaded.players, save.players);
        assert_eq!(loaded.formation, Some(Formation::F442));

        let back = store.load_roster("alice", RoleLimits::default()).unwrap();
        assert_eq!(back, roster());
    }

    #[test]
    fn atomic_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileRosterStore::new(temp_dir.path());
        store.save_roster("bob", &roster()).unwrap();

        let path = temp_dir.path().join("roster_bob.dat");
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn missing_and_invalid_users() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileRosterStore::new(temp_dir.path());
        assert!(matches!(store.load("carol"), Err(StoreError::NotFound { .. })));
        assert!(matches!(store.load("../etc"), Err(StoreError::InvalidUser { .. })));
        assert!(store.delete("carol").is_ok());
        assert!(!store.exists("../etc"));
    }

    #[test]
    fn delete_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileRosterStore::new(temp_dir.path());
        store.save_roster("dave", &roster()).unwrap();
        store.delete("dave").unwrap();
        assert!(!store.exists("dave"));
    }

    #[test]
    fn memory_store_detects_corruption() {
        let mut store = MemoryRosterStore::new();
        store.save_roster("erin", &roster()).unwrap();
        if let Some(bytes) = store.raw_mut("erin") {
            let last = bytes.len() - 1;
            bytes[last] ^= 0x01;
        }
        assert!(matches!(store.load("erin"), Err(StoreError::ChecksumMismatch)));
    }

    #[test]
    fn stored_roster_over_quota_is_rejected() {
        let mut store = MemoryRosterStore::new();
        let mut save = RosterSave::new("frank");
        for id in 0..4 {
            save.players.push(Player::new(id, format!("GK {id}"), "T", Role::GK, 1.0).unwrap());
        }
        store.save(&save).unwrap();
        assert!(matches!(
            store.load_roster("frank", RoleLimits::default()),
            Err(StoreError::Corrupted(_))
        ));
    }
}
