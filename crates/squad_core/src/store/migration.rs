use super::error::StoreError;
use super::format::RosterSave;
use super::ROSTER_SAVE_VERSION;
use std::collections::HashSet;

/// Migrate roster data from older versions to the current version
pub fn migrate_save(mut save: RosterSave) -> Result<RosterSave, StoreError> {
    let original_version = save.version;

    save = match save.version {
        1 => migrate_v1_to_v2(save),
        ROSTER_SAVE_VERSION => save,
        v if v > ROSTER_SAVE_VERSION => {
            return Err(StoreError::VersionMismatch { found: v, expected: ROSTER_SAVE_VERSION });
        }
        _ => {
            return Err(StoreError::VersionMismatch {
                found: save.version,
                expected: ROSTER_SAVE_VERSION,
            });
        }
    };

    save.version = ROSTER_SAVE_VERSION;

    if original_version != ROSTER_SAVE_VERSION {
        save.update_timestamp();
        log::info!("Migrated roster save from version {} to {}", original_version, ROSTER_SAVE_VERSION);
    }

    Ok(save)
}

/// v1 writers appended on every add, so repeated adds left duplicate entries.
/// Keep the first occurrence of each id and trim stray whitespace in names.
fn migrate_v1_to_v2(mut save: RosterSave) -> RosterSave {
    log::info!("Migrating roster save for {} from version 1 to 2", save.user_id);

    let before = save.players.len();
    let mut seen = HashSet::new();
    save.players.retain(|p| seen.insert(p.id));
    if save.players.len() != before {
        log::warn!(
            "Dropped {} duplicate roster entries for {}",
            before - save.players.len(),
            save.user_id
        );
    }

    for player in &mut save.players {
        let trimmed = player.name.trim();
        if trimmed.len() != player.name.len() {
            player.name = trimmed.to_string();
        }
    }

    save
}
