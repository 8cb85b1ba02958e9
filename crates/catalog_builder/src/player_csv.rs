//! Player catalog CSV → binary cache pipeline
//!
//! CSV → Vec<Player> → FxHashMap<u32, Player> → MessagePack → LZ4
//!
//! Expected header:
//! `id,name,team,role,price[,goals,assists,clean_sheets,goals_conceded]`
//!
//! Role accepts GK/DEF/MID/FWD and the P/D/C/A league codes. Stat columns are
//! optional; goalkeepers read `clean_sheets`/`goals_conceded`, everyone else
//! `goals`/`assists`.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use squad_core::{InMemoryCatalog, Player, Role, RoleStats};
use std::fs;
use std::path::Path;

use crate::{human_bytes, CacheMetadata, ParseStats};

/// Runtime index for player lookup by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogIndex {
    pub players: FxHashMap<u32, Player>,
    pub count: u32,
    pub schema_version: String,
}

impl CatalogIndex {
    pub fn new(schema_version: String) -> Self {
        Self { players: FxHashMap::default(), count: 0, schema_version }
    }

    /// Insert unless the id is already present; the first record wins.
    pub fn insert(&mut self, player: Player) -> bool {
        if self.players.contains_key(&player.id.0) {
            return false;
        }
        self.players.insert(player.id.0, player);
        self.count = self.players.len() as u32;
        true
    }

    pub fn get(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn into_catalog(self) -> Result<InMemoryCatalog> {
        Ok(InMemoryCatalog::from_players(self.players.into_values())?)
    }

    /// Every record must be valid and stored under its own id.
    pub fn validate(&self) -> Result<()> {
        for (key, player) in &self.players {
            if *key != player.id.0 {
                anyhow::bail!("Catalog entry {} holds player {}", key, player.id);
            }
            player.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PlayerRow {
    id: u32,
    name: String,
    team: String,
    role: String,
    price: f64,
    #[serde(default)]
    goals: Option<u16>,
    #[serde(default)]
    assists: Option<u16>,
    #[serde(default)]
    clean_sheets: Option<u16>,
    #[serde(default)]
    goals_conceded: Option<u16>,
}

impl PlayerRow {
    fn into_player(self) -> Result<Player> {
        let role: Role = self.role.parse().map_err(anyhow::Error::msg)?;
        let stats = if role.is_goalkeeper() {
            (self.clean_sheets.is_some() || self.goals_conceded.is_some()).then(|| {
                RoleStats::Goalkeeper {
                    clean_sheets: self.clean_sheets.unwrap_or(0),
                    goals_conceded: self.goals_conceded.unwrap_or(0),
                }
            })
        } else {
            (self.goals.is_some() || self.assists.is_some()).then(|| RoleStats::Outfield {
                goals: self.goals.unwrap_or(0),
                assists: self.assists.unwrap_or(0),
            })
        };

        let player = Player::new(self.id, self.name.trim(), self.team.trim(), role, self.price)?;
        Ok(match stats {
            Some(stats) => player.with_stats(stats)?,
            None => player,
        })
    }
}

/// Parse a player CSV into a [`CatalogIndex`].
///
/// Bad rows and repeated ids are counted in [`ParseStats::failed`] and skipped,
/// so the first row for an id is kept. An input with no valid rows is an error.
pub fn parse_players_csv(csv_path: &Path, schema_version: &str) -> Result<(CatalogIndex, ParseStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

    let mut index = CatalogIndex::new(schema_version.to_string());
    let mut stats = ParseStats::default();

    for record in reader.deserialize::<PlayerRow>() {
        stats.total_rows += 1;
        let player = match record.map_err(anyhow::Error::from).and_then(PlayerRow::into_player) {
            Ok(player) => player,
            Err(e) => {
                stats.failed += 1;
                log::warn!("Line {} - skipped player row: {}", stats.total_rows, e);
                continue;
            }
        };

        let id = player.id;
        if index.insert(player) {
            stats.parsed += 1;
        } else {
            stats.failed += 1;
            log::warn!("Line {} - duplicate player {}, keeping first", stats.total_rows, id);
        }
    }

    if stats.parsed == 0 {
        anyhow::bail!("No valid players parsed from CSV");
    }

    Ok((index, stats))
}

/// Build a binary catalog cache from a player CSV.
pub fn build_catalog_cache(
    csv_path: &Path,
    output_msgpack_lz4: &Path,
    schema_version: &str,
) -> Result<(CacheMetadata, ParseStats)> {
    let (index, stats) = parse_players_csv(csv_path, schema_version)?;
    log::info!(
        "Parsed {} players (failed: {}, total rows: {})",
        stats.parsed,
        stats.failed,
        stats.total_rows
    );

    let msgpack_bytes = rmp_serde::to_vec_named(&index)
        .context("Failed to serialize CatalogIndex to MessagePack")?;
    let original_size = msgpack_bytes.len() as u64;

    let compressed = lz4_flex::compress_prepend_size(&msgpack_bytes);
    let compressed_size = compressed.len() as u64;

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = format!("{:x}", hasher.finalize());

    if let Some(parent) = output_msgpack_lz4.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(output_msgpack_lz4, &compressed).with_context(|| {
        format!("Failed to write output file: {}", output_msgpack_lz4.display())
    })?;

    let compression_ratio = compressed_size as f64 / original_size as f64;
    log::info!(
        "Catalog cache built: {} -> {} (ratio: {:.2}%)",
        human_bytes(original_size),
        human_bytes(compressed_size),
        compression_ratio * 100.0
    );

    let metadata = CacheMetadata {
        schema_version: schema_version.to_string(),
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        player_count: index.count,
        original_size,
        compressed_size,
        compression_ratio,
    };
    Ok((metadata, stats))
}

/// Binary file → LZ4 decompress → MessagePack → [`CatalogIndex`]
pub fn load_catalog_cache(cache_file: &Path) -> Result<CatalogIndex> {
    let compressed = fs::read(cache_file)
        .with_context(|| format!("Failed to read cache file: {}", cache_file.display()))?;

    let msgpack_bytes =
        lz4_flex::decompress_size_prepended(&compressed).context("Failed to decompress LZ4")?;

    let index: CatalogIndex = rmp_serde::from_slice(&msgpack_bytes)
        .context("Failed to deserialize CatalogIndex from MessagePack")?;
    index
        .validate()
        .with_context(|| format!("Invalid catalog cache: {}", cache_file.display()))?;

    Ok(index)
}
