//! Catalog Builder Library
//!
//! Player CSV → MessagePack → LZ4 → SHA256-checksummed catalog cache,
//! plus prediction CSV loading into per-matchday score sheets.

pub mod player_csv;
pub mod score_csv;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub use player_csv::{build_catalog_cache, load_catalog_cache, parse_players_csv, CatalogIndex};
pub use score_csv::parse_scores_csv;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub schema_version: String,
    /// SHA256 of the compressed file (hex)
    pub checksum: String,
    /// RFC3339
    pub created_at: String,
    pub player_count: u32,
    /// MessagePack size before compression (bytes)
    pub original_size: u64,
    pub compressed_size: u64,
    /// compressed / original
    pub compression_ratio: f64,
}

/// CSV parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub total_rows: u32,
    pub parsed: u32,
    pub failed: u32,
}

/// Check a cache file against an expected SHA256 checksum.
pub fn verify_cache(cache_file: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(cache_file)
        .with_context(|| format!("Failed to read cache file: {}", cache_file.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let actual = format!("{:x}", hasher.finalize());

    Ok(actual.eq_ignore_ascii_case(expected_checksum.trim()))
}

pub(crate) fn human_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}
