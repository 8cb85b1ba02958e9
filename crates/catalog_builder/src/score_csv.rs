//! Prediction CSV → per-matchday score sheets
//!
//! Expected header: `player_id,matchday,predicted_score,confidence`.
//! A blank confidence takes the caller's default. A repeated
//! (player_id, matchday) row is skipped; the first prediction is kept.

use anyhow::{Context, Result};
use serde::Deserialize;
use squad_core::{InMemoryScores, PlayerId, ScoreSheet};
use std::collections::BTreeMap;
use std::path::Path;

use crate::ParseStats;

#[derive(Debug, Deserialize)]
struct ScoreRow {
    player_id: u32,
    matchday: u32,
    predicted_score: f64,
    #[serde(default)]
    confidence: Option<f64>,
}

pub fn parse_scores_csv(csv_path: &Path, default_confidence: f64) -> Result<(InMemoryScores, ParseStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

    let mut sheets: BTreeMap<u32, ScoreSheet> = BTreeMap::new();
    let mut stats = ParseStats::default();

    for record in reader.deserialize::<ScoreRow>() {
        stats.total_rows += 1;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                stats.failed += 1;
                log::warn!("Line {} - skipped score row: {}", stats.total_rows, e);
                continue;
            }
        };

        let sheet = sheets.entry(row.matchday).or_insert_with(|| ScoreSheet::new(row.matchday));
        if sheet.get(PlayerId(row.player_id)).is_some() {
            stats.failed += 1;
            log::warn!(
                "Line {} - duplicate prediction for player {} on matchday {}, keeping first",
                stats.total_rows,
                row.player_id,
                row.matchday
            );
            continue;
        }
        let confidence = row.confidence.unwrap_or(default_confidence);
        match sheet.insert(PlayerId(row.player_id), row.predicted_score, confidence) {
            Ok(()) => stats.parsed += 1,
            Err(e) => {
                stats.failed += 1;
                log::warn!("Line {} - skipped score row: {}", stats.total_rows, e);
            }
        }
    }

    if stats.parsed == 0 {
        anyhow::bail!("No valid predictions parsed from CSV");
    }

    let scores: InMemoryScores = sheets.into_values().filter(|s| !s.is_empty()).collect();
    Ok((scores, stats))
}
