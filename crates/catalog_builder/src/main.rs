//! Catalog Builder CLI
//!
//! Player CSV → binary catalog cache, cache verification and
//! prediction CSV checks.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "catalog_builder")]
#[command(about = "Build player catalog caches from CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Build catalog cache from a player CSV file
    Players {
        /// Input CSV (id,name,team,role,price[,goals,assists,clean_sheets,goals_conceded])
        #[arg(long)]
        csv: PathBuf,

        /// Output MsgPack+LZ4 file path
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value = "v1")]
        schema_version: String,

        /// Verify cache after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Verify a cache file against its checksum
    Verify {
        #[arg(long)]
        cache: PathBuf,

        #[arg(long)]
        checksum: String,
    },

    /// Parse a prediction CSV and report per-matchday counts
    Scores {
        /// Input CSV (player_id,matchday,predicted_score,confidence)
        #[arg(long)]
        csv: PathBuf,

        /// Confidence for rows that leave it blank
        #[arg(long, default_value_t = squad_core::DEFAULT_CONFIDENCE)]
        default_confidence: f64,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Players { csv, out, schema_version, verify, metadata } => {
            println!("Building catalog cache from CSV...");
            println!("   CSV Input: {}", csv.display());
            println!("   Output:    {}", out.display());
            println!("   Schema:    {}", schema_version);

            let (meta, stats) = catalog_builder::build_catalog_cache(&csv, &out, &schema_version)?;
            println!(
                "   Parsed {} players (failed: {}, total rows: {})",
                stats.parsed, stats.failed, stats.total_rows
            );

            print_metadata(&meta);

            if verify {
                verify_cache_integrity(&out, &meta.checksum)?;
            }

            if let Some(metadata_path) = metadata {
                save_metadata(&metadata_path, &meta)?;
            }
        }

        Commands::Verify { cache, checksum } => {
            verify_cache_integrity(&cache, &checksum)?;
        }

        Commands::Scores { csv, default_confidence } => {
            let (scores, stats) = catalog_builder::parse_scores_csv(&csv, default_confidence)?;
            println!(
                "Parsed {} predictions (failed: {}, total rows: {})",
                stats.parsed, stats.failed, stats.total_rows
            );
            for matchday in scores.matchdays() {
                let sheet = squad_core::ScoreProvider::scores_for(&scores, matchday)?;
                println!("   Matchday {:>3}: {} players", matchday, sheet.len());
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &catalog_builder::CacheMetadata) {
    println!("\nCache built successfully");
    println!("   Players:         {}", meta.player_count);
    println!(
        "   Original size:   {} bytes ({:.2} KB)",
        meta.original_size,
        meta.original_size as f64 / 1024.0
    );
    println!(
        "   Compressed size: {} bytes ({:.2} KB)",
        meta.compressed_size,
        meta.compressed_size as f64 / 1024.0
    );
    println!("   Compression:     {:.1}%", meta.compression_ratio * 100.0);
    println!("   Checksum:        {}", meta.checksum);
    println!("   Created:         {}", meta.created_at);
}

#[cfg(feature = "cli")]
fn verify_cache_integrity(cache_path: &std::path::Path, checksum: &str) -> Result<()> {
    println!("\nVerifying cache integrity...");
    if catalog_builder::verify_cache(cache_path, checksum)? {
        println!("Cache verification passed");
        Ok(())
    } else {
        anyhow::bail!("Cache verification failed - checksum mismatch")
    }
}

#[cfg(feature = "cli")]
fn save_metadata(path: &std::path::Path, meta: &catalog_builder::CacheMetadata) -> Result<()> {
    let metadata_json = serde_json::to_string_pretty(meta)?;
    std::fs::write(path, metadata_json)?;
    println!("\nMetadata saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("catalog_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
