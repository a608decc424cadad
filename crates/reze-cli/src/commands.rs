//! CLI command implementations

use crate::output::{to_json, to_table, OutputFormat};
use anyhow::Context;
use reze_core::quality::best_effort_level_index;
use reze_core::{
    fetch_ladder, quality_to_resolution, quality_to_string, resolution_to_quality, DisplayConfig,
    LadderManifest, LoadableSource, SourceQuality, SourceType,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tabled::Tabled;
use tracing::{debug, info};
use url::Url;

#[derive(Serialize, Tabled)]
struct LevelRow {
    #[tabled(rename = "#")]
    index: usize,
    resolution: String,
    bitrate: String,
    quality: String,
}

#[derive(Serialize)]
struct ProbeReport<'a> {
    url: &'a str,
    levels: Vec<LevelRow>,
    ladder: &'a LadderManifest,
    /// Level a manual pin to the requested quality selects
    pinned_level: Option<usize>,
}

/// Parse `name:value` header arguments
fn parse_headers(raw: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|header| -> anyhow::Result<(String, String)> {
            let (name, value) = header
                .split_once(':')
                .with_context(|| format!("header '{}' is not name:value", header))?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn format_bitrate(bps: u64) -> String {
    if bps >= 1_000_000 {
        format!("{:.1} Mbps", bps as f64 / 1_000_000.0)
    } else {
        format!("{} kbps", bps / 1_000)
    }
}

/// Fetch a master playlist and show the quality ladder it exposes
pub async fn probe(
    url: &str,
    headers: &[String],
    quality: Option<SourceQuality>,
    format: &str,
) -> anyhow::Result<()> {
    let mut source = LoadableSource::hls(Url::parse(url)?);
    let headers = parse_headers(headers)?;
    if !headers.is_empty() {
        source = source.with_headers(headers);
    }

    let policy = DisplayConfig::default().engine.fragment_load_policy;
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(policy.max_time_to_first_byte_ms))
        .timeout(Duration::from_millis(policy.max_load_time_ms))
        .build()?;

    info!(url = %source.url, "Probing ladder");
    let ladder = fetch_ladder(&client, &source).await?;

    let levels: Vec<LevelRow> = ladder
        .levels
        .iter()
        .zip(ladder.qualities())
        .enumerate()
        .map(|(index, (level, q))| LevelRow {
            index,
            resolution: format!("{}x{}", level.width, level.height),
            bitrate: format_bitrate(level.bitrate),
            quality: quality_to_string(Some(q), Some(SourceType::Hls)),
        })
        .collect();
    let pinned_level = quality.and_then(|q| best_effort_level_index(&ladder.levels, q));
    debug!(levels = levels.len(), pinned = ?pinned_level, "Ladder mapped");

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            let report = ProbeReport {
                url,
                levels,
                ladder: &ladder,
                pinned_level,
            };
            println!("{}", to_json(&report)?);
        }
        OutputFormat::Table => {
            println!("{}", to_table(levels));
            print_pin(quality, pinned_level);
        }
        OutputFormat::Text => {
            println!("Ladder for {}", url);
            if ladder.single_variant {
                println!("  Media playlist: no quality ladder (menu shows Auto only)");
            }
            for row in &levels {
                println!(
                    "  {}. {} - {} ({})",
                    row.index + 1,
                    row.resolution,
                    row.bitrate,
                    row.quality
                );
            }

            if !ladder.audio.is_empty() {
                println!("\nAudio:");
                for track in &ladder.audio {
                    println!(
                        "  {} [{}]{}",
                        track.name,
                        track.language.as_deref().unwrap_or("unknown"),
                        if track.default { " default" } else { "" }
                    );
                }
            }
            if !ladder.subtitles.is_empty() {
                println!("\nSubtitles:");
                for track in &ladder.subtitles {
                    println!(
                        "  {} [{}]",
                        track.name,
                        track.language.as_deref().unwrap_or("unknown")
                    );
                }
            }
            print_pin(quality, pinned_level);
        }
    }

    Ok(())
}

fn print_pin(quality: Option<SourceQuality>, pinned: Option<usize>) {
    let Some(quality) = quality else {
        return;
    };
    match pinned {
        Some(index) => println!("\nPinning {} selects level {}", quality, index + 1),
        None => println!("\nPinning {} selects no level", quality),
    }
}

#[derive(Serialize, Tabled)]
struct QualityRow {
    height: u32,
    quality: String,
    label: String,
    canonical_height: String,
}

/// Map heights to quality labels
pub fn quality(heights: &[u32], format: &str) -> anyhow::Result<()> {
    let rows: Vec<QualityRow> = heights
        .iter()
        .map(|&height| {
            let q = resolution_to_quality(height);
            QualityRow {
                height,
                quality: q.to_string(),
                label: quality_to_string(Some(q), Some(SourceType::Hls)),
                canonical_height: quality_to_resolution(q)
                    .map_or_else(|| "-".to_string(), |h| h.to_string()),
            }
        })
        .collect();

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&rows)?),
        OutputFormat::Table => println!("{}", to_table(rows)),
        OutputFormat::Text => {
            for row in &rows {
                println!("  {} -> {}", row.height, row.label);
            }
        }
    }

    Ok(())
}

/// Validate a display configuration and print the effective values
pub fn config(file: Option<PathBuf>, format: &str) -> anyhow::Result<()> {
    let config = match &file {
        Some(path) => DisplayConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => DisplayConfig::default(),
    };
    config.validate()?;

    match OutputFormat::from(format) {
        OutputFormat::Json | OutputFormat::Table => println!("{}", to_json(&config)?),
        OutputFormat::Text => {
            let engine = &config.engine;
            let policy = &engine.fragment_load_policy;
            println!("Configuration OK");
            println!("  Max buffer size: {} bytes", engine.max_buffer_size);
            println!("  Native text tracks: {}", engine.render_text_tracks_natively);
            println!("  Fragment load timeout: {} ms", policy.max_load_time_ms);
            println!("  Time to first byte: {} ms", policy.max_time_to_first_byte_ms);
            println!(
                "  Error retries: {} ({}..{} ms)",
                policy.error_retry.max_num_retry,
                policy.error_retry.retry_delay_ms,
                policy.error_retry.max_retry_delay_ms
            );
            println!("  Timeout retries: {}", policy.timeout_retry.max_num_retry);
            println!("  Subtitle wait: {} ms", config.subtitle_wait_timeout_ms);
            println!(
                "  Preferred audio: {}",
                config.preferred_audio_language.as_deref().unwrap_or("none")
            );
        }
    }

    Ok(())
}
