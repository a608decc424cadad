//! Quality mapping between backend resolution levels and semantic labels
//!
//! Every height maps to a label: exact matches come from [`HEIGHT_TABLE`],
//! anything else rounds up to the next cataloged height, and heights above
//! the catalog map to the top tier.

use crate::types::{Level, SourceQuality, SourceType};

/// Cataloged heights, ascending. Some labels have more than one entry.
pub const HEIGHT_TABLE: [(u32, SourceQuality); 12] = [
    (144, SourceQuality::Q144),
    (180, SourceQuality::Q144),
    (240, SourceQuality::Q240),
    (270, SourceQuality::Q240),
    (360, SourceQuality::Q360),
    (406, SourceQuality::Q360),
    (480, SourceQuality::Q480),
    (540, SourceQuality::Q540),
    (720, SourceQuality::Q720),
    (1080, SourceQuality::Q1080),
    (1440, SourceQuality::Q1440),
    (2160, SourceQuality::Q4k),
];

/// Map a backend-reported height to its quality bucket
pub fn resolution_to_quality(height: u32) -> SourceQuality {
    HEIGHT_TABLE
        .iter()
        .find(|(h, _)| height <= *h)
        .map(|(_, q)| *q)
        .unwrap_or(SourceQuality::Q4k)
}

/// Canonical height of a label, `None` for [`SourceQuality::Unknown`]
pub fn quality_to_resolution(quality: SourceQuality) -> Option<u32> {
    HEIGHT_TABLE
        .iter()
        .find(|(_, q)| *q == quality)
        .map(|(h, _)| *h)
}

/// Labels for the backend's levels, in backend order
pub fn rank_levels(levels: &[Level]) -> Vec<SourceQuality> {
    levels
        .iter()
        .map(|level| resolution_to_quality(level.height))
        .filter(|quality| *quality != SourceQuality::Unknown)
        .collect()
}

/// The last chosen quality if the ladder offers it, otherwise `None`
pub fn select_preferred(
    qualities: &[SourceQuality],
    last_chosen: Option<SourceQuality>,
    automatic: bool,
) -> Option<SourceQuality> {
    if automatic {
        return None;
    }
    last_chosen.filter(|chosen| qualities.contains(chosen))
}

/// Index of the level playing `quality`
///
/// Prefers an exact height match, then the first level (in backend order)
/// that maps to the same label.
pub fn resolve_level_index(levels: &[Level], quality: SourceQuality) -> Option<usize> {
    let target = quality_to_resolution(quality)?;
    levels
        .iter()
        .position(|level| level.height == target)
        .or_else(|| {
            levels
                .iter()
                .position(|level| resolution_to_quality(level.height) == quality)
        })
}

/// Like [`resolve_level_index`] but never fails on a non-empty ladder
///
/// Without a match, picks the highest level not above the requested
/// quality, and the lowest level when every level is above it. Ties go to
/// the first occurrence in backend order.
pub fn best_effort_level_index(levels: &[Level], quality: SourceQuality) -> Option<usize> {
    if quality == SourceQuality::Unknown {
        return None;
    }
    if let Some(index) = resolve_level_index(levels, quality) {
        return Some(index);
    }

    let mut below: Option<(usize, u32)> = None;
    let mut lowest: Option<(usize, u32)> = None;
    for (index, level) in levels.iter().enumerate() {
        if resolution_to_quality(level.height) <= quality
            && below.map_or(true, |(_, h)| level.height > h)
        {
            below = Some((index, level.height));
        }
        if lowest.map_or(true, |(_, h)| level.height < h) {
            lowest = Some((index, level.height));
        }
    }
    below.or(lowest).map(|(index, _)| index)
}

/// Human readable label for quality menus
pub fn quality_to_string(quality: Option<SourceQuality>, source_type: Option<SourceType>) -> String {
    match quality {
        None | Some(SourceQuality::Unknown) => match source_type {
            Some(SourceType::Mp4) => "Default".to_string(),
            _ => "Auto".to_string(),
        },
        Some(SourceQuality::Q4k) => "4K".to_string(),
        Some(SourceQuality::Q1440) => "1440p (2K)".to_string(),
        Some(quality) => format!("{}p", quality),
    }
}
