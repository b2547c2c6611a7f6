//! Star rating derived from per-class best base fame.

use crate::models::{ClassStat, StarInfo};

/// Fame thresholds granting one star each, per class.
pub const STAR_FAME: [i64; 5] = [20, 500, 1500, 5000, 15000];

/// Number of playable classes; one full color band is this many stars.
pub const NUM_CLASSES: u32 = 18;

/// Color ladder, one entry per full band of [`NUM_CLASSES`] stars.
pub const STAR_COLORS: [&str; 6] = [
    "#8a98de", "#314ddb", "#c1272d", "#f7931e", "#ffff00", "#ffffff",
];

/// Fallback when the star total falls outside the ladder.
pub const DEFAULT_COLOR: &str = "#8a98de";

/// Stars earned by one class: the number of thresholds its best base fame
/// has reached.
fn class_stars(best_base_fame: i64) -> u32 {
    STAR_FAME.iter().filter(|&&t| best_base_fame >= t).count() as u32
}

/// Total star rating across all class stats, with the display color for the
/// band the total lands in.
pub fn star_info(class_stats: &[ClassStat]) -> StarInfo {
    let stars: u32 = class_stats
        .iter()
        .map(|cs| class_stars(cs.best_base_fame))
        .sum();

    let color = STAR_COLORS
        .get((stars / NUM_CLASSES) as usize)
        .copied()
        .unwrap_or(DEFAULT_COLOR)
        .to_string();

    StarInfo { stars, color }
}
