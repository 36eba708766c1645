//! Artist orderings derived from heatmap cells.
//!
//! Two different scores are in play and must not be mixed up:
//! the Y axis is ordered by the *mean* of an artist's cell averages, while
//! the top-N view keeps the artists with the largest *sum* of them, so an
//! artist with many active years beats one with a few stronger years.

use super::HeatmapCell;
use std::collections::{HashMap, HashSet};

/// Per-artist (sum, count) of cell averages, in first-appearance order.
fn artist_totals(cells: &[HeatmapCell]) -> Vec<(&str, i64, usize)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, i64, usize)> = Vec::new();
    for cell in cells {
        let slot = *slots.entry(cell.artist_name.as_str()).or_insert_with(|| {
            totals.push((cell.artist_name.as_str(), 0, 0));
            totals.len() - 1
        });
        totals[slot].1 += cell.avg_popularity;
        totals[slot].2 += 1;
    }
    totals
}

/// Unique artists ordered by the mean of their cells' `avg_popularity`,
/// highest first. Not weighted by track count.
pub fn unique_artists_by_avg_popularity(cells: &[HeatmapCell]) -> Vec<String> {
    let mut means: Vec<(&str, f64)> = artist_totals(cells)
        .into_iter()
        .map(|(artist, sum, count)| (artist, sum as f64 / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means
        .into_iter()
        .map(|(artist, _)| artist.to_owned())
        .collect()
}

/// Keeps every cell of the `top_n` artists with the largest cumulative
/// `avg_popularity` across all their years.
pub fn top_n_artists_by_cumulative_popularity(
    cells: &[HeatmapCell],
    top_n: usize,
) -> Vec<HeatmapCell> {
    let mut sums = artist_totals(cells);
    sums.sort_by(|a, b| b.1.cmp(&a.1));
    let keep: HashSet<&str> = sums
        .into_iter()
        .take(top_n)
        .map(|(artist, _, _)| artist)
        .collect();

    cells
        .iter()
        .filter(|c| keep.contains(c.artist_name.as_str()))
        .cloned()
        .collect()
}
