//! (artist, year) heatmap cells.

use crate::catalog::Track;
use serde::Serialize;
use std::collections::HashMap;

pub const POPULAR_SONGS_PER_CELL: usize = 5;

/// Minimum group max-popularity for each rank, highest first.
const RANK_THRESHOLDS: [(f64, u8); 4] = [(80.0, 4), (60.0, 3), (40.0, 2), (20.0, 1)];

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct PopularSong {
    pub track_name: String,
    pub track_id: String,
    pub popularity: f64,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct HeatmapCell {
    pub artist_name: String,
    pub year: i32,
    pub popular_songs: Vec<PopularSong>,
    pub rank: u8,
    pub avg_popularity: i64,
    pub track_count: usize,
}

/// Optional restrictions applied before grouping. An empty genre string
/// means no genre filter; a missing year bound is unbounded on that side.
#[derive(Clone, Debug, Default)]
pub struct HeatmapFilter {
    pub genre: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

impl HeatmapFilter {
    fn accepts(&self, track: &Track) -> bool {
        if let Some(genre) = self.genre.as_deref().filter(|g| !g.is_empty()) {
            if !track.genre_is(genre) {
                return false;
            }
        }
        if self.year_min.is_some_and(|min| track.year < min) {
            return false;
        }
        if self.year_max.is_some_and(|max| track.year > max) {
            return false;
        }
        true
    }
}

pub fn popularity_rank(max_popularity: f64) -> u8 {
    RANK_THRESHOLDS
        .iter()
        .find(|(threshold, _)| max_popularity >= *threshold)
        .map(|(_, rank)| *rank)
        .unwrap_or(0)
}

pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn build_cell(mut group: Vec<&Track>) -> HeatmapCell {
    let track_count = group.len();
    let total: f64 = group.iter().map(|t| t.popularity).sum();
    let max = group
        .iter()
        .map(|t| t.popularity)
        .fold(f64::NEG_INFINITY, f64::max);

    // sort_by is stable, equal popularity keeps input order
    group.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));

    let first = group[0];
    HeatmapCell {
        artist_name: first.artist_name.clone(),
        year: first.year,
        popular_songs: group
            .iter()
            .take(POPULAR_SONGS_PER_CELL)
            .map(|t| PopularSong {
                track_name: t.track_name.clone(),
                track_id: t.track_id.clone(),
                popularity: t.popularity,
            })
            .collect(),
        rank: popularity_rank(max),
        avg_popularity: round_half_up(total / track_count as f64),
        track_count,
    }
}

/// Groups the filtered tracks by (artist, year). Only non-empty groups
/// produce a cell; callers must not rely on the order of the cells.
pub fn aggregate(tracks: &[Track], filter: &HeatmapFilter) -> Vec<HeatmapCell> {
    let mut slots: HashMap<(&str, i32), usize> = HashMap::new();
    let mut groups: Vec<Vec<&Track>> = Vec::new();

    for track in tracks.iter().filter(|t| filter.accepts(t)) {
        let slot = *slots
            .entry((track.artist_name.as_str(), track.year))
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[slot].push(track);
    }

    groups.into_iter().map(build_cell).collect()
}
