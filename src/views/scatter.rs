//! Danceability / energy scatter plot for one year.

use crate::cache::DatasetCache;
use crate::catalog::Track;
use serde::Serialize;
use tracing::warn;

const MIN_POINT_SIZE: f64 = 2.0;

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct ScatterPoint {
    /// Danceability.
    pub x: f64,
    /// Energy.
    pub y: f64,
    pub size: f64,
    pub popularity: f64,
    pub track_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub genre: String,
    pub tempo: f64,
    pub valence: f64,
}

fn in_range(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}

fn is_plottable(track: &Track) -> bool {
    in_range(track.danceability, 0.0, 1.0)
        && in_range(track.energy, 0.0, 1.0)
        && in_range(track.popularity, 0.0, 100.0)
}

/// Point radius grows linearly with popularity, 2 to 12.
pub fn point_size(popularity: f64) -> f64 {
    MIN_POINT_SIZE + popularity / 10.0
}

impl From<&Track> for ScatterPoint {
    fn from(track: &Track) -> Self {
        ScatterPoint {
            x: track.danceability,
            y: track.energy,
            size: point_size(track.popularity),
            popularity: track.popularity,
            track_id: track.track_id.clone(),
            track_name: track.track_name.clone(),
            artist_name: track.artist_name.clone(),
            genre: track.genre.clone(),
            tempo: track.tempo,
            valence: track.valence,
        }
    }
}

/// Year match, optional case-insensitive genre substring match, the `top_n`
/// most popular, then out-of-domain records removed.
///
/// Cleaning runs after truncation, so fewer than `top_n` points may come
/// back; the gap is never refilled from lower-ranked tracks.
pub fn process(tracks: &[Track], year: i32, top_n: usize, genre: &str) -> Vec<ScatterPoint> {
    let mut selected: Vec<&Track> = tracks
        .iter()
        .filter(|t| t.year == year)
        .filter(|t| genre.is_empty() || t.genre_contains(genre))
        .collect();

    selected.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    selected.truncate(top_n);

    selected
        .into_iter()
        .filter(|t| is_plottable(t))
        .map(ScatterPoint::from)
        .collect()
}

/// Like [`process`] but reads the shared dataset. A failed load yields an
/// empty plot.
pub async fn process_cached(
    cache: &DatasetCache,
    year: i32,
    top_n: usize,
    genre: &str,
) -> Vec<ScatterPoint> {
    match cache.load().await {
        Ok(tracks) => process(&tracks, year, top_n, genre),
        Err(err) => {
            warn!("Scatter data unavailable for {}: {}", year, err);
            vec![]
        }
    }
}
