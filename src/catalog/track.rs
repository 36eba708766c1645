use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One parsed row of the tracks dataset.
///
/// Every numeric field is always a finite number: unparsable cells are
/// replaced with the column default from [`super::parse::NUMERIC_COLUMNS`].
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Track {
    pub artist_name: String,
    pub track_name: String,
    pub track_id: String,
    pub popularity: f64,
    pub year: i32,
    pub genre: String,
    pub danceability: f64,
    pub energy: f64,
    pub key: i32,
    pub loudness: f64,
    pub mode: i32,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: i64,
    pub time_signature: i32,
}

impl Track {
    /// Case-insensitive exact genre comparison.
    pub fn genre_is(&self, genre: &str) -> bool {
        self.genre.to_lowercase() == genre.to_lowercase()
    }

    /// Case-insensitive substring genre comparison.
    pub fn genre_contains(&self, fragment: &str) -> bool {
        self.genre.to_lowercase().contains(&fragment.to_lowercase())
    }
}

/// Id-based lookup over a loaded track list.
#[derive(Debug)]
pub struct TrackIndex<'a> {
    by_id: HashMap<&'a str, &'a Track>,
}

impl<'a> TrackIndex<'a> {
    pub fn new(tracks: &'a [Track]) -> TrackIndex<'a> {
        let mut by_id = HashMap::with_capacity(tracks.len());
        for track in tracks {
            // First occurrence wins when a dataset repeats an id.
            by_id.entry(track.track_id.as_str()).or_insert(track);
        }
        TrackIndex { by_id }
    }

    pub fn get(&self, track_id: &str) -> Option<&'a Track> {
        self.by_id.get(track_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn make_track(artist: &str, name: &str, year: i32, popularity: f64) -> Track {
    Track {
        artist_name: artist.to_owned(),
        track_name: name.to_owned(),
        track_id: format!("{}-{}-{}", artist, name, year),
        popularity,
        year,
        genre: "rock".to_owned(),
        danceability: 0.5,
        energy: 0.5,
        key: 0,
        loudness: -6.0,
        mode: 1,
        speechiness: 0.05,
        acousticness: 0.1,
        instrumentalness: 0.0,
        liveness: 0.1,
        valence: 0.5,
        tempo: 120.0,
        duration_ms: 180000,
        time_signature: 4,
    }
}
