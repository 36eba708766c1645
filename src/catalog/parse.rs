//! Raw row to [`Track`] conversion.
//!
//! Numeric cells that fail to parse are replaced with a per-column default
//! taken from [`NUMERIC_COLUMNS`]. A row is only dropped when its shape is
//! broken (wrong field count, unreadable, empty); dropping never aborts the
//! rest of the load.

use super::Track;
use clap::ValueEnum;
#[cfg(not(feature = "no_par"))]
use rayon::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Column name to raw cell value.
pub type RawRow = HashMap<String, String>;

pub const UNKNOWN_GENRE: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericKind {
    Float,
    /// Decimal literals are accepted and truncated toward zero.
    Integer,
}

#[derive(Clone, Copy, Debug)]
pub struct NumericColumn {
    pub name: &'static str,
    pub kind: NumericKind,
    pub default: f64,
}

const fn float(name: &'static str, default: f64) -> NumericColumn {
    NumericColumn {
        name,
        kind: NumericKind::Float,
        default,
    }
}

const fn integer(name: &'static str, default: f64) -> NumericColumn {
    NumericColumn {
        name,
        kind: NumericKind::Integer,
        default,
    }
}

/// Every numeric column of the dataset with its fallback value.
pub const NUMERIC_COLUMNS: &[NumericColumn] = &[
    float("popularity", 0.0),
    integer("year", 2000.0),
    float("danceability", 0.0),
    float("energy", 0.0),
    integer("key", 0.0),
    float("loudness", 0.0),
    integer("mode", 0.0),
    float("speechiness", 0.0),
    float("acousticness", 0.0),
    float("instrumentalness", 0.0),
    float("liveness", 0.0),
    float("valence", 0.0),
    float("tempo", 120.0),
    integer("duration_ms", 180000.0),
    integer("time_signature", 4.0),
];

pub fn numeric_column(name: &str) -> Option<&'static NumericColumn> {
    NUMERIC_COLUMNS.iter().find(|c| c.name == name)
}

/// Which genre column wins when a dataset carries both `genre` and
/// `track_genre`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum GenreColumn {
    /// `genre`, then `track_genre`.
    #[default]
    Genre,
    /// `track_genre`, then `genre`.
    #[value(alias = "track_genre")]
    TrackGenre,
}

impl GenreColumn {
    fn lookup_order(&self) -> [&'static str; 2] {
        match self {
            GenreColumn::Genre => ["genre", "track_genre"],
            GenreColumn::TrackGenre => ["track_genre", "genre"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row {index} has {found} fields, header has {expected}")]
    FieldCount {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {index} could not be read: {message}")]
    Unreadable { index: usize, message: String },

    #[error("row {index} has no fields")]
    Empty { index: usize },
}

#[derive(Debug, Default)]
pub struct ParsedTracks {
    pub tracks: Vec<Track>,
    pub dropped: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RecordParser {
    genre_column: GenreColumn,
}

fn non_empty<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn parse_numeric(raw: Option<&str>, column: &NumericColumn) -> f64 {
    let parsed = raw
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite());
    match (parsed, column.kind) {
        (Some(value), NumericKind::Float) => value,
        (Some(value), NumericKind::Integer) => value.trunc(),
        (None, _) => column.default,
    }
}

impl RecordParser {
    pub fn new(genre_column: GenreColumn) -> RecordParser {
        RecordParser { genre_column }
    }

    fn numeric(&self, row: &RawRow, name: &str) -> f64 {
        match numeric_column(name) {
            Some(column) => parse_numeric(row.get(name).map(String::as_str), column),
            None => 0.0,
        }
    }

    fn genre(&self, row: &RawRow) -> String {
        self.genre_column
            .lookup_order()
            .iter()
            .find_map(|column| non_empty(row, column))
            .unwrap_or(UNKNOWN_GENRE)
            .to_owned()
    }

    /// Converts one raw row. `index` is the row's position in the input and
    /// seeds the synthesized `track_<index>` id when the row has none.
    pub fn parse_row(&self, row: &RawRow, index: usize) -> Result<Track, RowError> {
        if row.is_empty() {
            return Err(RowError::Empty { index });
        }

        let text = |column: &str| row.get(column).cloned().unwrap_or_default();
        let track_id = non_empty(row, "track_id")
            .map(str::to_owned)
            .unwrap_or_else(|| format!("track_{}", index));

        Ok(Track {
            artist_name: text("artist_name"),
            track_name: text("track_name"),
            track_id,
            popularity: self.numeric(row, "popularity"),
            year: self.numeric(row, "year") as i32,
            genre: self.genre(row),
            danceability: self.numeric(row, "danceability"),
            energy: self.numeric(row, "energy"),
            key: self.numeric(row, "key") as i32,
            loudness: self.numeric(row, "loudness"),
            mode: self.numeric(row, "mode") as i32,
            speechiness: self.numeric(row, "speechiness"),
            acousticness: self.numeric(row, "acousticness"),
            instrumentalness: self.numeric(row, "instrumentalness"),
            liveness: self.numeric(row, "liveness"),
            valence: self.numeric(row, "valence"),
            tempo: self.numeric(row, "tempo"),
            duration_ms: self.numeric(row, "duration_ms") as i64,
            time_signature: self.numeric(row, "time_signature") as i32,
        })
    }

    /// Parses every row, keeping input order and dropping broken rows.
    pub fn parse_rows(&self, rows: Vec<Result<RawRow, RowError>>) -> ParsedTracks {
        #[cfg(not(feature = "no_par"))]
        let results: Vec<Result<Track, RowError>> = rows
            .into_par_iter()
            .enumerate()
            .map(|(index, row)| row.and_then(|row| self.parse_row(&row, index)))
            .collect();

        #[cfg(feature = "no_par")]
        let results: Vec<Result<Track, RowError>> = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| row.and_then(|row| self.parse_row(&row, index)))
            .collect();

        let mut parsed = ParsedTracks::default();
        for result in results {
            match result {
                Ok(track) => parsed.tracks.push(track),
                Err(err) => {
                    debug!("Dropping row: {}", err);
                    parsed.dropped += 1;
                }
            }
        }
        parsed
    }
}
