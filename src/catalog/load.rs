//! Dataset and genre tree loading.

use super::genre_tree::TreeFromJsonError;
use super::parse::{RawRow, RecordParser, RowError};
use super::{GenreNode, Track, TreeValidationError};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors of a whole-file load. Cloneable so one failed in-flight load can
/// be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("Could not read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed CSV header: {0}")]
    CsvHeader(String),

    #[error("Malformed JSON: {0}")]
    Json(String),

    #[error(transparent)]
    InvalidTree(#[from] TreeValidationError),

    #[error("Load task did not complete: {0}")]
    Aborted(String),
}

impl From<TreeFromJsonError> for LoadError {
    fn from(err: TreeFromJsonError) -> Self {
        match err {
            TreeFromJsonError::Json(err) => LoadError::Json(err.to_string()),
            TreeFromJsonError::Invalid(err) => LoadError::InvalidTree(err),
        }
    }
}

fn read_rows<R: Read>(reader: R) -> Result<Vec<Result<RawRow, RowError>>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|err| LoadError::CsvHeader(err.to_string()))?
        .clone();

    let rows = csv_reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            let record = record.map_err(|err| RowError::Unreadable {
                index,
                message: err.to_string(),
            })?;
            if record.len() != headers.len() {
                return Err(RowError::FieldCount {
                    index,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            Ok(headers
                .iter()
                .zip(record.iter())
                .map(|(column, value)| (column.to_owned(), value.to_owned()))
                .collect())
        })
        .collect();
    Ok(rows)
}

/// Parses CSV text with a header row into tracks.
pub fn parse_tracks_csv<R: Read>(reader: R, parser: &RecordParser) -> Result<Vec<Track>, LoadError> {
    let rows = read_rows(reader)?;
    let total = rows.len();
    let parsed = parser.parse_rows(rows);
    info!(
        "Parsed {} tracks from {} rows ({} dropped)",
        parsed.tracks.len(),
        total,
        parsed.dropped
    );
    Ok(parsed.tracks)
}

pub async fn load_tracks_csv<P: AsRef<Path>>(
    path: P,
    parser: &RecordParser,
) -> Result<Vec<Track>, LoadError> {
    let path = path.as_ref();
    info!("Loading tracks from {}...", path.display());
    let bytes = tokio::fs::read(path).await.map_err(|err| LoadError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    parse_tracks_csv(bytes.as_slice(), parser)
}

pub async fn load_genre_tree<P: AsRef<Path>>(path: P) -> Result<GenreNode, LoadError> {
    let path = path.as_ref();
    info!("Loading genre tree from {}...", path.display());
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| LoadError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
    Ok(GenreNode::from_json_str(&text)?)
}
