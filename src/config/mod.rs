mod file_config;

pub use file_config::{EnrichmentConfig, FileConfig};

use crate::catalog::GenreColumn;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_SONGS_PER_GENRE: usize = 50;
const PREFERENCES_FILE_NAME: &str = "dashboard_preferences.json";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub tracks_csv: Option<PathBuf>,
    pub genre_tree: Option<PathBuf>,
    pub enriched_tree: Option<PathBuf>,
    pub preferences_path: Option<PathBuf>,
    pub genre_column: GenreColumn,
    pub songs_per_genre: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tracks_csv: PathBuf,
    pub genre_tree: Option<PathBuf>,
    /// When absent the enriched tree is derived from `genre_tree` and the
    /// dataset.
    pub enriched_tree: Option<PathBuf>,
    pub preferences_path: PathBuf,
    pub genre_column: GenreColumn,
    pub songs_per_genre: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let tracks_csv = file
            .tracks_csv
            .map(PathBuf::from)
            .or_else(|| cli.tracks_csv.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("tracks_csv must be specified via --tracks or in config file")
            })?;

        if !tracks_csv.exists() {
            bail!("Tracks file does not exist: {:?}", tracks_csv);
        }
        if !tracks_csv.is_file() {
            bail!("tracks_csv is not a file: {:?}", tracks_csv);
        }

        let genre_tree = file
            .genre_tree
            .map(PathBuf::from)
            .or_else(|| cli.genre_tree.clone());
        let enriched_tree = file
            .enriched_tree
            .map(PathBuf::from)
            .or_else(|| cli.enriched_tree.clone());

        if enriched_tree.is_some() && genre_tree.is_none() {
            bail!("An enriched tree requires a plain genre_tree as well");
        }

        let preferences_path = file
            .preferences_path
            .map(PathBuf::from)
            .or_else(|| cli.preferences_path.clone())
            .unwrap_or_else(|| {
                tracks_csv
                    .parent()
                    .map(|dir| dir.join(PREFERENCES_FILE_NAME))
                    .unwrap_or_else(|| PathBuf::from(PREFERENCES_FILE_NAME))
            });

        let genre_column = match file.genre_column {
            Some(raw) => match parse_genre_column(&raw) {
                Some(column) => column,
                None => bail!("Unknown genre_column {:?}", raw),
            },
            None => cli.genre_column,
        };

        let songs_per_genre = file
            .enrichment
            .and_then(|e| e.songs_per_genre)
            .or(cli.songs_per_genre)
            .unwrap_or(DEFAULT_SONGS_PER_GENRE);

        Ok(Self {
            tracks_csv,
            genre_tree,
            enriched_tree,
            preferences_path,
            genre_column,
            songs_per_genre,
        })
    }
}

/// Parses a genre column name. Uses clap's ValueEnum trait for parsing.
fn parse_genre_column(s: &str) -> Option<GenreColumn> {
    GenreColumn::from_str(s, true).ok()
}
