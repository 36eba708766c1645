//! Test fixture creation for the dataset, genre trees and preferences

use super::constants::*;
use anyhow::Result;
use music_dashboard::catalog::GenreColumn;
use music_dashboard::config::{AppConfig, CliConfig};
use music_dashboard::Dashboard;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestData {
    // Keeps the files alive for the duration of the test
    _dir: TempDir,
    pub tracks_csv: PathBuf,
    pub genre_tree: PathBuf,
    pub enriched_tree: PathBuf,
    pub invalid_tree: PathBuf,
    pub preferences: PathBuf,
}

impl TestData {
    pub fn create() -> Result<TestData> {
        let dir = TempDir::new()?;

        let tracks_csv = dir.path().join("tracks.csv");
        fs::write(&tracks_csv, TRACKS_CSV)?;

        let genre_tree = dir.path().join("genres.json");
        fs::write(&genre_tree, GENRE_TREE_JSON)?;

        let enriched_tree = dir.path().join("genres_enriched.json");
        fs::write(&enriched_tree, ENRICHED_TREE_JSON)?;

        let invalid_tree = dir.path().join("genres_invalid.json");
        fs::write(&invalid_tree, INVALID_TREE_JSON)?;

        let preferences = dir.path().join("prefs").join("preferences.json");

        Ok(TestData {
            _dir: dir,
            tracks_csv,
            genre_tree,
            enriched_tree,
            invalid_tree,
            preferences,
        })
    }

    pub fn cli_config(&self) -> CliConfig {
        CliConfig {
            tracks_csv: Some(self.tracks_csv.clone()),
            genre_tree: Some(self.genre_tree.clone()),
            enriched_tree: None,
            preferences_path: Some(self.preferences.clone()),
            genre_column: GenreColumn::Genre,
            songs_per_genre: None,
        }
    }

    pub fn dashboard_with(&self, cli: CliConfig) -> Dashboard {
        let config = AppConfig::resolve(&cli, None).unwrap();
        Dashboard::from_config(&config)
    }

    /// Dashboard whose enriched tree is derived from the dataset.
    pub fn dashboard(&self) -> Dashboard {
        self.dashboard_with(self.cli_config())
    }
}
