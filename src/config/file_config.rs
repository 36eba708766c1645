use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Data files (can override CLI)
    pub tracks_csv: Option<String>,
    pub genre_tree: Option<String>,
    pub enriched_tree: Option<String>,
    pub preferences_path: Option<String>,
    pub genre_column: Option<String>,

    // Feature configs
    pub enrichment: Option<EnrichmentConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Songs attached to each leaf genre when the enriched tree is derived
    /// from the dataset.
    pub songs_per_genre: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
