use crate::cache::{
    CsvDatasetSource, DatasetCache, DerivedEnrichedSource, GenreTreeCache, GenreTreeQuery,
    JsonTreeSource,
};
use crate::catalog::RecordParser;
use crate::config::AppConfig;
use crate::user::{FilePreferencesStore, PreferencesStore};
use std::sync::Arc;
use tracing::info;

/// Everything a chart needs, built once per session from the config.
#[derive(Clone)]
pub struct Dashboard {
    pub dataset: Arc<DatasetCache>,
    pub genre_tree: Option<Arc<GenreTreeQuery>>,
    pub preferences: Arc<dyn PreferencesStore>,
}

impl Dashboard {
    pub fn new(
        dataset: Arc<DatasetCache>,
        genre_tree: Option<Arc<GenreTreeQuery>>,
        preferences: Arc<dyn PreferencesStore>,
    ) -> Dashboard {
        Dashboard {
            dataset,
            genre_tree,
            preferences,
        }
    }

    pub fn from_config(config: &AppConfig) -> Dashboard {
        let parser = RecordParser::new(config.genre_column);
        let dataset = Arc::new(DatasetCache::new(Arc::new(CsvDatasetSource::new(
            &config.tracks_csv,
            parser,
        ))));

        let genre_tree = config.genre_tree.as_ref().map(|plain_path| {
            let plain = Arc::new(GenreTreeCache::new(Arc::new(JsonTreeSource::new(
                plain_path,
            ))));
            let enriched = match &config.enriched_tree {
                Some(path) => {
                    info!("Using enriched genre tree at {:?}", path);
                    Arc::new(GenreTreeCache::new(Arc::new(JsonTreeSource::new(path))))
                }
                None => {
                    info!("Enriched genre tree will be derived from the dataset");
                    Arc::new(GenreTreeCache::new(Arc::new(DerivedEnrichedSource::new(
                        plain.clone(),
                        dataset.clone(),
                        config.songs_per_genre,
                    ))))
                }
            };
            Arc::new(GenreTreeQuery::new(plain, enriched))
        });

        let preferences: Arc<dyn PreferencesStore> =
            Arc::new(FilePreferencesStore::new(&config.preferences_path));

        Dashboard::new(dataset, genre_tree, preferences)
    }
}
