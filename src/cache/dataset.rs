use super::SingleFlight;
use crate::catalog::{load_tracks_csv, LoadError, RecordParser, Track};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the track dataset comes from.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch_tracks(&self) -> Result<Vec<Track>, LoadError>;
}

pub struct CsvDatasetSource {
    path: PathBuf,
    parser: RecordParser,
}

impl CsvDatasetSource {
    pub fn new<P: Into<PathBuf>>(path: P, parser: RecordParser) -> CsvDatasetSource {
        CsvDatasetSource {
            path: path.into(),
            parser,
        }
    }
}

#[async_trait]
impl DatasetSource for CsvDatasetSource {
    async fn fetch_tracks(&self) -> Result<Vec<Track>, LoadError> {
        load_tracks_csv(&self.path, &self.parser).await
    }
}

#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
pub struct CacheInfo {
    pub has_cache: bool,
    pub count: usize,
    pub is_loading: bool,
}

/// Session-wide memoized track dataset.
pub struct DatasetCache {
    source: Arc<dyn DatasetSource>,
    tracks: SingleFlight<Vec<Track>>,
}

impl DatasetCache {
    pub fn new(source: Arc<dyn DatasetSource>) -> DatasetCache {
        DatasetCache {
            source,
            tracks: SingleFlight::new(),
        }
    }

    pub async fn load(&self) -> Result<Arc<Vec<Track>>, LoadError> {
        let source = self.source.clone();
        self.tracks
            .get_or_load(move || async move { source.fetch_tracks().await })
            .await
    }

    pub fn clear(&self) {
        self.tracks.clear();
    }

    pub fn cache_info(&self) -> CacheInfo {
        let cached = self.tracks.peek();
        CacheInfo {
            has_cache: cached.is_some(),
            count: cached.map(|tracks| tracks.len()).unwrap_or(0),
            is_loading: self.tracks.is_loading(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::make_track;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl DatasetSource for CountingSource {
        async fn fetch_tracks(&self) -> Result<Vec<Track>, LoadError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(vec![
                make_track("A", "a", 2020, 10.0),
                make_track("B", "b", 2021, 20.0),
            ])
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DatasetSource for FailingSource {
        async fn fetch_tracks(&self) -> Result<Vec<Track>, LoadError> {
            Err(LoadError::Io {
                path: "tracks.csv".to_owned(),
                message: "unreachable".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_fetch_once() {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        });
        let cache = DatasetCache::new(source.clone());

        let (first, second) = tokio::join!(cache.load(), cache.load());

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[tokio::test]
    async fn test_cache_info_and_clear() {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        });
        let cache = DatasetCache::new(source.clone());

        assert_eq!(
            cache.cache_info(),
            CacheInfo {
                has_cache: false,
                count: 0,
                is_loading: false
            }
        );

        cache.load().await.unwrap();
        assert_eq!(
            cache.cache_info(),
            CacheInfo {
                has_cache: true,
                count: 2,
                is_loading: false
            }
        );

        cache.clear();
        assert!(!cache.cache_info().has_cache);
        cache.load().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_surfaced() {
        let cache = DatasetCache::new(Arc::new(FailingSource));
        assert!(matches!(cache.load().await, Err(LoadError::Io { .. })));
        assert!(!cache.cache_info().has_cache);
    }
}
