use super::{DatasetCache, SingleFlight};
use crate::catalog::{
    compute_tree_stats, enrich_tree, extract_leaf_genres, get_data, load_genre_tree, GenreNode,
    LoadError, TreeResponse, TreeStats,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[async_trait]
pub trait GenreTreeSource: Send + Sync {
    async fn fetch_tree(&self) -> Result<GenreNode, LoadError>;
}

pub struct JsonTreeSource {
    path: PathBuf,
}

impl JsonTreeSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> JsonTreeSource {
        JsonTreeSource { path: path.into() }
    }
}

#[async_trait]
impl GenreTreeSource for JsonTreeSource {
    async fn fetch_tree(&self) -> Result<GenreNode, LoadError> {
        load_genre_tree(&self.path).await
    }
}

/// Enriched tree derived from a plain tree and the track dataset, for
/// setups that don't ship a pre-enriched JSON file.
pub struct DerivedEnrichedSource {
    plain: Arc<GenreTreeCache>,
    dataset: Arc<DatasetCache>,
    per_genre_limit: usize,
}

impl DerivedEnrichedSource {
    pub fn new(
        plain: Arc<GenreTreeCache>,
        dataset: Arc<DatasetCache>,
        per_genre_limit: usize,
    ) -> DerivedEnrichedSource {
        DerivedEnrichedSource {
            plain,
            dataset,
            per_genre_limit,
        }
    }
}

#[async_trait]
impl GenreTreeSource for DerivedEnrichedSource {
    async fn fetch_tree(&self) -> Result<GenreNode, LoadError> {
        let plain = self.plain.load().await?;
        let tracks = self.dataset.load().await?;
        info!(
            "Enriching genre tree with up to {} tracks per genre",
            self.per_genre_limit
        );
        Ok(enrich_tree(&plain, &tracks, self.per_genre_limit))
    }
}

/// Session-wide memoized genre tree.
pub struct GenreTreeCache {
    source: Arc<dyn GenreTreeSource>,
    tree: SingleFlight<GenreNode>,
}

impl GenreTreeCache {
    pub fn new(source: Arc<dyn GenreTreeSource>) -> GenreTreeCache {
        GenreTreeCache {
            source,
            tree: SingleFlight::new(),
        }
    }

    pub async fn load(&self) -> Result<Arc<GenreNode>, LoadError> {
        let source = self.source.clone();
        self.tree
            .get_or_load(move || async move { source.fetch_tree().await })
            .await
    }

    /// The tree, or the empty fallback tree when it can't be loaded.
    pub async fn load_or_fallback(&self) -> Arc<GenreNode> {
        match self.load().await {
            Ok(tree) => tree,
            Err(err) => {
                error!("Failed to load genre tree, using an empty one: {}", err);
                Arc::new(GenreNode::fallback())
            }
        }
    }

    pub fn clear(&self) {
        self.tree.clear();
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct QueryParams {
    /// Browse the enriched tree (songs at leaves) instead of the plain one.
    #[serde(default)]
    pub enriched: bool,
}

/// Breadcrumb navigation and statistics over the plain and enriched trees.
pub struct GenreTreeQuery {
    plain: Arc<GenreTreeCache>,
    enriched: Arc<GenreTreeCache>,
}

impl GenreTreeQuery {
    pub fn new(plain: Arc<GenreTreeCache>, enriched: Arc<GenreTreeCache>) -> GenreTreeQuery {
        GenreTreeQuery { plain, enriched }
    }

    fn cache(&self, params: &QueryParams) -> &GenreTreeCache {
        if params.enriched {
            &self.enriched
        } else {
            &self.plain
        }
    }

    pub async fn get_data<S: AsRef<str>>(
        &self,
        path: &[S],
        params: &QueryParams,
    ) -> Result<TreeResponse, LoadError> {
        let tree = self.cache(params).load().await?;
        Ok(get_data(&tree, path))
    }

    /// Leaf genre names of the plain tree, sorted.
    pub async fn leaf_genres(&self) -> Result<Vec<String>, LoadError> {
        let tree = self.plain.load().await?;
        let mut genres = extract_leaf_genres(&tree);
        genres.sort();
        Ok(genres)
    }

    pub async fn stats(&self, params: &QueryParams) -> Result<TreeStats, LoadError> {
        let tree = self.cache(params).load().await?;
        Ok(compute_tree_stats(&tree))
    }
}
