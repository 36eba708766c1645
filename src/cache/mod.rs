//! Load-once caches for the session's data files.
//!
//! Caches are plain values: construct them at startup and hand them to
//! whatever needs them. Tests build their own.

mod dataset;
mod single_flight;
mod tree;

pub use dataset::{CacheInfo, CsvDatasetSource, DatasetCache, DatasetSource};
pub use single_flight::SingleFlight;
pub use tree::{
    DerivedEnrichedSource, GenreTreeCache, GenreTreeQuery, GenreTreeSource, JsonTreeSource,
    QueryParams,
};
