mod genre_tree;
mod load;
pub mod parse;
mod query;
mod track;

pub use genre_tree::{
    compute_tree_stats, enrich_tree, extract_leaf_genres, GenreNode, SongRef, TreeFromJsonError,
    TreeStats, TreeValidationError, FALLBACK_TREE_NAME,
};
pub use load::{load_genre_tree, load_tracks_csv, parse_tracks_csv, LoadError};
pub use parse::{GenreColumn, RecordParser};
pub use query::{get_data, TreeResponse};
pub use track::{Track, TrackIndex};

#[cfg(test)]
pub(crate) use track::make_track;
