//! View models handed to the chart renderers.

mod artist_ranking;
mod filters;
mod heatmap;
mod scatter;
mod timeline;

pub use artist_ranking::{top_n_artists_by_cumulative_popularity, unique_artists_by_avg_popularity};
pub use filters::{available_genres, available_years};
pub use heatmap::{
    aggregate as aggregate_heatmap, popularity_rank, round_half_up, HeatmapCell, HeatmapFilter,
    PopularSong, POPULAR_SONGS_PER_CELL,
};
pub use scatter::{
    point_size, process as process_scatter, process_cached as process_scatter_cached,
    ScatterPoint,
};
pub use timeline::{timeline, YearSummary};
