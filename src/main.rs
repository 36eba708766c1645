use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use music_dashboard::catalog::{GenreColumn, TrackIndex};
use music_dashboard::config::{AppConfig, CliConfig, FileConfig};
use music_dashboard::user::PreferencesUpdate;
use music_dashboard::views::{
    aggregate_heatmap, available_genres, available_years, process_scatter_cached, timeline,
    top_n_artists_by_cumulative_popularity, unique_artists_by_avg_popularity, HeatmapCell,
    HeatmapFilter,
};
use music_dashboard::{cache::QueryParams, Dashboard, GenreTreeQuery};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the CLI ones.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the tracks CSV file.
    #[clap(long, value_parser = parse_path)]
    pub tracks: Option<PathBuf>,

    /// Path to the plain genre tree JSON file.
    #[clap(long, value_parser = parse_path)]
    pub genre_tree: Option<PathBuf>,

    /// Path to a pre-enriched genre tree JSON file.
    #[clap(long, value_parser = parse_path)]
    pub enriched_tree: Option<PathBuf>,

    /// Path to the preferences JSON file.
    #[clap(long, value_parser = parse_path)]
    pub preferences: Option<PathBuf>,

    /// Which column wins when both `genre` and `track_genre` are present.
    #[clap(long, default_value = "genre")]
    pub genre_column: GenreColumn,

    /// Songs per leaf genre when deriving the enriched tree.
    #[clap(long)]
    pub songs_per_genre: Option<usize>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Artist/year heatmap cells.
    Heatmap {
        /// Exact genre to keep (case-insensitive).
        #[clap(long)]
        genre: Option<String>,

        #[clap(long)]
        year_min: Option<i32>,

        #[clap(long)]
        year_max: Option<i32>,

        /// Keep only the artists with the highest cumulative popularity.
        #[clap(long)]
        top_artists: Option<usize>,
    },

    /// Danceability/energy scatter points for one year.
    Scatter {
        /// Defaults to the stored preference.
        #[clap(long)]
        year: Option<i32>,

        /// Genre substring (case-insensitive). Defaults to the stored preference.
        #[clap(long)]
        genre: Option<String>,

        /// Defaults to the stored preference.
        #[clap(long)]
        top_n: Option<usize>,
    },

    /// Per-year feature averages.
    Timeline {
        #[clap(long)]
        genre: Option<String>,
    },

    /// Years and genres available for filtering.
    Filters,

    /// Look up a single track by id.
    Track { id: String },

    /// Loads the dataset and reports the cache state.
    CacheInfo,

    /// Sorted leaf genres of the genre tree.
    Genres,

    /// Children or songs at a genre tree path.
    Browse {
        segments: Vec<String>,

        #[clap(long)]
        enriched: bool,
    },

    /// Track and genre counts of the genre tree.
    TreeStats {
        #[clap(long)]
        enriched: bool,
    },

    /// Show or update the stored preferences.
    Prefs {
        #[clap(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    Show,
    Set {
        #[clap(long)]
        year: Option<i32>,

        #[clap(long)]
        genre: Option<String>,

        #[clap(long)]
        top_n: Option<usize>,
    },
}

#[derive(Serialize)]
struct HeatmapView {
    artists: Vec<String>,
    cells: Vec<HeatmapCell>,
}

#[derive(Serialize)]
struct FiltersView {
    years: Vec<i32>,
    genres: Vec<String>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn genre_tree(dashboard: &Dashboard) -> Result<&Arc<GenreTreeQuery>> {
    dashboard
        .genre_tree
        .as_ref()
        .with_context(|| "No genre tree configured, pass --genre-tree or set genre_tree.")
}

async fn run(dashboard: Dashboard, command: Command) -> Result<()> {
    match command {
        Command::Heatmap {
            genre,
            year_min,
            year_max,
            top_artists,
        } => {
            let tracks = dashboard.dataset.load().await?;
            let filter = HeatmapFilter {
                genre,
                year_min,
                year_max,
            };
            let mut cells = aggregate_heatmap(&tracks, &filter);
            if let Some(top_n) = top_artists {
                cells = top_n_artists_by_cumulative_popularity(&cells, top_n);
            }
            if cells.is_empty() {
                info!("No data for this selection");
            }
            let artists = unique_artists_by_avg_popularity(&cells);
            print_json(&HeatmapView { artists, cells })
        }
        Command::Scatter { year, genre, top_n } => {
            let prefs = dashboard.preferences.get();
            let year = year.unwrap_or(prefs.year);
            let genre = genre.unwrap_or(prefs.genre);
            let top_n = top_n.unwrap_or(prefs.top_n);
            let points = process_scatter_cached(&dashboard.dataset, year, top_n, &genre).await;
            if points.is_empty() {
                info!("No data for this selection");
            }
            print_json(&points)
        }
        Command::Timeline { genre } => {
            let tracks = dashboard.dataset.load().await?;
            print_json(&timeline(&tracks, genre.as_deref()))
        }
        Command::Filters => {
            let tracks = dashboard.dataset.load().await?;
            print_json(&FiltersView {
                years: available_years(&tracks),
                genres: available_genres(&tracks),
            })
        }
        Command::Track { id } => {
            let tracks = dashboard.dataset.load().await?;
            let index = TrackIndex::new(&tracks);
            print_json(&index.get(&id))
        }
        Command::CacheInfo => {
            dashboard.dataset.load().await?;
            print_json(&dashboard.dataset.cache_info())
        }
        Command::Genres => print_json(&genre_tree(&dashboard)?.leaf_genres().await?),
        Command::Browse { segments, enriched } => {
            let params = QueryParams { enriched };
            print_json(&genre_tree(&dashboard)?.get_data(segments.as_slice(), &params).await?)
        }
        Command::TreeStats { enriched } => {
            let params = QueryParams { enriched };
            print_json(&genre_tree(&dashboard)?.stats(&params).await?)
        }
        Command::Prefs { action } => match action {
            PrefsAction::Show => print_json(&dashboard.preferences.get()),
            PrefsAction::Set { year, genre, top_n } => {
                let update = PreferencesUpdate { year, genre, top_n };
                print_json(&dashboard.preferences.set(update)?)
            }
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install the log subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Reading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config = CliConfig {
        tracks_csv: cli_args.tracks,
        genre_tree: cli_args.genre_tree,
        enriched_tree: cli_args.enriched_tree,
        preferences_path: cli_args.preferences,
        genre_column: cli_args.genre_column,
        songs_per_genre: cli_args.songs_per_genre,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let dashboard = Dashboard::from_config(&config);
    run(dashboard, cli_args.command).await
}
