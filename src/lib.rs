//! Music Dashboard Library
//!
//! Turns a CSV of track metadata and a genre taxonomy into the view models
//! behind the dashboard charts: the (artist, year) heatmap, the per-year
//! danceability/energy scatter plot, the yearly timeline and the genre tree
//! browser.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod user;
pub mod views;

// Re-export commonly used types for convenience
pub use cache::{DatasetCache, GenreTreeCache, GenreTreeQuery};
pub use catalog::{GenreNode, LoadError, Track};
pub use dashboard::Dashboard;
pub use user::{Preferences, PreferencesStore};
