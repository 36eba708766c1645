use crate::catalog::Track;
use std::collections::{BTreeSet, HashSet};

/// Distinct years present in the dataset, ascending.
pub fn available_years(tracks: &[Track]) -> Vec<i32> {
    tracks
        .iter()
        .map(|t| t.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct genres, case-insensitively deduplicated (first spelling wins),
/// sorted by lowercase name.
pub fn available_genres(tracks: &[Track]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut genres: Vec<String> = tracks
        .iter()
        .filter(|t| seen.insert(t.genre.to_lowercase()))
        .map(|t| t.genre.clone())
        .collect();
    genres.sort_by_key(|g| g.to_lowercase());
    genres
}
