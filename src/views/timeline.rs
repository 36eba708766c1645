use crate::catalog::Track;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-year means of the features the timeline chart plots.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct YearSummary {
    pub year: i32,
    pub track_count: usize,
    pub avg_popularity: f64,
    pub avg_danceability: f64,
    pub avg_energy: f64,
    pub avg_valence: f64,
    pub avg_tempo: f64,
}

#[derive(Default)]
struct Sums {
    count: usize,
    popularity: f64,
    danceability: f64,
    energy: f64,
    valence: f64,
    tempo: f64,
}

impl Sums {
    fn add(&mut self, track: &Track) {
        self.count += 1;
        self.popularity += track.popularity;
        self.danceability += track.danceability;
        self.energy += track.energy;
        self.valence += track.valence;
        self.tempo += track.tempo;
    }

    fn into_summary(self, year: i32) -> YearSummary {
        let n = self.count as f64;
        YearSummary {
            year,
            track_count: self.count,
            avg_popularity: self.popularity / n,
            avg_danceability: self.danceability / n,
            avg_energy: self.energy / n,
            avg_valence: self.valence / n,
            avg_tempo: self.tempo / n,
        }
    }
}

/// One summary per year with tracks, ascending by year. The genre filter is
/// the same exact case-insensitive match the heatmap uses.
pub fn timeline(tracks: &[Track], genre: Option<&str>) -> Vec<YearSummary> {
    let genre = genre.filter(|g| !g.is_empty());
    let mut by_year: BTreeMap<i32, Sums> = BTreeMap::new();
    for track in tracks {
        if genre.is_some_and(|g| !track.genre_is(g)) {
            continue;
        }
        by_year.entry(track.year).or_default().add(track);
    }

    by_year
        .into_iter()
        .map(|(year, sums)| sums.into_summary(year))
        .collect()
}
