//! Shared constants for integration tests
//!
//! When the fixture dataset changes, update only this file.

// ============================================================================
// Tracks CSV
// ============================================================================

/// Header plus rows. Row 6 is short and must be dropped, row 7 has no
/// track_id and unparsable numbers.
pub const TRACKS_CSV: &str = "\
artist_name,track_name,track_id,popularity,year,genre,danceability,energy,key,loudness,mode,speechiness,acousticness,instrumentalness,liveness,valence,tempo,duration_ms,time_signature
Ramones,Blitzkrieg Bop,T1,70,1976,punk,0.45,0.95,9,-7.1,1,0.05,0.01,0.0,0.3,0.8,177.0,132000,4
Ramones,Judy Is a Punk,T2,55,1976,punk,0.40,0.90,2,-6.5,1,0.06,0.02,0.0,0.2,0.7,170.0,92000,4
Blondie,Heart of Glass,T3,78,1978,synth-pop,0.73,0.62,4,-9.0,0,0.03,0.10,0.1,0.1,0.9,113.0,275000,4
Blondie,Call Me,T4,65,1980,synth-pop,0.62,0.81,5,-8.2,1,0.04,0.05,0.0,0.2,0.6,142.0,212000,4
Kraftwerk,The Model,T5,60,1978,electronic,0.80,0.55,0,-11.0,1,0.05,0.30,0.6,0.1,0.5,122.0,220000,4
Broken,Row
Nameless,Mystery,,loud,year?,pop,0.5,0.5,x,y,z,0,0,0,0,0.5,fast,long,4
Devo,Whip It,T8,72,1980,new wave,1.20,0.70,7,-8.0,1,0.05,0.05,0.0,0.1,0.9,158.0,160000,4
";

pub const TRACKS_IN_CSV: usize = 7;

/// Track id synthesized for the row without one (its zero-based row index).
pub const SYNTHESIZED_ID: &str = "track_6";

// ============================================================================
// Genre tree JSON
// ============================================================================

pub const GENRE_TREE_JSON: &str = r#"{
  "name": "Music Genres",
  "children": [
    {
      "name": "Rock",
      "children": [
        {"name": "punk"},
        {"name": "new wave"}
      ]
    },
    {
      "name": "Electronic",
      "children": [
        {"name": "synth-pop"},
        {"name": "electronic"}
      ]
    }
  ]
}"#;

pub const ENRICHED_TREE_JSON: &str = r#"{
  "name": "Music Genres",
  "songs": [{"track_name": "Anthem", "track_id": "S0"}],
  "children": [
    {
      "name": "Rock",
      "children": [
        {"name": "punk", "songs": [
          {"track_name": "Blitzkrieg Bop", "track_id": "T1", "popularity": 70},
          {"track_name": "Judy Is a Punk", "track_id": "T2"}
        ]}
      ]
    },
    {"name": "Jazz"}
  ]
}"#;

pub const INVALID_TREE_JSON: &str = r#"{"name": "Music Genres", "children": [{"name": 3}]}"#;
