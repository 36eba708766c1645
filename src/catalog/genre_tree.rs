//! Hierarchical genre taxonomy.
//!
//! Trees arrive as untyped JSON and are validated once into [`GenreNode`];
//! everything downstream works on the typed structure. Leaf-ness is decided
//! in a single place, [`GenreNode::is_leaf`].

use super::Track;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

pub const FALLBACK_TREE_NAME: &str = "Music Genres";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeValidationError {
    #[error("Invalid genre tree format at {path}: node is not an object")]
    NotAnObject { path: String },

    #[error("Invalid genre tree format at {path}: missing or non-string \"name\"")]
    MissingName { path: String },

    #[error("Invalid genre tree format at {path}: \"children\" is not an array")]
    ChildrenNotArray { path: String },

    #[error("Invalid genre tree format at {path}: \"songs\" is not an array")]
    SongsNotArray { path: String },

    #[error("Invalid genre tree format at {path}: {reason}")]
    InvalidSong { path: String, reason: String },
}

/// Only `track_name` is required. A missing `track_id` is empty and a
/// `popularity` that isn't a number is dropped.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SongRef {
    pub track_name: String,
    #[serde(default)]
    pub track_id: String,
    #[serde(
        default,
        deserialize_with = "lenient_popularity",
        skip_serializing_if = "Option::is_none"
    )]
    pub popularity: Option<f64>,
}

fn lenient_popularity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64())
}

impl From<&Track> for SongRef {
    fn from(track: &Track) -> Self {
        SongRef {
            track_name: track.track_name.clone(),
            track_id: track.track_id.clone(),
            popularity: Some(track.popularity),
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct GenreNode {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GenreNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub songs: Vec<SongRef>,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct TreeStats {
    pub total_tracks: usize,
    pub total_genres: usize,
    pub avg_tracks_per_genre: f64,
}

fn optional_array<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Vec<Value>>, ()> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(()),
    }
}

impl GenreNode {
    pub fn new<S: Into<String>>(name: S) -> GenreNode {
        GenreNode {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_children<S: Into<String>>(name: S, children: Vec<GenreNode>) -> GenreNode {
        GenreNode {
            name: name.into(),
            children,
            songs: vec![],
        }
    }

    /// Empty tree handed to callers when the real one cannot be loaded.
    pub fn fallback() -> GenreNode {
        GenreNode::new(FALLBACK_TREE_NAME)
    }

    /// A node is a genre leaf iff it has no children. Songs don't matter.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&GenreNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.iter().map(|c| c.name.clone()).collect()
    }

    pub fn from_json_str(json: &str) -> Result<GenreNode, TreeFromJsonError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(GenreNode::from_json_value(&value)?)
    }

    /// Validates and converts an untyped JSON tree.
    pub fn from_json_value(value: &Value) -> Result<GenreNode, TreeValidationError> {
        Self::from_value_at(value, "$".to_owned())
    }

    fn from_value_at(value: &Value, path: String) -> Result<GenreNode, TreeValidationError> {
        let object = match value.as_object() {
            Some(object) => object,
            None => return Err(TreeValidationError::NotAnObject { path }),
        };

        let name = match object.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(TreeValidationError::MissingName { path }),
        };

        let children = match optional_array(object, "children") {
            Ok(Some(items)) => items
                .iter()
                .enumerate()
                .map(|(i, child)| Self::from_value_at(child, format!("{}.children[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()?,
            Ok(None) => vec![],
            Err(()) => return Err(TreeValidationError::ChildrenNotArray { path }),
        };

        let songs = match optional_array(object, "songs") {
            Ok(Some(items)) => items
                .iter()
                .enumerate()
                .map(|(i, song)| {
                    serde_json::from_value::<SongRef>(song.clone()).map_err(|err| {
                        TreeValidationError::InvalidSong {
                            path: format!("{}.songs[{}]", path, i),
                            reason: err.to_string(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Ok(None) => vec![],
            Err(()) => return Err(TreeValidationError::SongsNotArray { path }),
        };

        Ok(GenreNode {
            name,
            children,
            songs,
        })
    }
}

#[derive(Debug, Error)]
pub enum TreeFromJsonError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] TreeValidationError),
}

fn collect_leaf_genres(node: &GenreNode, out: &mut Vec<String>) {
    if node.is_leaf() && !node.name.is_empty() {
        out.push(node.name.clone());
    }
    for child in &node.children {
        collect_leaf_genres(child, out);
    }
}

/// Names of all leaf genres in pre-order. Callers sort if they need to.
pub fn extract_leaf_genres(root: &GenreNode) -> Vec<String> {
    let mut out = Vec::new();
    collect_leaf_genres(root, &mut out);
    out
}

fn accumulate_stats(node: &GenreNode, tracks: &mut usize, genres: &mut usize) {
    *tracks += node.songs.len();
    if node.is_leaf() {
        *genres += 1;
    }
    for child in &node.children {
        accumulate_stats(child, tracks, genres);
    }
}

/// Song totals count every node, including internal ones carrying songs.
pub fn compute_tree_stats(root: &GenreNode) -> TreeStats {
    let mut total_tracks = 0;
    let mut total_genres = 0;
    accumulate_stats(root, &mut total_tracks, &mut total_genres);

    let avg_tracks_per_genre = if total_genres == 0 {
        0.0
    } else {
        total_tracks as f64 / total_genres as f64
    };

    TreeStats {
        total_tracks,
        total_genres,
        avg_tracks_per_genre,
    }
}

fn enrich_node(
    node: &GenreNode,
    by_genre: &HashMap<String, Vec<&Track>>,
    per_genre_limit: usize,
) -> GenreNode {
    let songs = if node.is_leaf() {
        by_genre
            .get(&node.name.to_lowercase())
            .map(|tracks| {
                tracks
                    .iter()
                    .take(per_genre_limit)
                    .map(|t| SongRef::from(*t))
                    .collect()
            })
            .unwrap_or_default()
    } else {
        node.songs.clone()
    };

    GenreNode {
        name: node.name.clone(),
        children: node
            .children
            .iter()
            .map(|child| enrich_node(child, by_genre, per_genre_limit))
            .collect(),
        songs,
    }
}

/// Builds an enriched copy of a plain tree: each leaf gets the most popular
/// tracks whose genre equals the leaf name, case-insensitively.
pub fn enrich_tree(root: &GenreNode, tracks: &[Track], per_genre_limit: usize) -> GenreNode {
    let mut by_genre: HashMap<String, Vec<&Track>> = HashMap::new();
    for track in tracks {
        by_genre
            .entry(track.genre.to_lowercase())
            .or_default()
            .push(track);
    }
    for group in by_genre.values_mut() {
        group.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    }

    enrich_node(root, &by_genre, per_genre_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::track::make_track;
    use serde_json::json;

    fn song(name: &str) -> SongRef {
        SongRef {
            track_name: name.to_owned(),
            track_id: format!("id-{}", name),
            popularity: None,
        }
    }

    #[test]
    fn test_parses_nested_tree() {
        let value = json!({
            "name": "Music",
            "children": [
                {"name": "Rock", "children": [{"name": "Punk"}]},
                {"name": "Pop", "songs": [{"track_name": "Hit", "track_id": "t1", "popularity": 90}]}
            ]
        });

        let tree = GenreNode::from_json_value(&value).unwrap();

        assert_eq!(tree.child_names(), vec!["Rock", "Pop"]);
        assert!(tree.child("Rock").unwrap().child("Punk").unwrap().is_leaf());
        assert_eq!(tree.child("Pop").unwrap().songs[0].popularity, Some(90.0));
    }

    #[test]
    fn test_rejects_missing_name() {
        let value = json!({"name": "Music", "children": [{"title": "Rock"}]});
        assert_eq!(
            GenreNode::from_json_value(&value),
            Err(TreeValidationError::MissingName {
                path: "$.children[0]".to_owned()
            })
        );
    }

    #[test]
    fn test_rejects_non_array_children_and_songs() {
        let children = json!({"name": "Music", "children": {"name": "Rock"}});
        assert!(matches!(
            GenreNode::from_json_value(&children),
            Err(TreeValidationError::ChildrenNotArray { .. })
        ));

        let songs = json!({"name": "Music", "songs": "none"});
        assert!(matches!(
            GenreNode::from_json_value(&songs),
            Err(TreeValidationError::SongsNotArray { .. })
        ));

        let bad_song = json!({"name": "Music", "songs": [{"track_id": "x"}]});
        assert!(matches!(
            GenreNode::from_json_value(&bad_song),
            Err(TreeValidationError::InvalidSong { .. })
        ));
    }

    #[test]
    fn test_song_without_id_or_numeric_popularity_loads() {
        let value = json!({
            "name": "Music",
            "songs": [
                {"track_name": "Untagged"},
                {"track_name": "Vague", "track_id": "t2", "popularity": "high"}
            ]
        });

        let tree = GenreNode::from_json_value(&value).unwrap();

        assert_eq!(tree.songs[0].track_id, "");
        assert_eq!(tree.songs[1].track_id, "t2");
        assert_eq!(tree.songs[1].popularity, None);
    }

    #[test]
    fn test_from_json_str_reports_syntax_errors() {
        assert!(matches!(
            GenreNode::from_json_str("{not json"),
            Err(TreeFromJsonError::Json(_))
        ));
        assert!(matches!(
            GenreNode::from_json_str("[]"),
            Err(TreeFromJsonError::Invalid(TreeValidationError::NotAnObject { .. }))
        ));
    }

    #[test]
    fn test_leaf_genres_of_childless_root() {
        let root = GenreNode::new("Everything");
        assert_eq!(extract_leaf_genres(&root), vec!["Everything"]);
    }

    #[test]
    fn test_leaf_genres_at_any_depth() {
        let root = GenreNode::with_children(
            "Music",
            vec![
                GenreNode::with_children(
                    "Rock",
                    vec![
                        GenreNode::new("Punk"),
                        GenreNode::with_children("Metal", vec![GenreNode::new("Doom")]),
                    ],
                ),
                GenreNode::new("Jazz"),
            ],
        );

        assert_eq!(extract_leaf_genres(&root), vec!["Punk", "Doom", "Jazz"]);
    }

    #[test]
    fn test_leaf_genres_skip_internal_nodes_with_songs() {
        let mut rock = GenreNode::with_children(
            "Rock",
            vec![GenreNode::new("Punk"), GenreNode::new("Grunge")],
        );
        rock.songs = vec![song("anthem")];
        let root = GenreNode::with_children("Music", vec![rock]);

        assert_eq!(extract_leaf_genres(&root), vec!["Punk", "Grunge"]);
    }

    #[test]
    fn test_tree_stats_count_internal_songs() {
        let mut rock = GenreNode::with_children("Rock", vec![GenreNode::new("Punk")]);
        rock.songs = vec![song("a")];
        let mut jazz = GenreNode::new("Jazz");
        jazz.songs = vec![song("b"), song("c")];
        let root = GenreNode::with_children("Music", vec![rock, jazz]);

        let stats = compute_tree_stats(&root);
        assert_eq!(stats.total_tracks, 3);
        assert_eq!(stats.total_genres, 2);
        assert_eq!(stats.avg_tracks_per_genre, 1.5);
    }

    #[test]
    fn test_tree_stats_of_fallback() {
        let stats = compute_tree_stats(&GenreNode::fallback());
        assert_eq!(stats.total_genres, 1);
        assert_eq!(stats.total_tracks, 0);
        assert_eq!(stats.avg_tracks_per_genre, 0.0);
    }

    #[test]
    fn test_enrich_tree_attaches_top_tracks_to_leaves() {
        let mut low = make_track("A", "low", 2020, 10.0);
        low.genre = "Punk".to_owned();
        let mut high = make_track("B", "high", 2020, 80.0);
        high.genre = "punk".to_owned();
        let mut mid = make_track("C", "mid", 2020, 50.0);
        mid.genre = "PUNK".to_owned();
        let other = make_track("D", "other", 2020, 99.0);

        let plain = GenreNode::with_children(
            "Music",
            vec![GenreNode::with_children("Rock", vec![GenreNode::new("Punk")])],
        );

        let enriched = enrich_tree(&plain, &[low, high, mid, other], 2);
        let punk = enriched.child("Rock").unwrap().child("Punk").unwrap();
        let names: Vec<&str> = punk.songs.iter().map(|s| s.track_name.as_str()).collect();

        assert_eq!(names, vec!["high", "mid"]);
        assert!(enriched.child("Rock").unwrap().songs.is_empty());
    }

    #[test]
    fn test_serializes_without_empty_fields() {
        let json = serde_json::to_value(GenreNode::new("Jazz")).unwrap();
        assert_eq!(json, json!({"name": "Jazz"}));
    }
}
