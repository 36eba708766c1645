use super::GenreNode;
use serde::Serialize;

/// Answer to a breadcrumb lookup in the genre tree.
#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum TreeResponse {
    Genres(Vec<String>),
    Songs(Vec<String>),
}

impl TreeResponse {
    /// Canonical "path not found" answer.
    pub fn not_found() -> TreeResponse {
        TreeResponse::Genres(vec![])
    }
}

/// Walks `path` from `root`, one exact child-name match per segment.
///
/// A node with children answers with their names, any other node with the
/// track names of its songs. A segment that doesn't match is not an error.
pub fn get_data<S: AsRef<str>>(root: &GenreNode, path: &[S]) -> TreeResponse {
    let mut node = root;
    for segment in path {
        node = match node.child(segment.as_ref()) {
            Some(child) => child,
            None => return TreeResponse::not_found(),
        };
    }

    if node.is_leaf() {
        TreeResponse::Songs(node.songs.iter().map(|s| s.track_name.clone()).collect())
    } else {
        TreeResponse::Genres(node.child_names())
    }
}
