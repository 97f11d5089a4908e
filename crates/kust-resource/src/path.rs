//! Dotted field paths
//!
//! Var field paths address a value inside a document:
//!
//! - Dot-separated keys: `spec.clusterIP`
//! - Array indexing: `spec.ports[0].port`
//!
//! ```
//! use kust_resource::path::{parse_path, get_at_path, PathSegment};
//! use serde_json::json;
//!
//! let path = parse_path("spec.ports[0].port");
//! assert_eq!(path[2], PathSegment::Index(0));
//!
//! let svc = json!({"spec": {"ports": [{"port": 80}]}});
//! assert_eq!(get_at_path(&svc, &path), Some(&json!(80)));
//! ```

use serde_json::Value;

/// A segment of a path - either a key or an array index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parse a dotted path into segments.
///
/// Empty keys are dropped, so `a..b` reads as `a.b`. A bracket whose
/// content is not an index is kept as a literal key.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut key = String::new();
    let mut chars = path.chars();

    let flush = |key: &mut String, segments: &mut Vec<PathSegment>| {
        if !key.is_empty() {
            segments.push(PathSegment::Key(std::mem::take(key)));
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '.' => flush(&mut key, &mut segments),
            '[' => {
                flush(&mut key, &mut segments);
                let inner: String = chars.by_ref().take_while(|c| *c != ']').collect();
                match inner.parse::<usize>() {
                    Ok(index) => segments.push(PathSegment::Index(index)),
                    Err(_) if !inner.is_empty() => segments.push(PathSegment::Key(inner)),
                    Err(_) => {}
                }
            }
            other => key.push(other),
        }
    }
    flush(&mut key, &mut segments);

    segments
}

/// Borrow the value at `segments`, or `None` if any step is missing.
pub fn get_at_path<'a>(value: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| match segment {
            PathSegment::Key(key) => current.get(key),
            PathSegment::Index(idx) => current.get(*idx),
        })
}
