//! # Paths Module
//!
//! Path normalisation, query-string parsing, and the [`PathPattern`] compiler
//! used by the endpoint registry.
//!
//! ## Normalisation
//!
//! The same rules are applied wherever a path is registered or matched:
//!
//! 1. trim surrounding whitespace
//! 2. drop any `?query` suffix
//! 3. ensure a leading `/`
//! 4. drop a trailing `/` (the root `/` is kept)
//!
//! ```rust
//! use restgate::paths::sanitise_path;
//!
//! assert_eq!(sanitise_path(" users/:id/ ").as_deref(), Some("/users/:id"));
//! assert_eq!(sanitise_path("/").as_deref(), Some("/"));
//! assert_eq!(sanitise_path("  "), None);
//! ```

mod pattern;

pub use pattern::{CaptureVec, PathPattern, MAX_INLINE_CAPTURES};

use std::borrow::Cow;
use std::collections::HashMap;

/// Normalises a route path. Returns `None` when nothing is left to register.
#[must_use]
pub fn sanitise_path(path: &str) -> Option<String> {
    let trimmed = path.trim();
    let without_query = match trimmed.find('?') {
        Some(pos) => &trimmed[..pos],
        None => trimmed,
    };
    let without_query = without_query.trim();
    if without_query.is_empty() {
        return None;
    }

    let mut route_path = if without_query.starts_with('/') {
        without_query.to_string()
    } else {
        format!("/{without_query}")
    };

    while route_path.len() > 1 && route_path.ends_with('/') {
        route_path.pop();
    }

    Some(route_path)
}

/// Normalises a base path prefix: `""` and `"/"` both mean "no base path".
#[must_use]
pub fn clean_base_path(path: &str) -> String {
    let mut base = path.trim().to_string();
    while base.ends_with('/') {
        base.pop();
        base = base.trim_end().to_string();
    }
    if base.is_empty() {
        return String::new();
    }
    if !base.starts_with('/') {
        base.insert(0, '/');
    }
    base
}

/// Removes `base_path` from the front of `path`.
///
/// The prefix only counts on a segment boundary, so `/api` strips `/api/ping`
/// but not `/apix/ping`. An exact match leaves the root `/`. Returns `None`
/// when the path lies outside the base.
#[must_use]
pub fn strip_base_path<'a>(path: &'a str, base_path: &str) -> Option<Cow<'a, str>> {
    if base_path.is_empty() {
        return Some(Cow::Borrowed(path));
    }
    let rest = path.strip_prefix(base_path)?;
    if rest.is_empty() {
        return Some(Cow::Borrowed("/"));
    }
    if rest.starts_with('/') {
        return Some(Cow::Borrowed(rest));
    }
    if rest.starts_with('?') {
        return Some(Cow::Owned(format!("/{rest}")));
    }
    None
}

/// Splits request text into its path component and raw query string.
///
/// Everything after the first `?` is the query. The path gets a leading `/`
/// and loses a trailing one; the bare root `/` is preserved and an empty path
/// becomes `/`.
#[must_use]
pub fn split_full_path(full_path: &str) -> (String, String) {
    let (path, query) = match full_path.split_once('?') {
        Some((path, query)) => (path, query),
        None => (full_path, ""),
    };

    let mut path = path.trim().to_string();
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    (path, query.to_string())
}

/// Parses a raw query string into a flat map.
///
/// `name=value` pairs are percent-decoded on both sides; a bare `name` maps to
/// the empty string. When a name repeats, the last occurrence wins.
///
/// Decoding is plain percent-decoding, not form decoding: `+` stays a literal
/// `+` and only `%20` is a space.
#[must_use]
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let query = query.trim();
    let query = query.strip_prefix('?').unwrap_or(query).trim();

    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, value)) => (decode(name), decode(value.trim())),
            None => (decode(part), String::new()),
        })
        .collect()
}

fn decode(text: &str) -> String {
    urlencoding::decode(text)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| text.to_string())
}

/// Splits a delimited list, accepting an optional `[a,b]` wrapper.
///
/// ```rust
/// use restgate::paths::split_list;
///
/// assert_eq!(split_list("[1, 2,3]"), vec!["1", "2", "3"]);
/// assert!(split_list("[]").is_empty());
/// ```
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    let mut text = text.trim();
    if text.len() >= 2 && text.starts_with('[') && text.ends_with(']') {
        text = text[1..text.len() - 1].trim();
    }
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',').map(|item| item.trim().to_string()).collect()
}

/// Compares two name lists as sets, treating duplicates as a mismatch.
#[must_use]
pub fn same_name_set(left: &[String], right: &[String]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut left: Vec<&str> = left.iter().map(String::as_str).collect();
    let mut right: Vec<&str> = right.iter().map(String::as_str).collect();
    left.sort_unstable();
    right.sort_unstable();
    let unique = left.windows(2).all(|pair| pair[0] != pair[1]);
    unique && left == right
}
