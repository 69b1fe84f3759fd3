/*!
 * Separator-agnostic path handling
 *
 * Paths coming from the walker are compared segment by segment, never as raw
 * strings, so that `build\lib` and `build/lib/` name the same directory.
 */

use std::fmt;
use std::path::Path;

use crate::error::{Result, WixGenError};

/// Separator used when rendering paths into the generated document
pub const SEPARATOR: char = '/';

/// A path split into non-empty segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Whether the original path started at the filesystem root
    rooted: bool,
    /// Path segments, none of them empty or containing a separator
    segments: Vec<String>,
}

/// Tails of two paths after their longest shared prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathDivergence<'a> {
    /// Segments shared by both paths
    pub common: &'a [String],
    /// Segments only present in the first path
    pub left: &'a [String],
    /// Segments only present in the second path
    pub right: &'a [String],
}

impl NormalizedPath {
    /// Segments of this path
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the path has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Return a new path with one more trailing segment
    ///
    /// The segment is normalized as well, so `join("a/b")` adds two segments.
    pub fn join(&self, segment: &str) -> Self {
        let mut joined = self.clone();
        joined.segments.extend(normalize(segment).segments);
        joined
    }

    /// Whether `self` is `other` or lies below it
    pub fn starts_with(&self, other: &NormalizedPath) -> bool {
        self.rooted == other.rooted && divergence(other, self).left.is_empty()
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rooted {
            write!(f, "{}", SEPARATOR)?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for NormalizedPath {
    fn from(path: &str) -> Self {
        normalize(path)
    }
}

impl TryFrom<&Path> for NormalizedPath {
    type Error = WixGenError;

    fn try_from(path: &Path) -> Result<Self> {
        path.to_str()
            .map(normalize)
            .ok_or_else(|| WixGenError::NonUtf8Path(path.to_path_buf()))
    }
}

/// Normalize a path with any mixture of `/` and `\` separators
///
/// Leading, trailing and repeated separators are dropped. An empty input
/// yields an empty path.
pub fn normalize(path: &str) -> NormalizedPath {
    let unified = path.replace('\\', "/");
    NormalizedPath {
        rooted: unified.starts_with(SEPARATOR),
        segments: unified
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Split two paths at the first segment where they stop agreeing
///
/// Both tails start at that index, so `common + left == a` and
/// `common + right == b`. Identical paths give two empty tails.
pub fn divergence<'a>(a: &'a NormalizedPath, b: &'a NormalizedPath) -> PathDivergence<'a> {
    let shared = a
        .segments
        .iter()
        .zip(&b.segments)
        .take_while(|(x, y)| x == y)
        .count();

    PathDivergence {
        common: &a.segments[..shared],
        left: &a.segments[shared..],
        right: &b.segments[shared..],
    }
}

/// Join path fragments using `/` exclusively
///
/// Each fragment has its separators unified and is trimmed of surrounding
/// separators, except that a leading `/` on the first fragment is kept so
/// absolute paths stay absolute.
pub fn slash_join<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        let unified = part.as_ref().replace('\\', "/");
        if i == 0 && unified.starts_with(SEPARATOR) {
            joined.push(SEPARATOR);
        }
        let trimmed = unified.trim_matches(SEPARATOR);
        if trimmed.is_empty() {
            continue;
        }
        if !joined.is_empty() && !joined.ends_with(SEPARATOR) {
            joined.push(SEPARATOR);
        }
        joined.push_str(trimmed);
    }
    joined
}
