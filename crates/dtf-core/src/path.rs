//! Token paths and their positional roles.
//!
//! A path is the list of keys leading from the document root to a node.
//! Source documents address nodes with dots (`kda.color.brand.$value`),
//! token names use slashes (`kda/color/brand`).

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::TokenError;
use crate::keys;

/// An immutable list of path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPath(pub SmallVec<[String; 8]>);

impl TokenPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dot-delimited source path (`a.b.$value`).
    pub fn from_dotted(path: &str) -> Self {
        Self::split(path, keys::PATH_DELIMITER)
    }

    /// Parse a slash-delimited token name (`a/b/c`).
    pub fn from_name(name: &str) -> Self {
        Self::split(name, keys::NAME_DELIMITER)
    }

    fn split(input: &str, delimiter: char) -> Self {
        TokenPath(
            input
                .trim()
                .split(delimiter)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Return a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        TokenPath(segments)
    }

    /// The path without its last segment.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(TokenPath(self.0[..self.0.len() - 1].iter().cloned().collect()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.0.iter().any(|s| s == segment)
    }

    /// Whether the path crosses an `$extensions` boundary.
    pub fn is_extension(&self) -> bool {
        self.contains(keys::EXTENSIONS)
    }

    /// Segments before the first `$extensions` key: the token that owns the extension.
    pub fn before_extensions(&self) -> Self {
        TokenPath(
            self.0
                .iter()
                .take_while(|s| s.as_str() != keys::EXTENSIONS)
                .cloned()
                .collect(),
        )
    }

    /// The same path with every `$extensions` segment dropped.
    pub fn without_extensions(&self) -> Self {
        TokenPath(
            self.0
                .iter()
                .filter(|s| s.as_str() != keys::EXTENSIONS)
                .cloned()
                .collect(),
        )
    }

    /// The same path without a trailing `$value` segment.
    pub fn without_value_key(&self) -> Self {
        if self.last() == Some(keys::VALUE) {
            self.parent().unwrap_or_default()
        } else {
            self.clone()
        }
    }

    /// Dot-joined form, as written in source references.
    pub fn to_dotted(&self) -> String {
        self.0.join(".")
    }

    /// Canonical token name: trailing `$value` stripped, joined with `/`.
    pub fn to_name(&self) -> String {
        self.without_value_key().0.join("/")
    }

    /// Positional roles of this path.
    pub fn roles(&self) -> PathRoles<'_> {
        deconstruct(self)
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl<S: Into<String>> FromIterator<S> for TokenPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TokenPath(iter.into_iter().map(Into::into).collect())
    }
}

/// Semantic roles derived from the end of a path.
///
/// For `kda.color.brand.primary.$value` the key is `$value`, the parent key
/// `primary`, the group name `brand`, the root key `color` and the ref key `kda`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRoles<'a> {
    pub key: Option<&'a str>,
    pub parent_key: Option<&'a str>,
    pub group_name: Option<&'a str>,
    pub root_key: Option<&'a str>,
    pub ref_key: Option<&'a str>,
    pub is_extension: bool,
    depth: usize,
}

impl<'a> PathRoles<'a> {
    /// Number of segments in the underlying path.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Reject paths with fewer than `required` segments.
    pub fn require(&self, required: usize, path: &TokenPath) -> Result<(), TokenError> {
        if self.depth < required {
            return Err(TokenError::PathTooShort {
                path: path.to_dotted(),
                required,
                found: self.depth,
            });
        }
        Ok(())
    }
}

/// Derive positional roles; missing positions are `None`.
pub fn deconstruct(path: &TokenPath) -> PathRoles<'_> {
    let mut rev = path.0.iter().rev().map(String::as_str);
    PathRoles {
        key: rev.next(),
        parent_key: rev.next(),
        group_name: rev.next(),
        root_key: rev.next(),
        ref_key: rev.next(),
        is_extension: path.is_extension(),
        depth: path.len(),
    }
}
