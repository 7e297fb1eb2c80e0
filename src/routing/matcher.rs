//! Route matching logic.
//!
//! # Responsibilities
//! - Match the configured public prefix on a path-segment boundary
//! - Produce the remainder that is forwarded upstream
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/upload` matches `/upload` and `/upload/...`, never `/uploads`
//! - No regex, no allocation on the match itself

/// Matches the request path against the public prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix this matcher was built with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the path with the prefix removed, or `None` when the path is
    /// not under the prefix. An exact match yields `""`.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    /// Returns true if the path is under the prefix.
    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }
}
