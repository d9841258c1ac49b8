//! Tree configuration
//!
//! A [`TreeConfig`] fixes the few knobs a document needs at construction time:
//! which characters are reserved as glyphs, which target string means "any
//! node", and how many rounds a nested hide pass may run before it gives up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// First character of the Unicode Private Use Area
pub const DEFAULT_GLYPH_FIRST: char = '\u{E000}';

/// Last character of the Unicode Private Use Area
pub const DEFAULT_GLYPH_LAST: char = '\u{F8FF}';

/// Inclusive range of characters reserved for label glyphs.
///
/// The pool must not intersect the characters of the documents being
/// processed; the Private Use Area is the natural default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphPool {
    pub first: char,
    pub last: char,
}

impl GlyphPool {
    pub fn new(first: char, last: char) -> Self {
        Self { first, last }
    }

    /// The `index`-th glyph of the pool, if the pool is that large.
    ///
    /// Surrogate code points are never produced: the pool is walked as a
    /// sequence of valid `char`s.
    pub fn nth(&self, index: usize) -> Option<char> {
        (self.first..=self.last).nth(index)
    }

    pub fn contains(&self, c: char) -> bool {
        (self.first..=self.last).contains(&c)
    }
}

impl Default for GlyphPool {
    fn default() -> Self {
        Self::new(DEFAULT_GLYPH_FIRST, DEFAULT_GLYPH_LAST)
    }
}

/// Per-document configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Characters handed out by `define`
    pub glyph_pool: GlyphPool,

    /// Target filter meaning "every node that is not ignored"
    pub wildcard: String,

    /// Upper bound on the rounds of a nested hide pass
    pub max_rounds: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            glyph_pool: GlyphPool::default(),
            wildcard: "*".to_string(),
            max_rounds: 10_000,
        }
    }
}

/// Error reading a configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl TreeConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: TreeConfig =
            serde_json::from_str(source).map_err(|e| ConfigError(e.to_string()))?;
        if config.glyph_pool.first > config.glyph_pool.last {
            return Err(ConfigError(format!(
                "glyph pool starts after it ends ({:?} > {:?})",
                config.glyph_pool.first, config.glyph_pool.last
            )));
        }
        Ok(config)
    }

    /// Shorthand for a config with a custom glyph pool
    pub fn with_glyph_pool(mut self, first: char, last: char) -> Self {
        self.glyph_pool = GlyphPool::new(first, last);
        self
    }

    /// Whether `filter` is the configured wildcard
    pub fn is_wildcard(&self, filter: &str) -> bool {
        filter == self.wildcard
    }
}
