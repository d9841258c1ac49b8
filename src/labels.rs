//! Label and placeholder registry
//!
//! A label is a symbolic name such as `<Comment>` bound to exactly one glyph,
//! a character drawn from a reserved pool that never occurs in ordinary text.
//! A label may also carry a macro body: a regex fragment substituted wherever
//! the label appears inside a pattern.
//!
//! ## Pattern expansion
//!
//! ```text
//! define("<String>")                  -> glyph U+E000
//! define_macro("< >", "[ \t]*")
//!
//! pattern:   "(?m)^< >\(([^<String>]*)\)"
//! expanded:  "(?m)^[ \t]*\(([^\u{E000}]*)\)"
//! ```
//!
//! Expansion is a plain textual pass, longest label first, and runs again on
//! every call: labels can be redefined between passes.
//!
//! A one-character label that was never defined is a *literal label*: hiding
//! with `"\n"` or `" "` as the label leaves that very character as the glyph.

use crate::config::GlyphPool;
use crate::error::HideError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Tokens shaped like a label (`<Identifier>`). Used to catch references to
/// labels that were never defined.
static LABEL_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z_][A-Za-z0-9_]*>").unwrap());

/// A defined label
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub glyph: char,
    pub macro_body: Option<String>,
}

/// Registry of labels for one document
#[derive(Debug, Clone)]
pub struct LabelRegistry {
    pool: GlyphPool,
    labels: HashMap<String, Label>,
    by_glyph: HashMap<char, String>,
    next_glyph: usize,
}

impl LabelRegistry {
    pub fn new(pool: GlyphPool) -> Self {
        Self {
            pool,
            labels: HashMap::new(),
            by_glyph: HashMap::new(),
            next_glyph: 0,
        }
    }

    /// Register `label`, allocating a glyph the first time it is seen.
    ///
    /// Returns the label's glyph. Defining the same label again is a no-op.
    pub fn define(&mut self, label: &str) -> Result<char, HideError> {
        if let Some(existing) = self.labels.get(label) {
            return Ok(existing.glyph);
        }

        let glyph = self
            .pool
            .nth(self.next_glyph)
            .ok_or_else(|| HideError::PlaceholderExhaustion {
                label: label.to_string(),
            })?;
        self.next_glyph += 1;

        self.labels.insert(
            label.to_string(),
            Label {
                name: label.to_string(),
                glyph,
                macro_body: None,
            },
        );
        self.by_glyph.insert(glyph, label.to_string());
        log::trace!(target: "hidetree", "define label {} as {:?}", label, glyph);
        Ok(glyph)
    }

    /// Register `label` with a macro body; redefining keeps the glyph and
    /// replaces the body.
    pub fn define_macro(&mut self, label: &str, body: &str) -> Result<char, HideError> {
        let glyph = self.define(label)?;
        if let Some(entry) = self.labels.get_mut(label) {
            entry.macro_body = Some(body.to_string());
        }
        Ok(glyph)
    }

    pub fn get(&self, label: &str) -> Option<&Label> {
        self.labels.get(label)
    }

    pub fn is_defined(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Number of defined labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Resolve the glyph to leave in the parent text when hiding with `label`.
    pub fn glyph(&self, label: &str) -> Result<char, HideError> {
        if let Some(entry) = self.labels.get(label) {
            return Ok(entry.glyph);
        }

        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(HideError::UndefinedLabel(label.to_string())),
        }
    }

    /// The label that owns `glyph`, if it came from the pool
    pub fn label_for(&self, glyph: char) -> Option<&str> {
        self.by_glyph.get(&glyph).map(|s| s.as_str())
    }

    /// Substitute every defined label in `pattern` by its macro body or glyph.
    pub fn expand(&self, pattern: &str) -> Result<String, HideError> {
        // Longest first, so "<#/>" wins over "<#>" where both could start.
        let mut names: Vec<&Label> = self.labels.values().collect();
        names.sort_by(|a, b| b.name.len().cmp(&a.name.len()).then(a.name.cmp(&b.name)));

        let mut expanded = String::with_capacity(pattern.len());
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(c) = rest.chars().next() {
            match names.iter().find(|l| rest.starts_with(l.name.as_str())) {
                Some(label) => {
                    self.check_undefined(&literal)?;
                    expanded.push_str(&literal);
                    literal.clear();
                    match &label.macro_body {
                        Some(body) => expanded.push_str(body),
                        None => expanded.push_str(&regex::escape(&label.glyph.to_string())),
                    }
                    rest = &rest[label.name.len()..];
                }
                None => {
                    literal.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }

        self.check_undefined(&literal)?;
        expanded.push_str(&literal);
        Ok(expanded)
    }

    /// Reject label-shaped tokens in a stretch of pattern text that holds no
    /// defined label. Regex named groups (`(?P<name>`, `(?<name>`) are not
    /// labels.
    fn check_undefined(&self, text: &str) -> Result<(), HideError> {
        for token in LABEL_TOKEN_REGEX.find_iter(text) {
            let before = &text[..token.start()];
            if before.ends_with("(?P") || before.ends_with("(?") || before.ends_with("\\k") {
                continue;
            }
            return Err(HideError::UndefinedLabel(token.as_str().to_string()));
        }
        Ok(())
    }
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self::new(GlyphPool::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_allocates_sequential_glyphs() {
        let mut labels = LabelRegistry::default();
        assert_eq!(labels.define("<Comment>").unwrap(), '\u{E000}');
        assert_eq!(labels.define("<Word>").unwrap(), '\u{E001}');
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_define_is_idempotent() {
        let mut labels = LabelRegistry::default();
        let first = labels.define("<Comment>").unwrap();
        let again = labels.define("<Comment>").unwrap();
        assert_eq!(first, again);
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_pool_exhaustion() {
        let mut labels = LabelRegistry::new(GlyphPool::new('\u{E000}', '\u{E001}'));
        labels.define("<A>").unwrap();
        labels.define("<B>").unwrap();
        assert_eq!(
            labels.define("<C>"),
            Err(HideError::PlaceholderExhaustion {
                label: "<C>".to_string()
            })
        );
        // Existing labels still resolve after exhaustion
        assert_eq!(labels.define("<A>").unwrap(), '\u{E000}');
    }

    #[test]
    fn test_redefining_macro_keeps_glyph() {
        let mut labels = LabelRegistry::default();
        let glyph = labels.define_macro("< >", "[ ]*").unwrap();
        let again = labels.define_macro("< >", "[ \\t]*").unwrap();
        assert_eq!(glyph, again);
        assert_eq!(
            labels.get("< >").unwrap().macro_body.as_deref(),
            Some("[ \\t]*")
        );
    }

    #[test]
    fn test_literal_labels() {
        let labels = LabelRegistry::default();
        assert_eq!(labels.glyph("\n").unwrap(), '\n');
        assert_eq!(labels.glyph("X").unwrap(), 'X');
        assert_eq!(
            labels.glyph("<Nope>"),
            Err(HideError::UndefinedLabel("<Nope>".to_string()))
        );
        assert!(labels.glyph("").is_err());
    }

    #[test]
    fn test_expand_glyphs_and_macros() {
        let mut labels = LabelRegistry::default();
        labels.define("<String>").unwrap();
        labels.define_macro("< >", "[ \\t]*").unwrap();

        let expanded = labels.expand(r"^< >x[^<String>]").unwrap();
        assert_eq!(expanded, "^[ \\t]*x[^\u{E000}]");
    }

    #[test]
    fn test_expand_prefers_longest_label() {
        let mut labels = LabelRegistry::default();
        labels.define_macro("<#>", "A").unwrap();
        labels.define_macro("<#/>", "B").unwrap();
        assert_eq!(labels.expand("<#/><#>").unwrap(), "BA");
    }

    #[test]
    fn test_expand_sees_redefinitions() {
        let mut labels = LabelRegistry::default();
        labels.define_macro("<d>", "[0-9]").unwrap();
        assert_eq!(labels.expand("<d>+").unwrap(), "[0-9]+");
        labels.define_macro("<d>", "\\d").unwrap();
        assert_eq!(labels.expand("<d>+").unwrap(), "\\d+");
    }

    #[test]
    fn test_expand_rejects_undefined_label_tokens() {
        let labels = LabelRegistry::default();
        assert_eq!(
            labels.expand("[^<Content>]*"),
            Err(HideError::UndefinedLabel("<Content>".to_string()))
        );
    }

    #[test]
    fn test_expand_leaves_named_groups_alone() {
        let labels = LabelRegistry::default();
        assert_eq!(
            labels.expand("(?P<word>\\w+)(?<rest>.*)").unwrap(),
            "(?P<word>\\w+)(?<rest>.*)"
        );
        assert_eq!(labels.expand("<.*?>").unwrap(), "<.*?>");
    }

    #[test]
    fn test_label_for_reverse_lookup() {
        let mut labels = LabelRegistry::default();
        let glyph = labels.define("<Word>").unwrap();
        assert_eq!(labels.label_for(glyph), Some("<Word>"));
        assert_eq!(labels.label_for('a'), None);
    }
}
