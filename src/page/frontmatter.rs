//! Frontmatter block detection and the metadata mapping.
//!
//! A block starts when the first line of a file is exactly `---` and ends at
//! the next `---` line:
//!
//! ```text
//! ---
//! title: Hello
//! layout: base.html
//! ---
//! <h1><template variable="title"></template></h1>
//! ```

use std::fmt;
use thiserror::Error;

/// Block delimiter line.
const DELIMITER: &str = "---";

// ============================================================================
// Values
// ============================================================================

/// A scalar frontmatter value.
///
/// Rendered to text only when substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    String(String),
    /// Numeric scalar, kept as written (`1.0` stays `1.0`)
    Number(String),
    Bool(bool),
    /// Renders as the empty string
    Null,
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Number(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

// ============================================================================
// Mapping
// ============================================================================

/// Ordered key → value mapping with unique keys.
///
/// Inserting an existing key replaces its value in place, so the last
/// occurrence in a file wins while the first position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, MetaValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Value of `key` rendered as text, if present.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(ToString::to_string)
    }

    /// Layout file requested by the page (non-empty `layout` key).
    pub fn layout(&self) -> Option<String> {
        self.text("layout")
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<MetaValue>> FromIterator<(K, V)> for Frontmatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut frontmatter = Self::new();
        for (key, value) in iter {
            frontmatter.insert(key, value);
        }
        frontmatter
    }
}

// ============================================================================
// Block Splitting
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("frontmatter opened with `---` but never closed, treating the file as plain body")]
    Unclosed,
}

/// A file cut into its raw frontmatter block and body.
#[derive(Debug, PartialEq, Eq)]
pub struct Split<'a> {
    /// Text between the delimiters, `None` when the file has no block
    pub block: Option<&'a str>,
    pub body: &'a str,
}

/// Separate the frontmatter block from the body.
///
/// Without an opening delimiter the whole text is body. An opening
/// delimiter with no closing one is reported as [`SplitError::Unclosed`].
pub fn split(raw: &str) -> Result<Split<'_>, SplitError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let (first, after_open) = next_line(text);
    if !is_delimiter(first) {
        return Ok(Split {
            block: None,
            body: raw,
        });
    }

    let mut rest = after_open;
    let mut block_len = 0;
    while !rest.is_empty() {
        let (line, next) = next_line(rest);
        if is_delimiter(line) {
            return Ok(Split {
                block: Some(&after_open[..block_len]),
                body: next,
            });
        }
        block_len += rest.len() - next.len();
        rest = next;
    }

    Err(SplitError::Unclosed)
}

/// Cut one line off `s`, returning the line (without `\n`) and the rest.
fn next_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_block() {
        let split = split("---\ntitle: Hi\n---\n<h1>x</h1>").unwrap();
        assert_eq!(split.block, Some("title: Hi\n"));
        assert_eq!(split.body, "<h1>x</h1>");
    }

    #[test]
    fn test_split_without_block() {
        let raw = "<p>no metadata</p>\n---\n";
        let split = split(raw).unwrap();
        assert_eq!(split.block, None);
        assert_eq!(split.body, raw);
    }

    #[test]
    fn test_split_empty_block() {
        let split = split("---\n---\nbody").unwrap();
        assert_eq!(split.block, Some(""));
        assert_eq!(split.body, "body");
    }

    #[test]
    fn test_split_crlf_and_trailing_spaces() {
        let split = split("---  \r\ntitle: Hi\r\n---\r\nbody").unwrap();
        assert_eq!(split.block, Some("title: Hi\r\n"));
        assert_eq!(split.body, "body");
    }

    #[test]
    fn test_split_closing_at_eof() {
        let split = split("---\na: 1\n---").unwrap();
        assert_eq!(split.block, Some("a: 1\n"));
        assert_eq!(split.body, "");
    }

    #[test]
    fn test_split_unclosed() {
        assert_eq!(split("---\ntitle: Hi\n<p>x</p>"), Err(SplitError::Unclosed));
        assert_eq!(split("---"), Err(SplitError::Unclosed));
    }

    #[test]
    fn test_split_delimiter_must_be_exact() {
        let split = split("----\ntitle: Hi\n---\n").unwrap();
        assert_eq!(split.block, None);
    }

    #[test]
    fn test_frontmatter_last_wins_keeps_position() {
        let fm: Frontmatter = [("title", "a"), ("layout", "x.html"), ("title", "b")]
            .into_iter()
            .collect();
        assert_eq!(fm.len(), 2);
        assert_eq!(fm.text("title").as_deref(), Some("b"));
        assert_eq!(fm.iter().next().map(|(k, _)| k), Some("title"));
    }

    #[test]
    fn test_frontmatter_layout() {
        let mut fm = Frontmatter::new();
        assert_eq!(fm.layout(), None);
        fm.insert("layout", "  ");
        assert_eq!(fm.layout(), None);
        fm.insert("layout", " base.html ");
        assert_eq!(fm.layout().as_deref(), Some("base.html"));
    }

    #[test]
    fn test_meta_value_display() {
        assert_eq!(MetaValue::from("x").to_string(), "x");
        assert_eq!(MetaValue::Number("42".into()).to_string(), "42");
        assert_eq!(MetaValue::Number("1.50".into()).to_string(), "1.50");
        assert_eq!(MetaValue::Bool(true).to_string(), "true");
        assert_eq!(MetaValue::Null.to_string(), "");
    }
}
