//! Frontmatter parsing strategies.
//!
//! [`YamlParser`] handles real YAML (quoting, block scalars, numbers) and is
//! compiled in with the `yaml` feature. [`LineParser`] only understands
//! `key: value` lines and never fails. [`FrontmatterReader`] tries them in
//! that order, so a block YAML rejects still yields its simple pairs.

use super::frontmatter::{self, Frontmatter, SplitError};
#[cfg(feature = "yaml")]
use super::frontmatter::MetaValue;
#[cfg(feature = "yaml")]
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid yaml: {0}")]
    Yaml(String),

    #[error("frontmatter must be a mapping of keys to values")]
    NotMapping,
}

/// One way of turning a frontmatter block into a [`Frontmatter`].
pub trait MetaParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, block: &str) -> Result<Frontmatter, ParseError>;
}

// ============================================================================
// YAML
// ============================================================================

/// Structured YAML via `serde_yaml`.
#[cfg(feature = "yaml")]
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlParser;

#[cfg(feature = "yaml")]
impl MetaParser for YamlParser {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, block: &str) -> Result<Frontmatter, ParseError> {
        use serde_yaml::Value;

        if block.trim().is_empty() {
            return Ok(Frontmatter::new());
        }

        let value: Value =
            serde_yaml::from_str(block).map_err(|e| ParseError::Yaml(e.to_string()))?;

        match value {
            Value::Null => Ok(Frontmatter::new()),
            Value::Mapping(map) => {
                let written = written_scalars(block);
                Ok(map
                    .into_iter()
                    .filter_map(|(key, value)| {
                        let key = yaml_key(key)?;
                        let value = match value {
                            // YAML normalizes numbers (`2.50` -> 2.5); use the source text
                            Value::Number(n) => MetaValue::Number(
                                written
                                    .get(key.as_str())
                                    .map_or_else(|| n.to_string(), |s| (*s).to_owned()),
                            ),
                            other => yaml_value(other),
                        };
                        Some((key, value))
                    })
                    .collect())
            }
            _ => Err(ParseError::NotMapping),
        }
    }
}

#[cfg(feature = "yaml")]
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Raw `key: value` text of the top-level lines of a block, trailing
/// comments removed.
#[cfg(feature = "yaml")]
fn written_scalars(block: &str) -> FxHashMap<&str, &str> {
    block
        .lines()
        .filter(|line| !line.starts_with([' ', '\t', '#', '-']))
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| {
            let value = value.split(" #").next().unwrap_or(value);
            (key.trim(), value.trim())
        })
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect()
}

/// Convert a YAML node to a scalar; nested sequences and mappings are kept
/// as their compact YAML text.
#[cfg(feature = "yaml")]
fn yaml_value(value: serde_yaml::Value) -> MetaValue {
    use serde_yaml::Value;

    match value {
        Value::Null => MetaValue::Null,
        Value::Bool(b) => MetaValue::Bool(b),
        Value::Number(n) => MetaValue::Number(n.to_string()),
        Value::String(s) => MetaValue::String(s),
        Value::Tagged(tagged) => yaml_value(tagged.value),
        nested @ (Value::Sequence(_) | Value::Mapping(_)) => MetaValue::String(
            serde_yaml::to_string(&nested)
                .map(|s| s.trim_end().to_owned())
                .unwrap_or_default(),
        ),
    }
}

// ============================================================================
// Line-oriented fallback
// ============================================================================

/// Forgiving `key: value` parser.
///
/// Splits each line at its first colon and trims both sides. Comments,
/// blank lines and lines without a key are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineParser;

impl MetaParser for LineParser {
    fn name(&self) -> &'static str {
        "line"
    }

    fn parse(&self, block: &str) -> Result<Frontmatter, ParseError> {
        let mut frontmatter = Frontmatter::new();

        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            frontmatter.insert(key, unquote(value.trim()));
        }

        Ok(frontmatter)
    }
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

// ============================================================================
// Reader
// ============================================================================

/// Result of reading a content file.
#[derive(Debug)]
pub struct Parsed<'a> {
    pub frontmatter: Frontmatter,
    pub body: &'a str,
    /// Recovered problems (unclosed block, YAML fallback)
    pub warnings: Vec<String>,
}

/// Splits files and parses their frontmatter with a primary strategy,
/// retrying with the line parser when the primary one fails.
pub struct FrontmatterReader {
    primary: Option<Box<dyn MetaParser>>,
    fallback: LineParser,
}

impl FrontmatterReader {
    /// Reader using the best parser compiled into this build.
    pub fn new() -> Self {
        #[cfg(feature = "yaml")]
        let primary: Option<Box<dyn MetaParser>> = Some(Box::new(YamlParser));
        #[cfg(not(feature = "yaml"))]
        let primary: Option<Box<dyn MetaParser>> = None;

        Self {
            primary,
            fallback: LineParser,
        }
    }

    /// Reader that only uses the line parser.
    #[cfg(test)]
    pub fn line_only() -> Self {
        Self {
            primary: None,
            fallback: LineParser,
        }
    }

    /// Name of the strategy tried first.
    #[cfg(test)]
    pub fn strategy(&self) -> &'static str {
        self.primary
            .as_deref()
            .map_or(self.fallback.name(), |parser| parser.name())
    }

    /// Split `raw` and parse its frontmatter. Never fails.
    pub fn read<'a>(&self, raw: &'a str) -> Parsed<'a> {
        let mut warnings = Vec::new();

        let split = match frontmatter::split(raw) {
            Ok(split) => split,
            Err(e @ SplitError::Unclosed) => {
                warnings.push(e.to_string());
                return Parsed {
                    frontmatter: Frontmatter::new(),
                    body: raw,
                    warnings,
                };
            }
        };

        let frontmatter = match split.block {
            None => Frontmatter::new(),
            Some(block) => self.parse_block(block, &mut warnings),
        };

        Parsed {
            frontmatter,
            body: split.body,
            warnings,
        }
    }

    fn parse_block(&self, block: &str, warnings: &mut Vec<String>) -> Frontmatter {
        if let Some(primary) = &self.primary {
            match primary.parse(block) {
                Ok(frontmatter) => return frontmatter,
                Err(e) => warnings.push(format!(
                    "{} frontmatter rejected ({e}), using {} parser",
                    primary.name(),
                    self.fallback.name()
                )),
            }
        }
        // The line parser is infallible
        self.fallback.parse(block).unwrap_or_default()
    }
}

impl Default for FrontmatterReader {
    fn default() -> Self {
        Self::new()
    }
}
