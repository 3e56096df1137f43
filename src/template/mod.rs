//! `<template>` directives.
//!
//! Two directives are recognized inside page, layout and partial text:
//!
//! ```html
//! <template variable="title" default="Untitled"></template>
//! <template include="partials/header.html"></template>
//! ```
//!
//! - **variable**: replaced by the frontmatter value, else `default`, else `""`
//! - **include**: replaced by the resolved partial from `layouts/`
//!
//! Matching is tolerant: attribute order, quote style, surrounding
//! whitespace and tag case don't matter, the closing `</template>` may be
//! omitted and `<template … />` is accepted. A `<template>` element without
//! either attribute is ordinary HTML and passes through untouched.

mod layout;
mod resolve;

pub use layout::apply_layout;
pub use resolve::{Resolved, Resolver};

use regex::Regex;
use std::{ops::Range, sync::LazyLock};

/// Opening tag plus an optional closing tag separated only by whitespace.
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<template\b(?P<attrs>[^>]*?)\s*/?>(?:\s*</template\s*>)?").unwrap()
});

/// `name="value"` or `name='value'`.
static RE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<name>[A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .unwrap()
});

/// What a tag asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Variable {
        name: String,
        default: Option<String>,
    },
    Include {
        path: String,
    },
}

/// A directive occurrence in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Byte range of the whole match (opening and closing tag)
    pub span: Range<usize>,
    /// Matched text, used when a tag is left unresolved
    pub source: &'a str,
    pub directive: Directive,
}

/// Find every directive tag in `text`, left to right.
pub fn scan(text: &str) -> impl Iterator<Item = Tag<'_>> {
    RE_TAG.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let directive = parse_directive(caps.name("attrs").map_or("", |m| m.as_str()))?;
        Some(Tag {
            span: whole.range(),
            source: whole.as_str(),
            directive,
        })
    })
}

/// Read `include` / `variable` / `default` from an attribute list.
///
/// `include` takes precedence when both directives are present.
fn parse_directive(attrs: &str) -> Option<Directive> {
    let mut variable = None;
    let mut include = None;
    let mut default = None;

    for caps in RE_ATTR.captures_iter(attrs) {
        let value = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .map_or("", |m| m.as_str())
            .to_owned();
        match caps["name"].to_ascii_lowercase().as_str() {
            "variable" => variable = Some(value),
            "include" => include = Some(value),
            "default" => default = Some(value),
            _ => {}
        }
    }

    match (include, variable) {
        (Some(path), _) => Some(Directive::Include { path }),
        (None, Some(name)) => Some(Directive::Variable { name, default }),
        (None, None) => None,
    }
}
