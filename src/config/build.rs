//! `[build]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[build]` section in stencil.toml - page generation settings.
///
/// # Example
/// ```toml
/// [build]
/// pretty_urls = true      # about.html -> about/index.html
/// max_include_depth = 10
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Emit `name/index.html` instead of `name.html` for non-index pages.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub pretty_urls: bool,

    /// Maximum nesting of `<template include>` before the tag is left as-is.
    #[serde(default = "defaults::build::max_include_depth")]
    #[educe(Default = defaults::build::max_include_depth())]
    pub max_include_depth: usize,
}
