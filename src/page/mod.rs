//! Content pages: reading, frontmatter and output paths.
//!
//! # Path Mapping
//!
//! | Source (`content/`) | Output (`_output/`)  | URL           |
//! |---------------------|----------------------|---------------|
//! | `index.html`        | `index.html`         | `/`           |
//! | `about.htm`         | `about.html`         | `/about.html` |
//! | `blog/index.html`   | `blog/index.html`    | `/blog/`      |
//!
//! With `[build] pretty_urls = true`, non-index pages get their own
//! directory: `about.html` → `about/index.html` → `/about/`.

mod frontmatter;
mod parser;

pub use frontmatter::{Frontmatter, MetaValue};
pub use parser::FrontmatterReader;

use crate::{config::SiteConfig, diagnostic::Diagnostic};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Extensions treated as content pages.
pub const PAGE_EXTENSIONS: &[&str] = &["html", "htm"];

const INDEX_FILE: &str = "index.html";

/// Errors that skip a single page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("unreadable: {0}")]
    Read(#[source] io::Error),

    #[error("not valid UTF-8")]
    Encoding,

    #[error("not inside the content directory")]
    OutsideContent,

    #[error("`{url}` is already produced by {}, skipped", .previous.display())]
    Collision { url: String, previous: PathBuf },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Check whether `path` has a content page extension.
pub fn is_page(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PAGE_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p)))
}

// ============================================================================
// Paths
// ============================================================================

/// Where a page comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePaths {
    /// Source file path
    pub source: PathBuf,
    /// Output HTML file path
    pub html: PathBuf,
    /// Source path relative to `content/` (for logging)
    pub relative: String,
    /// Root-relative URL, e.g. `/blog/`
    pub url_path: String,
    /// URL with `[base] url` prepended when configured
    pub full_url: String,
}

impl PagePaths {
    pub fn from_source(source: PathBuf, config: &SiteConfig) -> Result<Self, PageError> {
        let paths = &config.paths;
        let rel = source
            .strip_prefix(&paths.content)
            .map_err(|_| PageError::OutsideContent)?;

        let out_rel = output_rel_path(rel, config.build.pretty_urls);
        let url_path = url_for(&out_rel);
        let full_url = match &config.base.url {
            Some(base) => format!("{}{url_path}", base.trim_end_matches('/')),
            None => url_path.clone(),
        };

        Ok(Self {
            relative: slash_path(rel),
            html: paths.output.join(&out_rel),
            url_path,
            full_url,
            source,
        })
    }
}

/// Output path relative to `_output/`.
fn output_rel_path(rel: &Path, pretty: bool) -> PathBuf {
    let is_index = rel.file_stem().is_some_and(|stem| stem == "index");
    if pretty && !is_index {
        rel.with_extension("").join(INDEX_FILE)
    } else {
        rel.with_extension("html")
    }
}

/// URL for an output path: `/`-separated, `index.html` collapsed to its directory.
fn url_for(out_rel: &Path) -> String {
    let path = slash_path(out_rel);
    let path = match path.strip_suffix(INDEX_FILE) {
        Some(dir) if dir.is_empty() || dir.ends_with('/') => dir.to_owned(),
        _ => path,
    };
    format!("/{path}")
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Content File
// ============================================================================

/// A parsed content page. Lives for one build pass.
#[derive(Debug)]
pub struct ContentFile {
    pub paths: PagePaths,
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl ContentFile {
    /// Read and parse a page. Recovered frontmatter problems are returned
    /// as warnings alongside the page.
    pub fn load(
        source: PathBuf,
        config: &SiteConfig,
        reader: &FrontmatterReader,
    ) -> Result<(Self, Vec<Diagnostic>), PageError> {
        let paths = PagePaths::from_source(source, config)?;
        let bytes = fs::read(&paths.source).map_err(PageError::Read)?;
        let raw = String::from_utf8(bytes).map_err(|_| PageError::Encoding)?;

        let parsed = reader.read(&raw);
        let warnings = parsed
            .warnings
            .into_iter()
            .map(|w| Diagnostic::warning(w).in_file(&paths.source))
            .collect();

        let page = Self {
            frontmatter: parsed.frontmatter,
            body: parsed.body.to_owned(),
            paths,
        };
        Ok((page, warnings))
    }
}
