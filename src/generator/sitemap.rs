//! Sitemap generation.
//!
//! Generates a sitemap.xml file listing every page built in the current pass.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```

use crate::{build::BuiltPage, log};
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::{fs, path::Path};

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const ROOT_PRIORITY: &str = "1.0";
const PAGE_PRIORITY: &str = "0.8";

// ============================================================================
// Public API
// ============================================================================

/// Write the sitemap for this pass's pages to `path`.
///
/// A failure here is fatal for the build.
pub fn build_sitemap(pages: &[BuiltPage], path: &Path) -> Result<()> {
    Sitemap::from_pages(pages).write(path)
}

// ============================================================================
// Sitemap Implementation
// ============================================================================

/// Sitemap data structure
pub struct Sitemap {
    /// List of URL entries, one per page
    urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap
struct UrlEntry {
    /// URL location
    loc: String,
    /// Last modification date
    lastmod: String,
    priority: &'static str,
}

impl Sitemap {
    /// Build sitemap from the pages of one pass, dropping repeated URLs.
    pub fn from_pages(pages: &[BuiltPage]) -> Self {
        let mut seen = FxHashSet::default();

        let urls = pages
            .iter()
            .filter(|page| seen.insert(page.url.as_str()))
            .map(|page| UrlEntry {
                loc: page.url.clone(),
                lastmod: page.lastmod.clone(),
                priority: if page.is_root() {
                    ROOT_PRIORITY
                } else {
                    PAGE_PRIORITY
                },
            })
            .collect();

        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Generate sitemap XML string.
    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(128 + self.urls.len() * 128);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_xml(&entry.lastmod)));
            xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Write sitemap to output file.
    fn write(self, path: &Path) -> Result<()> {
        let count = self.len();
        let xml = self.into_xml();

        fs::write(path, xml)
            .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

        log!("sitemap"; "{} urls", count);
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ============================================================================
// Tests
// ============================================================================
