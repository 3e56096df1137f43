//! Fixed directory layout of a site.
//!
//! ```text
//! <site>/
//!   content/   pages (.html / .htm) with optional frontmatter
//!   layouts/   layouts and partials
//!   assets/    copied to _output/assets/
//!   extra/     copied to the root of _output/
//!   _output/   generated, wiped on every build
//! ```
//!
//! The names are part of the site format and cannot be configured.

use std::path::{Path, PathBuf};

pub const CONTENT_DIR: &str = "content";
pub const LAYOUTS_DIR: &str = "layouts";
pub const ASSETS_DIR: &str = "assets";
pub const EXTRA_DIR: &str = "extra";
pub const OUTPUT_DIR: &str = "_output";
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Absolute paths of every site directory, derived from the site root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitePaths {
    pub root: PathBuf,
    pub content: PathBuf,
    pub layouts: PathBuf,
    pub assets: PathBuf,
    pub extra: PathBuf,
    pub output: PathBuf,
}

impl SitePaths {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            content: root.join(CONTENT_DIR),
            layouts: root.join(LAYOUTS_DIR),
            assets: root.join(ASSETS_DIR),
            extra: root.join(EXTRA_DIR),
            output: root.join(OUTPUT_DIR),
        }
    }

    /// Where the sitemap is written.
    pub fn sitemap(&self) -> PathBuf {
        self.output.join(SITEMAP_FILE)
    }

    /// Input directories whose changes trigger a rebuild.
    pub fn watched(&self) -> [&Path; 4] {
        [&self.content, &self.layouts, &self.assets, &self.extra]
    }

    /// Check whether a path lies inside the generated output.
    pub fn is_output(&self, path: &Path) -> bool {
        path.starts_with(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_paths_layout() {
        let paths = SitePaths::new(Path::new("/site"));
        assert_eq!(paths.content, PathBuf::from("/site/content"));
        assert_eq!(paths.layouts, PathBuf::from("/site/layouts"));
        assert_eq!(paths.output, PathBuf::from("/site/_output"));
        assert_eq!(paths.sitemap(), PathBuf::from("/site/_output/sitemap.xml"));
    }

    #[test]
    fn test_watched_excludes_output() {
        let paths = SitePaths::new(Path::new("/site"));
        assert!(!paths.watched().contains(&paths.output.as_path()));
        assert!(paths.is_output(Path::new("/site/_output/index.html")));
        assert!(!paths.is_output(Path::new("/site/content/index.html")));
    }
}
