//! Site building orchestration.
//!
//! One build pass regenerates the whole output directory.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── check_inputs()       content/ and layouts/ must exist
//!     ├── prepare_output()     wipe and recreate _output/
//!     │
//!     ├── for each content/**/*.html
//!     │       ContentFile::load()  ──► frontmatter + body
//!     │       render_page()        ──► resolve body, wrap in layout
//!     │       write_page()         ──► _output/<relative>.html
//!     │
//!     ├── copy_static()        assets/ and extra/
//!     └── build_sitemap()      _output/sitemap.xml
//! ```
//!
//! A page that cannot be read or written is skipped and reported; the rest
//! of the pass continues. Input, output and sitemap failures abort the pass.

use crate::{
    assets::copy_static,
    config::{SiteConfig, SitePaths},
    diagnostic::Diagnostic,
    generator::sitemap::build_sitemap,
    log,
    page::{self, ContentFile, FrontmatterReader, PageError},
    template::{Resolved, Resolver, apply_layout},
};
use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use walkdir::WalkDir;

/// A page written during the current pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPage {
    /// Sitemap location (with `[base] url` when set)
    pub url: String,
    /// Root-relative URL
    pub url_path: String,
    /// `YYYY-MM-DD`, from the `date` key or the build date
    pub lastmod: String,
}

impl BuiltPage {
    pub fn is_root(&self) -> bool {
        self.url_path == "/"
    }
}

/// Outcome of a successful pass.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<BuiltPage>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// Build the entire site.
///
/// Returns `Err` only for failures that leave no usable output.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let started = Instant::now();
    let paths = &config.paths;

    check_inputs(paths)?;
    prepare_output(&paths.output)?;

    let reader = FrontmatterReader::new();
    let resolver = Resolver::new(&paths.layouts, config.build.max_include_depth);
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    let (sources, mut diagnostics) = collect_pages(&paths.content);
    let mut report = BuildReport::default();
    // output file -> source that produced it
    let mut produced: FxHashMap<PathBuf, PathBuf> = FxHashMap::default();

    for source in sources {
        match build_page(source.clone(), config, &reader, &resolver, &today, &mut produced) {
            Ok((page, page_diagnostics)) => {
                diagnostics.extend(page_diagnostics);
                report.pages.push(page);
            }
            Err(e) => diagnostics.push(Diagnostic::error(e.to_string()).in_file(&source)),
        }
    }
    report.diagnostics = diagnostics;

    let copied = copy_static(paths)?;
    if copied > 0 {
        log!("assets"; "copied {} files", copied);
    }

    build_sitemap(&report.pages, &paths.sitemap())?;

    log!(
        "build";
        "{} pages, {} warnings, {} errors in {:.2}s",
        report.pages.len(),
        report.warning_count(),
        report.error_count(),
        started.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Build one page and write it to the output directory.
fn build_page(
    source: PathBuf,
    config: &SiteConfig,
    reader: &FrontmatterReader,
    resolver: &Resolver<'_>,
    today: &str,
    produced: &mut FxHashMap<PathBuf, PathBuf>,
) -> Result<(BuiltPage, Vec<Diagnostic>), PageError> {
    let (page, mut diagnostics) = ContentFile::load(source, config, reader)?;

    if let Some(previous) = produced.get(&page.paths.html) {
        return Err(PageError::Collision {
            url: page.paths.url_path.clone(),
            previous: previous.clone(),
        });
    }

    let rendered = render_page(&page, resolver, reader);
    diagnostics.extend(
        rendered
            .diagnostics
            .into_iter()
            .map(|d| d.in_file(&page.paths.source)),
    );

    write_page(&page.paths.html, &rendered.text)?;
    produced.insert(page.paths.html.clone(), page.paths.source.clone());
    log!("content"; "{}", page.paths.relative);

    let lastmod = page
        .frontmatter
        .text("date")
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| today.to_owned());

    let built = BuiltPage {
        url: page.paths.full_url,
        url_path: page.paths.url_path,
        lastmod,
    };
    Ok((built, diagnostics))
}

/// Resolve a page body with its own frontmatter, then apply its layout.
pub fn render_page(page: &ContentFile, resolver: &Resolver<'_>, reader: &FrontmatterReader) -> Resolved {
    let body = resolver.resolve(&page.body, &page.frontmatter);
    let mut wrapped = apply_layout(resolver, reader, &page.frontmatter, body.text);

    let mut diagnostics = body.diagnostics;
    diagnostics.append(&mut wrapped.diagnostics);
    wrapped.diagnostics = diagnostics;
    wrapped
}

fn write_page(path: &Path, html: &str) -> Result<(), PageError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)
    };
    write().map_err(|source| PageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Inputs that must exist for a build to make sense.
fn check_inputs(paths: &SitePaths) -> Result<()> {
    if !paths.content.is_dir() {
        bail!("Content directory not found: {}", paths.content.display());
    }
    if !paths.layouts.is_dir() {
        bail!("Layouts directory not found: {}", paths.layouts.display());
    }
    Ok(())
}

/// Remove the previous output and recreate an empty directory.
fn prepare_output(output: &Path) -> Result<()> {
    if output.exists() {
        fs::remove_dir_all(output).with_context(|| {
            format!("Failed to clear output directory: {}", output.display())
        })?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Content pages in a stable order, plus diagnostics for unreadable entries.
fn collect_pages(content: &Path) -> (Vec<PathBuf>, Vec<Diagnostic>) {
    let mut pages = Vec::new();
    let mut diagnostics = Vec::new();

    for entry in WalkDir::new(content).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && page::is_page(entry.path()) => {
                pages.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                let diagnostic = Diagnostic::error(format!("unreadable: {e}"));
                diagnostics.push(match e.path() {
                    Some(path) => diagnostic.in_file(path),
                    None => diagnostic,
                });
            }
        }
    }

    (pages, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Site directory with the given files and an (empty) layouts root.
    fn site(files: &[(&str, &str)]) -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::for_root(dir.path());
        fs::create_dir_all(&config.paths.content).unwrap();
        fs::create_dir_all(&config.paths.layouts).unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        (dir, config)
    }

    fn output(config: &SiteConfig, rel: &str) -> String {
        fs::read_to_string(config.paths.output.join(rel)).unwrap()
    }

    #[test]
    fn test_variable_from_frontmatter() {
        let (_dir, config) = site(&[(
            "content/index.html",
            "---\ntitle: Hi\n---\n<h1><template variable=\"title\"></template></h1>",
        )]);
        build_site(&config).unwrap();
        assert_eq!(output(&config, "index.html"), "<h1>Hi</h1>");
    }

    #[test]
    fn test_numeric_values_render_as_written() {
        let (_dir, config) = site(&[(
            "content/index.html",
            "---\nversion: 1.0\nid: 12345678901234567890\nprice: 2.50\n---\n\
             <template variable=\"version\"></template>|\
             <template variable=\"id\"></template>|\
             <template variable=\"price\"></template>",
        )]);
        build_site(&config).unwrap();
        assert_eq!(output(&config, "index.html"), "1.0|12345678901234567890|2.50");
    }

    #[test]
    fn test_include_closing_tag_on_next_line() {
        let (_dir, config) = site(&[
            ("content/index.html", "<template include=\"h.html\">\n</template>"),
            ("layouts/h.html", "<header></header>"),
        ]);
        build_site(&config).unwrap();
        assert_eq!(output(&config, "index.html"), "<header></header>");
    }

    #[test]
    fn test_no_frontmatter_is_resolved_body() {
        let (_dir, config) = site(&[
            ("content/plain.html", "<p><template variable=\"x\" default=\"d\"></template></p><template include=\"nav.html\">"),
            ("layouts/nav.html", "<nav></nav>"),
        ]);
        build_site(&config).unwrap();
        assert_eq!(output(&config, "plain.html"), "<p>d</p><nav></nav>");
    }

    #[test]
    fn test_layout_wraps_body() {
        let (_dir, config) = site(&[
            ("content/page.html", "---\nlayout: base.html\n---\n<p>X</p>"),
            ("layouts/base.html", "<template variable=\"content\"></template>"),
        ]);
        build_site(&config).unwrap();
        assert_eq!(output(&config, "page.html"), "<p>X</p>");
    }

    #[test]
    fn test_include_scenario() {
        let (_dir, config) = site(&[
            ("content/index.html", "<body><template include=\"header.html\"></template></body>"),
            ("layouts/header.html", "<header></header>"),
        ]);
        build_site(&config).unwrap();
        assert_eq!(output(&config, "index.html"), "<body><header></header></body>");
    }

    #[test]
    fn test_sitemap_lists_every_page() {
        let (_dir, config) = site(&[
            ("content/index.html", "<p>home</p>"),
            ("content/about.html", "<p>about</p>"),
            ("content/notes.txt", "not a page"),
        ]);
        let report = build_site(&config).unwrap();

        assert_eq!(report.pages.len(), 2);
        let sitemap = output(&config, "sitemap.xml");
        assert_eq!(sitemap.matches("<url>").count(), 2);
        assert!(sitemap.contains("<loc>/</loc>"));
        assert!(sitemap.contains("<loc>/about.html</loc>"));
        assert!(!config.paths.output.join("notes.txt").exists());
    }

    #[test]
    fn test_sitemap_rebuilt_fresh() {
        let (dir, config) = site(&[
            ("content/index.html", "<p>home</p>"),
            ("content/old.html", "<p>old</p>"),
        ]);
        build_site(&config).unwrap();
        assert_eq!(output(&config, "sitemap.xml").matches("<url>").count(), 2);

        fs::remove_file(dir.path().join("content/old.html")).unwrap();
        let report = build_site(&config).unwrap();

        assert_eq!(report.pages.len(), 1);
        let sitemap = output(&config, "sitemap.xml");
        assert_eq!(sitemap.matches("<url>").count(), 1);
        assert!(!sitemap.contains("old.html"));
        assert!(!config.paths.output.join("old.html").exists());
    }

    #[test]
    fn test_lastmod_from_date() {
        let (_dir, config) = site(&[("content/post.html", "---\ndate: 2024-05-06\n---\nx")]);
        let report = build_site(&config).unwrap();
        assert_eq!(report.pages[0].lastmod, "2024-05-06");
        assert!(output(&config, "sitemap.xml").contains("<lastmod>2024-05-06</lastmod>"));
    }

    #[test]
    fn test_nested_paths_and_extension() {
        let (_dir, config) = site(&[("content/blog/post.htm", "post")]);
        let report = build_site(&config).unwrap();
        assert_eq!(output(&config, "blog/post.html"), "post");
        assert_eq!(report.pages[0].url_path, "/blog/post.html");
    }

    #[test]
    fn test_output_collision_skips_second_page() {
        let (_dir, config) = site(&[
            ("content/a.htm", "from htm"),
            ("content/a.html", "from html"),
        ]);
        let report = build_site(&config).unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.error_count(), 1);
        // sorted by file name: a.htm comes first
        assert_eq!(output(&config, "a.html"), "from htm");
    }

    #[test]
    fn test_bad_page_does_not_abort_build() {
        let (dir, config) = site(&[("content/good.html", "ok")]);
        fs::write(dir.path().join("content/bad.html"), [0xff, 0xfe]).unwrap();

        let report = build_site(&config).unwrap();
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(output(&config, "good.html"), "ok");
        assert!(output(&config, "sitemap.xml").contains("/good.html"));
    }

    #[test]
    fn test_circular_include_reports_warning() {
        let (_dir, config) = site(&[
            ("content/index.html", "<template include=\"a.html\">"),
            ("layouts/a.html", "<template include=\"b.html\">"),
            ("layouts/b.html", "<template include=\"a.html\">"),
        ]);
        let report = build_site(&config).unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
        assert!(output(&config, "index.html").contains("<template include=\"a.html\">"));
    }

    #[test]
    fn test_missing_layouts_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::for_root(dir.path());
        fs::create_dir_all(&config.paths.content).unwrap();
        assert!(build_site(&config).is_err());
    }

    #[test]
    fn test_missing_content_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::for_root(dir.path());
        fs::create_dir_all(&config.paths.layouts).unwrap();
        assert!(build_site(&config).is_err());
    }

    #[test]
    fn test_pretty_urls() {
        let (_dir, mut config) = site(&[
            ("content/index.html", "home"),
            ("content/about.html", "about"),
        ]);
        config.build.pretty_urls = true;
        build_site(&config).unwrap();

        assert_eq!(output(&config, "about/index.html"), "about");
        assert!(output(&config, "sitemap.xml").contains("<loc>/about/</loc>"));
    }

    #[test]
    fn test_static_files_copied() {
        let (_dir, config) = site(&[
            ("content/index.html", "home"),
            ("assets/css/site.css", "body{}"),
            ("extra/robots.txt", "User-agent: *"),
        ]);
        build_site(&config).unwrap();

        assert_eq!(output(&config, "assets/css/site.css"), "body{}");
        assert_eq!(output(&config, "robots.txt"), "User-agent: *");
    }
}
