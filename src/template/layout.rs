//! Layout wrapping.
//!
//! A page with `layout: base.html` is rendered by resolving
//! `layouts/base.html` with the page's variables plus `content`, the page's
//! own resolved body. Layouts are terminal: a `layout` key in a layout's
//! frontmatter is ignored.

use super::{Resolved, Resolver};
use crate::{
    diagnostic::Diagnostic,
    page::{Frontmatter, FrontmatterReader},
};
use std::fs;

/// Variable bound to the page body inside a layout.
pub const CONTENT_VAR: &str = "content";

/// Wrap an already resolved `body` in the layout named by `frontmatter`.
///
/// Without a `layout` key, or when the layout cannot be loaded, the body is
/// returned unchanged (the latter with a warning).
pub fn apply_layout(
    resolver: &Resolver<'_>,
    reader: &FrontmatterReader,
    frontmatter: &Frontmatter,
    body: String,
) -> Resolved {
    let Some(layout) = frontmatter.layout() else {
        return Resolved {
            text: body,
            diagnostics: Vec::new(),
        };
    };

    let unwrapped = |message: String| Resolved {
        text: body.clone(),
        diagnostics: vec![Diagnostic::warning(message)],
    };

    let Some(path) = resolver.layouts_path(&layout) else {
        return unwrapped(format!(
            "layout `{layout}` must be a relative path inside layouts/, page emitted without layout"
        ));
    };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            return unwrapped(format!(
                "layout `{layout}` could not be read ({e}), page emitted without layout"
            ));
        }
    };

    let parsed = reader.read(&raw);
    let mut diagnostics: Vec<_> = parsed
        .warnings
        .into_iter()
        .map(|w| Diagnostic::warning(w).in_file(&path))
        .collect();

    if let Some(nested) = parsed.frontmatter.layout() {
        diagnostics.push(
            Diagnostic::warning(format!(
                "layouts cannot have a layout, ignoring `layout: {nested}`"
            ))
            .in_file(&path),
        );
    }

    let mut vars = frontmatter.clone();
    vars.insert(CONTENT_VAR, body);

    let mut resolved = resolver.resolve_file(parsed.body, &vars, &path);
    diagnostics.append(&mut resolved.diagnostics);
    resolved.diagnostics = diagnostics;
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn site(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn render(layouts: &Path, fm: &Frontmatter, body: &str) -> Resolved {
        let resolver = Resolver::new(layouts, 10);
        apply_layout(&resolver, &FrontmatterReader::new(), fm, body.to_owned())
    }

    #[test]
    fn test_no_layout_returns_body() {
        let dir = site(&[]);
        let out = render(dir.path(), &Frontmatter::new(), "<p>X</p>");
        assert_eq!(out.text, "<p>X</p>");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_layout_content_only() {
        let dir = site(&[("base.html", r#"<template variable="content"></template>"#)]);
        let fm: Frontmatter = [("layout", "base.html")].into_iter().collect();
        let out = render(dir.path(), &fm, "<p>X</p>");
        assert_eq!(out.text, "<p>X</p>");
    }

    #[test]
    fn test_layout_places_body_once_with_page_vars() {
        let dir = site(&[
            ("base.html", r#"<html><template include="head.html"></template><body><template variable="content"></template></body></html>"#),
            ("head.html", r#"<title><template variable="title" default="Site"></template></title>"#),
        ]);
        let fm: Frontmatter = [("layout", "base.html"), ("title", "About")].into_iter().collect();
        let out = render(dir.path(), &fm, "<p>body</p>");

        assert_eq!(
            out.text,
            "<html><title>About</title><body><p>body</p></body></html>"
        );
        assert_eq!(out.text.matches("<p>body</p>").count(), 1);
    }

    #[test]
    fn test_content_key_is_overridden() {
        let dir = site(&[("base.html", r#"[<template variable="content"></template>]"#)]);
        let fm: Frontmatter = [("layout", "base.html"), ("content", "from frontmatter")]
            .into_iter()
            .collect();
        let out = render(dir.path(), &fm, "from body");
        assert_eq!(out.text, "[from body]");
    }

    #[test]
    fn test_missing_layout_keeps_body() {
        let dir = site(&[]);
        let fm: Frontmatter = [("layout", "gone.html")].into_iter().collect();
        let out = render(dir.path(), &fm, "<p>X</p>");
        assert_eq!(out.text, "<p>X</p>");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("gone.html"));
    }

    #[test]
    fn test_layouts_are_terminal() {
        let dir = site(&[
            ("inner.html", "---\nlayout: outer.html\n---\n<main><template variable=\"content\"></template></main>"),
            ("outer.html", "<html><template variable=\"content\"></template></html>"),
        ]);
        let fm: Frontmatter = [("layout", "inner.html")].into_iter().collect();
        let out = render(dir.path(), &fm, "x");

        assert_eq!(out.text, "<main>x</main>");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("outer.html"));
    }
}
