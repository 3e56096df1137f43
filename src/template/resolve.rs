//! Recursive directive substitution.
//!
//! # Resolution
//!
//! ```text
//! resolve(text, vars)
//!     │
//!     ├── variable ──► vars[name] │ default │ ""
//!     │
//!     └── include ───► read layouts/<path>
//!                          │
//!                          └── resolve(partial, vars)   depth + 1
//! ```
//!
//! Tags are replaced left to right in a single pass per level. Substituted
//! values are never scanned again. Partials see the variables of the page
//! that (transitively) included them.

use super::{Directive, scan};
use crate::{diagnostic::Diagnostic, page::Frontmatter};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Output of a resolution pass.
#[derive(Debug, Default)]
pub struct Resolved {
    pub text: String,
    /// Recovered problems: missing partials, the recursion bound
    pub diagnostics: Vec<Diagnostic>,
}

/// Substitutes directives, reading partials from the layouts root.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    layouts: &'a Path,
    max_depth: usize,
}

impl<'a> Resolver<'a> {
    pub const fn new(layouts: &'a Path, max_depth: usize) -> Self {
        Self { layouts, max_depth }
    }

    /// Resolve page text.
    pub fn resolve(&self, text: &str, vars: &Frontmatter) -> Resolved {
        let mut resolved = Resolved {
            text: String::with_capacity(text.len()),
            diagnostics: Vec::new(),
        };
        self.resolve_at(text, vars, 0, None, &mut resolved);
        resolved
    }

    /// Resolve text read from `origin` (a layout), tagging diagnostics with it.
    pub fn resolve_file(&self, text: &str, vars: &Frontmatter, origin: &Path) -> Resolved {
        let mut resolved = Resolved {
            text: String::with_capacity(text.len()),
            diagnostics: Vec::new(),
        };
        self.resolve_at(text, vars, 0, Some(origin), &mut resolved);
        resolved
    }

    /// Map a path written in a tag or a `layout` key to a file under the
    /// layouts root. Absolute paths and `..` are refused.
    pub fn layouts_path(&self, rel: &str) -> Option<PathBuf> {
        let rel = Path::new(rel.trim());
        let is_plain = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        (is_plain && rel.components().next().is_some()).then(|| self.layouts.join(rel))
    }

    fn resolve_at(
        &self,
        text: &str,
        vars: &Frontmatter,
        depth: usize,
        origin: Option<&Path>,
        out: &mut Resolved,
    ) {
        let mut cursor = 0;

        for tag in scan(text) {
            out.text.push_str(&text[cursor..tag.span.start]);
            cursor = tag.span.end;

            match &tag.directive {
                Directive::Variable { name, default } => match vars.get(name) {
                    Some(value) => out.text.push_str(&value.to_string()),
                    None => out.text.push_str(default.as_deref().unwrap_or_default()),
                },
                Directive::Include { path } => {
                    self.include(path, tag.source, vars, depth, origin, out);
                }
            }
        }

        out.text.push_str(&text[cursor..]);
    }

    fn include(
        &self,
        include: &str,
        tag_source: &str,
        vars: &Frontmatter,
        depth: usize,
        origin: Option<&Path>,
        out: &mut Resolved,
    ) {
        let warn = |out: &mut Resolved, message: String| {
            let diagnostic = Diagnostic::warning(message);
            out.diagnostics.push(match origin {
                Some(path) => diagnostic.in_file(path),
                None => diagnostic,
            });
        };

        if depth >= self.max_depth {
            warn(
                out,
                format!(
                    "include `{include}` exceeds the nesting limit of {}, left unresolved (circular include?)",
                    self.max_depth
                ),
            );
            out.text.push_str(tag_source);
            return;
        }

        let Some(path) = self.layouts_path(include) else {
            warn(out, format!("include `{include}` must be a relative path inside layouts/"));
            return;
        };

        match fs::read_to_string(&path) {
            Ok(partial) => self.resolve_at(&partial, vars, depth + 1, Some(&path), out),
            Err(e) => warn(out, format!("include `{include}` could not be read: {e}")),
        }
    }
}
