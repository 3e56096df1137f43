//! Static file copying.
//!
//! - `assets/<path>` → `_output/assets/<path>`
//! - `extra/<path>`  → `_output/<path>`
//!
//! Files are copied byte for byte. Missing source directories are skipped.

use crate::config::{SitePaths, paths::ASSETS_DIR};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Copy `assets/` and `extra/` into the output directory.
///
/// Returns the number of files copied.
pub fn copy_static(paths: &SitePaths) -> Result<usize> {
    let assets = copy_tree(&paths.assets, &paths.output.join(ASSETS_DIR))?;
    let extra = copy_tree(&paths.extra, &paths.output)?;
    Ok(assets + extra)
}

/// Recursively copy every file under `src` to the same relative path under `dest`.
fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to read {}", src.display()))?;
        if !entry.file_type().is_file() || is_ignored(entry.path()) {
            continue;
        }

        let rel = entry.path().strip_prefix(src)?;
        let target = dest.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target).with_context(|| {
            format!("Failed to copy {} to {}", entry.path().display(), target.display())
        })?;
        count += 1;
    }

    Ok(count)
}

fn is_ignored(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| IGNORED_FILES.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_static() {
        let dir = TempDir::new().unwrap();
        let paths = SitePaths::new(dir.path());
        fs::create_dir_all(paths.assets.join("img")).unwrap();
        fs::create_dir_all(paths.extra.join(".well-known")).unwrap();
        fs::write(paths.assets.join("img/logo.svg"), "<svg/>").unwrap();
        fs::write(paths.assets.join(".DS_Store"), "").unwrap();
        fs::write(paths.extra.join("CNAME"), "example.com").unwrap();
        fs::write(paths.extra.join(".well-known/security.txt"), "x").unwrap();

        let copied = copy_static(&paths).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(fs::read_to_string(paths.output.join("assets/img/logo.svg")).unwrap(), "<svg/>");
        assert_eq!(fs::read_to_string(paths.output.join("CNAME")).unwrap(), "example.com");
        assert!(paths.output.join(".well-known/security.txt").is_file());
        assert!(!paths.output.join("assets/.DS_Store").exists());
    }

    #[test]
    fn test_copy_static_without_sources() {
        let dir = TempDir::new().unwrap();
        let paths = SitePaths::new(dir.path());
        assert_eq!(copy_static(&paths).unwrap(), 0);
    }
}
