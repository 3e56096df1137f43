//! Site configuration management for `stencil.toml`.
//!
//! The config file is optional; a site without one builds with defaults.
//! Directory names are fixed (see [`paths`]) and only derived from the
//! site root given on the command line.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `[base]`    | Site URL used for sitemap locations             |
//! | `[build]`   | Output layout and include nesting limit         |
//! | `[serve]`   | Preview server (interface, port)                |
//! | `[watch]`   | Debounce window and polling fallback            |
//!
//! # Example
//!
//! ```toml
//! [base]
//! url = "https://example.com"
//!
//! [build]
//! pretty_urls = true
//!
//! [serve]
//! port = 3000
//!
//! [watch]
//! debounce_ms = 200
//! ```

mod base;
mod build;
pub mod defaults;
mod error;
pub mod paths;
mod serve;
mod watch;

use base::BaseConfig;
use build::BuildConfig;
use error::ConfigError;
use serve::ServeConfig;
use watch::WatchConfig;

pub use paths::SitePaths;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Name of the optional config file inside the site directory.
pub const CONFIG_FILE: &str = "stencil.toml";

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure, constructed once at startup and passed by
/// reference to the builder, the watcher and the server.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (may not exist)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site directories resolved against the root
    #[serde(skip)]
    pub paths: SitePaths,

    #[serde(default)]
    pub base: BaseConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the configuration of the site rooted at `root`.
    ///
    /// Reads `stencil.toml` when present, otherwise starts from defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let root = Self::normalize_path(root);
        let config_path = root.join(CONFIG_FILE);

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.config_path = config_path;
        config.set_root(&root);
        Ok(config)
    }

    /// Defaults for a site rooted at `root`, without reading any file.
    #[cfg(test)]
    pub fn for_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.config_path = root.join(CONFIG_FILE);
        config.set_root(root);
        config
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.paths.root
    }

    /// Set the root directory path, re-deriving every site directory
    pub fn set_root(&mut self, path: &Path) {
        self.paths = SitePaths::new(path);
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        if let Commands::Serve { server } | Commands::Watch { server } = &cli.command {
            Self::update_option(&mut self.serve.interface, server.interface.as_ref());
            Self::update_option(&mut self.serve.port, server.port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.paths.root.is_dir() {
            bail!(
                "Site directory not found: {}",
                self.paths.root.display()
            );
        }

        if let Some(base_url) = &self.base.url
            && !base_url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        if self.build.max_include_depth == 0 {
            bail!(ConfigError::Validation(
                "[build.max_include_depth] must be at least 1".into()
            ));
        }

        if self.watch.poll_interval_ms == 0 {
            bail!(ConfigError::Validation(
                "[watch.poll_interval_ms] must be greater than 0".into()
            ));
        }

        if self.serve.interface.parse::<std::net::IpAddr>().is_err() {
            bail!(ConfigError::Validation(format!(
                "[serve.interface] `{}` is not an IP address",
                self.serve.interface
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ServeArgs;
    use tempfile::TempDir;

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [base]
            url = "https://example.com"
            [serve]
            port = 8000
        "#,
        )
        .unwrap();
        assert_eq!(config.base.url.as_deref(), Some("https://example.com"));
        assert_eq!(config.serve.port, 8000);
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str("[serve\nport = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_without_config_file() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::load(dir.path()).unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.get_root(), root);
        assert_eq!(config.paths.content, root.join("content"));
        assert_eq!(config.config_path, root.join(CONFIG_FILE));
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn test_load_reads_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[build]\npretty_urls = true\n").unwrap();

        let config = SiteConfig::load(dir.path()).unwrap();
        assert!(config.build.pretty_urls);
    }

    #[test]
    fn test_update_with_cli_overrides_serve() {
        let mut config = SiteConfig::default();
        let cli = Cli {
            site: PathBuf::from("."),
            command: Commands::Watch {
                server: ServeArgs {
                    interface: Some("0.0.0.0".into()),
                    port: Some(9000),
                },
            },
        };
        config.update_with_cli(&cli);

        assert_eq!(config.serve.interface, "0.0.0.0");
        assert_eq!(config.serve.port, 9000);
    }

    #[test]
    fn test_update_with_cli_keeps_config_values() {
        let mut config = SiteConfig::default();
        config.serve.port = 4000;
        let cli = Cli {
            site: PathBuf::from("."),
            command: Commands::Serve {
                server: ServeArgs::default(),
            },
        };
        config.update_with_cli(&cli);
        assert_eq!(config.serve.port, 4000);
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::for_root(dir.path());
        assert!(config.validate().is_ok());

        config.base.url = Some("example.com".into());
        assert!(config.validate().is_err());

        config.base.url = None;
        config.build.max_include_depth = 0;
        assert!(config.validate().is_err());

        config.build.max_include_depth = 10;
        config.serve.interface = "localhost:80".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_missing_root() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::for_root(&dir.path().join("nope"));
        assert!(config.validate().is_err());
    }
}
