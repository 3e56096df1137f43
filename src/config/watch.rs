//! `[watch]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[watch]` section in stencil.toml - rebuild trigger settings.
///
/// # Example
/// ```toml
/// [watch]
/// debounce_ms = 200
/// poll = true             # skip OS notifications, poll mtimes instead
/// poll_interval_ms = 1000
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Quiet period after the last change before a rebuild starts.
    #[serde(default = "defaults::watch::debounce_ms")]
    #[educe(Default = defaults::watch::debounce_ms())]
    pub debounce_ms: u64,

    /// Always use the polling watcher.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub poll: bool,

    /// Scan interval of the polling watcher.
    #[serde(default = "defaults::watch::poll_interval_ms")]
    #[educe(Default = defaults::watch::poll_interval_ms())]
    pub poll_interval_ms: u64,
}

impl WatchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
