//! File system watcher for live rebuilds.
//!
//! Monitors `content/`, `layouts/`, `assets/` and `extra/` and runs a full
//! build after changes settle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Event Loop                          │
//! │                                                          │
//! │  ┌────────────────┐    ┌───────────┐    ┌─────────────┐  │
//! │  │ native watcher │───▶│ Debouncer │───▶│  rebuild()  │  │
//! │  │  or poller     │    │  (200ms)  │    │ full build  │  │
//! │  └────────────────┘    └───────────┘    └─────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The OS watcher is preferred. When it cannot be created, refuses one of
//! the directories, or `[watch] poll` is set, a [`PollWatcher`] compares
//! modification times instead. Both sit
//! behind the same [`Watcher`] trait and feed the same channel.

use crate::{
    build::{BuildReport, build_site},
    config::{SiteConfig, SitePaths},
    log, logger,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    time::{Duration, Instant},
};

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with(".#")
        || name == ".DS_Store"
}

/// Format path relative to the site root for log display.
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events; every new event restarts the quiet window.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    window: Duration,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            window,
        }
    }

    /// Record the interesting paths of an event.
    fn add(&mut self, event: Event, paths: &SitePaths) {
        let mut relevant = event
            .paths
            .into_iter()
            .filter(|p| !paths.is_output(p) && !is_temp_file(p))
            .peekable();

        if relevant.peek().is_some() {
            self.pending.extend(relevant);
            self.last_event = Some(Instant::now());
        }
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty() && self.last_event.is_some_and(|t| t.elapsed() >= self.window)
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn timeout(&self) -> Duration {
        match self.last_event {
            Some(t) if !self.pending.is_empty() => self.window.saturating_sub(t.elapsed()),
            _ => Duration::from_secs(60),
        }
    }
}

// =============================================================================
// Observers
// =============================================================================

/// Which change source is feeding the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverKind {
    /// OS notifications (inotify, FSEvents, ReadDirectoryChangesW)
    Native,
    /// Periodic modification-time scan
    Polling,
}

impl ObserverKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Polling => "polling",
        }
    }
}

type EventSender = mpsc::Sender<notify::Result<Event>>;
type Observer = Box<dyn Watcher + Send>;

fn native_observer(tx: EventSender) -> notify::Result<Observer> {
    Ok(Box::new(notify::recommended_watcher(tx)?))
}

fn polling_observer(tx: EventSender, config: &SiteConfig) -> Result<Observer> {
    let poll_config = notify::Config::default().with_poll_interval(config.watch.poll_interval());
    let watcher = PollWatcher::new(tx, poll_config).context("Failed to create polling watcher")?;
    Ok(Box::new(watcher))
}

/// Start the best available observer on every input directory.
///
/// The native watcher is dropped in favor of polling when it cannot be
/// created or refuses a directory (e.g. inotify watch limit reached).
fn start_observer<N>(
    tx: EventSender,
    config: &SiteConfig,
    native: N,
) -> Result<(Observer, ObserverKind, Vec<PathBuf>)>
where
    N: FnOnce(EventSender) -> notify::Result<Observer>,
{
    if !config.watch.poll {
        let started = native(tx.clone())
            .map_err(anyhow::Error::from)
            .and_then(|mut watcher| {
                let watched = setup_watchers(watcher.as_mut(), &config.paths)?;
                Ok((watcher, watched))
            });

        match started {
            Ok((watcher, watched)) => return Ok((watcher, ObserverKind::Native, watched)),
            Err(e) => log!("watch"; "native watcher unavailable ({e:#}), polling instead"),
        }
    }

    let mut watcher = polling_observer(tx, config)?;
    let watched = setup_watchers(watcher.as_mut(), &config.paths)?;
    Ok((watcher, ObserverKind::Polling, watched))
}

/// Watch every existing input directory recursively.
fn setup_watchers(watcher: &mut dyn Watcher, paths: &SitePaths) -> Result<Vec<PathBuf>> {
    let mut watched = Vec::new();
    for dir in paths.watched().into_iter().filter(|p| p.is_dir()) {
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        watched.push(dir.to_path_buf());
    }
    Ok(watched)
}

// =============================================================================
// Rebuild
// =============================================================================

/// Run a full rebuild for a batch of changed paths.
///
/// Every page is rebuilt regardless of which file changed. Errors are logged
/// and returned; they never stop the watch loop.
pub fn rebuild(changed: &[PathBuf], config: &SiteConfig) -> Result<BuildReport> {
    let root = config.get_root();
    match changed {
        [] => log!("watch"; "rebuilding..."),
        [one] => log!("watch"; "{} changed, rebuilding...", rel_path(one, root)),
        [first, rest @ ..] => log!(
            "watch";
            "{} and {} more changed, rebuilding...",
            rel_path(first, root),
            rest.len()
        ),
    }

    let result = build_site(config);
    match &result {
        Ok(report) => logger::report(&report.diagnostics),
        Err(e) => log!("error"; "rebuild failed: {e:#}"),
    }
    result
}

// =============================================================================
// Public API
// =============================================================================

/// Start blocking file watcher with debouncing and full rebuilds.
///
/// `on_rebuild` is called with the outcome of every triggered build.
pub fn watch_for_changes_blocking<F>(config: &SiteConfig, mut on_rebuild: F) -> Result<()>
where
    F: FnMut(&Result<BuildReport>),
{
    let (tx, rx) = mpsc::channel();
    // Dropping the observer would disconnect the channel
    let (_observer, kind, watched) = start_observer(tx, config, native_observer)?;

    let root = config.get_root();
    let dirs: Vec<_> = watched.iter().map(|p| format!("{}/", rel_path(p, root))).collect();
    log!("watch"; "{} ({})", dirs.join(", "), kind.name());

    let mut debouncer = Debouncer::new(config.watch.debounce());

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => debouncer.add(event, &config.paths),
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                let changed = debouncer.take();
                on_rebuild(&rebuild(&changed, config));
            }
            Err(RecvTimeoutError::Disconnected) => break,
            // Irrelevant events, timeout without pending changes
            _ => {}
        }
    }

    Ok(())
}
