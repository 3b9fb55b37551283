use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::config_io::CONFIG_FILE;

/// Change notifications for the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A note was created or its contents changed
    Modified(PathBuf),
    Renamed(PathBuf),
    Deleted(PathBuf),
    /// boardwalk.toml changed
    ConfigChanged,
}

impl StoreEvent {
    pub fn path(&self) -> Option<&Path> {
        match self {
            StoreEvent::Modified(p) | StoreEvent::Renamed(p) | StoreEvent::Deleted(p) => Some(p),
            StoreEvent::ConfigChanged => None,
        }
    }
}

/// Translate a raw notify event into vault events
fn classify(event: Event, root: &Path) -> Vec<StoreEvent> {
    let make: fn(PathBuf) -> StoreEvent = match event.kind {
        EventKind::Modify(ModifyKind::Name(_)) => StoreEvent::Renamed,
        EventKind::Create(_) | EventKind::Modify(_) => StoreEvent::Modified,
        EventKind::Remove(_) => StoreEvent::Deleted,
        _ => return Vec::new(),
    };

    let mut out = Vec::new();
    for path in event.paths {
        if !path.starts_with(root) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path);
        // Skip anything under a hidden directory (.git, .obsidian, temp files)
        let hidden = relative.components().any(|c| {
            c.as_os_str()
                .to_str()
                .is_some_and(|s| s.starts_with('.'))
        });
        if hidden {
            continue;
        }
        if relative == Path::new(CONFIG_FILE) {
            if !out.contains(&StoreEvent::ConfigChanged) {
                out.push(StoreEvent::ConfigChanged);
            }
            continue;
        }
        if relative.extension().and_then(|e| e.to_str()) == Some("md") {
            out.push(make(relative.to_path_buf()));
        }
    }
    out
}

/// A file system watcher for a vault directory.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StoreEvent>,
}

impl VaultWatcher {
    /// Start watching the vault root recursively.
    /// Returns a `VaultWatcher` whose `poll()` method should be called each tick.
    pub fn start(root: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let root_owned = root.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "watch error");
                        return;
                    }
                };
                for evt in classify(event, &root_owned) {
                    let _ = tx.send(evt);
                }
            },
            Config::default(),
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(VaultWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending events.
    pub fn poll(&self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}
