use std::path::{Path, PathBuf};

use log::warn;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{AppError, Result};

/// Keeps a filesystem watcher alive for as long as the value is held.
pub struct PreferenceWatcher {
    _watcher: RecommendedWatcher,
}

/// Invoke `on_change` whenever the preferences file is created, modified, or removed.
///
/// The parent directory is watched rather than the file itself so that editors
/// replacing the file atomically are still observed.
pub fn watch_preferences<F>(path: &Path, on_change: F) -> Result<PreferenceWatcher>
where
    F: Fn() + Send + 'static,
{
    let target: PathBuf = path.to_path_buf();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    let file_name = target.file_name().map(|name| name.to_os_string());
    let mut watcher =
        notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) if is_relevant_event(&event.kind) => {
                let touches_file = event
                    .paths
                    .iter()
                    .any(|changed| changed.file_name().map(|n| n.to_os_string()) == file_name);
                if touches_file {
                    on_change();
                }
            }
            Ok(_) => {}
            Err(err) => warn!("Preferences watch error: {err}"),
        })
        .map_err(|err| AppError::message(format!("Failed to start watcher: {err}")))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|err| AppError::message(format!("Failed to watch preferences: {err}")))?;

    Ok(PreferenceWatcher { _watcher: watcher })
}

fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}
