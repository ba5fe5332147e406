use std::sync::Arc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::{ChangeKind, FileChangeEvent, WatchTarget, classify};
use crate::{Error, Result};

/// Maps a `notify` event kind; access and unknown events are dropped.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Add),
        EventKind::Remove(_) => Some(ChangeKind::Unlink),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(ChangeKind::Unlink),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(ChangeKind::Add),
        EventKind::Modify(_) => Some(ChangeKind::Change),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Classifies every path of a `notify` event. A rename carrying both paths
/// becomes an unlink of the old path and an add of the new one.
pub fn classify_event(targets: &[WatchTarget], event: &Event) -> Vec<FileChangeEvent> {
    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind
        && let [from, to] = event.paths.as_slice()
    {
        return [(from, ChangeKind::Unlink), (to, ChangeKind::Add)]
            .into_iter()
            .filter_map(|(path, kind)| classify(targets, path, kind))
            .collect();
    }

    let Some(kind) = change_kind(&event.kind) else {
        return Vec::new();
    };
    event
        .paths
        .iter()
        .filter_map(|path| classify(targets, path, kind))
        .collect()
}

/// Watches every existing target root and forwards classified events.
///
/// Watching stops when the `FileWatcher` is dropped or [`stop`](Self::stop)ped.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    targets: Arc<Vec<WatchTarget>>,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    pub fn start(
        targets: Vec<WatchTarget>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FileChangeEvent>)> {
        let targets = Arc::new(targets);
        let (tx, rx) = mpsc::unbounded_channel();

        let handler_targets = Arc::clone(&targets);
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for change in classify_event(&handler_targets, &event) {
                        tracing::debug!("{:?} {:?}: {}", change.area, change.kind, change.path.display());
                        if tx.send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => tracing::warn!("File watcher error: {}", e),
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::Watch(e.to_string()))?;

        for target in targets.iter() {
            if !target.root().is_dir() {
                tracing::debug!(
                    "Not watching {} ({}): not a directory",
                    target.name(),
                    target.root().display()
                );
                continue;
            }
            watcher
                .watch(target.root(), RecursiveMode::Recursive)
                .map_err(|e| {
                    Error::Watch(format!("{}: {}", target.root().display(), e))
                })?;
        }

        tracing::info!("File watching started for {} targets", targets.len());
        Ok((Self { watcher, targets }, rx))
    }

    pub fn targets(&self) -> &[WatchTarget] {
        &self.targets
    }

    pub fn stop(mut self) {
        for target in self.targets.iter() {
            let _ = self.watcher.unwatch(target.root());
        }
        tracing::info!("File watching stopped");
    }
}
