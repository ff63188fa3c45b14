use notify::event::{EventKind, ModifyKind};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Watches a work tree and yields the paths of files written to it.
///
/// notify delivers events on its own thread; they are forwarded over a
/// channel so the save feed itself stays on the local event loop.
pub struct SaveWatcher {
    // Dropping the watcher stops it
    _watcher: RecommendedWatcher,
    receiver: UnboundedReceiver<PathBuf>,
}

impl SaveWatcher {
    pub fn start(root: &Path) -> notify::Result<Self> {
        let (sender, receiver) = unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_save_event(&event.kind) => {
                for path in event.paths {
                    if sender.send(path).is_err() {
                        return;
                    }
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("File watcher error: {}", e),
        })?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        log::debug!("Watching {} for saves", root.display());

        Ok(Self {
            _watcher: watcher,
            receiver,
        })
    }

    /// Wait for the next written path. `None` once the watcher has shut down.
    pub async fn next_save(&mut self) -> Option<PathBuf> {
        self.receiver.recv().await
    }
}

/// Editors save either in place or by writing a temp file and renaming it.
fn is_save_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

/// Whether a written path should be published as a save.
///
/// Git's own bookkeeping and anything under `ignored_roots` (such as the
/// preview output directory) never count, otherwise writing the preview would
/// trigger another refresh.
pub fn is_relevant_save(path: &Path, ignored_roots: &[PathBuf]) -> bool {
    if path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == ".git"))
    {
        return false;
    }
    !ignored_roots.iter().any(|root| path.starts_with(root))
}
