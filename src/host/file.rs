use super::listeners::Listeners;
use super::{PanelHost, PanelOptions, ViewColumn, WebviewPanel};
use crate::disposable::Disposable;
use crate::error::PanelError;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const INDEX_FILE: &str = "index.html";
const MEDIA_DIR: &str = "media";

/// Host that renders the preview into `<out>/index.html` for a browser.
pub struct FileHost {
    out_dir: PathBuf,
    /// (path relative to the media dir, contents)
    assets: Vec<(String, String)>,
    live: Rc<Cell<bool>>,
}

impl FileHost {
    pub fn new(out_dir: impl Into<PathBuf>, assets: Vec<(String, String)>) -> Self {
        Self {
            out_dir: out_dir.into(),
            assets,
            live: Rc::new(Cell::new(false)),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.out_dir.join(INDEX_FILE)
    }

    fn write_assets(&self, media_root: &Path) -> std::io::Result<()> {
        for (relative, contents) in &self.assets {
            let path = media_root.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, contents)?;
        }
        Ok(())
    }
}

impl PanelHost for FileHost {
    fn create_panel(
        &self,
        title: &str,
        column: ViewColumn,
        options: PanelOptions,
    ) -> Result<Box<dyn WebviewPanel>, PanelError> {
        if self.live.get() {
            return Err(PanelError::Host(format!(
                "a preview is already being written to {}",
                self.out_dir.display()
            )));
        }

        std::fs::create_dir_all(&self.out_dir).map_err(|e| {
            PanelError::Host(format!("Failed to create {}: {}", self.out_dir.display(), e))
        })?;
        let out_dir = std::fs::canonicalize(&self.out_dir)
            .map_err(|e| PanelError::Host(format!("Failed to resolve output dir: {}", e)))?;
        let media_root = out_dir.join(MEDIA_DIR);
        self.write_assets(&media_root)
            .map_err(|e| PanelError::Host(format!("Failed to write assets: {}", e)))?;

        self.live.set(true);
        log::debug!(
            "Created panel '{}' in column {} (scripts: {})",
            title,
            column,
            options.enable_scripts
        );

        Ok(Box::new(FilePanel {
            index_path: out_dir.join(INDEX_FILE),
            media_root,
            disposed: Cell::new(false),
            dispose_listeners: Listeners::default(),
            visibility_listeners: Listeners::default(),
            live: Rc::clone(&self.live),
        }))
    }

    fn show_error(&self, message: &str) {
        log::error!("{}", message);
        eprintln!("diffpane: {}", message);
    }
}

struct FilePanel {
    index_path: PathBuf,
    media_root: PathBuf,
    disposed: Cell<bool>,
    dispose_listeners: Listeners<dyn Fn()>,
    // A file is always "visible"; kept so the hook contract holds.
    visibility_listeners: Listeners<dyn Fn(bool)>,
    live: Rc<Cell<bool>>,
}

impl WebviewPanel for FilePanel {
    fn set_html(&self, html: &str) -> Result<(), PanelError> {
        if self.disposed.get() {
            return Err(PanelError::Disposed);
        }
        // Write then rename so a reader never sees half a document.
        let tmp = self.index_path.with_extension("html.tmp");
        std::fs::write(&tmp, html)
            .and_then(|_| std::fs::rename(&tmp, &self.index_path))
            .map_err(|e| {
                PanelError::Host(format!("Failed to write {}: {}", self.index_path.display(), e))
            })
    }

    fn reveal(&self, column: ViewColumn) {
        if self.disposed.get() {
            return;
        }
        log::info!(
            "Preview ready at {} (column {})",
            self.index_path.display(),
            column
        );
    }

    fn asset_uri(&self, relative: &str) -> String {
        let path = self.media_root.join(relative);
        url::Url::from_file_path(&path)
            .map(String::from)
            .unwrap_or_else(|_| path.display().to_string())
    }

    fn on_did_dispose(&self, listener: Box<dyn Fn()>) -> Disposable {
        self.dispose_listeners.add(Rc::from(listener))
    }

    fn on_did_change_visibility(&self, listener: Box<dyn Fn(bool)>) -> Disposable {
        self.visibility_listeners.add(Rc::from(listener))
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.live.set(false);
        log::debug!("Disposed panel at {}", self.index_path.display());
        for listener in self.dispose_listeners.snapshot() {
            listener();
        }
    }
}
