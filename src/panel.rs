//! The live diff preview panel.
//!
//! A [`DiffPanel`] owns one host panel. Everything it attaches to the host
//! (dispose hook, visibility hook, save listener) goes into a single
//! [`DisposableChain`] so teardown happens exactly once, in order, whichever
//! side initiates it.

use crate::disposable::{Disposable, DisposableChain};
use crate::error::{PanelError, RefreshError};
use crate::host::{PanelHost, PanelOptions, SaveFeed, ViewColumn, WebviewPanel};
use crate::render::{render_page, DiffHtmlRenderer, PageAssets, SCRIPT_ASSETS, STYLESHEET_ASSETS};
use crate::source::{CommandRunner, RefreshSource, WatchedPath};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::task::JoinHandle;

/// Collaborators shared by every panel a registry creates
pub struct PanelContext {
    pub host: Rc<dyn PanelHost>,
    pub runner: Rc<dyn CommandRunner>,
    pub renderer: Rc<dyn DiffHtmlRenderer>,
    pub save_feed: SaveFeed,
    pub title: String,
}

/// What a call to [`DiffPanel::refresh`] did
#[derive(Debug)]
pub enum RefreshOutcome {
    /// New content is displayed
    Rendered,
    /// A later refresh was issued while this one resolved; its result was dropped
    Superseded,
    /// Content left unchanged; the error was reported to the host
    Failed(RefreshError),
    /// The panel is gone
    Disposed,
}

pub struct DiffPanel {
    id: u64,
    panel: Rc<dyn WebviewPanel>,
    ctx: Rc<PanelContext>,
    source: RefCell<RefreshSource>,
    watched_path: RefCell<WatchedPath>,
    visible: Cell<bool>,
    refresh_seq: Cell<u64>,
    disposables: DisposableChain,
}

impl DiffPanel {
    /// Create the host panel and attach all hooks. `on_dispose` runs first
    /// during teardown; the registry uses it to clear its slot.
    ///
    /// Does not render; callers follow up with [`refresh`](Self::refresh).
    pub(crate) fn create(
        id: u64,
        ctx: Rc<PanelContext>,
        column: ViewColumn,
        source: RefreshSource,
        watched_path: WatchedPath,
        on_dispose: Disposable,
    ) -> Result<Rc<Self>, PanelError> {
        let options = PanelOptions {
            enable_scripts: true,
        };
        let panel: Rc<dyn WebviewPanel> =
            Rc::from(ctx.host.create_panel(&ctx.title, column, options)?);

        let this = Rc::new(Self {
            id,
            panel,
            ctx,
            source: RefCell::new(source),
            watched_path: RefCell::new(watched_path),
            visible: Cell::new(true),
            refresh_seq: Cell::new(0),
            disposables: DisposableChain::new(),
        });

        this.disposables.register(on_dispose);

        // Closing the host panel tears the whole instance down.
        let weak = Rc::downgrade(&this);
        this.disposables
            .register(this.panel.on_did_dispose(Box::new(move || {
                if let Some(panel) = weak.upgrade() {
                    panel.dispose();
                }
            })));

        let weak = Rc::downgrade(&this);
        this.disposables
            .register(this.panel.on_did_change_visibility(Box::new(move |visible| {
                if let Some(panel) = weak.upgrade() {
                    panel.set_visible(visible);
                }
            })));

        let weak = Rc::downgrade(&this);
        this.disposables
            .register(this.ctx.save_feed.subscribe(move |saved_path| {
                if let Some(panel) = weak.upgrade() {
                    panel.handle_save(saved_path);
                }
            }));

        let panel = Rc::clone(&this.panel);
        this.disposables.push(move || panel.dispose());

        log::debug!(
            "Panel #{} created (watching {})",
            this.id,
            this.watched_path.borrow()
        );
        Ok(this)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposables.is_disposed()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn source(&self) -> RefreshSource {
        self.source.borrow().clone()
    }

    pub fn watched_path(&self) -> WatchedPath {
        self.watched_path.borrow().clone()
    }

    /// Replace the refresh source and watched path wholesale.
    pub fn update(&self, source: RefreshSource, watched_path: WatchedPath) -> Result<(), PanelError> {
        if self.is_disposed() {
            return Err(PanelError::Disposed);
        }
        *self.source.borrow_mut() = source;
        *self.watched_path.borrow_mut() = watched_path;
        Ok(())
    }

    /// Resolve, render and display the current diff.
    ///
    /// Each call takes a ticket; if another refresh was issued while this one
    /// was waiting on its command, this result is dropped. On failure the
    /// previous document stays on screen and the error goes to the host's
    /// diagnostics channel.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self.is_disposed() {
            return RefreshOutcome::Disposed;
        }

        let ticket = self.refresh_seq.get() + 1;
        self.refresh_seq.set(ticket);
        let source = self.source();

        let resolved = source.resolve(self.ctx.runner.as_ref()).await;

        if self.is_disposed() {
            return RefreshOutcome::Disposed;
        }
        if ticket != self.refresh_seq.get() {
            log::debug!("Panel #{}: refresh {} superseded", self.id, ticket);
            return RefreshOutcome::Superseded;
        }

        let result = resolved
            .map_err(RefreshError::from)
            .and_then(|text| self.render(&text, source.command()))
            .and_then(|html| {
                self.panel
                    .set_html(&html)
                    .map_err(|e| RefreshError::Host(e.to_string()))
            });

        match result {
            Ok(()) => {
                log::debug!("Panel #{}: refresh {} rendered", self.id, ticket);
                RefreshOutcome::Rendered
            }
            Err(e) => {
                log::error!("Panel #{}: refresh failed: {}", self.id, e);
                self.ctx
                    .host
                    .show_error(&format!("Failed to refresh diff preview: {}", e));
                RefreshOutcome::Failed(e)
            }
        }
    }

    fn render(&self, diff: &str, command: Option<&str>) -> Result<String, RefreshError> {
        let fragment = self.ctx.renderer.render_fragment(diff)?;
        let assets = PageAssets {
            stylesheets: STYLESHEET_ASSETS
                .iter()
                .map(|asset| self.panel.asset_uri(asset))
                .collect(),
            scripts: SCRIPT_ASSETS
                .iter()
                .map(|asset| self.panel.asset_uri(asset))
                .collect(),
        };
        Ok(render_page(&self.ctx.title, &assets, &fragment, command))
    }

    pub fn reveal(&self, column: ViewColumn) {
        if self.is_disposed() {
            return;
        }
        self.panel.reveal(column);
    }

    /// Tear down the panel and everything attached to it. Safe to call twice.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        log::debug!("Panel #{} disposing", self.id);
        self.disposables.dispose_all();
    }

    fn set_visible(&self, visible: bool) {
        if self.visible.get() != visible {
            log::debug!("Panel #{} visible: {}", self.id, visible);
            self.visible.set(visible);
        }
    }

    /// Refresh on the local task set if `saved_path` matches the watched path.
    ///
    /// Must be called from within a `tokio::task::LocalSet` when it matches;
    /// see [`SaveFeed::publish`].
    pub fn handle_save(self: &Rc<Self>, saved_path: &str) -> Option<JoinHandle<RefreshOutcome>> {
        if self.is_disposed() || !self.watched_path.borrow().matches(saved_path) {
            return None;
        }
        log::debug!("Panel #{}: {} saved, refreshing", self.id, saved_path);
        let panel = Rc::clone(self);
        Some(tokio::task::spawn_local(async move { panel.refresh().await }))
    }
}

impl Drop for DiffPanel {
    fn drop(&mut self) {
        self.disposables.dispose_all();
    }
}
