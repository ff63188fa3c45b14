//! Capabilities the preview core consumes from its host environment.
//!
//! The core never talks to a concrete UI. It asks a [`PanelHost`] for a
//! [`WebviewPanel`], pushes HTML into it and listens for its lifecycle events.

mod file;
mod listeners;
mod save_feed;
mod watcher;

pub use file::FileHost;
pub use save_feed::SaveFeed;
pub use watcher::{is_relevant_save, SaveWatcher};

use crate::disposable::Disposable;
use crate::error::PanelError;
use std::fmt;
use std::str::FromStr;

/// Where the panel should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewColumn {
    #[default]
    Active,
    Beside,
    Numbered(u8),
}

impl FromStr for ViewColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(ViewColumn::Active),
            "beside" => Ok(ViewColumn::Beside),
            other => other
                .parse::<u8>()
                .ok()
                .filter(|n| *n > 0)
                .map(ViewColumn::Numbered)
                .ok_or_else(|| format!("invalid column '{}': expected active, beside or 1-255", s)),
        }
    }
}

impl fmt::Display for ViewColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewColumn::Active => write!(f, "active"),
            ViewColumn::Beside => write!(f, "beside"),
            ViewColumn::Numbered(n) => write!(f, "{}", n),
        }
    }
}

/// Options passed when a panel is created
#[derive(Debug, Clone, Default)]
pub struct PanelOptions {
    pub enable_scripts: bool,
}

/// The host surface that displays one HTML document.
///
/// All methods take `&self`; implementations use interior mutability and must
/// not hold a borrow while invoking listeners, since listeners may call back
/// into the panel (a dispose listener typically calls `dispose`).
pub trait WebviewPanel {
    /// Replace the displayed document as a whole.
    fn set_html(&self, html: &str) -> Result<(), PanelError>;

    /// Bring the panel into focus in `column` without touching its content.
    fn reveal(&self, column: ViewColumn);

    /// Resolve an asset path relative to the extension media root into a URI
    /// the document can reference.
    fn asset_uri(&self, relative: &str) -> String;

    /// Called once when the panel is closed, by the user or by `dispose`.
    fn on_did_dispose(&self, listener: Box<dyn Fn()>) -> Disposable;

    /// Called with the new visibility whenever the host reports a change.
    fn on_did_change_visibility(&self, listener: Box<dyn Fn(bool)>) -> Disposable;

    /// Destroy the panel. Must be idempotent.
    fn dispose(&self);
}

pub trait PanelHost {
    fn create_panel(
        &self,
        title: &str,
        column: ViewColumn,
        options: PanelOptions,
    ) -> Result<Box<dyn WebviewPanel>, PanelError>;

    /// Diagnostics channel for failures that have no caller to return to.
    fn show_error(&self, message: &str);
}
