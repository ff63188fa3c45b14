//! Holds the one live preview panel.

use crate::disposable::Disposable;
use crate::error::PanelError;
use crate::host::ViewColumn;
use crate::panel::{DiffPanel, PanelContext, RefreshOutcome};
use crate::source::{RefreshSource, WatchedPath};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Slot = RefCell<Option<Rc<DiffPanel>>>;

/// A request to show a diff
#[derive(Debug, Clone)]
pub struct ShowRequest {
    pub column: Option<ViewColumn>,
    pub source: RefreshSource,
    pub watched_path: WatchedPath,
}

/// Owns the single-panel slot.
///
/// The slot is written by construction and cleared only by the disposal chain
/// of the panel it holds, so a disposed panel can never be handed out again.
pub struct PanelRegistry {
    ctx: Rc<PanelContext>,
    slot: Rc<Slot>,
    next_id: Cell<u64>,
}

impl PanelRegistry {
    pub fn new(ctx: Rc<PanelContext>) -> Self {
        Self {
            ctx,
            slot: Rc::new(RefCell::new(None)),
            next_id: Cell::new(1),
        }
    }

    pub fn active(&self) -> Option<Rc<DiffPanel>> {
        self.slot
            .borrow()
            .as_ref()
            .filter(|panel| !panel.is_disposed())
            .cloned()
    }

    /// Show `request` in the live panel, creating it if there is none.
    ///
    /// Reuse replaces the panel's source and watched path, reveals it and then
    /// refreshes it; a slow command never holds back the reveal. A refresh
    /// failure is reported by the panel itself and does not fail this call.
    pub async fn create_or_show(&self, request: ShowRequest) -> Result<Rc<DiffPanel>, PanelError> {
        let column = request.column.unwrap_or_default();

        if let Some(panel) = self.active() {
            log::debug!(
                "Reusing panel #{} (was watching {}, visible: {})",
                panel.id(),
                panel.watched_path(),
                panel.is_visible()
            );
            panel.update(request.source, request.watched_path)?;
            panel.reveal(column);
            log_outcome(&panel, panel.refresh().await);
            return Ok(panel);
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let panel = DiffPanel::create(
            id,
            Rc::clone(&self.ctx),
            column,
            request.source,
            request.watched_path,
            self.slot_clearer(id),
        )?;
        *self.slot.borrow_mut() = Some(Rc::clone(&panel));

        log_outcome(&panel, panel.refresh().await);
        Ok(panel)
    }

    /// Dispose the live panel, if any.
    pub fn dispose_active(&self) {
        if let Some(panel) = self.active() {
            panel.dispose();
        }
    }

    fn slot_clearer(&self, id: u64) -> Disposable {
        let slot: Weak<Slot> = Rc::downgrade(&self.slot);
        Disposable::new(move || {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let Ok(mut slot) = slot.try_borrow_mut() else {
                // `active` skips disposed panels, so the stale entry is inert
                // until the next construction overwrites it.
                log::warn!("Panel #{} released while the slot was borrowed", id);
                return;
            };
            if slot.as_ref().is_some_and(|panel| panel.id() == id) {
                *slot = None;
                log::debug!("Panel #{} released", id);
            }
        })
    }
}

fn log_outcome(panel: &DiffPanel, outcome: RefreshOutcome) {
    match outcome {
        RefreshOutcome::Rendered => {}
        RefreshOutcome::Failed(e) => log::debug!("Panel #{}: showing stale content ({})", panel.id(), e),
        other => log::debug!("Panel #{}: refresh ended as {:?}", panel.id(), other),
    }
}
