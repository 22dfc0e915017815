//! Tip/anchor controller
//!
//! Holds the single transient popup and the edit-in-progress flag.

use doc_model::{PageNumber, Tip, ViewportPosition};
use viewer_core::{position_to_viewport, PageViewport};

/// Why an automatic tip may not be shown right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TipBlockers {
    pub selecting: bool,
    pub ghost_pending: bool,
    pub dragging: bool,
}

impl TipBlockers {
    pub fn any(&self) -> bool {
        self.selecting || self.ghost_pending || self.dragging
    }
}

#[derive(Debug)]
pub struct TipController<T> {
    tip: Option<Tip<T>>,
    edit_in_progress: bool,
}

impl<T> TipController<T> {
    pub fn new() -> Self {
        Self { tip: None, edit_in_progress: false }
    }

    /// Show a tip unless a gesture or an edit is in progress.
    pub fn show(&mut self, tip: Tip<T>, blockers: TipBlockers) -> bool {
        if blockers.any() || self.edit_in_progress {
            return false;
        }
        self.tip = Some(tip);
        true
    }

    /// Replace the tip unconditionally.
    pub fn set(&mut self, tip: Option<Tip<T>>) {
        self.tip = tip;
    }

    pub fn hide(&mut self) -> bool {
        self.tip.take().is_some()
    }

    /// Tear down the tip if it is anchored on `page`.
    pub fn hide_on_page(&mut self, page: PageNumber) -> bool {
        if self.tip.as_ref().is_some_and(|tip| tip.page_number() == page) {
            self.tip = None;
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&Tip<T>> {
        self.tip.as_ref()
    }

    /// Anchor of the current tip on the page's current viewport.
    pub fn anchor(&self, viewport: &PageViewport) -> Option<ViewportPosition> {
        let tip = self.tip.as_ref()?;
        position_to_viewport(&tip.position, viewport)
    }

    pub fn set_edit_in_progress(&mut self, edit_in_progress: bool) {
        self.edit_in_progress = edit_in_progress;
    }

    pub fn is_edit_in_progress(&self) -> bool {
        self.edit_in_progress
    }
}

impl<T> Default for TipController<T> {
    fn default() -> Self {
        Self::new()
    }
}
