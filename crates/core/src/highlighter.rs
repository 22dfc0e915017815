//! PDF highlighter engine
//!
//! [`PdfHighlighter`] wires selection capture, the layer manager, the tip
//! controller, and the scroll controller to a [`ViewerHost`]. The host's event
//! loop forwards input, selection changes, scrolls, resizes, and page
//! lifecycle notifications, and calls [`PdfHighlighter::tick`] when
//! [`PdfHighlighter::next_deadline`] is reached.
//!
//! Every mutation that can change what is drawn ends with a layer render, so a
//! render triggered by an event reflects all state changed before it.

use crate::config::HighlighterConfig;
use crate::error::{HighlightError, HighlightResult};
use crate::host::{AreaSelectionPredicate, Key, PointerEvent, SelectionRange, ViewerHost};
use crate::layer::HighlightLayerManager;
use crate::scroll::{ScrollController, ScrollOutcome};
use crate::selection::{
    PendingSelection, PendingToken, SelectionCapture, SelectionChange, SelectionState,
};
use crate::tip::{TipBlockers, TipController};
use doc_model::{
    GhostHighlight, Highlight, HighlightContent, HighlightEdit, HighlightId, HighlightKind,
    PageNumber, PageRect, ReferencePosition, Tip, ViewportPosition,
};
use pdf_highlighter_scheduler::{earliest, Debouncer};
use std::time::Instant;
use viewer_core::{place_tip, to_reference, TipPlacement};

/// Notifications for the caller
#[derive(Debug, Clone, PartialEq)]
pub enum HighlighterEvent {
    /// A selection settled; answer with `commit` or `cancel`
    SelectionFinished(PendingSelection),

    /// The user scrolled away from the scrolled-to highlight
    ScrolledAway,
}

/// Highlight overlay engine for one document
///
/// `T` is the caller's tip content type.
pub struct PdfHighlighter<H: ViewerHost, T> {
    host: H,
    config: HighlighterConfig,
    highlights: Vec<Highlight>,
    selection: SelectionCapture,
    layers: HighlightLayerManager<H::Surface>,
    tips: TipController<T>,
    scroll: ScrollController,
    rescale: Debouncer<()>,
    area_selection: Option<AreaSelectionPredicate>,
}

impl<H: ViewerHost, T> PdfHighlighter<H, T> {
    /// Create an engine for the document shown by `host`
    pub fn new(host: H, config: HighlighterConfig) -> Self {
        Self {
            selection: SelectionCapture::new(
                config.selection_debounce(),
                config.multi_page_policy,
                config.min_area_size_px,
            ),
            layers: HighlightLayerManager::new(),
            tips: TipController::new(),
            scroll: ScrollController::new(config.scroll_margin_px, config.scroll_settle()),
            rescale: Debouncer::new(config.resize_debounce()),
            highlights: Vec::new(),
            area_selection: None,
            config,
            host,
        }
    }

    /// Enable area selection for pointer-downs accepted by `predicate`
    pub fn with_area_selection(
        mut self,
        predicate: impl Fn(&PointerEvent) -> bool + 'static,
    ) -> Self {
        self.area_selection = Some(Box::new(predicate));
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &HighlighterConfig {
        &self.config
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn layers(&self) -> &HighlightLayerManager<H::Surface> {
        &self.layers
    }

    pub fn ghost(&self) -> Option<&GhostHighlight> {
        self.selection.ghost()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    /// Live area-drag rectangle, for drawing the rubber band
    pub fn drag_rect(&self) -> Option<PageRect> {
        self.selection.drag_rect()
    }

    pub fn scrolled_to(&self) -> Option<&HighlightId> {
        self.scroll.scrolled_to()
    }

    /// Apply the configured zoom and draw every mounted page
    pub fn on_document_ready(&mut self) {
        self.host.apply_scale_value(self.config.scale_value);
        self.render_layers();
    }

    /// Replace the highlight collection with the store's current contents
    pub fn set_highlights(&mut self, highlights: Vec<Highlight>) {
        self.highlights = highlights;
        self.render_layers();
    }

    /// The host rendered (or re-rendered) a page's text layer
    pub fn on_page_rendered(&mut self, now: Instant, page: PageNumber) {
        log::trace!("page {page} rendered");
        self.render_layers();

        if let Some(id) = self.scroll.take_deferred() {
            if let Err(err) = self.scroll_to(now, &id) {
                log::debug!("deferred scroll dropped: {err}");
            }
        }
    }

    /// The host recycled a page
    pub fn on_page_unmounted(&mut self, page: PageNumber) {
        self.layers.on_page_unmounted(page);
        if self.tips.hide_on_page(page) {
            log::debug!("tip torn down with page {page}");
        }
    }

    /// The container or window was resized
    pub fn on_resize(&mut self, now: Instant) {
        if self.rescale.schedule(now, ()) {
            log::trace!("pending rescale postponed by resize");
        }
    }

    /// The host's scroll container scrolled
    pub fn on_scroll(&mut self, now: Instant) -> Option<HighlighterEvent> {
        match self.scroll.on_scroll(now) {
            ScrollOutcome::Cleared => {
                self.render_layers();
                Some(HighlighterEvent::ScrolledAway)
            }
            ScrollOutcome::Suppressed | ScrollOutcome::Unchanged => None,
        }
    }

    /// The host's text selection changed
    pub fn on_selection_change(&mut self, now: Instant, range: SelectionRange) {
        if self.tips.is_edit_in_progress() && !range.collapsed {
            log::trace!("selection ignored while an edit is in progress");
            return;
        }

        if let SelectionChange::Selecting { superseded_pending } =
            self.selection.on_selection_change(now, range)
        {
            self.tips.hide();
            if superseded_pending {
                self.render_layers();
            }
        }
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) {
        if event.on_tip {
            return;
        }

        self.hide_tip_and_selection();

        let Some(page) = event.page else {
            return;
        };
        let qualifies = self.area_selection.as_ref().is_some_and(|predicate| predicate(event));
        if qualifies && !self.tips.is_edit_in_progress() {
            self.selection.begin_drag(page, event.x, event.y);
        }
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) {
        self.selection.update_drag(event.x, event.y);
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> Option<HighlighterEvent> {
        let page = self.selection.drag_page()?;
        let viewport = self.host.page_viewport(page);
        let host = &mut self.host;

        let pending = self
            .selection
            .end_drag(event.x, event.y, viewport, |page, rect| host.capture_snippet(page, rect))?;

        self.render_layers();
        Some(HighlighterEvent::SelectionFinished(pending))
    }

    pub fn key_down(&mut self, key: Key) {
        if key == Key::Escape {
            self.hide_tip_and_selection();
        }
    }

    /// Drop the tip and any pending selection
    pub fn hide_tip_and_selection(&mut self) {
        self.tips.hide();
        if self.selection.discard_pending() {
            log::debug!("pending selection cleared");
        }
        self.render_layers();
    }

    /// Fire debounced work that is due
    pub fn tick(&mut self, now: Instant) -> Vec<HighlighterEvent> {
        let mut events = Vec::new();

        let host = &self.host;
        if let Some(pending) = self.selection.poll(now, |page| host.page_viewport(page)) {
            self.render_layers();
            events.push(HighlighterEvent::SelectionFinished(pending));
        }

        if self.rescale.poll(now).is_some() {
            log::debug!("re-applying scale value after resize");
            self.host.apply_scale_value(self.config.scale_value);
            self.render_layers();
        }

        self.scroll.poll(now);
        events
    }

    /// When `tick` next has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(
            earliest(self.selection.deadline(), self.rescale.deadline()),
            self.scroll.deadline(),
        )
    }

    /// Create a highlight from the pending selection
    ///
    /// Returns the highlight for the caller's store. The engine draws it right
    /// away in place of the ghost, so the store's follow-up
    /// [`set_highlights`](Self::set_highlights) writes nothing new.
    pub fn commit(
        &mut self,
        token: PendingToken,
        id: HighlightId,
        content: Option<HighlightContent>,
    ) -> HighlightResult<Highlight> {
        let highlight = self.selection.commit(token, id, content)?;
        self.highlights.push(highlight.clone());
        self.tips.hide();
        self.render_layers();
        Ok(highlight)
    }

    /// Discard the pending selection
    pub fn cancel(&mut self, token: PendingToken) -> HighlightResult<()> {
        self.selection.cancel(token)?;
        self.tips.hide();
        self.render_layers();
        Ok(())
    }

    /// Scroll the viewer to a highlight and emphasize it
    ///
    /// If the page has no viewport yet the scroll is retried when the host
    /// next reports a rendered page.
    pub fn scroll_to(&mut self, now: Instant, id: &HighlightId) -> HighlightResult<()> {
        let highlight = self.find(id)?.clone();
        let viewport = self.host.page_viewport(highlight.page_number());

        if let Some(target) = self.scroll.scroll_to(now, &highlight, viewport) {
            self.host.scroll_page_into_view(target.page, target.top);
        }
        self.render_layers();
        Ok(())
    }

    /// Show a hover tip, unless a gesture or edit is in progress
    pub fn show_tip(&mut self, tip: Tip<T>) -> bool {
        let blockers = TipBlockers {
            selecting: self.selection.is_selecting(),
            ghost_pending: self.selection.ghost().is_some(),
            dragging: self.selection.is_dragging(),
        };
        self.tips.show(tip, blockers)
    }

    /// Set or clear the tip unconditionally
    pub fn set_tip(&mut self, tip: Option<Tip<T>>) {
        self.tips.set(tip);
    }

    pub fn hide_tip(&mut self) {
        self.tips.hide();
    }

    pub fn tip(&self) -> Option<&Tip<T>> {
        self.tips.current()
    }

    /// Where the tip is anchored on its page's current viewport
    pub fn tip_anchor(&self) -> Option<ViewportPosition> {
        let page = self.tips.current()?.page_number();
        let viewport = self.host.page_viewport(page)?;
        self.tips.anchor(&viewport)
    }

    /// Where to draw a `tip_width` x `tip_height` tip on its page
    ///
    /// `visible_top` is the page-local offset of the top of the scroll view.
    pub fn tip_placement(
        &self,
        tip_width: f64,
        tip_height: f64,
        visible_top: f64,
    ) -> Option<TipPlacement> {
        let page = self.tips.current()?.page_number();
        let viewport = self.host.page_viewport(page)?;
        let anchor = self.tips.anchor(&viewport)?;

        Some(place_tip(
            &anchor.bounding_rect.rect,
            tip_width,
            tip_height,
            viewport.width(),
            visible_top,
        ))
    }

    pub fn set_edit_in_progress(&mut self, edit_in_progress: bool) {
        self.tips.set_edit_in_progress(edit_in_progress);
    }

    pub fn is_edit_in_progress(&self) -> bool {
        self.tips.is_edit_in_progress()
    }

    /// The user started moving or resizing an area highlight
    pub fn begin_area_edit(&mut self) {
        self.set_edit_in_progress(true);
    }

    /// The user released a moved or resized area highlight
    ///
    /// `rect` is the new box in the page's current viewport. The returned edit
    /// carries the new reference position and a freshly captured snippet.
    pub fn finish_area_edit(
        &mut self,
        id: &HighlightId,
        rect: PageRect,
    ) -> HighlightResult<HighlightEdit> {
        self.set_edit_in_progress(false);

        let highlight = self.find(id)?;
        if highlight.kind() != HighlightKind::Area {
            return Err(HighlightError::NotAnAreaHighlight(id.clone()));
        }
        let use_pdf_coordinates = highlight.position.use_pdf_coordinates;

        let page = rect.page_number;
        let viewport = self.host.page_viewport(page).ok_or(HighlightError::PageNotLaidOut(page))?;
        let bounding_rect = to_reference(&rect, &viewport, use_pdf_coordinates)
            .ok_or(HighlightError::PageNotLaidOut(page))?;
        let image = self
            .host
            .capture_snippet(page, &rect.rect)
            .ok_or(HighlightError::SnippetUnavailable(page))?;

        Ok(HighlightEdit {
            id: id.clone(),
            position: ReferencePosition { bounding_rect, rects: Vec::new(), use_pdf_coordinates },
            content: HighlightContent::Image(image),
        })
    }

    fn find(&self, id: &HighlightId) -> HighlightResult<&Highlight> {
        self.highlights
            .iter()
            .find(|highlight| &highlight.id == id)
            .ok_or_else(|| HighlightError::UnknownHighlight(id.clone()))
    }

    fn render_layers(&mut self) {
        self.layers.render_all(
            &mut self.host,
            &self.highlights,
            self.selection.ghost(),
            self.scroll.scrolled_to(),
        );

        if let Some(page) = self.tips.current().map(|tip| tip.page_number()) {
            if self.host.page_viewport(page).is_none() && self.tips.hide() {
                log::debug!("tip torn down: page {page} has no viewport");
            }
        }
    }
}
