//! Selection capture
//!
//! Turns host gestures into at most one pending selection:
//! - **Text ranges** arrive as selection-change snapshots and are finalized
//!   after a quiescence window, so rapid multi-click adjustments produce a
//!   single result.
//! - **Area drags** track a live rectangle between pointer down and pointer up
//!   and capture a raster snippet of the released rectangle.
//!
//! A finalized gesture materializes the ghost highlight and waits in
//! [`SelectionState::PendingCommit`] until the caller commits or cancels it.
//! Starting a new gesture silently cancels the previous pending one.

use crate::config::MultiPagePolicy;
use crate::error::{HighlightError, HighlightResult};
use crate::host::SelectionRange;
use doc_model::{
    GhostHighlight, Highlight, HighlightContent, HighlightId, PageNumber, PageRect, Rect,
    ReferencePosition, ViewportPosition,
};
use pdf_highlighter_scheduler::Debouncer;
use std::fmt;
use std::time::{Duration, Instant};
use viewer_core::{merge_rects, position_to_reference, to_reference, PageViewport};

/// Identifies one pending selection; tokens of superseded selections are rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingToken(u64);

impl fmt::Display for PendingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Selection capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No gesture in flight
    Idle,

    /// A text range is settling or an area drag is in progress
    Selecting,

    /// A ghost highlight exists and awaits commit or cancel
    PendingCommit,
}

/// A settled selection handed to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    /// Token to pass back to `commit` or `cancel`
    pub token: PendingToken,

    /// Geometry in reference space, as it will be persisted
    pub position: ReferencePosition,

    /// Geometry at the moment of selection, for anchoring a tip
    pub viewport_position: ViewportPosition,

    /// Extracted text or captured snippet
    pub content: HighlightContent,
}

/// Outcome of a selection-change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// The range was outside the viewer or capture is suppressed
    Ignored,

    /// The range collapsed; any unsettled range was dropped
    Collapsed,

    /// A range is settling; `superseded_pending` reports a cancelled ghost
    Selecting { superseded_pending: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    page: PageNumber,
    start: (f64, f64),
    current: (f64, f64),
}

impl Drag {
    fn rect(&self) -> Rect {
        Rect::from_corners(self.start.0, self.start.1, self.current.0, self.current.1)
    }
}

/// Gesture state machine owning the single in-flight geometry
///
/// At any instant at most one of {settling text range, live drag, ghost
/// highlight} is held.
#[derive(Debug)]
pub struct SelectionCapture {
    state: SelectionState,

    /// Latest unsettled text range, waiting for quiescence
    finalize: Debouncer<SelectionRange>,

    /// Live area drag
    drag: Option<Drag>,

    /// Materialized pending selection
    ghost: Option<GhostHighlight>,
    pending_token: Option<PendingToken>,
    next_token: u64,

    multi_page_policy: MultiPagePolicy,
    min_area_size: f64,
}

impl SelectionCapture {
    pub fn new(debounce: Duration, multi_page_policy: MultiPagePolicy, min_area_size: f64) -> Self {
        Self {
            state: SelectionState::Idle,
            finalize: Debouncer::new(debounce),
            drag: None,
            ghost: None,
            pending_token: None,
            next_token: 0,
            multi_page_policy,
            min_area_size,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn ghost(&self) -> Option<&GhostHighlight> {
        self.ghost.as_ref()
    }

    pub fn is_selecting(&self) -> bool {
        self.state == SelectionState::Selecting
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_page(&self) -> Option<PageNumber> {
        self.drag.map(|drag| drag.page)
    }

    /// Live drag rectangle for rendering the rubber band
    pub fn drag_rect(&self) -> Option<PageRect> {
        self.drag.map(|drag| PageRect::new(drag.page, drag.rect()))
    }

    /// When the settling text range will be finalized
    pub fn deadline(&self) -> Option<Instant> {
        self.finalize.deadline()
    }

    /// Handle a host selection-change notification
    ///
    /// A collapsed range drops the unsettled range but leaves a pending
    /// selection alone: focusing the comment form collapses the selection
    /// while the user is still deciding.
    pub fn on_selection_change(&mut self, now: Instant, range: SelectionRange) -> SelectionChange {
        if range.collapsed {
            if self.finalize.cancel().is_some() {
                log::trace!("selection collapsed before settling");
            }
            if self.state == SelectionState::Selecting && self.drag.is_none() {
                self.state = SelectionState::Idle;
            }
            return SelectionChange::Collapsed;
        }

        if !range.in_container {
            return SelectionChange::Ignored;
        }

        let superseded_pending = self.discard_pending();
        self.drag = None;
        self.state = SelectionState::Selecting;
        if self.finalize.schedule(now, range) {
            log::trace!("unsettled selection range replaced");
        }

        SelectionChange::Selecting { superseded_pending }
    }

    /// Finalize the settled text range, if its quiescence window has elapsed
    ///
    /// An empty, unresolvable, or rejected cross-page range returns to idle
    /// without producing a selection.
    pub fn poll(
        &mut self,
        now: Instant,
        viewport_of: impl Fn(PageNumber) -> Option<PageViewport>,
    ) -> Option<PendingSelection> {
        let range = self.finalize.poll(now)?;

        let pending = self.finalize_text(range, viewport_of);
        if pending.is_none() {
            self.state = SelectionState::Idle;
        }
        pending
    }

    fn finalize_text(
        &mut self,
        range: SelectionRange,
        viewport_of: impl Fn(PageNumber) -> Option<PageViewport>,
    ) -> Option<PendingSelection> {
        let (rects, text) = self.confine_to_one_page(range)?;
        let bounding_rect = merge_rects(&rects)?;
        let page = bounding_rect.page_number;

        let Some(viewport) = viewport_of(page) else {
            log::warn!("selection finalize skipped: page {page} has no viewport");
            return None;
        };

        let viewport_position = ViewportPosition { bounding_rect, rects };
        let position = position_to_reference(&viewport_position, &viewport, false)?;

        log::debug!("text selection settled on page {page}");
        Some(self.enter_pending(position, viewport_position, HighlightContent::Text(text)))
    }

    /// Apply the multi-page policy to a range's geometry and text
    ///
    /// `None` aborts finalization. Truncation keeps the first page's rects and
    /// the first page's share of the text; a range without per-page text cannot
    /// be truncated and is rejected.
    fn confine_to_one_page(&self, range: SelectionRange) -> Option<(Vec<PageRect>, String)> {
        let Some(first_page) = range.client_rects.first().map(|rect| rect.page_number) else {
            log::debug!("selection finalize skipped: no client rects");
            return None;
        };

        if range.client_rects.iter().all(|rect| rect.page_number == first_page) {
            return Some((range.client_rects, range.text));
        }

        match self.multi_page_policy {
            MultiPagePolicy::Reject => {
                log::debug!("selection finalize skipped: range spans several pages");
                None
            }
            MultiPagePolicy::FirstPage => {
                let Some(text) = range.text_on(first_page).map(str::to_owned) else {
                    log::debug!("selection finalize skipped: no text for page {first_page}");
                    return None;
                };

                log::debug!("selection truncated to page {first_page}");
                let rects = range
                    .client_rects
                    .into_iter()
                    .filter(|rect| rect.page_number == first_page)
                    .collect();
                Some((rects, text))
            }
        }
    }

    /// Start an area drag at a page-local point
    ///
    /// Returns `true` if a pending selection was cancelled to make room.
    pub fn begin_drag(&mut self, page: PageNumber, x: f64, y: f64) -> bool {
        let superseded = self.discard_pending();
        self.finalize.cancel();
        self.drag = Some(Drag { page, start: (x, y), current: (x, y) });
        self.state = SelectionState::Selecting;
        superseded
    }

    pub fn update_drag(&mut self, x: f64, y: f64) -> bool {
        match &mut self.drag {
            Some(drag) => {
                drag.current = (x, y);
                true
            }
            None => false,
        }
    }

    /// Release the drag and, if it covers an area, materialize a pending selection
    ///
    /// `capture` is invoked at most once, only for a drag that qualifies.
    pub fn end_drag(
        &mut self,
        x: f64,
        y: f64,
        viewport: Option<PageViewport>,
        capture: impl FnOnce(PageNumber, &Rect) -> Option<String>,
    ) -> Option<PendingSelection> {
        let mut drag = self.drag.take()?;
        drag.current = (x, y);
        self.state = SelectionState::Idle;

        let rect = drag.rect();
        if rect.width < self.min_area_size || rect.height < self.min_area_size {
            log::trace!("area drag too small, treated as click");
            return None;
        }

        let Some(viewport) = viewport else {
            log::warn!("area selection dropped: page {} has no viewport", drag.page);
            return None;
        };

        let bounding_rect = PageRect::new(drag.page, rect);
        let reference = to_reference(&bounding_rect, &viewport, false)?;

        let Some(image) = capture(drag.page, &rect) else {
            log::warn!("area selection dropped: snippet capture failed on page {}", drag.page);
            return None;
        };

        let position = ReferencePosition {
            bounding_rect: reference,
            rects: Vec::new(),
            use_pdf_coordinates: false,
        };
        let viewport_position = ViewportPosition { bounding_rect, rects: Vec::new() };

        log::debug!("area selection finished on page {}", drag.page);
        Some(self.enter_pending(position, viewport_position, HighlightContent::Image(image)))
    }

    fn enter_pending(
        &mut self,
        position: ReferencePosition,
        viewport_position: ViewportPosition,
        content: HighlightContent,
    ) -> PendingSelection {
        self.next_token += 1;
        let token = PendingToken(self.next_token);

        self.ghost =
            Some(GhostHighlight { position: position.clone(), content: Some(content.clone()) });
        self.pending_token = Some(token);
        self.state = SelectionState::PendingCommit;

        PendingSelection { token, position, viewport_position, content }
    }

    fn check_token(&self, token: PendingToken) -> HighlightResult<()> {
        match self.pending_token {
            None => Err(HighlightError::NothingPending),
            Some(current) if current != token => Err(HighlightError::StalePendingSelection(token)),
            Some(_) => Ok(()),
        }
    }

    /// Promote the pending selection to a highlight with caller identity
    ///
    /// `content` replaces the captured content when given.
    pub fn commit(
        &mut self,
        token: PendingToken,
        id: HighlightId,
        content: Option<HighlightContent>,
    ) -> HighlightResult<Highlight> {
        self.check_token(token)?;
        let ghost = self.ghost.take().ok_or(HighlightError::NothingPending)?;
        self.pending_token = None;
        self.state = SelectionState::Idle;

        let content = content
            .or_else(|| ghost.content.clone())
            .unwrap_or_else(|| HighlightContent::Text(String::new()));

        Ok(ghost.into_highlight(id, content))
    }

    pub fn cancel(&mut self, token: PendingToken) -> HighlightResult<()> {
        self.check_token(token)?;
        self.discard_pending();
        Ok(())
    }

    /// Drop the pending selection without a token; returns whether one existed
    pub fn discard_pending(&mut self) -> bool {
        let had_pending = self.ghost.take().is_some();
        self.pending_token = None;
        if self.state == SelectionState::PendingCommit {
            self.state = SelectionState::Idle;
        }
        had_pending
    }
}
