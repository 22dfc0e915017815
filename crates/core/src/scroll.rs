//! Scroll-to controller
//!
//! Tracks the scrolled-to highlight and tells user scrolls apart from the
//! echo of the engine's own programmatic scroll.

use doc_model::{Highlight, HighlightId, PageNumber};
use pdf_highlighter_scheduler::SuppressionWindow;
use std::time::{Duration, Instant};
use viewer_core::{to_viewport, PageViewport};

/// Where the host should scroll to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTarget {
    pub page: PageNumber,
    /// Page-local viewport offset to bring to the top of the view
    pub top: f64,
}

/// Result of a host scroll notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Fired inside the programmatic scroll window; ignored
    Suppressed,
    /// The scrolled-to emphasis was cleared
    Cleared,
    /// Nothing was emphasized
    Unchanged,
}

#[derive(Debug)]
pub struct ScrollController {
    scrolled_to: Option<HighlightId>,
    listener_detached: SuppressionWindow,
    /// Scroll requested while the target page had no viewport
    deferred: Option<HighlightId>,
    margin: f64,
    settle: Duration,
}

impl ScrollController {
    pub fn new(margin: f64, settle: Duration) -> Self {
        Self {
            scrolled_to: None,
            listener_detached: SuppressionWindow::new(),
            deferred: None,
            margin,
            settle,
        }
    }

    /// Mark `highlight` as scrolled-to and compute where to scroll.
    ///
    /// The scroll listener is detached for the settle window before the host
    /// scrolls. Without a viewport the request is parked for
    /// [`take_deferred`](Self::take_deferred) and `None` is returned.
    pub fn scroll_to(
        &mut self,
        now: Instant,
        highlight: &Highlight,
        viewport: Option<PageViewport>,
    ) -> Option<ScrollTarget> {
        self.scrolled_to = Some(highlight.id.clone());
        self.deferred = None;

        let position = &highlight.position;
        let page = position.page_number();
        let bounding = viewport.and_then(|viewport| {
            to_viewport(&position.bounding_rect, &viewport, position.use_pdf_coordinates)
        });

        let Some(bounding) = bounding else {
            log::debug!("scroll to {} deferred: page {page} not laid out", highlight.id);
            self.deferred = Some(highlight.id.clone());
            return None;
        };

        self.listener_detached.suppress(now, self.settle);
        log::debug!("scrolling to {} on page {page}", highlight.id);

        Some(ScrollTarget { page, top: bounding.rect.top - self.margin })
    }

    /// Handle a scroll event from the host.
    pub fn on_scroll(&mut self, now: Instant) -> ScrollOutcome {
        if self.listener_detached.is_active(now) {
            log::trace!("ignoring scroll during programmatic scroll");
            return ScrollOutcome::Suppressed;
        }

        self.deferred = None;
        match self.scrolled_to.take() {
            Some(_) => ScrollOutcome::Cleared,
            None => ScrollOutcome::Unchanged,
        }
    }

    /// Reattach the scroll listener once the settle window has passed.
    pub fn poll(&mut self, now: Instant) {
        if self.listener_detached.poll_expired(now) {
            log::trace!("scroll listener reattached");
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.listener_detached.deadline()
    }

    pub fn take_deferred(&mut self) -> Option<HighlightId> {
        self.deferred.take()
    }

    pub fn scrolled_to(&self) -> Option<&HighlightId> {
        self.scrolled_to.as_ref()
    }
}
