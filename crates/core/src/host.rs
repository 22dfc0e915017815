//! Interfaces consumed from the document-rendering host
//!
//! The host owns pagination, layout, zoom, and page virtualization. The engine
//! reads page geometry through [`ViewerHost`] and writes overlay content only
//! through the [`OverlaySurface`] handles it obtains from the host.

use crate::config::ScaleValue;
use crate::layer::PageOverlay;
use doc_model::{PageNumber, PageRect, Rect};
use viewer_core::PageViewport;

/// Mount point for one page's highlight overlay
///
/// The host may recycle page nodes at any time; `is_attached` is checked
/// before every write so a dead node is replaced instead of written to.
pub trait OverlaySurface {
    /// Whether the underlying node is still part of the live page
    fn is_attached(&self) -> bool;

    /// Replace the surface content with `overlay`
    fn render(&mut self, overlay: &PageOverlay);
}

/// The paginated document viewer the engine is layered on
pub trait ViewerHost {
    type Surface: OverlaySurface;

    /// Number of pages in the loaded document
    fn page_count(&self) -> u32;

    /// Current geometry of a page, or `None` if it is not laid out
    fn page_viewport(&self, page: PageNumber) -> Option<PageViewport>;

    /// Find or create the overlay layer on a mounted page
    ///
    /// Returns `None` when the page is not currently rendered.
    fn overlay_layer(&mut self, page: PageNumber) -> Option<Self::Surface>;

    /// Scroll so that `top` (page-local viewport px) is at the top of the view
    fn scroll_page_into_view(&mut self, page: PageNumber, top: f64);

    /// Capture the screen region of `rect` on `page` as an encoded image
    fn capture_snippet(&mut self, page: PageNumber, rect: &Rect) -> Option<String>;

    /// Ask the viewer to apply a zoom value
    fn apply_scale_value(&mut self, value: ScaleValue);
}

/// Snapshot of the host's text selection, delivered on every selection change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionRange {
    /// The selection is empty (caret only)
    pub collapsed: bool,

    /// The range's common ancestor lies inside the viewer container
    pub in_container: bool,

    /// Extracted text of the range
    pub text: String,

    /// Client rectangles of the range, clipped to pages, page-local viewport px
    pub client_rects: Vec<PageRect>,

    /// Text of the range split by page, for ranges crossing a page boundary
    pub page_text: Vec<(PageNumber, String)>,
}

impl SelectionRange {
    pub fn new(text: impl Into<String>, client_rects: Vec<PageRect>) -> Self {
        Self {
            collapsed: false,
            in_container: true,
            text: text.into(),
            client_rects,
            page_text: Vec::new(),
        }
    }

    /// Attach the part of the text that lies on `page`
    pub fn with_page_text(mut self, page: PageNumber, text: impl Into<String>) -> Self {
        self.page_text.push((page, text.into()));
        self
    }

    pub(crate) fn text_on(&self, page: PageNumber) -> Option<&str> {
        self.page_text.iter().find(|(p, _)| *p == page).map(|(_, text)| text.as_str())
    }

    pub fn collapsed() -> Self {
        Self { collapsed: true, in_container: true, ..Self::default() }
    }

    pub fn outside_container(mut self) -> Self {
        self.in_container = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

/// Pointer input, in page-local viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    /// Page under the pointer, if any
    pub page: Option<PageNumber>,
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
    /// The event target is inside the tip container
    pub on_tip: bool,
}

impl PointerEvent {
    pub fn on_page(page: PageNumber, x: f64, y: f64) -> Self {
        Self { page: Some(page), x, y, ..Self::default() }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn inside_tip(mut self) -> Self {
        self.on_tip = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Caller-supplied predicate deciding whether a pointer-down starts an area drag
pub type AreaSelectionPredicate = Box<dyn Fn(&PointerEvent) -> bool>;
