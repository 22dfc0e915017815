use serde::{Deserialize, Serialize};
use std::fmt;

/// One-based page number, as reported by the viewer host.
pub type PageNumber = u32;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Builds the axis-aligned rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            left: x1.min(x2),
            top: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A rectangle in viewport pixels, local to one rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRect {
    #[serde(flatten)]
    pub rect: Rect,
    pub page_number: PageNumber,
}

impl PageRect {
    pub fn new(page_number: PageNumber, rect: Rect) -> Self {
        Self { rect, page_number }
    }
}

/// A rectangle relative to a page's natural size.
///
/// `width`/`height` record the page dimensions the corners were measured against,
/// so the rectangle can be rescaled onto any later viewport of the same page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
    pub height: f64,
    pub page_number: PageNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportPosition {
    pub bounding_rect: PageRect,
    pub rects: Vec<PageRect>,
}

impl ViewportPosition {
    pub fn page_number(&self) -> PageNumber {
        self.bounding_rect.page_number
    }
}

/// Persisted, scale-independent highlight geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePosition {
    pub bounding_rect: ScaledRect,
    pub rects: Vec<ScaledRect>,
    /// Corners use the document's bottom-left origin instead of the viewer's top-left.
    #[serde(default)]
    pub use_pdf_coordinates: bool,
}

impl ReferencePosition {
    pub fn page_number(&self) -> PageNumber {
        self.bounding_rect.page_number
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightId(pub String);

impl HighlightId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random id for callers without an id scheme of their own.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HighlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HighlightId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightContent {
    Text(String),
    /// Encoded raster snippet, e.g. a `data:image/png;base64,` URL.
    Image(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Text,
    Area,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: HighlightId,
    pub position: ReferencePosition,
    pub content: HighlightContent,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<HighlightKind>,
}

impl Highlight {
    /// The explicit discriminant, or the one implied by the content.
    pub fn kind(&self) -> HighlightKind {
        self.kind.unwrap_or(match self.content {
            HighlightContent::Text(_) => HighlightKind::Text,
            HighlightContent::Image(_) => HighlightKind::Area,
        })
    }

    pub fn page_number(&self) -> PageNumber {
        self.position.page_number()
    }
}

/// An uncommitted highlight: geometry awaiting the user's decision, no identity yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostHighlight {
    pub position: ReferencePosition,
    pub content: Option<HighlightContent>,
}

impl GhostHighlight {
    pub fn kind(&self) -> HighlightKind {
        match self.content {
            Some(HighlightContent::Image(_)) => HighlightKind::Area,
            _ => HighlightKind::Text,
        }
    }

    pub fn page_number(&self) -> PageNumber {
        self.position.page_number()
    }

    pub fn into_highlight(self, id: HighlightId, content: HighlightContent) -> Highlight {
        let kind = Some(self.kind());
        Highlight { id, position: self.position, content, kind }
    }
}

/// Replacement geometry and content for an existing highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightEdit {
    pub id: HighlightId,
    pub position: ReferencePosition,
    pub content: HighlightContent,
}

/// The single transient popup, anchored to a reference position.
#[derive(Debug, Clone, PartialEq)]
pub struct Tip<T> {
    pub position: ReferencePosition,
    pub content: T,
}

impl<T> Tip<T> {
    pub fn new(position: ReferencePosition, content: T) -> Self {
        Self { position, content }
    }

    pub fn page_number(&self) -> PageNumber {
        self.position.page_number()
    }
}
