//! PDF Highlighter Core Library
//!
//! Highlight overlay engine for a paginated, zoomable document viewer.
//!
//! The engine keeps highlight geometry in a scale-independent reference space
//! and projects it onto whatever the host viewer currently shows. It captures
//! text and area selections, maintains one overlay surface per mounted page,
//! manages the single transient tip, and scrolls to highlights on request.
//!
//! # Example
//!
//! ```ignore
//! use pdf_highlighter_core::{HighlighterConfig, HighlighterEvent, PdfHighlighter};
//!
//! let mut highlighter: PdfHighlighter<_, String> =
//!     PdfHighlighter::new(host, HighlighterConfig::default())
//!         .with_area_selection(|event| event.modifiers.alt);
//!
//! highlighter.on_document_ready();
//! highlighter.on_selection_change(now, range);
//!
//! for event in highlighter.tick(later) {
//!     if let HighlighterEvent::SelectionFinished(pending) = event {
//!         let highlight = highlighter.commit(pending.token, HighlightId::generate(), None)?;
//!         store.push(highlight);
//!         highlighter.set_highlights(store.clone());
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod highlighter;
pub mod host;
pub mod layer;
pub mod scroll;
pub mod selection;
pub mod tip;

pub use config::{HighlighterConfig, MultiPagePolicy, ScalePreset, ScaleValue};
pub use error::{ConfigError, HighlightError, HighlightResult};
pub use highlighter::{HighlighterEvent, PdfHighlighter};
pub use host::{
    AreaSelectionPredicate, Key, Modifiers, OverlaySurface, PointerEvent, SelectionRange,
    ViewerHost,
};
pub use layer::{HighlightLayerManager, LayerStats, OverlayUnit, PageOverlay, UnitKey, UnitShape};
pub use scroll::{ScrollController, ScrollOutcome, ScrollTarget};
pub use selection::{
    PendingSelection, PendingToken, SelectionCapture, SelectionChange, SelectionState,
};
pub use tip::{TipBlockers, TipController};

pub use doc_model::{
    GhostHighlight, Highlight, HighlightContent, HighlightEdit, HighlightId, HighlightKind,
    PageNumber, PageRect, Rect, ReferencePosition, ScaledRect, Tip, ViewportPosition,
};
pub use viewer_core::{
    merge_rects, place_tip, position_to_reference, position_to_viewport, to_reference,
    to_viewport, PageViewport, Rotation, TipPlacement,
};
