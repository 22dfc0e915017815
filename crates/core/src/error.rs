//! Error types for the highlighter engine
//!
//! Geometry that is not laid out yet is not an error: conversions return
//! `None` and the affected page is skipped until the next geometry event.
//! The variants here cover caller mistakes on the control surface.

use crate::selection::PendingToken;
use doc_model::{HighlightId, PageNumber};

/// Errors returned by the caller-facing highlighter operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HighlightError {
    /// `commit`/`cancel` was called while no selection is awaiting a decision
    #[error("no selection is pending")]
    NothingPending,

    /// The token belongs to a selection that was superseded or already resolved
    #[error("pending selection {0} is no longer current")]
    StalePendingSelection(PendingToken),

    /// No highlight with this id is known to the engine
    #[error("unknown highlight: {0}")]
    UnknownHighlight(HighlightId),

    /// Area editing was requested for a text highlight
    #[error("highlight {0} is not an area highlight")]
    NotAnAreaHighlight(HighlightId),

    /// The host has no viewport for the page
    #[error("page {0} is not laid out")]
    PageNotLaidOut(PageNumber),

    /// The host could not capture a raster snippet
    #[error("snippet capture failed on page {0}")]
    SnippetUnavailable(PageNumber),
}

/// Errors that can occur while loading a [`HighlighterConfig`](crate::HighlighterConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for highlighter operations
pub type HighlightResult<T> = Result<T, HighlightError>;
