//! Highlighter configuration
//!
//! Timing constants, the zoom preset requested from the host, and the policy
//! for selections that cross a page boundary. Every field has a default, so a
//! partial JSON document is a valid configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Named zoom presets understood by the viewer host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalePreset {
    Auto,
    PageWidth,
    PageFit,
    PageActual,
}

/// Zoom requested from the host on document ready and after every resize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleValue {
    /// Absolute scale factor, 1.0 = natural size
    Factor(f64),
    Preset(ScalePreset),
}

impl Default for ScaleValue {
    fn default() -> Self {
        ScaleValue::Preset(ScalePreset::Auto)
    }
}

/// What to do with a text selection whose rectangles cover more than one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultiPagePolicy {
    /// Finalization is a no-op; no pending selection is produced
    #[default]
    Reject,

    /// Keep only the rectangles and text on the page of the first rectangle
    ///
    /// Ranges whose host supplied no per-page text are rejected.
    FirstPage,
}

/// Configuration for the highlighter engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Quiescence window before a text selection is finalized (ms)
    pub selection_debounce_ms: u64,

    /// Quiescence window before a resize re-applies the scale value (ms)
    pub resize_debounce_ms: u64,

    /// Space left above a highlight when scrolling to it (viewport px)
    pub scroll_margin_px: f64,

    /// How long scroll events are ignored after a programmatic scroll (ms)
    pub scroll_settle_ms: u64,

    /// Zoom requested from the host
    pub scale_value: ScaleValue,

    /// Handling of selections spanning several pages
    pub multi_page_policy: MultiPagePolicy,

    /// Minimum width and height of an area drag (viewport px)
    pub min_area_size_px: f64,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            selection_debounce_ms: 500,
            resize_debounce_ms: 500,
            scroll_margin_px: 10.0,
            scroll_settle_ms: 100,
            scale_value: ScaleValue::default(),
            multi_page_policy: MultiPagePolicy::default(),
            min_area_size_px: 1.0,
        }
    }
}

impl HighlighterConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes)?;
        log::debug!("loaded highlighter config from {}", path.display());
        Ok(config)
    }

    pub fn with_selection_debounce_ms(mut self, ms: u64) -> Self {
        self.selection_debounce_ms = ms;
        self
    }

    pub fn with_resize_debounce_ms(mut self, ms: u64) -> Self {
        self.resize_debounce_ms = ms;
        self
    }

    pub fn with_scroll_margin_px(mut self, px: f64) -> Self {
        self.scroll_margin_px = px;
        self
    }

    pub fn with_scroll_settle_ms(mut self, ms: u64) -> Self {
        self.scroll_settle_ms = ms;
        self
    }

    pub fn with_scale_value(mut self, scale_value: ScaleValue) -> Self {
        self.scale_value = scale_value;
        self
    }

    pub fn with_multi_page_policy(mut self, policy: MultiPagePolicy) -> Self {
        self.multi_page_policy = policy;
        self
    }

    pub fn with_min_area_size_px(mut self, px: f64) -> Self {
        self.min_area_size_px = px;
        self
    }

    pub fn selection_debounce(&self) -> Duration {
        Duration::from_millis(self.selection_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}
