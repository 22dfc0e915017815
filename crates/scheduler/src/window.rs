//! Time-boxed suppression
//!
//! Used to ignore the echo of the engine's own actions, e.g. the scroll events
//! produced by a programmatic scroll, until the host has had time to settle.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct SuppressionWindow {
    until: Option<Instant>,
}

impl SuppressionWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress until `now + duration`; a later call replaces the window.
    pub fn suppress(&mut self, now: Instant, duration: Duration) {
        self.until = Some(now + duration);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Returns `true` exactly once, on the first poll after the window closed.
    pub fn poll_expired(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.until
    }
}
