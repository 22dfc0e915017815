//! PDF Highlighter Scheduler Library
//!
//! Single-threaded timers for an event-driven viewer.
//!
//! Nothing in this crate reads a clock or sleeps. Every operation takes the
//! current [`Instant`](std::time::Instant) from the caller, and pending work is
//! surfaced by polling. Superseding a pending timer is the only cancellation
//! mechanism.
//!
//! # Example
//!
//! ```
//! use pdf_highlighter_scheduler::Debouncer;
//! use std::time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut finalize = Debouncer::new(Duration::from_millis(500));
//!
//! finalize.schedule(start, "first");
//! finalize.schedule(start + Duration::from_millis(200), "second");
//!
//! // The first request was superseded; only the second one fires.
//! assert_eq!(finalize.poll(start + Duration::from_millis(600)), None);
//! assert_eq!(finalize.poll(start + Duration::from_millis(700)), Some("second"));
//! ```

mod debounce;
mod window;

pub use debounce::Debouncer;
pub use window::SuppressionWindow;

use std::time::Instant;

/// Earliest of two optional deadlines.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
