//! Debounced, supersedable timer
//!
//! A debouncer holds at most one pending invocation. Scheduling again before
//! the quiescence window elapses discards the previous payload and restarts
//! the window.

use std::time::{Duration, Instant};

#[derive(Debug)]
struct Pending<T> {
    deadline: Instant,
    payload: T,
}

/// Quiescence timer carrying the payload of the latest request
///
/// # Example
///
/// ```
/// use pdf_highlighter_scheduler::Debouncer;
/// use std::time::{Duration, Instant};
///
/// let now = Instant::now();
/// let mut resize = Debouncer::new(Duration::from_millis(500));
/// resize.schedule(now, ());
///
/// assert!(resize.poll(now).is_none());
/// assert!(resize.poll(now + Duration::from_millis(500)).is_some());
/// ```
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Create an idle debouncer with the given quiescence window
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Request an invocation `delay` after `now`
    ///
    /// Any pending request is discarded. Returns `true` if one was superseded.
    pub fn schedule(&mut self, now: Instant, payload: T) -> bool {
        let replaced = self.pending.replace(Pending { deadline: now + self.delay, payload });
        replaced.is_some()
    }

    /// Drop the pending request, returning its payload
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.payload)
    }

    /// Take the payload if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.cancel(),
            _ => None,
        }
    }

    /// When the pending request will fire, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }
}
