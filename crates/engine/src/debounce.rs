//! Coalescing of rapid style writes (color picker drags, slider scrubs).
//!
//! A single pending slot holds the latest patch and the ids it targets.
//! Each `schedule` replaces the slot and pushes the deadline out; the owner
//! polls `take_due` from its event loop. Time is passed in, never read, so
//! callers and tests control the clock.

use std::time::{Duration, Instant};

use crate::cell::CellStyle;
use crate::cell_id::CellId;

/// Default quiet period before a scheduled style is committed.
pub const DEFAULT_STYLE_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct PendingStyle {
    pub patch: CellStyle,
    pub ids: Vec<CellId>,
    pub deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct StyleDebouncer {
    delay: Duration,
    pending: Option<PendingStyle>,
}

impl Default for StyleDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE_DEBOUNCE)
    }
}

impl StyleDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending write. Last call wins.
    pub fn schedule(&mut self, patch: CellStyle, ids: Vec<CellId>, now: Instant) {
        self.pending = Some(PendingStyle {
            patch,
            ids,
            deadline: now + self.delay,
        });
    }

    /// Drop the pending write, returning it if there was one.
    pub fn cancel(&mut self) -> Option<PendingStyle> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Take the pending write if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<PendingStyle> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if due {
            self.pending.take()
        } else {
            None
        }
    }
}
