// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Single-slot timers for coalescing bursts of events.
//!
//! Time is passed in rather than read from the clock, so callers decide what
//! "now" is and tests never sleep.

use std::time::{Duration, Instant};

/// Holds at most one pending value and the instant it becomes due.
///
/// Every [`push`](Debounce::push) replaces the pending value and restarts the
/// delay, so a burst of pushes yields only the last value, once the burst has
/// been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value; it becomes due `delay` after `now`.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Drops the pending value, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Takes the pending value if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.cancel(),
            _ => None,
        }
    }
}

/// A debounce with no payload: "something happened, act once it settles".
pub type Throttle = Debounce<()>;

impl Throttle {
    /// Schedules (or reschedules) the pending action.
    pub fn schedule(&mut self, now: Instant) {
        self.push((), now);
    }

    /// Whether the pending action is due at `now`; clears it if so.
    pub fn fire(&mut self, now: Instant) -> bool {
        self.poll(now).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_burst_coalesces_to_last_value() {
        let start = Instant::now();
        let mut debounce = Debounce::new(150 * MS);
        debounce.push("a", start);
        debounce.push("ab", start + 50 * MS);
        debounce.push("abc", start + 100 * MS);

        assert_eq!(debounce.poll(start + 200 * MS), None);
        assert_eq!(debounce.deadline(), Some(start + 250 * MS));
        assert_eq!(debounce.poll(start + 250 * MS), Some("abc"));
        assert_eq!(debounce.poll(start + 400 * MS), None);
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debounce = Debounce::new(10 * MS);
        debounce.push(1, start);
        assert_eq!(debounce.cancel(), Some(1));
        assert_eq!(debounce.poll(start + 20 * MS), None);
        assert_eq!(debounce.deadline(), None);
    }

    #[test]
    fn test_throttle_reschedules_on_each_event() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_secs(3));
        throttle.schedule(start);
        throttle.schedule(start + Duration::from_secs(2));

        assert!(!throttle.fire(start + Duration::from_secs(3)));
        assert!(throttle.fire(start + Duration::from_secs(5)));
        assert!(!throttle.fire(start + Duration::from_secs(9)));
    }
}
