//! Inactivity-timeout batch window.
//!
//! Owns the pending links of the currently open batch and decides when the
//! burst has settled. The threshold is measured from the *last accepted
//! arrival*, not from batch-open time, so a steady trickle of links keeps
//! extending the window. A single isolated link closes after exactly one
//! threshold period.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Where the window is in its collect/close/dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// No batch open; waiting indefinitely for the first link.
    Idle,
    /// Batch open; waiting for either a new link or the inactivity timeout.
    Collecting,
    /// Timeout fired; the batch has been handed off for enrichment.
    Closing,
    /// The player has been invoked for this batch.
    Dispatched,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::Idle => "idle",
            BatchState::Collecting => "collecting",
            BatchState::Closing => "closing",
            BatchState::Dispatched => "dispatched",
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The batch window state machine.
///
/// The control loop drives it: `submit` on every accepted arrival,
/// `try_close` after every bounded wait. The pending list is non-empty only
/// while a window is open and is drained atomically by `try_close`.
#[derive(Debug)]
pub struct BatchWindow {
    pending: Vec<String>,
    threshold: Duration,
    last_arrival: Option<Instant>,
    state: BatchState,
}

impl BatchWindow {
    pub fn new(threshold: Duration) -> Self {
        Self {
            pending: Vec::new(),
            threshold,
            last_arrival: None,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == BatchState::Collecting
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Accept one arrival: append it and refresh the window clock.
    ///
    /// Opens a new window when called in `Idle` or `Dispatched`.
    pub fn submit(&mut self, text: String, now: Instant) {
        if !self.is_open() {
            self.state = BatchState::Collecting;
        }
        self.pending.push(text);
        self.last_arrival = Some(now);
    }

    /// How long the control loop may wait for the next arrival before the
    /// window is due to close. `None` when no window is open.
    pub fn time_until_close(&self, now: Instant) -> Option<Duration> {
        if !self.is_open() {
            return None;
        }
        let last = self.last_arrival?;
        let deadline = last + self.threshold;
        // `duration_since` saturates to zero when `now` is past the deadline.
        Some(deadline.duration_since(now))
    }

    /// Close the window if the inactivity threshold has elapsed since the
    /// last accepted arrival. On close the pending list is drained
    /// atomically and the window moves to `Closing`.
    pub fn try_close(&mut self, now: Instant) -> Option<Vec<String>> {
        if !self.is_open() {
            return None;
        }
        let last = self.last_arrival?;
        if now.duration_since(last) < self.threshold {
            return None;
        }
        self.state = BatchState::Closing;
        self.last_arrival = None;
        Some(std::mem::take(&mut self.pending))
    }

    /// Unconditionally drain the open window, e.g. when the link source
    /// closes and the batch in flight should still be delivered.
    pub fn force_close(&mut self) -> Option<Vec<String>> {
        if !self.is_open() || self.pending.is_empty() {
            return None;
        }
        self.state = BatchState::Closing;
        self.last_arrival = None;
        Some(std::mem::take(&mut self.pending))
    }

    /// Record that the player was invoked for the closed batch.
    pub fn mark_dispatched(&mut self) {
        self.state = BatchState::Dispatched;
    }

    /// Return to `Idle`, ready for the next cycle.
    pub fn reset(&mut self) {
        debug_assert!(self.pending.is_empty());
        self.state = BatchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: Duration = Duration::from_secs(2);

    fn window() -> BatchWindow {
        BatchWindow::new(THRESHOLD)
    }

    #[test]
    fn test_starts_idle() {
        let w = window();
        assert_eq!(w.state(), BatchState::Idle);
        assert!(!w.is_open());
        assert_eq!(w.time_until_close(Instant::now()), None);
    }

    #[test]
    fn test_first_submit_opens_window() {
        let mut w = window();
        let t0 = Instant::now();
        w.submit("a".into(), t0);
        assert_eq!(w.state(), BatchState::Collecting);
        assert_eq!(w.pending_len(), 1);
        assert_eq!(w.time_until_close(t0), Some(THRESHOLD));
    }

    #[test]
    fn test_arrivals_under_threshold_keep_window_open() {
        let mut w = window();
        let t0 = Instant::now();
        w.submit("a".into(), t0);
        w.submit("b".into(), t0 + Duration::from_millis(1500));
        w.submit("c".into(), t0 + Duration::from_millis(3000));

        // Just under threshold since the last arrival: still open.
        assert_eq!(w.try_close(t0 + Duration::from_millis(4999)), None);
        assert_eq!(w.state(), BatchState::Collecting);
        assert_eq!(w.pending_len(), 3);
    }

    #[test]
    fn test_threshold_measured_from_last_arrival() {
        let mut w = window();
        let t0 = Instant::now();
        w.submit("a".into(), t0);
        // 1.5s later, well past t0+threshold would NOT yet have elapsed
        // relative to this newer arrival.
        w.submit("b".into(), t0 + Duration::from_millis(1500));
        assert_eq!(w.try_close(t0 + Duration::from_millis(2500)), None);

        let batch = w.try_close(t0 + Duration::from_millis(3500)).unwrap();
        assert_eq!(batch, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_gap_over_threshold_closes_exactly_once() {
        let mut w = window();
        let t0 = Instant::now();
        w.submit("a".into(), t0);
        w.submit("b".into(), t0 + Duration::from_millis(500));

        let close_time = t0 + Duration::from_millis(500) + THRESHOLD;
        let batch = w.try_close(close_time).unwrap();
        assert_eq!(batch, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(w.state(), BatchState::Closing);
        assert_eq!(w.pending_len(), 0);

        // A second attempt yields nothing.
        assert_eq!(w.try_close(close_time + THRESHOLD), None);
    }

    #[test]
    fn test_single_isolated_link_closes_after_one_period() {
        let mut w = window();
        let t0 = Instant::now();
        w.submit("only".into(), t0);
        assert_eq!(w.try_close(t0 + THRESHOLD - Duration::from_millis(1)), None);
        let batch = w.try_close(t0 + THRESHOLD).unwrap();
        assert_eq!(batch, vec!["only".to_string()]);
    }

    #[test]
    fn test_full_cycle_returns_to_idle() {
        let mut w = window();
        let t0 = Instant::now();
        w.submit("a".into(), t0);
        w.try_close(t0 + THRESHOLD).unwrap();
        w.mark_dispatched();
        assert_eq!(w.state(), BatchState::Dispatched);
        w.reset();
        assert_eq!(w.state(), BatchState::Idle);

        // The next submit opens a fresh window.
        let t1 = t0 + Duration::from_secs(60);
        w.submit("b".into(), t1);
        assert_eq!(w.state(), BatchState::Collecting);
        let batch = w.try_close(t1 + THRESHOLD).unwrap();
        assert_eq!(batch, vec!["b".to_string()]);
    }

    #[test]
    fn test_force_close_drains_open_window() {
        let mut w = window();
        let t0 = Instant::now();
        w.submit("a".into(), t0);
        w.submit("b".into(), t0 + Duration::from_millis(100));
        let batch = w.force_close().unwrap();
        assert_eq!(batch, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(w.state(), BatchState::Closing);
    }

    #[test]
    fn test_force_close_on_idle_is_none() {
        let mut w = window();
        assert_eq!(w.force_close(), None);
    }

    #[test]
    fn test_time_until_close_shrinks_and_saturates() {
        let mut w = window();
        let t0 = Instant::now();
        w.submit("a".into(), t0);
        assert_eq!(
            w.time_until_close(t0 + Duration::from_millis(500)),
            Some(Duration::from_millis(1500))
        );
        // Past the deadline: saturates to zero rather than underflowing.
        assert_eq!(
            w.time_until_close(t0 + Duration::from_secs(10)),
            Some(Duration::ZERO)
        );
    }
}
