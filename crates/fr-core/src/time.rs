//! Converting elapsed monotonic time into whole ticks.
//!
//! Host timers fire late, get coalesced, or stop entirely while the app is
//! backgrounded. A [`Metronome`] is polled with the current monotonic offset
//! and answers how many whole periods have elapsed since the last poll, so
//! each elapsed second (or minute) is delivered exactly once.

use std::time::Duration;

/// Counts whole periods of elapsed time.
#[derive(Debug, Clone)]
pub struct Metronome {
    period: Duration,
    /// Offset at which the current run started, or `None` when stopped.
    anchor: Option<Duration>,
    /// Periods already reported since `anchor`.
    fired: u64,
    /// Partial period carried across a pause.
    carried: Duration,
}

impl Metronome {
    /// Creates a stopped metronome. A zero period is treated as one second.
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            Duration::from_secs(1)
        } else {
            period
        };
        Self {
            period,
            anchor: None,
            fired: 0,
            carried: Duration::ZERO,
        }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    pub const fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Starts counting from `at`, discarding any carried partial period.
    pub fn start(&mut self, at: Duration) {
        self.anchor = Some(at);
        self.fired = 0;
        self.carried = Duration::ZERO;
    }

    /// Returns the number of periods that elapsed since the previous poll.
    pub fn poll(&mut self, at: Duration) -> u64 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let elapsed = at.saturating_sub(anchor);
        let total = u64::try_from(elapsed.as_nanos() / self.period.as_nanos()).unwrap_or(u64::MAX);
        let due = total.saturating_sub(self.fired);
        self.fired = self.fired.max(total);
        due
    }

    /// Suspends counting, keeping the partial period that has elapsed.
    ///
    /// Whole periods not yet polled are returned so the caller can apply them
    /// before the pause takes effect. Pausing a stopped metronome returns 0.
    pub fn pause(&mut self, at: Duration) -> u64 {
        let due = self.poll(at);
        if let Some(anchor) = self.anchor.take() {
            let elapsed = at.saturating_sub(anchor);
            let consumed = self.period.saturating_mul(u32::try_from(self.fired).unwrap_or(u32::MAX));
            self.carried = elapsed.saturating_sub(consumed);
        }
        due
    }

    /// Continues counting from `at`, honouring any partial period carried
    /// across the pause. Resuming a running metronome does nothing.
    pub fn resume(&mut self, at: Duration) {
        if self.anchor.is_some() {
            return;
        }
        self.anchor = Some(at.saturating_sub(self.carried));
        self.fired = 0;
        self.carried = Duration::ZERO;
    }

    /// Stops counting. Idempotent.
    pub fn stop(&mut self) {
        self.anchor = None;
        self.fired = 0;
        self.carried = Duration::ZERO;
    }
}
