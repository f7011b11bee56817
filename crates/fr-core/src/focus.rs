//! Focus/rest interval state machine.
//!
//! A [`FocusSession`] alternates between a focus interval and a rest interval.
//! The host calls [`FocusSession::tick`] once per elapsed wall-clock second
//! (see [`crate::Metronome`] for turning elapsed time into ticks). Every
//! transition is a total function over the state space; nothing here fails.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notify::{Notifier, NotifyKind, NullNotifier};

/// Default focus interval: 25 minutes.
pub const DEFAULT_FOCUS_SECS: u32 = 25 * 60;
/// Default rest interval: 5 minutes.
pub const DEFAULT_REST_SECS: u32 = 5 * 60;

/// Current mode of a focus session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusState {
    #[default]
    Idle,
    Focusing,
    Resting,
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Focusing => "focusing",
            Self::Resting => "resting",
        };
        f.pad(s)
    }
}

/// Interval lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusDurations {
    focus: u32,
    rest: u32,
}

impl FocusDurations {
    /// Creates interval lengths; each is at least one second.
    pub fn new(focus_secs: u32, rest_secs: u32) -> Self {
        Self {
            focus: focus_secs.max(1),
            rest: rest_secs.max(1),
        }
    }

    pub fn from_minutes(focus_minutes: u32, rest_minutes: u32) -> Self {
        Self::new(
            focus_minutes.saturating_mul(60),
            rest_minutes.saturating_mul(60),
        )
    }

    pub const fn focus_secs(&self) -> u32 {
        self.focus
    }

    pub const fn rest_secs(&self) -> u32 {
        self.rest
    }
}

impl Default for FocusDurations {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_SECS, DEFAULT_REST_SECS)
    }
}

/// Emitted when an interval runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    /// A focus interval finished; the session moved on to rest.
    FocusCompleted { completed_cycles: u32 },
    /// A rest interval finished; the session is idle again.
    RestCompleted,
}

/// Alternating focus/rest countdown.
///
/// Lives for the app run; nothing is persisted, so a restart begins `Idle`.
#[derive(Debug)]
pub struct FocusSession<N = NullNotifier> {
    durations: FocusDurations,
    state: FocusState,
    remaining: u32,
    completed_cycles: u32,
    paused: bool,
    notifier: N,
}

impl FocusSession<NullNotifier> {
    /// Creates an idle session that raises no notifications.
    pub fn new(durations: FocusDurations) -> Self {
        Self::with_notifier(durations, NullNotifier)
    }
}

impl<N: Notifier> FocusSession<N> {
    pub const fn with_notifier(durations: FocusDurations, notifier: N) -> Self {
        Self {
            durations,
            state: FocusState::Idle,
            remaining: 0,
            completed_cycles: 0,
            paused: false,
            notifier,
        }
    }

    pub const fn state(&self) -> FocusState {
        self.state
    }

    /// Seconds left in the current interval.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Focus intervals completed during this run.
    pub const fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    pub const fn durations(&self) -> FocusDurations {
        self.durations
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Begins a focus interval from any state, discarding any countdown.
    pub fn start_focus(&mut self) {
        self.enter(FocusState::Focusing, self.durations.focus);
        self.notifier.notify(NotifyKind::FocusStarted);
    }

    /// Begins a rest interval from any state.
    pub fn start_rest(&mut self) {
        self.enter(FocusState::Resting, self.durations.rest);
        self.notifier.notify(NotifyKind::RestStarted);
    }

    /// Returns to `Idle`. Idempotent.
    pub fn stop(&mut self) {
        if self.state != FocusState::Idle {
            tracing::debug!(from = %self.state, "focus session stopped");
        }
        self.state = FocusState::Idle;
        self.remaining = 0;
        self.paused = false;
    }

    /// Suspends the countdown without changing state. Idempotent.
    pub fn pause(&mut self) {
        if self.state != FocusState::Idle {
            self.paused = true;
        }
    }

    /// Continues a paused countdown. Does nothing when idle or at zero.
    pub fn resume(&mut self) {
        if self.state == FocusState::Idle || self.remaining == 0 {
            return;
        }
        self.paused = false;
    }

    /// Consumes one elapsed second.
    ///
    /// Ignored while idle or paused. When the countdown reaches zero the
    /// interval completes: a finished focus interval counts a cycle and moves
    /// to rest, a finished rest interval returns to idle.
    pub fn tick(&mut self) -> Option<FocusEvent> {
        if self.state == FocusState::Idle || self.paused {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }
        Some(self.complete())
    }

    /// Consumes `seconds` elapsed seconds, returning every completion.
    pub fn advance(&mut self, seconds: u64) -> Vec<FocusEvent> {
        let mut events = Vec::new();
        for _ in 0..seconds {
            if self.state == FocusState::Idle || self.paused {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    /// Fraction of the current interval that has elapsed, in `[0, 1]`.
    ///
    /// The tick that reaches zero also completes the interval, so a caller
    /// sees at most `(d - 1) / d` in a state before it resets to 0 in the
    /// next one.
    pub fn progress(&self) -> f64 {
        let total = match self.state {
            FocusState::Idle => return 0.0,
            FocusState::Focusing => self.durations.focus,
            FocusState::Resting => self.durations.rest,
        };
        let elapsed = total.saturating_sub(self.remaining);
        (f64::from(elapsed) / f64::from(total)).clamp(0.0, 1.0)
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_remaining(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }

    fn enter(&mut self, state: FocusState, seconds: u32) {
        tracing::debug!(from = %self.state, to = %state, seconds, "focus session transition");
        self.state = state;
        self.remaining = seconds;
        self.paused = false;
    }

    fn complete(&mut self) -> FocusEvent {
        match self.state {
            FocusState::Focusing => {
                self.notifier.notify(NotifyKind::FocusCompleted);
                self.completed_cycles += 1;
                tracing::info!(cycles = self.completed_cycles, "focus interval completed");
                self.start_rest();
                FocusEvent::FocusCompleted {
                    completed_cycles: self.completed_cycles,
                }
            }
            FocusState::Resting | FocusState::Idle => {
                self.notifier.notify(NotifyKind::RestCompleted);
                tracing::info!("rest interval completed");
                self.stop();
                FocusEvent::RestCompleted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;

    fn short() -> FocusDurations {
        FocusDurations::new(10, 4)
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = FocusSession::new(FocusDurations::default());
        assert_eq!(session.state(), FocusState::Idle);
        assert_eq!(session.remaining(), 0);
        assert!((session.progress() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_focus_runs_into_rest_after_exactly_focus_duration_ticks() {
        for focus in [1, 2, 7, 25] {
            let mut session = FocusSession::new(FocusDurations::new(focus, 3));
            session.start_focus();
            for _ in 1..focus {
                assert_eq!(session.tick(), None);
                assert_eq!(session.state(), FocusState::Focusing);
            }
            let event = session.tick();
            assert_eq!(
                event,
                Some(FocusEvent::FocusCompleted {
                    completed_cycles: 1
                })
            );
            assert_eq!(session.state(), FocusState::Resting);
            assert_eq!(session.remaining(), 3);
            assert_eq!(session.completed_cycles(), 1);
        }
    }

    #[test]
    fn test_rest_completion_returns_to_idle() {
        let mut session = FocusSession::new(short());
        session.start_rest();
        let events = session.advance(4);
        assert_eq!(events, vec![FocusEvent::RestCompleted]);
        assert_eq!(session.state(), FocusState::Idle);
        assert_eq!(session.remaining(), 0);
    }

    #[test]
    fn test_full_cycle_emits_both_completions() {
        let mut session = FocusSession::new(short());
        session.start_focus();
        let events = session.advance(100);
        assert_eq!(
            events,
            vec![
                FocusEvent::FocusCompleted {
                    completed_cycles: 1
                },
                FocusEvent::RestCompleted,
            ]
        );
        assert_eq!(session.state(), FocusState::Idle);
    }

    #[test]
    fn test_progress_is_monotonic_within_a_state() {
        let mut session = FocusSession::new(short());
        session.start_focus();
        let mut last = session.progress();
        assert!(last.abs() < f64::EPSILON);
        for _ in 0..9 {
            session.tick();
            let p = session.progress();
            assert!(p >= last);
            assert!(p < 1.0);
            last = p;
        }
        assert!((last - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_progress_peaks_one_tick_before_completion() {
        let mut session = FocusSession::new(FocusDurations::new(5, 3));
        session.start_focus();
        let mut peak = 0.0_f64;
        while session.state() == FocusState::Focusing {
            peak = peak.max(session.progress());
            session.tick();
        }
        assert!((peak - 0.8).abs() < 1e-9);
        assert_eq!(session.state(), FocusState::Resting);
        assert!(session.progress().abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_resets_on_entering_rest() {
        let mut session = FocusSession::new(short());
        session.start_focus();
        session.advance(10);
        assert_eq!(session.state(), FocusState::Resting);
        assert!(session.progress().abs() < f64::EPSILON);
    }

    #[test]
    fn test_pause_does_not_lose_or_double_count_time() {
        let mut continuous = FocusSession::new(FocusDurations::new(100, 10));
        continuous.start_focus();
        continuous.advance(3 + 5);

        let mut paused = FocusSession::new(FocusDurations::new(100, 10));
        paused.start_focus();
        paused.advance(3);
        paused.pause();
        for _ in 0..20 {
            assert_eq!(paused.tick(), None);
        }
        paused.resume();
        paused.advance(5);

        assert_eq!(paused.remaining(), continuous.remaining());
        assert_eq!(paused.remaining(), 92);
    }

    #[test]
    fn test_resume_is_a_noop_when_idle() {
        let mut session = FocusSession::new(short());
        session.pause();
        session.resume();
        assert!(!session.is_paused());
        assert_eq!(session.state(), FocusState::Idle);
        assert_eq!(session.tick(), None);
    }

    #[test]
    fn test_stop_and_pause_are_idempotent() {
        let mut session = FocusSession::new(short());
        session.start_focus();
        session.pause();
        session.pause();
        assert!(session.is_paused());
        session.stop();
        session.stop();
        assert_eq!(session.state(), FocusState::Idle);
        assert_eq!(session.remaining(), 0);
        assert!(!session.is_paused());
    }

    #[test]
    fn test_start_focus_restarts_countdown_from_any_state() {
        let mut session = FocusSession::new(short());
        session.start_rest();
        session.advance(2);
        session.start_focus();
        assert_eq!(session.state(), FocusState::Focusing);
        assert_eq!(session.remaining(), 10);

        session.advance(4);
        session.pause();
        session.start_focus();
        assert_eq!(session.remaining(), 10);
        assert!(!session.is_paused());
    }

    #[test]
    fn test_notifications_follow_transitions() {
        let notifier = RecordingNotifier::new();
        let mut session = FocusSession::with_notifier(FocusDurations::new(2, 1), &notifier);
        session.start_focus();
        session.advance(3);
        assert_eq!(
            notifier.kinds(),
            vec![
                NotifyKind::FocusStarted,
                NotifyKind::FocusCompleted,
                NotifyKind::RestStarted,
                NotifyKind::RestCompleted,
            ]
        );
    }

    #[test]
    fn test_formatted_remaining_is_minutes_and_seconds() {
        let mut session = FocusSession::new(FocusDurations::default());
        assert_eq!(session.formatted_remaining(), "00:00");
        session.start_focus();
        assert_eq!(session.formatted_remaining(), "25:00");
        session.tick();
        assert_eq!(session.formatted_remaining(), "24:59");
    }

    #[test]
    fn test_durations_are_at_least_one_second() {
        let durations = FocusDurations::new(0, 0);
        assert_eq!(durations.focus_secs(), 1);
        assert_eq!(durations.rest_secs(), 1);
        assert_eq!(FocusDurations::from_minutes(25, 5), FocusDurations::default());
    }
}
