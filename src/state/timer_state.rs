//! Timer state structure and transition logic
//!
//! ```text
//!            Start                      Resample
//!   Idle ───────────► Running ◄──────────────────┐
//!    ▲ │                 │  └────────────────────┘
//!    │ │ Reset    Stop   │
//!    │ └──┐  ┌───────────┘
//!    └────┘◄─┘
//! ```
//!
//! `SetInitialSeconds` is accepted in either state.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Seconds between two instants, zero if `to` precedes `from`
pub fn passed_seconds(from: Instant, to: Instant) -> f64 {
    to.saturating_duration_since(from).as_secs_f64()
}

/// Countdown state for one timer
#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    pub started_at: Instant,
    pub sampled_at: Instant,
    pub initial_seconds: f64,
    /// Budget left as of the last transition, not net of time since `started_at`
    pub remaining_seconds: f64,
    pub active: bool,
}

/// Transitions accepted by [`reduce`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerAction {
    Start { now: Instant },
    Stop,
    Reset { now: Instant },
    Resample { now: Instant },
    SetInitialSeconds { seconds: f64 },
}

impl TimerAction {
    /// Short name used for logging and last-action tracking
    pub fn name(&self) -> &'static str {
        match self {
            TimerAction::Start { .. } => "start",
            TimerAction::Stop => "stop",
            TimerAction::Reset { .. } => "reset",
            TimerAction::Resample { .. } => "resample",
            TimerAction::SetInitialSeconds { .. } => "set-initial-seconds",
        }
    }
}

impl TimerState {
    /// Create an idle timer with the given budget
    pub fn new(initial_seconds: f64, now: Instant) -> Self {
        Self {
            started_at: now,
            sampled_at: now,
            initial_seconds,
            remaining_seconds: initial_seconds,
            active: false,
        }
    }

    /// Seconds elapsed between the run start and the last sample
    pub fn elapsed_seconds(&self) -> f64 {
        passed_seconds(self.started_at, self.sampled_at)
    }

    /// Remaining budget net of elapsed time; negative once expired
    pub fn derived_remaining_seconds(&self) -> f64 {
        self.remaining_seconds - self.elapsed_seconds()
    }

    /// Whole seconds shown to the user
    pub fn seconds(&self) -> i64 {
        self.derived_remaining_seconds().ceil() as i64
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Check if a running timer has used up its budget
    pub fn is_expired(&self) -> bool {
        self.active && self.elapsed_seconds() >= self.remaining_seconds
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            seconds: self.seconds(),
            is_running: self.active,
            initial_seconds: self.initial_seconds,
            remaining_seconds: self.derived_remaining_seconds(),
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(0.0, Instant::now())
    }
}

/// Apply an action to a state and return the next state
pub fn reduce(state: &TimerState, action: TimerAction) -> TimerState {
    match action {
        TimerAction::Start { now } => {
            if state.active {
                return state.clone();
            }
            TimerState {
                remaining_seconds: state.derived_remaining_seconds(),
                started_at: now,
                sampled_at: now,
                active: true,
                ..state.clone()
            }
        }
        TimerAction::Stop => {
            if !state.active {
                return state.clone();
            }
            TimerState {
                remaining_seconds: state.derived_remaining_seconds(),
                started_at: state.sampled_at,
                active: false,
                ..state.clone()
            }
        }
        TimerAction::Reset { now } => {
            if state.active {
                return state.clone();
            }
            TimerState::new(state.initial_seconds, now)
        }
        TimerAction::Resample { now } => {
            if !state.active {
                return state.clone();
            }
            TimerState {
                sampled_at: now.max(state.started_at),
                ..state.clone()
            }
        }
        TimerAction::SetInitialSeconds { seconds } => TimerState {
            initial_seconds: seconds,
            remaining_seconds: seconds,
            ..state.clone()
        },
    }
}

/// Observer view of the timer, published on every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub seconds: i64,
    pub is_running: bool,
    pub initial_seconds: f64,
    pub remaining_seconds: f64,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn secs(n: f64) -> Duration {
        Duration::from_secs_f64(n)
    }

    #[test]
    fn new_timer_is_idle_with_full_budget() {
        let state = TimerState::new(5.0, Instant::now());
        assert!(!state.is_active());
        assert_eq!(state.remaining_seconds, 5.0);
        assert_eq!(state.seconds(), 5);
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let t0 = Instant::now();
        let running = reduce(&TimerState::new(10.0, t0), TimerAction::Start { now: t0 });
        let again = reduce(&running, TimerAction::Start { now: t0 + secs(2.0) });
        assert_eq!(again, running);
    }

    #[test]
    fn resample_advances_derived_value() {
        let t0 = Instant::now();
        let running = reduce(&TimerState::new(10.0, t0), TimerAction::Start { now: t0 });
        let sampled = reduce(&running, TimerAction::Resample { now: t0 + secs(2.5) });
        assert_eq!(sampled.remaining_seconds, 10.0);
        assert_eq!(sampled.derived_remaining_seconds(), 7.5);
        assert_eq!(sampled.seconds(), 8);
    }

    #[test]
    fn resample_is_ignored_while_idle() {
        let t0 = Instant::now();
        let idle = TimerState::new(10.0, t0);
        assert_eq!(reduce(&idle, TimerAction::Resample { now: t0 + secs(1.0) }), idle);
    }

    #[test]
    fn stop_snapshots_remaining_time() {
        let t0 = Instant::now();
        let mut state = reduce(&TimerState::new(10.0, t0), TimerAction::Start { now: t0 });
        state = reduce(&state, TimerAction::Resample { now: t0 + secs(3.0) });
        let stopped = reduce(&state, TimerAction::Stop);

        assert!(!stopped.active);
        assert_eq!(stopped.remaining_seconds, 7.0);
        assert_eq!(stopped.derived_remaining_seconds(), 7.0);
    }

    #[test]
    fn restart_resumes_from_stopped_value() {
        let t0 = Instant::now();
        let mut state = reduce(&TimerState::new(10.0, t0), TimerAction::Start { now: t0 });
        state = reduce(&state, TimerAction::Resample { now: t0 + secs(3.0) });
        state = reduce(&state, TimerAction::Stop);

        let t1 = t0 + secs(60.0);
        state = reduce(&state, TimerAction::Start { now: t1 });
        state = reduce(&state, TimerAction::Resample { now: t1 + secs(2.0) });
        assert_eq!(state.derived_remaining_seconds(), 5.0);
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let idle = TimerState::new(4.0, Instant::now());
        assert_eq!(reduce(&idle, TimerAction::Stop), idle);
    }

    #[test]
    fn reset_while_idle_restores_budget() {
        let t0 = Instant::now();
        let mut state = reduce(&TimerState::new(10.0, t0), TimerAction::Start { now: t0 });
        state = reduce(&state, TimerAction::Resample { now: t0 + secs(4.0) });
        state = reduce(&state, TimerAction::Stop);

        let t1 = t0 + secs(5.0);
        let reset = reduce(&state, TimerAction::Reset { now: t1 });
        assert_eq!(reset.remaining_seconds, reset.initial_seconds);
        assert!(!reset.active);
        assert_eq!(reset.started_at, t1);
        assert_eq!(reset.sampled_at, t1);
    }

    #[test]
    fn reset_while_running_is_noop() {
        let t0 = Instant::now();
        let running = reduce(&TimerState::new(10.0, t0), TimerAction::Start { now: t0 });
        assert_eq!(reduce(&running, TimerAction::Reset { now: t0 + secs(1.0) }), running);
    }

    #[test]
    fn set_initial_seconds_applies_in_any_state() {
        let t0 = Instant::now();
        let idle = TimerState::new(10.0, t0);
        let updated = reduce(&idle, TimerAction::SetInitialSeconds { seconds: 30.0 });
        assert_eq!(updated.initial_seconds, 30.0);
        assert_eq!(updated.remaining_seconds, 30.0);

        let running = reduce(&idle, TimerAction::Start { now: t0 });
        let updated = reduce(&running, TimerAction::SetInitialSeconds { seconds: 3.0 });
        assert!(updated.active);
        assert_eq!(updated.remaining_seconds, 3.0);
    }

    #[test]
    fn expiry_requires_running_and_spent_budget() {
        let t0 = Instant::now();
        let idle = TimerState::new(0.0, t0);
        assert!(!idle.is_expired());

        let running = reduce(&idle, TimerAction::Start { now: t0 });
        assert!(running.is_expired());

        let running = reduce(
            &TimerState::new(2.0, t0),
            TimerAction::Start { now: t0 },
        );
        assert!(!reduce(&running, TimerAction::Resample { now: t0 + secs(1.9) }).is_expired());
        assert!(reduce(&running, TimerAction::Resample { now: t0 + secs(2.0) }).is_expired());
    }

    #[test]
    fn negative_budget_is_not_clamped() {
        let state = TimerState::new(-3.5, Instant::now());
        assert_eq!(state.seconds(), -3);
        assert_eq!(state.snapshot().remaining_seconds, -3.5);
    }
}
