//! Timer controller owning the tick source and exposing imperative actions

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle, time::Instant};
use tracing::{debug, info, trace};

use super::timer_state::{reduce, TimerAction, TimerSnapshot, TimerState};
use crate::tasks::tick_source_task;

/// Callback invoked once each time a running countdown reaches zero
pub type ExpiryCallback = Arc<dyn Fn() + Send + Sync>;

/// Shortest tick interval accepted by the controller
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Outcome of a single tick, tells the tick source whether to keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Continue,
    Expired,
    /// The tick belongs to a run that was stopped in the meantime
    Cancelled,
}

struct TickHandle {
    run: u64,
    handle: JoinHandle<()>,
}

struct Inner {
    state: TimerState,
    tick: Option<TickHandle>,
    next_run: u64,
}

struct Shared {
    inner: Mutex<Inner>,
    tick_interval: Duration,
    on_expire: Option<ExpiryCallback>,
    updates_tx: watch::Sender<TimerSnapshot>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Ok(inner) = self.inner.get_mut() {
            if let Some(tick) = inner.tick.take() {
                tick.handle.abort();
            }
        }
    }
}

/// Countdown timer with a single owned tick source.
///
/// Cloning is cheap and every clone drives the same timer. The tick source
/// only holds a weak reference, so dropping the last clone cancels it.
#[derive(Clone)]
pub struct TimerController {
    shared: Arc<Shared>,
}

/// Non-owning handle given to the tick source
#[derive(Clone)]
pub struct WeakTimerController {
    shared: Weak<Shared>,
}

impl WeakTimerController {
    pub fn upgrade(&self) -> Option<TimerController> {
        self.shared.upgrade().map(|shared| TimerController { shared })
    }
}

impl TimerController {
    /// Create an idle controller.
    ///
    /// `tick_interval` is raised to [`MIN_TICK_INTERVAL`] if shorter.
    pub fn new(
        initial_seconds: f64,
        tick_interval: Duration,
        on_expire: Option<ExpiryCallback>,
    ) -> Self {
        let state = TimerState::new(initial_seconds, Instant::now());
        let (updates_tx, _) = watch::channel(state.snapshot());

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state,
                    tick: None,
                    next_run: 0,
                }),
                tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
                on_expire,
                updates_tx,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakTimerController {
        WeakTimerController {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.shared.tick_interval
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, String> {
        self.shared
            .inner
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    fn apply(&self, inner: &mut Inner, action: TimerAction) -> TimerSnapshot {
        trace!("Applying {} to timer", action.name());
        inner.state = reduce(&inner.state, action);
        let snapshot = inner.state.snapshot();
        self.shared.updates_tx.send_replace(snapshot.clone());
        snapshot
    }

    /// Start counting down. No-op if a tick source is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<TimerSnapshot, String> {
        let mut inner = self.lock()?;
        if inner.tick.is_some() {
            debug!("Timer already running, ignoring start");
            return Ok(inner.state.snapshot());
        }

        let run = inner.next_run;
        inner.next_run += 1;

        let snapshot = self.apply(&mut inner, TimerAction::Start { now: Instant::now() });
        let handle = tokio::spawn(tick_source_task(
            self.downgrade(),
            run,
            self.shared.tick_interval,
        ));
        inner.tick = Some(TickHandle { run, handle });

        info!("Timer started with {:.1}s remaining", snapshot.remaining_seconds);
        Ok(snapshot)
    }

    /// Stop counting down, freezing the remaining time. No-op while idle.
    pub fn stop(&self) -> Result<TimerSnapshot, String> {
        let mut inner = self.lock()?;
        let Some(tick) = inner.tick.take() else {
            debug!("Timer not running, ignoring stop");
            return Ok(inner.state.snapshot());
        };

        tick.handle.abort();
        let snapshot = self.apply(&mut inner, TimerAction::Stop);

        info!("Timer stopped with {:.1}s remaining", snapshot.remaining_seconds);
        Ok(snapshot)
    }

    /// Restore the initial budget. No-op while running.
    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        let mut inner = self.lock()?;
        if inner.tick.is_some() {
            debug!("Timer running, ignoring reset");
            return Ok(inner.state.snapshot());
        }

        let snapshot = self.apply(&mut inner, TimerAction::Reset { now: Instant::now() });
        info!("Timer reset to {}s", snapshot.initial_seconds);
        Ok(snapshot)
    }

    /// Set both the initial and the remaining budget, in any state
    pub fn set_initial_seconds(&self, seconds: f64) -> Result<TimerSnapshot, String> {
        let mut inner = self.lock()?;
        let snapshot = self.apply(&mut inner, TimerAction::SetInitialSeconds { seconds });
        info!("Initial seconds set to {}", seconds);
        Ok(snapshot)
    }

    /// Sample the clock for the given run and auto-stop on expiry
    pub(crate) fn resample(&self, run: u64) -> Result<TickOutcome, String> {
        let mut inner = self.lock()?;
        match &inner.tick {
            Some(tick) if tick.run == run => {}
            _ => return Ok(TickOutcome::Cancelled),
        }

        self.apply(&mut inner, TimerAction::Resample { now: Instant::now() });
        if !inner.state.is_expired() {
            return Ok(TickOutcome::Continue);
        }

        // Called from the tick task itself, so release the handle without aborting.
        inner.tick = None;
        self.apply(&mut inner, TimerAction::Stop);
        drop(inner);

        info!("Countdown expired");
        if let Some(on_expire) = &self.shared.on_expire {
            on_expire();
        }
        Ok(TickOutcome::Expired)
    }

    pub fn state(&self) -> Result<TimerState, String> {
        self.lock().map(|inner| inner.state.clone())
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.lock().map(|inner| inner.state.snapshot())
    }

    /// Whole seconds left, `ceil` of the derived remaining time
    pub fn seconds(&self) -> Result<i64, String> {
        self.lock().map(|inner| inner.state.seconds())
    }

    pub fn is_running(&self) -> Result<bool, String> {
        self.lock().map(|inner| inner.tick.is_some())
    }

    /// Receive a snapshot after every state change, including each tick
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.updates_tx.subscribe()
    }
}

impl fmt::Debug for TimerController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerController")
            .field("state", &self.snapshot().ok())
            .field("tick_interval", &self.shared.tick_interval)
            .field("on_expire", &self.shared.on_expire.is_some())
            .finish()
    }
}
