//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tracing::warn;

use super::{TimerController, TimerSnapshot};

/// Expiry bookkeeping shared with the controller's expiry callback
#[derive(Debug, Default, Clone)]
pub struct ExpiryLog {
    pub count: u64,
    pub last_expired_at: Option<DateTime<Utc>>,
}

/// Main application state shared by all HTTP handlers
#[derive(Debug)]
pub struct AppState {
    pub timer: TimerController,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    pub expirations: Arc<Mutex<ExpiryLog>>,
}

impl AppState {
    /// Create a new AppState with an idle timer
    pub fn new(port: u16, host: String, initial_seconds: f64, tick_interval: Duration) -> Self {
        let expirations = Arc::new(Mutex::new(ExpiryLog::default()));

        let log = Arc::clone(&expirations);
        let timer = TimerController::new(
            initial_seconds,
            tick_interval,
            Some(Arc::new(move || match log.lock() {
                Ok(mut log) => {
                    log.count += 1;
                    log.last_expired_at = Some(Utc::now());
                }
                Err(e) => warn!("Failed to record expiry: {}", e),
            })),
        );

        Self {
            timer,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            expirations,
        }
    }

    /// Run a timer action and record it as the last action
    pub fn run_action<F>(&self, action: &str, op: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&TimerController) -> Result<TimerSnapshot, String>,
    {
        let snapshot = op(&self.timer)?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(snapshot)
    }

    pub fn start(&self) -> Result<TimerSnapshot, String> {
        self.run_action("start", TimerController::start)
    }

    pub fn stop(&self) -> Result<TimerSnapshot, String> {
        self.run_action("stop", TimerController::stop)
    }

    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        self.run_action("reset", TimerController::reset)
    }

    pub fn set_initial_seconds(&self, seconds: f64) -> Result<TimerSnapshot, String> {
        self.run_action("set-initial-seconds", |timer| timer.set_initial_seconds(seconds))
    }

    /// Get expiry count and time of the latest expiry
    pub fn get_expirations(&self) -> Result<ExpiryLog, String> {
        self.expirations
            .lock()
            .map(|log| log.clone())
            .map_err(|e| format!("Failed to lock expiry log: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

fn format_uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3 * 3600 + 61)), "3h 1m 1s");
    }

    #[tokio::test(start_paused = true)]
    async fn actions_are_tracked() {
        let state = AppState::new(0, "127.0.0.1".to_string(), 5.0, Duration::from_millis(100));
        assert_eq!(state.get_last_action().0, None);

        state.set_initial_seconds(12.0).unwrap();
        assert_eq!(state.get_last_action().0.as_deref(), Some("set-initial-seconds"));

        state.reset().unwrap();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("reset"));
        assert!(time.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_is_recorded() {
        let state = AppState::new(0, "127.0.0.1".to_string(), 1.0, Duration::from_millis(100));
        state.start().unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        let log = state.get_expirations().unwrap();
        assert_eq!(log.count, 1);
        assert!(log.last_expired_at.is_some());
    }
}
