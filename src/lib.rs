//! Countdown Timer - A state-managed countdown timer served over HTTP
//!
//! The core is a pure state machine ([`state::reduce`]) wrapped by a
//! [`TimerController`] that owns a single repeating tick source and fires
//! an optional callback when the countdown runs out.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, TimerController, TimerSnapshot};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
