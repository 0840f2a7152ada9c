//! State management module
//!
//! This module contains the countdown state machine, the controller that
//! drives it and the shared application state.

pub mod timer_state;
pub mod timer_controller;
pub mod app_state;

// Re-export main types
pub use timer_state::{reduce, TimerAction, TimerSnapshot, TimerState};
pub use timer_controller::{ExpiryCallback, TimerController, WeakTimerController};
pub use app_state::{AppState, ExpiryLog};
