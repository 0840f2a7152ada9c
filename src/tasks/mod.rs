//! Background tasks module
//!
//! This module contains the tick source that drives a running countdown.

pub mod tick_source;

pub use tick_source::tick_source_task;
