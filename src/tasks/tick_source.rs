//! Tick source background task

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

use crate::state::{timer_controller::TickOutcome, WeakTimerController};

/// Re-sample the timer every `period` until its run is stopped or expires.
///
/// The first tick fires immediately, so a zero budget expires right away.
pub async fn tick_source_task(controller: WeakTimerController, run: u64, period: Duration) {
    debug!("Starting tick source for run {} every {:?}", run, period);

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(controller) = controller.upgrade() else {
            debug!("Timer dropped, ending tick source for run {}", run);
            break;
        };

        match controller.resample(run) {
            Ok(TickOutcome::Continue) => {}
            Ok(TickOutcome::Expired) => {
                debug!("Run {} expired, ending tick source", run);
                break;
            }
            Ok(TickOutcome::Cancelled) => {
                debug!("Run {} was stopped, ending tick source", run);
                break;
            }
            Err(e) => {
                error!("Failed to sample timer: {}", e);
                break;
            }
        }
    }
}
