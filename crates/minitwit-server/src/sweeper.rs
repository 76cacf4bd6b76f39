use std::time::Duration;
use tracing::info;

use minitwit_api::latest::CommandTracker;

/// Background task that drops command checkpoints of idle sessions.
pub async fn run_sweep_loop(tracker: CommandTracker, interval: Duration) {
    let mut interval = tokio::time::interval(interval);

    loop {
        interval.tick().await;

        let count = tracker.purge_expired().await;
        if count > 0 {
            info!("Sweep: dropped {} idle sessions", count);
        }
    }
}
