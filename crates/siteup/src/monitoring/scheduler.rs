use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::orchestrator::Orchestrator;

/// Periodic "check all" trigger.
pub struct CheckScheduler {
    orchestrator: Orchestrator,
    period: Duration,
}

impl CheckScheduler {
    pub fn new(orchestrator: Orchestrator, period: Duration) -> Self {
        Self { orchestrator, period }
    }

    /// Run forever on the current task. The first round starts immediately and
    /// a round that overruns the period delays the next one.
    pub async fn run(self) {
        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;

            match self.orchestrator.check_all_sites().await {
                Ok(report) => tracing::debug!(checked = report.checked(), "Scheduled check round done"),
                Err(e) => tracing::error!("Scheduled check round failed: {}", e),
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
