//! Background removal of abandoned destruction requests
//!
//! Expiry is enforced when a confirmation touches a record. Records nobody
//! touches again would otherwise stay in memory until restart, so the sweeper
//! periodically drops everything past its deadline.

use std::time::Duration;

use tokio::task::JoinHandle;

use super::coordinator::DestructionCoordinator;

/// Default interval between sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct ExpirySweeper {
    coordinator: DestructionCoordinator,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(coordinator: DestructionCoordinator, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    /// Spawn the sweep loop on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let removed = self.coordinator.sweep_expired();
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        remaining = self.coordinator.pending_count(),
                        "Swept expired destruction requests"
                    );
                }
            }
        })
    }
}
