//! Periodic intake trigger.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::ResumeIntake;

/// Runs intake ticks on a fixed interval, starting immediately. Ticks never overlap: a tick that
/// outlasts the interval delays the next one instead of stacking.
pub struct IntakeScheduler;

impl IntakeScheduler {
    pub fn spawn(intake: Arc<ResumeIntake>, interval: Duration) -> IntakeSchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks: u64 = 0;

            info!(interval_secs = interval.as_secs(), "intake scheduler started");
            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                    _ = timer.tick() => {}
                }

                ticks += 1;
                debug!(tick = ticks, "intake tick triggered");
                let report = intake.run_once().await;
                if let Some(err) = &report.fetch_error {
                    warn!(tick = ticks, error = %err, "intake tick abandoned");
                }
            }
            info!(ticks, "intake scheduler stopped");
            ticks
        });

        IntakeSchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

pub struct IntakeSchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl IntakeSchedulerHandle {
    /// Stop after the tick in progress, if any, and return how many ticks ran.
    pub async fn shutdown(self) -> u64 {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(ticks) => ticks,
            Err(err) => {
                warn!(error = %err, "intake scheduler task ended abnormally");
                0
            }
        }
    }
}
