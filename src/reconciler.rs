//! Pending transaction reconciler
//!
//! Background task polling the chain data provider while addresses of the
//! current network wait on pending transactions. It sleeps on a wakeup signal
//! while nothing is pending and every check is awaited before the next tick,
//! so two checks never overlap.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::manager::{AddressManager, PendingCheck};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcilerState {
    Idle,
    Polling,
}

pub struct PendingReconciler {
    manager: Arc<AddressManager>,
    interval: Duration,
}

impl PendingReconciler {
    pub fn new(manager: Arc<AddressManager>, interval: Duration) -> Self {
        Self { manager, interval }
    }

    /// Start the polling task. Dropping the returned handle stops it.
    pub fn spawn(self) -> ReconcilerHandle {
        let (state_tx, state_rx) = watch::channel(ReconcilerState::Idle);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(state_tx, shutdown_rx));

        ReconcilerHandle {
            state: state_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    async fn run(
        self,
        state: watch::Sender<ReconcilerState>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        log::debug!("Pending transaction reconciler started ({:?} interval)", self.interval);

        'idle: loop {
            if self.manager.hashes_needing_pending_check().await.is_empty() {
                state.send_replace(ReconcilerState::Idle);
                tokio::select! {
                    _ = &mut shutdown => break 'idle,
                    _ = self.manager.pending_wakeup().notified() => continue 'idle,
                }
            }

            log::info!("Pending transactions detected, polling every {:?}", self.interval);
            state.send_replace(ReconcilerState::Polling);

            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut shutdown => break 'idle,
                    _ = ticker.tick() => {}
                }

                match self.manager.check_pending_transactions().await {
                    PendingCheck::Idle => {
                        log::info!("No pending transactions left, polling stopped");
                        continue 'idle;
                    }
                    PendingCheck::InFlight => {}
                    PendingCheck::Checked(report) => {
                        log::debug!(
                            "Pending check: {} refreshed, {} failed, {} confirmed{}",
                            report.refreshed.len(),
                            report.failed.len(),
                            report.confirmed_pending,
                            if report.offline { " (offline)" } else { "" }
                        );
                    }
                }
            }
        }

        state.send_replace(ReconcilerState::Idle);
        log::debug!("Pending transaction reconciler stopped");
    }
}

pub struct ReconcilerHandle {
    state: watch::Receiver<ReconcilerState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
    pub fn state(&self) -> ReconcilerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReconcilerState> {
        self.state.clone()
    }

    /// Stop polling and wait for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("Reconciler task failed: {}", e);
            }
        }
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
