//! Periodic removal of expired credentials.
//!
//! The sweeper runs [`CredentialStore::sweep_now`] on a fixed interval
//! until told to stop. [`Sweeper::run_once`] sweeps inline and
//! [`Sweeper::trigger`] starts a tracked background sweep. All paths share
//! the store's sweep guard, so at most one sweep per store is ever in
//! flight.
//!
//! Shutdown only cancels the wait for the next tick. A sweep that has
//! already started, scheduled or triggered, always runs to completion
//! before the spawned loop's handle resolves.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};

use crate::auth::credentials::{CredentialStore, SweepOutcome};
use crate::error::GateResult;

/// Default interval between scheduled sweeps (1 hour).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Scheduled and on-demand expiry sweeps for one store.
///
/// Clones share the set of triggered sweeps.
#[derive(Clone)]
pub struct Sweeper {
    store: Arc<CredentialStore>,
    interval: Duration,
    triggered: Arc<Mutex<JoinSet<()>>>,
}

impl Sweeper {
    pub fn new(store: Arc<CredentialStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            triggered: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    fn triggered(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.triggered.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Perform exactly one sweep now and log its outcome.
    pub async fn run_once(&self) -> GateResult<SweepOutcome> {
        match self.store.sweep_now().await {
            Ok(outcome) => {
                for (identity, reason) in &outcome.artifact_failures {
                    tracing::warn!("Could not remove artifact for {}: {}", identity, reason);
                }
                tracing::info!("Sweep removed {} expired credentials", outcome.count());
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Sweep failed: {}", e);
                Err(e)
            }
        }
    }

    /// Start one sweep in the background and return immediately.
    ///
    /// The sweep is tracked until it finishes; [`Sweeper::drain`] waits for
    /// it. Must be called inside a tokio runtime.
    pub fn trigger(&self) {
        let sweeper = self.clone();
        let mut triggered = self.triggered();
        // Reap finished sweeps so the set only holds live ones.
        while triggered.try_join_next().is_some() {}
        triggered.spawn(async move {
            // Outcome and failures are logged by run_once.
            let _ = sweeper.run_once().await;
        });
    }

    /// Wait for every triggered sweep, including ones triggered while
    /// waiting, to finish.
    pub async fn drain(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.triggered());
            if pending.is_empty() {
                return;
            }
            while let Some(result) = pending.join_next().await {
                if let Err(e) = result {
                    tracing::error!("Triggered sweep task failed: {}", e);
                }
            }
        }
    }

    /// Run a sweep every interval until `shutdown` flips to `true` or its
    /// sender is dropped.
    ///
    /// The first sweep happens one full interval after spawning.
    ///
    /// # Returns
    /// A JoinHandle that resolves once the loop has stopped and every
    /// triggered sweep has finished.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("Sweeper started (interval: {:?})", self.interval);

            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if *shutdown.borrow() {
                    break;
                }
                tokio::select! {
                    _ = ticker.tick() => {
                        // Shutdown is not polled while this runs.
                        let _ = self.run_once().await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }

            self.drain().await;
            tracing::info!("Sweeper stopped");
        })
    }
}
