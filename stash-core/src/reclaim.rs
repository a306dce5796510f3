use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::store::StoreInner;

/// Background task that periodically removes expired entries
///
/// The reclaimer holds only a weak reference to the store state, so the task
/// can never keep the store alive on its own. It exits when the shutdown
/// signal fires or when every `Store` handle has been dropped.
pub(crate) struct Reclaimer {
    store: Weak<StoreInner>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl Reclaimer {
    /// Spawns the reclaimer loop on the current Tokio runtime
    pub(crate) fn spawn(
        store: Weak<StoreInner>,
        interval: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let reclaimer = Self {
            store,
            interval,
            shutdown_rx,
        };
        tokio::spawn(reclaimer.run())
    }

    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        // The first tick completes immediately; wait one full interval
        // before the first sweep.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(store) = self.store.upgrade() else {
                        break;
                    };
                    let removed = store.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "swept expired entries");
                    }
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
