//! # Sync Agent
//!
//! The background driver for [`SyncService`]: a spawned task that owns
//! the timers and the connectivity signal so the service itself stays
//! free of clocks.
//!
//! ## Task Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SyncAgent task                                   │
//! │                                                                         │
//! │  startup:  seed connectivity from the watch, optional full sync        │
//! │                                                                         │
//! │  select! {                                                              │
//! │    interval.tick()        ──► check_drift (no-op while offline)        │
//! │    connectivity.changed() ──► set_online; offline→online edge runs     │
//! │                               an immediate full sync                    │
//! │    shutdown               ──► break                                     │
//! │  }                                                                      │
//! │                                                                         │
//! │  Pass errors are caught and logged here; they never kill the loop.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::service::SyncService;

// =============================================================================
// Sync Agent
// =============================================================================

/// Spawns and supervises the background sync loop.
pub struct SyncAgent {
    service: Arc<SyncService>,
    connectivity: watch::Receiver<bool>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle to a running agent task.
pub struct SyncAgentHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl SyncAgent {
    /// Spawns the agent task.
    ///
    /// `connectivity` is the platform's online/offline signal; the agent
    /// seeds the service from its current value before the first pass.
    pub fn spawn(
        service: Arc<SyncService>,
        connectivity: watch::Receiver<bool>,
    ) -> SyncAgentHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let agent = SyncAgent {
            service,
            connectivity,
            shutdown_rx,
        };
        let join = tokio::spawn(agent.run());
        SyncAgentHandle { shutdown_tx, join }
    }

    async fn run(mut self) {
        let online = *self.connectivity.borrow();
        self.service.set_online(online);

        if online && self.service.config().startup_sync {
            debug!("Running startup sync");
            if let Err(err) = self.service.full_sync().await {
                warn!(%err, "Startup sync failed, continuing from local cache");
            }
        }

        // First tick lands one full period out; the startup sync above
        // already covered "now".
        let period = self.service.config().sync_interval();
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = period.as_secs(), "Sync agent started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = self.service.check_drift().await {
                        warn!(%err, "Drift check failed");
                    }
                }
                changed = self.connectivity.changed() => {
                    if changed.is_err() {
                        // Signal source gone; nothing left to drive us
                        info!("Connectivity signal closed, sync agent stopping");
                        break;
                    }
                    let online = *self.connectivity.borrow();
                    if self.service.set_online(online) && online {
                        debug!("Back online, running catch-up sync");
                        if let Err(err) = self.service.full_sync().await {
                            warn!(%err, "Catch-up sync failed");
                        }
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Sync agent shutting down");
                    break;
                }
            }
        }
    }
}

impl SyncAgentHandle {
    /// Stops the agent and waits for the task to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.join.await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::error::SyncResult;
    use crate::event::SyncEventKind;
    use crate::memory::{MemoryLocalStore, MemoryRemoteStore};
    use crate::store::{LocalStore, RemoteStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use lumen_core::{Bill, Product};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn product(id: &str, barcode: &str) -> Product {
        Product {
            id: id.into(),
            barcode: barcode.into(),
            name: format!("Product {id}"),
            description: None,
            price_cents: 100,
            category: None,
            stock: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Remote wrapper counting every call that reaches the network.
    struct CountingRemote {
        inner: MemoryRemoteStore,
        calls: AtomicUsize,
    }

    impl CountingRemote {
        fn new(inner: MemoryRemoteStore) -> Self {
            CountingRemote {
                inner,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteStore for CountingRemote {
        async fn get_products(&self) -> SyncResult<Vec<Product>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_products().await
        }

        async fn create_product(&self, p: &Product) -> SyncResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create_product(p).await
        }

        async fn update_product(&self, p: &Product) -> SyncResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.update_product(p).await
        }

        async fn delete_product(&self, id: &str) -> SyncResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_product(id).await
        }

        async fn find_product_by_barcode(&self, barcode: &str) -> SyncResult<Option<Product>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_product_by_barcode(barcode).await
        }

        async fn get_bills(&self) -> SyncResult<Vec<Bill>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_bills().await
        }

        async fn create_bill(&self, b: &Bill) -> SyncResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create_bill(b).await
        }
    }

    fn config() -> SyncConfig {
        SyncConfig {
            sync_interval_secs: 10,
            startup_sync: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_sync_uploads_local_records() {
        let local =
            Arc::new(MemoryLocalStore::with_products(vec![product("P-000001", "11111111")]).await);
        let remote = Arc::new(MemoryRemoteStore::new());
        let service =
            Arc::new(SyncService::new(local, remote.clone(), config()).unwrap());

        let (_tx, rx) = watch::channel(true);
        let handle = SyncAgent::spawn(service, rx);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(remote.product_rows().await.len(), 1);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_drift_check_downloads_new_rows() {
        let local = Arc::new(MemoryLocalStore::new());
        let remote = Arc::new(MemoryRemoteStore::new());
        let service =
            Arc::new(SyncService::new(local.clone(), remote.clone(), config()).unwrap());

        let (_tx, rx) = watch::channel(true);
        let handle = SyncAgent::spawn(service, rx);
        tokio::time::sleep(Duration::from_millis(10)).await;

        // A row appears remotely between passes
        remote.create_product(&product("r-1", "22222222")).await.unwrap();
        assert!(local.get_products().await.unwrap().is_empty());

        // The next drift check sees the cardinality mismatch
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(local.get_products().await.unwrap().len(), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_issues_no_remote_traffic() {
        let local =
            Arc::new(MemoryLocalStore::with_products(vec![product("P-000001", "11111111")]).await);
        let remote = Arc::new(CountingRemote::new(MemoryRemoteStore::new()));
        let service =
            Arc::new(SyncService::new(local, remote.clone(), config()).unwrap());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        drop(service.subscribe(move |e| sink.lock().unwrap().push(e.kind.clone())));

        let (tx, rx) = watch::channel(false);
        let handle = SyncAgent::spawn(service, rx);

        // Several intervals pass while offline: zero remote calls
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(remote.calls(), 0);

        // Connectivity returns: exactly one catch-up pass runs
        tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(remote.calls() > 0);

        let full_syncs = events
            .lock()
            .unwrap()
            .iter()
            .filter(|k| matches!(k, SyncEventKind::FullSync { .. }))
            .count();
        assert_eq!(full_syncs, 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_online_to_online_does_not_resync() {
        let local = Arc::new(MemoryLocalStore::new());
        let remote = Arc::new(CountingRemote::new(MemoryRemoteStore::new()));
        let service = Arc::new(
            SyncService::new(
                local,
                remote.clone(),
                SyncConfig {
                    startup_sync: false,
                    ..config()
                },
            )
            .unwrap(),
        );

        let (tx, rx) = watch::channel(true);
        let handle = SyncAgent::spawn(service, rx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let baseline = remote.calls();

        // Re-asserting "online" is not an offline→online edge
        tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(remote.calls(), baseline);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_the_loop() {
        let local = Arc::new(MemoryLocalStore::new());
        let remote = Arc::new(CountingRemote::new(MemoryRemoteStore::new()));
        let service = Arc::new(
            SyncService::new(
                local,
                remote.clone(),
                SyncConfig {
                    startup_sync: false,
                    ..config()
                },
            )
            .unwrap(),
        );

        let (_tx, rx) = watch::channel(true);
        let handle = SyncAgent::spawn(service, rx);
        handle.shutdown().await;

        let stopped_at = remote.calls();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(remote.calls(), stopped_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_connectivity_signal_stops_agent() {
        let local = Arc::new(MemoryLocalStore::new());
        let remote = Arc::new(CountingRemote::new(MemoryRemoteStore::new()));
        let service = Arc::new(
            SyncService::new(
                local,
                remote.clone(),
                SyncConfig {
                    startup_sync: false,
                    ..config()
                },
            )
            .unwrap(),
        );

        let (tx, rx) = watch::channel(true);
        let handle = SyncAgent::spawn(service, rx);
        drop(tx);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(handle.join.is_finished());
        let stopped_at = remote.calls();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(remote.calls(), stopped_at);
    }
}
