//! Registry-driven unit discovery.
//!
//! The coordinator listens for change notifications from the remote registry
//! and re-scans the handled unit set each time one arrives. Scans are
//! coalesced: while one pass is running, further triggers are dropped, and
//! the registry notification that arrives after the pass finishes starts the
//! next one. Each pass diffs the current unit set against the previous
//! snapshot and reports only additions and removals to the sink.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use homelink_model::UnitId;

use crate::config::BridgeConfig;
use crate::diff::SnapshotDiff;
use crate::filter::DiscoveryFilter;
use crate::remote::UnitRegistry;
use crate::sink::DiscoverySink;

/// A unit reported to the discovery sink.
#[derive(Debug, Clone)]
pub struct DiscoveredUnit {
    /// Stable unit identifier
    pub id: UnitId,
    /// Human-readable label at discovery time
    pub label: String,
    /// When the unit was first reported
    pub discovered_at: DateTime<Utc>,
}

/// Coordinates discovery passes against the remote registry.
///
/// Cheap to clone; all state is shared behind `Arc`s.
#[derive(Clone)]
pub struct DiscoveryCoordinator {
    registry: Arc<dyn UnitRegistry>,
    sink: Arc<dyn DiscoverySink>,
    filter: DiscoveryFilter,
    config: BridgeConfig,
    diff: Arc<Mutex<SnapshotDiff>>,
    discovered: Arc<RwLock<HashMap<UnitId, DiscoveredUnit>>>,
    scan_task: Arc<StdMutex<Option<JoinHandle<()>>>>,
    background_task: Arc<StdMutex<Option<JoinHandle<()>>>>,
    initial: Arc<AtomicBool>,
}

impl DiscoveryCoordinator {
    pub fn new(
        registry: Arc<dyn UnitRegistry>,
        sink: Arc<dyn DiscoverySink>,
        config: BridgeConfig,
    ) -> Self {
        let filter = DiscoveryFilter::new(config.foreign_binding_id.clone());
        Self {
            registry,
            sink,
            filter,
            config,
            diff: Arc::new(Mutex::new(SnapshotDiff::new())),
            discovered: Arc::new(RwLock::new(HashMap::new())),
            scan_task: Arc::new(StdMutex::new(None)),
            background_task: Arc::new(StdMutex::new(None)),
            initial: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Advertised upper bound for a single scan pass.
    pub fn scan_timeout(&self) -> Duration {
        self.config.scan_timeout()
    }

    /// Start a scan pass unless one is already running.
    ///
    /// Triggers arriving while a pass is in flight are dropped. Registry
    /// change notifications keep coming, so a dropped trigger is recovered
    /// by the next notification.
    pub fn trigger(&self) {
        let mut guard = match self.scan_task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(task) = guard.as_ref() {
            if !task.is_finished() {
                info!("Discovery scan already running, skipping trigger");
                return;
            }
        }

        let coordinator = self.clone();
        *guard = Some(tokio::spawn(async move {
            coordinator.run_scan().await;
        }));
    }

    /// Abort the in-flight scan pass, if any.
    pub fn stop_scan(&self) {
        let mut guard = match self.scan_task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(task) = guard.take() {
            task.abort();
            debug!("Discovery scan aborted");
        }
    }

    /// Subscribe to registry change notifications and re-scan on each one.
    ///
    /// Also kicks off an immediate initial pass.
    pub fn start_background(&self) {
        let mut guard = match self.background_task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() {
            return;
        }

        // Re-arm the one-time grace delay for this activation.
        self.initial.store(true, Ordering::SeqCst);

        let coordinator = self.clone();
        let mut changes = self.registry.subscribe_changes();
        *guard = Some(tokio::spawn(async move {
            coordinator.trigger();
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        debug!(revision = change.revision, "Registry change received");
                        coordinator.trigger();
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Registry change stream lagged, re-scanning");
                        coordinator.trigger();
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Registry change stream closed");
                        break;
                    }
                }
            }
        }));
    }

    /// Stop listening for registry changes and abort any running pass.
    pub fn stop_background(&self) {
        let mut guard = match self.background_task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(task) = guard.take() {
            task.abort();
        }
        self.stop_scan();
    }

    /// Units currently reported as discovered.
    pub async fn discovered_units(&self) -> Vec<DiscoveredUnit> {
        self.discovered.read().await.values().cloned().collect()
    }

    async fn run_scan(&self) {
        if !self.registry.is_data_available() {
            debug!("Registry data not available yet, waiting");
            if let Err(e) = self.registry.wait_for_data().await {
                warn!("Discovery pass aborted while waiting for registry: {}", e);
                return;
            }
        }

        // One-time grace period so the remote side can finish its own
        // startup before the first full pass.
        if self.initial.swap(false, Ordering::SeqCst) {
            let grace = self.config.startup_grace();
            if !grace.is_zero() {
                tokio::time::sleep(grace).await;
            }
        }

        let units = match self.filter.handled_units(self.registry.as_ref()).await {
            Ok(units) => units,
            Err(e) => {
                warn!("Discovery pass aborted: {}", e);
                return;
            }
        };

        let report = {
            let mut diff = self.diff.lock().await;
            diff.diff(&units)
        };

        if report.is_empty() {
            debug!("Discovery pass found no changes");
            return;
        }

        info!(
            added = report.added.len(),
            removed = report.removed.len(),
            "Discovery pass complete"
        );

        for unit in &report.added {
            let label = unit.display_label(&self.config.preferred_languages);
            self.sink.unit_discovered(&unit.id, &label).await;
            self.discovered.write().await.insert(
                unit.id.clone(),
                DiscoveredUnit {
                    id: unit.id.clone(),
                    label,
                    discovered_at: Utc::now(),
                },
            );
        }

        for unit in &report.removed {
            self.sink.unit_removed(&unit.id).await;
            self.discovered.write().await.remove(&unit.id);
        }
    }

    /// Run a single pass inline. Used by tests and manual scans.
    pub async fn scan_once(&self) {
        self.run_scan().await;
    }
}
