//! Shared mocks for bridge integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{broadcast, Notify};

use homelink_bridge::{
    ChannelSink, DiscoverySink, RegistryChange, UnitLink, UnitRegistry, UnitResolver,
};
use homelink_model::{
    ChannelSpec, ChannelValue, ConnectionState, RegistryError, ServiceType, ThingStatus,
    UnitEntity, UnitId, UnitKind,
};
use homelink_transform::ServiceState;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// In-memory unit registry with scripted availability and change stream.
pub struct MockRegistry {
    units: Mutex<Vec<UnitEntity>>,
    available: AtomicBool,
    available_notify: Notify,
    changes: broadcast::Sender<RegistryChange>,
    list_calls: AtomicUsize,
}

impl MockRegistry {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            units: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            available_notify: Notify::new(),
            changes,
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_units(&self, units: Vec<UnitEntity>) {
        *self.units.lock().unwrap() = units;
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
        if available {
            self.available_notify.notify_waiters();
        }
    }

    pub fn emit_change(&self, revision: u64) {
        let _ = self.changes.send(RegistryChange { revision });
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitRegistry for MockRegistry {
    fn is_data_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn wait_for_data(&self) -> Result<(), RegistryError> {
        loop {
            let notified = self.available_notify.notified();
            if self.available.load(Ordering::SeqCst) {
                return Ok(());
            }
            notified.await;
        }
    }

    async fn list_units(&self, kind: Option<UnitKind>) -> Result<Vec<UnitEntity>, RegistryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let units = self.units.lock().unwrap();
        Ok(units
            .iter()
            .filter(|u| kind.map(|k| u.kind == k).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn unit_by_id(&self, id: &UnitId) -> Result<UnitEntity, RegistryError> {
        self.units
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::NotAvailable(id.to_string()))
    }

    async fn resolve_host(&self, unit: &UnitEntity) -> Result<Option<UnitEntity>, RegistryError> {
        match &unit.host_id {
            Some(host_id) => self.unit_by_id(host_id).await.map(Some),
            None => Ok(None),
        }
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<RegistryChange> {
        self.changes.subscribe()
    }
}

/// Scripted live handle for a single unit.
pub struct MockLink {
    record: Mutex<UnitEntity>,
    states: Mutex<HashMap<ServiceType, ServiceState>>,
    fused: Mutex<Vec<ServiceType>>,
    scoped_power: Mutex<Option<ServiceState>>,
    data_available: AtomicBool,
    reject_writes: AtomicBool,
    applied: Mutex<Vec<(ServiceType, ServiceState)>>,
    applied_scoped: Mutex<Vec<(UnitKind, ServiceState)>>,
    connection_tx: broadcast::Sender<ConnectionState>,
    config_tx: broadcast::Sender<UnitEntity>,
    data_tx: broadcast::Sender<()>,
}

impl MockLink {
    pub fn new(record: UnitEntity) -> Self {
        let (connection_tx, _) = broadcast::channel(16);
        let (config_tx, _) = broadcast::channel(16);
        let (data_tx, _) = broadcast::channel(16);
        Self {
            record: Mutex::new(record),
            states: Mutex::new(HashMap::new()),
            fused: Mutex::new(Vec::new()),
            scoped_power: Mutex::new(None),
            data_available: AtomicBool::new(true),
            reject_writes: AtomicBool::new(false),
            applied: Mutex::new(Vec::new()),
            applied_scoped: Mutex::new(Vec::new()),
            connection_tx,
            config_tx,
            data_tx,
        }
    }

    pub fn set_state(&self, service: ServiceType, state: ServiceState) {
        self.states.lock().unwrap().insert(service, state);
    }

    pub fn set_fused(&self, services: Vec<ServiceType>) {
        *self.fused.lock().unwrap() = services;
    }

    pub fn set_scoped_power(&self, state: ServiceState) {
        *self.scoped_power.lock().unwrap() = Some(state);
    }

    pub fn set_data_available(&self, available: bool) {
        self.data_available.store(available, Ordering::SeqCst);
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn applied_writes(&self) -> Vec<(ServiceType, ServiceState)> {
        self.applied.lock().unwrap().clone()
    }

    pub fn applied_scoped_writes(&self) -> Vec<(UnitKind, ServiceState)> {
        self.applied_scoped.lock().unwrap().clone()
    }

    pub fn emit_connection(&self, state: ConnectionState) {
        let _ = self.connection_tx.send(state);
    }

    pub fn emit_config(&self, record: UnitEntity) {
        *self.record.lock().unwrap() = record.clone();
        let _ = self.config_tx.send(record);
    }

    pub fn emit_data(&self) {
        let _ = self.data_tx.send(());
    }
}

#[async_trait]
impl UnitLink for MockLink {
    fn id(&self) -> UnitId {
        self.record.lock().unwrap().id.clone()
    }

    fn is_data_available(&self) -> bool {
        self.data_available.load(Ordering::SeqCst)
    }

    async fn config(&self) -> Result<UnitEntity, RegistryError> {
        Ok(self.record.lock().unwrap().clone())
    }

    async fn available_service_types(&self) -> Vec<ServiceType> {
        self.record.lock().unwrap().services.clone()
    }

    async fn fused_service_types(&self) -> Vec<ServiceType> {
        self.fused.lock().unwrap().clone()
    }

    async fn service_state(&self, service: ServiceType) -> Result<ServiceState, RegistryError> {
        self.states
            .lock()
            .unwrap()
            .get(&service)
            .cloned()
            .ok_or_else(|| RegistryError::NotAvailable(format!("{}", service)))
    }

    async fn apply_service_state(
        &self,
        service: ServiceType,
        state: ServiceState,
    ) -> Result<(), RegistryError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(RegistryError::Transport("write rejected".to_string()));
        }
        self.applied.lock().unwrap().push((service, state.clone()));
        self.states.lock().unwrap().insert(service, state);
        Ok(())
    }

    async fn scoped_power_state(&self, _scope: UnitKind) -> Result<ServiceState, RegistryError> {
        self.scoped_power
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RegistryError::NotAvailable("scoped power".to_string()))
    }

    async fn apply_scoped_power(
        &self,
        state: ServiceState,
        scope: UnitKind,
    ) -> Result<(), RegistryError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(RegistryError::Transport("write rejected".to_string()));
        }
        self.applied_scoped
            .lock()
            .unwrap()
            .push((scope, state.clone()));
        *self.scoped_power.lock().unwrap() = Some(state);
        Ok(())
    }

    fn subscribe_connection(&self) -> broadcast::Receiver<ConnectionState> {
        self.connection_tx.subscribe()
    }

    fn subscribe_config(&self) -> broadcast::Receiver<UnitEntity> {
        self.config_tx.subscribe()
    }

    fn subscribe_data(&self) -> broadcast::Receiver<()> {
        self.data_tx.subscribe()
    }
}

/// Resolver over a fixed set of mock links.
#[derive(Default)]
pub struct MockResolver {
    links: Mutex<HashMap<UnitId, Arc<MockLink>>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&self, link: Arc<MockLink>) {
        self.links.lock().unwrap().insert(link.id(), link);
    }
}

#[async_trait]
impl UnitResolver for MockResolver {
    async fn unit_link(&self, id: &UnitId) -> Result<Arc<dyn UnitLink>, RegistryError> {
        self.links
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .map(|link| link as Arc<dyn UnitLink>)
            .ok_or_else(|| RegistryError::NotAvailable(id.to_string()))
    }
}

/// Discovery events recorded in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    Added(UnitId, String),
    Removed(UnitId),
}

#[derive(Default)]
pub struct RecordingDiscoverySink {
    events: Mutex<Vec<DiscoveryEvent>>,
}

impl RecordingDiscoverySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiscoveryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn added_ids(&self) -> Vec<UnitId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DiscoveryEvent::Added(id, _) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn removed_ids(&self) -> Vec<UnitId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DiscoveryEvent::Removed(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DiscoverySink for RecordingDiscoverySink {
    async fn unit_discovered(&self, id: &UnitId, label: &str) {
        self.events
            .lock()
            .unwrap()
            .push(DiscoveryEvent::Added(id.clone(), label.to_string()));
    }

    async fn unit_removed(&self, id: &UnitId) {
        self.events
            .lock()
            .unwrap()
            .push(DiscoveryEvent::Removed(id.clone()));
    }
}

/// Channel sink that records everything pushed into it.
#[derive(Default)]
pub struct RecordingChannelSink {
    channels: Mutex<HashMap<UnitId, Vec<ChannelSpec>>>,
    states: Mutex<Vec<(UnitId, String, ChannelValue)>>,
    statuses: Mutex<Vec<(UnitId, ThingStatus)>>,
    labels: Mutex<Vec<(UnitId, String, Option<String>)>>,
}

impl RecordingChannelSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self, id: &UnitId) -> Vec<ChannelSpec> {
        self.channels
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn states(&self) -> Vec<(UnitId, String, ChannelValue)> {
        self.states.lock().unwrap().clone()
    }

    /// The most recent value pushed onto a channel, if any.
    pub fn last_state(&self, id: &UnitId, channel_id: &str) -> Option<ChannelValue> {
        self.states()
            .into_iter()
            .rev()
            .find(|(unit, channel, _)| unit == id && channel == channel_id)
            .map(|(_, _, value)| value)
    }

    pub fn clear_states(&self) {
        self.states.lock().unwrap().clear();
    }

    pub fn statuses(&self) -> Vec<(UnitId, ThingStatus)> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<(UnitId, String, Option<String>)> {
        self.labels.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelSink for RecordingChannelSink {
    async fn rebuild_channels(&self, id: &UnitId, channels: Vec<ChannelSpec>) {
        self.channels.lock().unwrap().insert(id.clone(), channels);
    }

    async fn update_state(&self, id: &UnitId, channel_id: &str, value: ChannelValue) {
        self.states
            .lock()
            .unwrap()
            .push((id.clone(), channel_id.to_string(), value));
    }

    async fn update_status(&self, id: &UnitId, status: ThingStatus) {
        self.statuses.lock().unwrap().push((id.clone(), status));
    }

    async fn update_labels(&self, id: &UnitId, label: &str, location: Option<&str>) {
        self.labels.lock().unwrap().push((
            id.clone(),
            label.to_string(),
            location.map(str::to_string),
        ));
    }
}
