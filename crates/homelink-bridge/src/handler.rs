//! Per-unit event handler.
//!
//! Each handled unit gets one handler. The handler subscribes to the unit's
//! connection, config and data streams and funnels them, together with
//! inbound channel commands, into a single queue drained by one worker task.
//! That gives strict per-unit event ordering without holding locks across
//! remote calls.
//!
//! Failure policy for commands: a write that the remote rejects is rolled
//! back by reading the unit's actual state and reflecting it to the channel,
//! so the channel never shows a value the unit does not hold.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use homelink_model::{
    ChannelValue, ConnectionState, HandlerError, ServiceType, ThingStatus, TransformError,
    UnitEntity, UnitId, UnitKind, ValueKind, CHANNEL_POWER_LIGHT,
};
use homelink_transform::{
    channels_for, composite_rule, value_kinds_for, ServiceState, TransformerRegistry,
};

use crate::auth::AuthContext;
use crate::config::BridgeConfig;
use crate::remote::{UnitLink, UnitRegistry, UnitResolver};
use crate::sink::ChannelSink;

/// Queue depth for the per-unit event queue.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// Events processed by the per-unit worker, in arrival order.
#[derive(Debug, Clone)]
pub enum UnitEvent {
    /// The unit's connection state changed.
    Connection(ConnectionState),
    /// The unit's registry record changed.
    ConfigChanged,
    /// The unit's service data changed.
    DataChanged,
    /// A command arrived on one of the unit's channels.
    Command {
        channel_id: String,
        value: ChannelValue,
    },
}

/// Handler for one remote unit.
pub struct UnitHandler {
    id: UnitId,
    registry: Arc<dyn UnitRegistry>,
    resolver: Arc<dyn UnitResolver>,
    sink: Arc<dyn ChannelSink>,
    transformers: Arc<TransformerRegistry>,
    auth: AuthContext,
    config: BridgeConfig,
    tx: StdMutex<Option<mpsc::Sender<UnitEvent>>>,
    tasks: StdMutex<Vec<JoinHandle<()>>>,
}

impl UnitHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: UnitId,
        registry: Arc<dyn UnitRegistry>,
        resolver: Arc<dyn UnitResolver>,
        sink: Arc<dyn ChannelSink>,
        transformers: Arc<TransformerRegistry>,
        auth: AuthContext,
        config: BridgeConfig,
    ) -> Self {
        Self {
            id,
            registry,
            resolver,
            sink,
            transformers,
            auth,
            config,
            tx: StdMutex::new(None),
            tasks: StdMutex::new(Vec::new()),
        }
    }

    /// The unit this handler is bound to.
    pub fn id(&self) -> &UnitId {
        &self.id
    }

    /// Resolve the unit link, wire up the event streams and start the
    /// worker.
    ///
    /// Always enqueues an initial config pass so channels and labels are
    /// built; an initial data pass follows if the unit already has data.
    pub async fn initialize(&self) -> Result<(), HandlerError> {
        let link = self
            .resolver
            .unit_link(&self.id)
            .await
            .map_err(|e| HandlerError::Initialization(format!("unit {}: {}", self.id, e)))?;

        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

        let mut tasks = Vec::with_capacity(4);
        tasks.push(forward_connection(link.subscribe_connection(), tx.clone()));
        tasks.push(forward_config(link.subscribe_config(), tx.clone()));
        tasks.push(forward_data(link.subscribe_data(), tx.clone()));

        let worker = UnitWorker {
            id: self.id.clone(),
            link: link.clone(),
            registry: self.registry.clone(),
            sink: self.sink.clone(),
            transformers: self.transformers.clone(),
            auth: self.auth.clone(),
            config: self.config.clone(),
            kind: None,
        };
        tasks.push(tokio::spawn(worker.run(rx)));

        // Seed the queue before anything else can interleave.
        let _ = tx.send(UnitEvent::ConfigChanged).await;
        if link.is_data_available() {
            let _ = tx.send(UnitEvent::DataChanged).await;
        }

        self.store_tx(Some(tx));
        self.store_tasks(tasks);
        Ok(())
    }

    /// Enqueue a channel command.
    ///
    /// Commands arriving before [`initialize`](Self::initialize) completed
    /// are dropped with a warning.
    pub async fn handle_command(&self, channel_id: &str, value: ChannelValue) {
        let tx = {
            let guard = match self.tx.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.clone()
        };

        let Some(tx) = tx else {
            warn!(unit = %self.id, channel = channel_id, "Command before initialization, dropping");
            return;
        };

        if tx
            .send(UnitEvent::Command {
                channel_id: channel_id.to_string(),
                value,
            })
            .await
            .is_err()
        {
            warn!(unit = %self.id, channel = channel_id, "Worker gone, command dropped");
        }
    }

    /// Stop all tasks and mark the unit offline.
    ///
    /// Safe to call multiple times and without prior initialization.
    pub async fn dispose(&self) {
        self.store_tx(None);
        let tasks = {
            let mut guard = match self.tasks.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::take(&mut *guard)
        };
        for task in tasks {
            task.abort();
        }
        self.sink.update_status(&self.id, ThingStatus::Offline).await;
    }

    fn store_tx(&self, tx: Option<mpsc::Sender<UnitEvent>>) {
        let mut guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = tx;
    }

    fn store_tasks(&self, tasks: Vec<JoinHandle<()>>) {
        let mut guard = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = tasks;
    }
}

fn forward_connection(
    mut rx: broadcast::Receiver<ConnectionState>,
    tx: mpsc::Sender<UnitEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(state) => {
                    if tx.send(UnitEvent::Connection(state)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn forward_config(
    mut rx: broadcast::Receiver<UnitEntity>,
    tx: mpsc::Sender<UnitEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(_) => {
                    if tx.send(UnitEvent::ConfigChanged).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn forward_data(mut rx: broadcast::Receiver<()>, tx: mpsc::Sender<UnitEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(()) => {
                    if tx.send(UnitEvent::DataChanged).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// State owned by the single worker task of a handler.
struct UnitWorker {
    id: UnitId,
    link: Arc<dyn UnitLink>,
    registry: Arc<dyn UnitRegistry>,
    sink: Arc<dyn ChannelSink>,
    transformers: Arc<TransformerRegistry>,
    auth: AuthContext,
    config: BridgeConfig,
    /// Unit kind as of the last config pass. Config is always processed
    /// before data, so this is set whenever channels exist.
    kind: Option<UnitKind>,
}

impl UnitWorker {
    async fn run(mut self, mut rx: mpsc::Receiver<UnitEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle_event(event).await;
        }
    }

    async fn handle_event(&mut self, event: UnitEvent) {
        match event {
            UnitEvent::Connection(state) => {
                self.sink.update_status(&self.id, state.thing_status()).await;
            }
            UnitEvent::ConfigChanged => self.apply_config().await,
            UnitEvent::DataChanged => self.update_channels().await,
            UnitEvent::Command { channel_id, value } => {
                self.dispatch_command(&channel_id, value).await;
            }
        }
    }

    /// Rebuild labels and the channel set from the unit's registry record.
    async fn apply_config(&mut self) {
        let record = match self.link.config().await {
            Ok(record) => record,
            Err(e) => {
                warn!(unit = %self.id, "Config pass failed: {}", e);
                return;
            }
        };
        self.kind = Some(record.kind);

        let label = record.display_label(&self.config.preferred_languages);
        let location = match &record.location_id {
            Some(location_id) => match self.registry.unit_by_id(location_id).await {
                Ok(location) => {
                    Some(location.display_label(&self.config.preferred_languages))
                }
                Err(e) => {
                    warn!(unit = %self.id, "Location lookup failed: {}", e);
                    None
                }
            },
            None => None,
        };
        self.sink
            .update_labels(&self.id, &label, location.as_deref())
            .await;

        let declared = self.link.available_service_types().await;
        let fused = if composite_rule(record.kind).fuse_members {
            self.link.fused_service_types().await
        } else {
            Vec::new()
        };
        let channels = channels_for(record.kind, &declared, &fused);
        self.sink.rebuild_channels(&self.id, channels).await;
    }

    /// Push the current state of every service to its channel, in every
    /// value representation the service supports.
    async fn update_channels(&self) {
        let rule = composite_rule(self.kind.unwrap_or(UnitKind::Other));
        let services = if rule.fuse_members {
            self.link.fused_service_types().await
        } else {
            self.link.available_service_types().await
        };

        for service in &services {
            let kinds = value_kinds_for(*service);
            if kinds.is_empty() {
                debug!(unit = %self.id, service = %service, "Service has no channel representation");
                continue;
            }

            let state = match self.link.service_state(*service).await {
                Ok(state) => state,
                Err(e) => {
                    warn!(unit = %self.id, service = %service, "State read failed: {}", e);
                    continue;
                }
            };

            let channel = service.channel_id();
            for kind in kinds {
                self.push_state(&channel, *service, *kind, &state).await;
            }
        }

        if rule.synthetic_light_power && services.contains(&ServiceType::PowerState) {
            match self.link.scoped_power_state(UnitKind::Light).await {
                Ok(state) => {
                    self.push_state(
                        CHANNEL_POWER_LIGHT,
                        ServiceType::PowerState,
                        ValueKind::OnOff,
                        &state,
                    )
                    .await;
                }
                Err(e) => {
                    warn!(unit = %self.id, "Light power read failed: {}", e);
                }
            }
        }
    }

    /// Convert one state into one representation and push it. Values a
    /// representation cannot carry are skipped silently.
    async fn push_state(
        &self,
        channel_id: &str,
        service: ServiceType,
        kind: ValueKind,
        state: &ServiceState,
    ) {
        let Some(transformer) = self.transformers.get(service, kind) else {
            error!(unit = %self.id, service = %service, %kind, "No transformer registered");
            return;
        };
        match transformer.to_value(state) {
            Ok(value) => {
                self.sink.update_state(&self.id, channel_id, value).await;
            }
            Err(TransformError::NotRepresentable { .. }) => {}
            Err(e) => {
                warn!(unit = %self.id, service = %service, %kind, "State conversion failed: {}", e);
            }
        }
    }

    async fn dispatch_command(&self, channel_id: &str, value: ChannelValue) {
        debug!(unit = %self.id, channel = channel_id, value = %value, "Dispatching command");

        if value.kind() == ValueKind::Refresh {
            debug!(unit = %self.id, channel = channel_id, "Refresh not supported, dropping");
            return;
        }

        if let Err(e) = self.auth.ensure_login().await {
            error!(unit = %self.id, "Login failed, proceeding unauthenticated: {}", e);
        }

        if channel_id == CHANNEL_POWER_LIGHT {
            self.dispatch_light_power(value).await;
            return;
        }

        let Some(service) = ServiceType::from_channel_id(channel_id) else {
            error!(unit = %self.id, channel = channel_id, "Command for unknown channel, dropping");
            return;
        };

        let Some(transformer) = self.transformers.get(service, value.kind()) else {
            error!(
                unit = %self.id,
                "Transformer from service {} to {} is not available",
                service,
                value.kind()
            );
            return;
        };

        let state = match transformer.to_state(&value) {
            Ok(state) => state,
            Err(e) => {
                warn!(unit = %self.id, channel = channel_id, "Command conversion failed: {}", e);
                return;
            }
        };

        if let Err(e) = self.link.apply_service_state(service, state).await {
            warn!(unit = %self.id, channel = channel_id, "Write rejected, rolling back: {}", e);
            self.rollback(channel_id, service).await;
        }
    }

    /// Synthetic channel writing the power state of the composite's light
    /// members only.
    async fn dispatch_light_power(&self, value: ChannelValue) {
        let Some(transformer) = self.transformers.get(ServiceType::PowerState, value.kind()) else {
            error!(
                unit = %self.id,
                "Transformer from service {} to {} is not available",
                ServiceType::PowerState,
                value.kind()
            );
            return;
        };

        let state = match transformer.to_state(&value) {
            Ok(state) => state,
            Err(e) => {
                warn!(unit = %self.id, "Light power conversion failed: {}", e);
                return;
            }
        };

        if let Err(e) = self.link.apply_scoped_power(state, UnitKind::Light).await {
            warn!(unit = %self.id, "Light power write rejected, rolling back: {}", e);
            match self.link.scoped_power_state(UnitKind::Light).await {
                Ok(actual) => {
                    self.push_state(
                        CHANNEL_POWER_LIGHT,
                        ServiceType::PowerState,
                        ValueKind::OnOff,
                        &actual,
                    )
                    .await;
                }
                Err(e) => {
                    warn!(unit = %self.id, "Rollback read failed: {}", e);
                }
            }
        }
    }

    /// Reflect the unit's actual state back to the channel after a failed
    /// write.
    async fn rollback(&self, channel_id: &str, service: ServiceType) {
        let actual = match self.link.service_state(service).await {
            Ok(actual) => actual,
            Err(e) => {
                warn!(unit = %self.id, channel = channel_id, "Rollback read failed: {}", e);
                return;
            }
        };
        for kind in value_kinds_for(service) {
            self.push_state(channel_id, service, *kind, &actual).await;
        }
    }
}
