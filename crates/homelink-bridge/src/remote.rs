//! Traits consumed from the remote registry collaborator.
//!
//! The registry, the per-unit live handle and the handle resolver are the
//! three surfaces the remote middleware offers. All notification streams are
//! tokio broadcast channels; a subscriber that lags simply coalesces to the
//! next notification.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use homelink_model::{ConnectionState, RegistryError, ServiceType, UnitEntity, UnitId, UnitKind};
use homelink_transform::ServiceState;

/// Notification that the remote unit set changed.
#[derive(Debug, Clone)]
pub struct RegistryChange {
    /// Monotonic revision of the remote registry
    pub revision: u64,
}

/// The remote unit registry.
#[async_trait]
pub trait UnitRegistry: Send + Sync {
    /// Whether registry data is currently available.
    fn is_data_available(&self) -> bool;

    /// Suspend until registry data becomes available.
    ///
    /// Cancellation-safe: coordinators abort this wait on shutdown.
    async fn wait_for_data(&self) -> Result<(), RegistryError>;

    /// List the current unit snapshot, optionally filtered by kind.
    async fn list_units(&self, kind: Option<UnitKind>) -> Result<Vec<UnitEntity>, RegistryError>;

    /// Resolve a unit record by id. Fails with
    /// [`RegistryError::NotAvailable`] when absent.
    async fn unit_by_id(&self, id: &UnitId) -> Result<UnitEntity, RegistryError>;

    /// Resolve the hosting unit of `unit`, if it declares one.
    async fn resolve_host(&self, unit: &UnitEntity) -> Result<Option<UnitEntity>, RegistryError>;

    /// Subscribe to registry-change notifications.
    fn subscribe_changes(&self) -> broadcast::Receiver<RegistryChange>;
}

/// Live handle to a single remote unit.
#[async_trait]
pub trait UnitLink: Send + Sync {
    /// The unit's stable identity.
    fn id(&self) -> UnitId;

    /// Whether unit state data is currently available.
    fn is_data_available(&self) -> bool;

    /// The unit's current registry record.
    async fn config(&self) -> Result<UnitEntity, RegistryError>;

    /// Service types currently available on this unit.
    async fn available_service_types(&self) -> Vec<ServiceType>;

    /// Union of the member units' service types. Only meaningful for
    /// composite kinds; empty otherwise.
    async fn fused_service_types(&self) -> Vec<ServiceType>;

    /// Read the current typed state of a service.
    async fn service_state(&self, service: ServiceType) -> Result<ServiceState, RegistryError>;

    /// Invoke the typed write operation of a service.
    async fn apply_service_state(
        &self,
        service: ServiceType,
        state: ServiceState,
    ) -> Result<(), RegistryError>;

    /// Read the power state of the member units of the given kind.
    async fn scoped_power_state(&self, scope: UnitKind) -> Result<ServiceState, RegistryError>;

    /// Apply a power state to the member units of the given kind.
    async fn apply_scoped_power(
        &self,
        state: ServiceState,
        scope: UnitKind,
    ) -> Result<(), RegistryError>;

    /// Subscribe to connection-state changes.
    fn subscribe_connection(&self) -> broadcast::Receiver<ConnectionState>;

    /// Subscribe to registry-record (config) changes.
    fn subscribe_config(&self) -> broadcast::Receiver<UnitEntity>;

    /// Subscribe to data/state change ticks.
    fn subscribe_data(&self) -> broadcast::Receiver<()>;
}

/// Resolves live handles for discovered units.
#[async_trait]
pub trait UnitResolver: Send + Sync {
    /// Resolve a live handle. Failure is fatal for the requesting handler.
    async fn unit_link(&self, id: &UnitId) -> Result<Arc<dyn UnitLink>, RegistryError>;
}
