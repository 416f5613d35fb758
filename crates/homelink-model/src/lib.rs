//! Shared data model for the HomeLink bridge.
//!
//! This crate defines the types that flow between the remote unit registry
//! and the generic channel model:
//! - **UnitEntity**: the externally owned registry record (observed, never mutated)
//! - **ServiceType**: the capability tags a unit declares
//! - **ChannelValue**: the generic command/state representation carried by channels
//! - the shared error taxonomy

pub mod error;
pub mod service;
pub mod unit;
pub mod value;

// Re-exports
pub use error::{HandlerError, RegistryError, TransformError};
pub use service::{ItemKind, ServiceType, CHANNEL_POWER_LIGHT};
pub use unit::{
    ChannelSpec, ConnectionState, LocalizedLabel, ThingStatus, UnitEntity, UnitId, UnitKind,
};
pub use value::{ChannelValue, OnOff, StopMove, UpDown, ValueKind};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
