//! Error taxonomy shared across the bridge.

use crate::service::ServiceType;
use crate::value::ValueKind;

/// Errors raised by the remote registry and live unit handles.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// The requested data or unit is not (yet) resolvable.
    #[error("Not available: {0}")]
    NotAvailable(String),

    /// A blocking wait was interrupted by shutdown.
    #[error("Interrupted while waiting for registry data")]
    Interrupted,

    /// Transport-level failure reported by the remote collaborator.
    #[error("Registry transport error: {0}")]
    Transport(String),
}

/// Errors raised while converting between service states and channel values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// No converter registered for the pair. A registration gap, not a
    /// transient failure.
    #[error("Transformer from service {service} to value kind {kind} is not available")]
    NoTransformer {
        service: ServiceType,
        kind: ValueKind,
    },

    /// The conversion is structurally inapplicable (e.g. a momentary action
    /// has no current-state form). Skipped per-conversion, never fatal.
    #[error("Service {service} has no {kind} state representation")]
    NotRepresentable {
        service: ServiceType,
        kind: ValueKind,
    },

    /// The inbound value cannot be interpreted for the service.
    #[error("Invalid {kind} value for service {service}: {reason}")]
    InvalidValue {
        service: ServiceType,
        kind: ValueKind,
        reason: String,
    },
}

/// Errors raised by a unit handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The live handle could not be resolved; fatal for this handler.
    #[error("Could not initialize unit handler: {0}")]
    Initialization(String),

    /// The channel id matches no known naming pattern.
    #[error("Receive command for unknown channel {0}")]
    MalformedChannel(String),

    /// The typed write was rejected by the remote unit.
    #[error("Could not invoke service operation: {0}")]
    Invocation(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}
