//! State/command transformation engine.
//!
//! Maps typed service states to generic channel values and back:
//! - **ServiceState**: one typed variant per service capability
//! - **TransformerRegistry**: converter lookup keyed by `(ServiceType, ValueKind)`
//! - **value_kinds_for**: which generic representations each service publishes
//! - **channels_for**: channel derivation, including capability fusion for
//!   composite units and the synthetic lighting-scoped power channel

pub mod channels;
pub mod mapping;
pub mod state;
pub mod transformer;

// Re-exports
pub use channels::{channels_for, composite_rule, CompositeRule};
pub use mapping::value_kinds_for;
pub use state::{BlindMovement, MotionValue, PowerValue, ServiceState};
pub use transformer::{Transformer, TransformerRegistry};
