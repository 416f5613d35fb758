//! Registry reconciliation and unit handling.
//!
//! This crate sits between the remote unit registry and the generic
//! thing/channel model:
//! - **SnapshotDiff**: stateful presence diff over registry snapshots
//! - **DiscoveryCoordinator**: at-most-one-in-flight reconciliation driven by
//!   registry change notifications or manual scans
//! - **UnitHandler**: per-unit runtime translating typed service states to
//!   channel values and routing inbound commands back, with rollback on
//!   rejected writes
//!
//! The remote side is consumed through the [`UnitRegistry`], [`UnitLink`] and
//! [`UnitResolver`] traits; results are emitted through the [`DiscoverySink`]
//! and [`ChannelSink`] traits. Network transport, persistence and the host
//! plugin lifecycle live behind those traits and are out of scope here.

pub mod auth;
pub mod config;
pub mod diff;
pub mod discovery;
pub mod filter;
pub mod handler;
pub mod remote;
pub mod sink;

// Re-exports
pub use auth::{AnonymousSession, AuthContext, Session};
pub use config::BridgeConfig;
pub use diff::{DiffReport, SnapshotDiff};
pub use discovery::{DiscoveredUnit, DiscoveryCoordinator};
pub use filter::DiscoveryFilter;
pub use handler::{UnitEvent, UnitHandler};
pub use remote::{RegistryChange, UnitLink, UnitRegistry, UnitResolver};
pub use sink::{ChannelSink, DiscoverySink};
