//! Traits exposed to the surrounding framework.

use async_trait::async_trait;

use homelink_model::{ChannelSpec, ChannelValue, ThingStatus, UnitId};

/// Receives discovery add/remove events.
#[async_trait]
pub trait DiscoverySink: Send + Sync {
    /// A unit passed the inclusion filter and entered the handled set.
    async fn unit_discovered(&self, id: &UnitId, label: &str);

    /// A previously discovered unit left the handled set.
    async fn unit_removed(&self, id: &UnitId);
}

/// The generic thing/channel model a unit handler writes into.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    /// Replace the unit's channel set (clear-and-rebuild semantics; stale
    /// bindings are never patched incrementally).
    async fn rebuild_channels(&self, id: &UnitId, channels: Vec<ChannelSpec>);

    /// Push a state value onto a channel.
    async fn update_state(&self, id: &UnitId, channel_id: &str, value: ChannelValue);

    /// Update the unit's online/offline status.
    async fn update_status(&self, id: &UnitId, status: ThingStatus);

    /// Update the display label and the hierarchical location label.
    async fn update_labels(&self, id: &UnitId, label: &str, location: Option<&str>);
}
