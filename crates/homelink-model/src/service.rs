//! Service capability tags and channel naming.
//!
//! Each unit declares a set of service types. The channel exposed for a
//! service is derived by a fixed naming transform: strip the `_SERVICE`
//! suffix from the tag and lowercase the rest, so
//! `TARGET_TEMPERATURE_SERVICE` becomes channel `target_temperature`.

use serde::{Deserialize, Serialize};

/// Channel id of the synthetic lighting-scoped power channel.
///
/// Composite units whose fused capabilities include power get this extra
/// channel; it switches only the lights below the composite. Hard-coded
/// special case, not derivable from capability metadata.
pub const CHANNEL_POWER_LIGHT: &str = "power_state_light";

/// Typed service capability a unit can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    PowerState,
    BrightnessState,
    ColorState,
    TargetTemperature,
    TemperatureState,
    BlindState,
    BatteryState,
    MotionState,
    IlluminanceState,
    /// Activation flag service; has no generic item representation and is
    /// therefore skipped during channel derivation.
    ActivationState,
}

impl ServiceType {
    /// All known service types, in declaration order.
    pub const ALL: [ServiceType; 10] = [
        ServiceType::PowerState,
        ServiceType::BrightnessState,
        ServiceType::ColorState,
        ServiceType::TargetTemperature,
        ServiceType::TemperatureState,
        ServiceType::BlindState,
        ServiceType::BatteryState,
        ServiceType::MotionState,
        ServiceType::IlluminanceState,
        ServiceType::ActivationState,
    ];

    /// The upper snake capability tag, as declared by the remote registry.
    pub fn name(&self) -> &'static str {
        match self {
            ServiceType::PowerState => "POWER_STATE_SERVICE",
            ServiceType::BrightnessState => "BRIGHTNESS_STATE_SERVICE",
            ServiceType::ColorState => "COLOR_STATE_SERVICE",
            ServiceType::TargetTemperature => "TARGET_TEMPERATURE_SERVICE",
            ServiceType::TemperatureState => "TEMPERATURE_STATE_SERVICE",
            ServiceType::BlindState => "BLIND_STATE_SERVICE",
            ServiceType::BatteryState => "BATTERY_STATE_SERVICE",
            ServiceType::MotionState => "MOTION_STATE_SERVICE",
            ServiceType::IlluminanceState => "ILLUMINANCE_STATE_SERVICE",
            ServiceType::ActivationState => "ACTIVATION_STATE_SERVICE",
        }
    }

    /// Derive the channel id: strip the `_SERVICE` suffix, lowercase.
    pub fn channel_id(&self) -> String {
        self.name()
            .trim_end_matches("_SERVICE")
            .to_ascii_lowercase()
    }

    /// Reconstitute a service type from a channel id.
    ///
    /// Inverse of [`channel_id`](Self::channel_id); returns `None` for
    /// channel ids that match no known service (the malformed-command path).
    pub fn from_channel_id(channel_id: &str) -> Option<ServiceType> {
        Self::ALL
            .iter()
            .copied()
            .find(|service| service.channel_id() == channel_id)
    }

    /// Generic item kind exposed for this service, if one exists.
    ///
    /// Services without an item kind have no generic representation and are
    /// skipped (with a warning) during channel derivation.
    pub fn item_kind(&self) -> Option<ItemKind> {
        match self {
            ServiceType::PowerState => Some(ItemKind::Switch),
            ServiceType::BrightnessState => Some(ItemKind::Dimmer),
            ServiceType::ColorState => Some(ItemKind::Color),
            ServiceType::TargetTemperature => Some(ItemKind::Number),
            ServiceType::TemperatureState => Some(ItemKind::Number),
            ServiceType::BlindState => Some(ItemKind::Rollershutter),
            ServiceType::BatteryState => Some(ItemKind::Number),
            ServiceType::MotionState => Some(ItemKind::Switch),
            ServiceType::IlluminanceState => Some(ItemKind::Number),
            ServiceType::ActivationState => None,
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Generic item kind of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Switch,
    Dimmer,
    Number,
    Rollershutter,
    Color,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Switch => write!(f, "Switch"),
            Self::Dimmer => write!(f, "Dimmer"),
            Self::Number => write!(f, "Number"),
            Self::Rollershutter => write!(f, "Rollershutter"),
            Self::Color => write!(f, "Color"),
        }
    }
}
