//! Service-channel derivation.
//!
//! Derives the generic channel set a unit currently exposes from its service
//! capabilities. Composite kinds (groups, locations) aggregate member units
//! and therefore use the fused capability set instead of their own declared
//! list; per-kind behavior lives in one [`composite_rule`] table so the
//! generic derivation stays generic.

use tracing::warn;

use homelink_model::{ChannelSpec, ItemKind, ServiceType, UnitKind, CHANNEL_POWER_LIGHT};

/// Per-kind override for channel derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeRule {
    /// Use the fused (member-union) capability set instead of the declared one.
    pub fuse_members: bool,
    /// Add the synthetic lighting-scoped power channel when the fused set
    /// contains the power capability.
    pub synthetic_light_power: bool,
}

/// The derivation rule for a unit kind.
pub fn composite_rule(kind: UnitKind) -> CompositeRule {
    match kind {
        UnitKind::Group | UnitKind::Location => CompositeRule {
            fuse_members: true,
            synthetic_light_power: true,
        },
        _ => CompositeRule {
            fuse_members: false,
            synthetic_light_power: false,
        },
    }
}

/// Derive the channel set for a unit.
///
/// `declared` is the unit's own capability list, `fused` the union of its
/// members' capabilities (empty for non-composite units). Services without a
/// generic item kind are skipped with a warning.
pub fn channels_for(
    kind: UnitKind,
    declared: &[ServiceType],
    fused: &[ServiceType],
) -> Vec<ChannelSpec> {
    let rule = composite_rule(kind);
    let services = if rule.fuse_members { fused } else { declared };

    let mut channels = Vec::with_capacity(services.len());
    for service in services {
        match service.item_kind() {
            Some(item_kind) => channels.push(ChannelSpec::new(service.channel_id(), item_kind)),
            None => {
                warn!("Skip service {} because item type not available", service);
            }
        }
    }

    if rule.synthetic_light_power && services.contains(&ServiceType::PowerState) {
        channels.push(ChannelSpec::new(CHANNEL_POWER_LIGHT, ItemKind::Switch));
    }

    channels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_unit_uses_declared_services() {
        let channels = channels_for(
            UnitKind::Other,
            &[ServiceType::TargetTemperature, ServiceType::TemperatureState],
            &[],
        );

        assert_eq!(
            channels,
            vec![
                ChannelSpec::new("target_temperature", ItemKind::Number),
                ChannelSpec::new("temperature_state", ItemKind::Number),
            ]
        );
    }

    #[test]
    fn test_location_uses_fused_services() {
        // Declared list is ignored for composites.
        let channels = channels_for(
            UnitKind::Location,
            &[ServiceType::TargetTemperature],
            &[ServiceType::BrightnessState],
        );

        assert_eq!(
            channels,
            vec![ChannelSpec::new("brightness_state", ItemKind::Dimmer)]
        );
    }

    #[test]
    fn test_fused_power_adds_synthetic_light_channel() {
        let channels = channels_for(
            UnitKind::Location,
            &[],
            &[ServiceType::PowerState, ServiceType::MotionState],
        );

        assert!(channels.contains(&ChannelSpec::new("power_state", ItemKind::Switch)));
        assert!(channels.contains(&ChannelSpec::new(CHANNEL_POWER_LIGHT, ItemKind::Switch)));
    }

    #[test]
    fn test_group_gets_synthetic_light_channel_too() {
        let channels = channels_for(UnitKind::Group, &[], &[ServiceType::PowerState]);
        assert!(channels.contains(&ChannelSpec::new(CHANNEL_POWER_LIGHT, ItemKind::Switch)));
    }

    #[test]
    fn test_plain_unit_never_gets_synthetic_channel() {
        let channels = channels_for(UnitKind::Light, &[ServiceType::PowerState], &[]);
        assert_eq!(
            channels,
            vec![ChannelSpec::new("power_state", ItemKind::Switch)]
        );
    }

    #[test]
    fn test_service_without_item_kind_is_skipped() {
        let channels = channels_for(
            UnitKind::Other,
            &[ServiceType::ActivationState, ServiceType::PowerState],
            &[],
        );

        assert_eq!(
            channels,
            vec![ChannelSpec::new("power_state", ItemKind::Switch)]
        );
    }
}
