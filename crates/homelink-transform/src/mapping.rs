//! Service type to value kind mapping.
//!
//! Declares which generic representations are published for each service.
//! The mapping is many-to-many: a dimmable service publishes both a percent
//! and an on/off view, a blind additionally accepts momentary stop/move
//! commands. The transformer registry's completeness check enforces that a
//! converter exists for every pair named here.

use homelink_model::{ServiceType, ValueKind};

/// The value kinds published for a service.
///
/// An empty slice means the service has no generic representation at all
/// (it is skipped during channel updates with a warning).
pub fn value_kinds_for(service: ServiceType) -> &'static [ValueKind] {
    match service {
        ServiceType::PowerState => &[ValueKind::OnOff],
        ServiceType::BrightnessState => &[ValueKind::Percent, ValueKind::OnOff],
        ServiceType::ColorState => &[ValueKind::Hsb, ValueKind::Percent, ValueKind::OnOff],
        ServiceType::TargetTemperature => &[ValueKind::Decimal],
        ServiceType::TemperatureState => &[ValueKind::Decimal],
        ServiceType::BlindState => &[ValueKind::Percent, ValueKind::UpDown, ValueKind::StopMove],
        ServiceType::BatteryState => &[ValueKind::Decimal],
        ServiceType::MotionState => &[ValueKind::OnOff],
        ServiceType::IlluminanceState => &[ValueKind::Decimal],
        ServiceType::ActivationState => &[],
    }
}
