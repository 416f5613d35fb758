//! Transformer registry.
//!
//! A [`Transformer`] is an immutable pair of pure functions converting a
//! typed service state to one generic channel value representation and back.
//! Transformers are registered once per `(ServiceType, ValueKind)` pair in a
//! process-wide [`TransformerRegistry`]; [`TransformerRegistry::with_defaults`]
//! wires every built-in pair and rejects gaps against the mapping table at
//! startup instead of failing on first lookup.

use dashmap::DashMap;

use homelink_model::{ChannelValue, OnOff, ServiceType, StopMove, TransformError, UpDown, ValueKind};

use crate::mapping::value_kinds_for;
use crate::state::{BlindMovement, MotionValue, PowerValue, ServiceState};

/// Convert a typed service state into a generic channel value.
pub type StateToValue = fn(&ServiceState) -> Result<ChannelValue, TransformError>;

/// Convert a generic channel value into a typed service state.
pub type ValueToState = fn(&ChannelValue) -> Result<ServiceState, TransformError>;

/// Bidirectional converter for one `(ServiceType, ValueKind)` pair.
#[derive(Clone, Copy)]
pub struct Transformer {
    pub state_to_value: StateToValue,
    pub value_to_state: ValueToState,
}

impl Transformer {
    /// Create a transformer from its two conversion functions.
    pub fn new(state_to_value: StateToValue, value_to_state: ValueToState) -> Self {
        Self {
            state_to_value,
            value_to_state,
        }
    }

    /// Apply the state-to-value direction.
    pub fn to_value(&self, state: &ServiceState) -> Result<ChannelValue, TransformError> {
        (self.state_to_value)(state)
    }

    /// Apply the value-to-state direction.
    pub fn to_state(&self, value: &ChannelValue) -> Result<ServiceState, TransformError> {
        (self.value_to_state)(value)
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer").finish_non_exhaustive()
    }
}

fn unexpected_state(service: ServiceType, kind: ValueKind) -> TransformError {
    TransformError::InvalidValue {
        service,
        kind,
        reason: "unexpected state variant".to_string(),
    }
}

fn unexpected_value(service: ServiceType, kind: ValueKind) -> TransformError {
    TransformError::InvalidValue {
        service,
        kind,
        reason: "unexpected value variant".to_string(),
    }
}

// ========== Power ==========

fn power_to_on_off(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Power(PowerValue::On) => Ok(ChannelValue::OnOff(OnOff::On)),
        ServiceState::Power(PowerValue::Off) => Ok(ChannelValue::OnOff(OnOff::Off)),
        _ => Err(unexpected_state(ServiceType::PowerState, ValueKind::OnOff)),
    }
}

fn on_off_to_power(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::OnOff(OnOff::On) => Ok(ServiceState::Power(PowerValue::On)),
        ChannelValue::OnOff(OnOff::Off) => Ok(ServiceState::Power(PowerValue::Off)),
        _ => Err(unexpected_value(ServiceType::PowerState, ValueKind::OnOff)),
    }
}

// ========== Brightness ==========

fn brightness_to_percent(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Brightness { percent } => Ok(ChannelValue::Percent(*percent)),
        _ => Err(unexpected_state(
            ServiceType::BrightnessState,
            ValueKind::Percent,
        )),
    }
}

fn percent_to_brightness(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::Percent(percent) => Ok(ServiceState::Brightness { percent: *percent }),
        _ => Err(unexpected_value(
            ServiceType::BrightnessState,
            ValueKind::Percent,
        )),
    }
}

// Lossy cast: any brightness above zero reads as ON, ON writes full brightness.
fn brightness_to_on_off(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Brightness { percent } => Ok(ChannelValue::OnOff(if *percent > 0.0 {
            OnOff::On
        } else {
            OnOff::Off
        })),
        _ => Err(unexpected_state(
            ServiceType::BrightnessState,
            ValueKind::OnOff,
        )),
    }
}

fn on_off_to_brightness(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::OnOff(OnOff::On) => Ok(ServiceState::Brightness { percent: 100.0 }),
        ChannelValue::OnOff(OnOff::Off) => Ok(ServiceState::Brightness { percent: 0.0 }),
        _ => Err(unexpected_value(
            ServiceType::BrightnessState,
            ValueKind::OnOff,
        )),
    }
}

// ========== Color ==========

fn color_to_hsb(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Color {
            hue,
            saturation,
            brightness,
        } => Ok(ChannelValue::Hsb {
            hue: *hue,
            saturation: *saturation,
            brightness: *brightness,
        }),
        _ => Err(unexpected_state(ServiceType::ColorState, ValueKind::Hsb)),
    }
}

fn hsb_to_color(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::Hsb {
            hue,
            saturation,
            brightness,
        } => Ok(ServiceState::Color {
            hue: *hue,
            saturation: *saturation,
            brightness: *brightness,
        }),
        _ => Err(unexpected_value(ServiceType::ColorState, ValueKind::Hsb)),
    }
}

// Lossy cast: only the brightness component survives.
fn color_to_percent(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Color { brightness, .. } => Ok(ChannelValue::Percent(*brightness)),
        _ => Err(unexpected_state(ServiceType::ColorState, ValueKind::Percent)),
    }
}

fn percent_to_color(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::Percent(percent) => Ok(ServiceState::Color {
            hue: 0.0,
            saturation: 0.0,
            brightness: *percent,
        }),
        _ => Err(unexpected_value(ServiceType::ColorState, ValueKind::Percent)),
    }
}

fn color_to_on_off(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Color { brightness, .. } => Ok(ChannelValue::OnOff(if *brightness > 0.0 {
            OnOff::On
        } else {
            OnOff::Off
        })),
        _ => Err(unexpected_state(ServiceType::ColorState, ValueKind::OnOff)),
    }
}

fn on_off_to_color(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::OnOff(switch) => Ok(ServiceState::Color {
            hue: 0.0,
            saturation: 0.0,
            brightness: if switch.is_on() { 100.0 } else { 0.0 },
        }),
        _ => Err(unexpected_value(ServiceType::ColorState, ValueKind::OnOff)),
    }
}

// ========== Temperatures ==========

fn target_temperature_to_decimal(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::TargetTemperature { celsius } => Ok(ChannelValue::Decimal(*celsius)),
        _ => Err(unexpected_state(
            ServiceType::TargetTemperature,
            ValueKind::Decimal,
        )),
    }
}

fn decimal_to_target_temperature(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::Decimal(celsius) => Ok(ServiceState::TargetTemperature { celsius: *celsius }),
        _ => Err(unexpected_value(
            ServiceType::TargetTemperature,
            ValueKind::Decimal,
        )),
    }
}

fn temperature_to_decimal(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Temperature { celsius } => Ok(ChannelValue::Decimal(*celsius)),
        _ => Err(unexpected_state(
            ServiceType::TemperatureState,
            ValueKind::Decimal,
        )),
    }
}

fn decimal_to_temperature(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::Decimal(celsius) => Ok(ServiceState::Temperature { celsius: *celsius }),
        _ => Err(unexpected_value(
            ServiceType::TemperatureState,
            ValueKind::Decimal,
        )),
    }
}

// ========== Blind ==========

fn blind_to_percent(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Blind { opening_ratio, .. } => Ok(ChannelValue::Percent(*opening_ratio)),
        _ => Err(unexpected_state(ServiceType::BlindState, ValueKind::Percent)),
    }
}

fn percent_to_blind(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::Percent(percent) => Ok(ServiceState::Blind {
            opening_ratio: *percent,
            movement: BlindMovement::Stopped,
        }),
        _ => Err(unexpected_value(ServiceType::BlindState, ValueKind::Percent)),
    }
}

// A resting blind has no UP/DOWN form.
fn blind_to_up_down(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Blind { movement, .. } => match movement {
            BlindMovement::Up => Ok(ChannelValue::UpDown(UpDown::Up)),
            BlindMovement::Down => Ok(ChannelValue::UpDown(UpDown::Down)),
            BlindMovement::Stopped => Err(TransformError::NotRepresentable {
                service: ServiceType::BlindState,
                kind: ValueKind::UpDown,
            }),
        },
        _ => Err(unexpected_state(ServiceType::BlindState, ValueKind::UpDown)),
    }
}

fn up_down_to_blind(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::UpDown(UpDown::Up) => Ok(ServiceState::Blind {
            opening_ratio: 0.0,
            movement: BlindMovement::Up,
        }),
        ChannelValue::UpDown(UpDown::Down) => Ok(ServiceState::Blind {
            opening_ratio: 100.0,
            movement: BlindMovement::Down,
        }),
        _ => Err(unexpected_value(ServiceType::BlindState, ValueKind::UpDown)),
    }
}

// Momentary action: there is no "current stop/move state" to publish.
fn blind_to_stop_move(_state: &ServiceState) -> Result<ChannelValue, TransformError> {
    Err(TransformError::NotRepresentable {
        service: ServiceType::BlindState,
        kind: ValueKind::StopMove,
    })
}

fn stop_move_to_blind(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::StopMove(StopMove::Stop) => Ok(ServiceState::Blind {
            opening_ratio: 0.0,
            movement: BlindMovement::Stopped,
        }),
        ChannelValue::StopMove(StopMove::Move) => Err(TransformError::InvalidValue {
            service: ServiceType::BlindState,
            kind: ValueKind::StopMove,
            reason: "MOVE carries no drive direction".to_string(),
        }),
        _ => Err(unexpected_value(
            ServiceType::BlindState,
            ValueKind::StopMove,
        )),
    }
}

// ========== Battery / Motion / Illuminance ==========

fn battery_to_decimal(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Battery { level } => Ok(ChannelValue::Decimal(*level)),
        _ => Err(unexpected_state(
            ServiceType::BatteryState,
            ValueKind::Decimal,
        )),
    }
}

fn decimal_to_battery(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::Decimal(level) => Ok(ServiceState::Battery { level: *level }),
        _ => Err(unexpected_value(
            ServiceType::BatteryState,
            ValueKind::Decimal,
        )),
    }
}

fn motion_to_on_off(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Motion(MotionValue::Motion) => Ok(ChannelValue::OnOff(OnOff::On)),
        ServiceState::Motion(MotionValue::NoMotion) => Ok(ChannelValue::OnOff(OnOff::Off)),
        _ => Err(unexpected_state(ServiceType::MotionState, ValueKind::OnOff)),
    }
}

fn on_off_to_motion(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::OnOff(OnOff::On) => Ok(ServiceState::Motion(MotionValue::Motion)),
        ChannelValue::OnOff(OnOff::Off) => Ok(ServiceState::Motion(MotionValue::NoMotion)),
        _ => Err(unexpected_value(ServiceType::MotionState, ValueKind::OnOff)),
    }
}

fn illuminance_to_decimal(state: &ServiceState) -> Result<ChannelValue, TransformError> {
    match state {
        ServiceState::Illuminance { lux } => Ok(ChannelValue::Decimal(*lux)),
        _ => Err(unexpected_state(
            ServiceType::IlluminanceState,
            ValueKind::Decimal,
        )),
    }
}

fn decimal_to_illuminance(value: &ChannelValue) -> Result<ServiceState, TransformError> {
    match value {
        ChannelValue::Decimal(lux) => Ok(ServiceState::Illuminance { lux: *lux }),
        _ => Err(unexpected_value(
            ServiceType::IlluminanceState,
            ValueKind::Decimal,
        )),
    }
}

/// Process-wide transformer lookup keyed by `(ServiceType, ValueKind)`.
pub struct TransformerRegistry {
    transformers: DashMap<(ServiceType, ValueKind), Transformer>,
}

impl TransformerRegistry {
    /// Create an empty registry (tests only; production uses
    /// [`with_defaults`](Self::with_defaults)).
    pub fn empty() -> Self {
        Self {
            transformers: DashMap::new(),
        }
    }

    /// Create a registry with every built-in transformer registered and
    /// verify completeness against the value-kind mapping table.
    pub fn with_defaults() -> Result<Self, TransformError> {
        let registry = Self::empty();

        registry.register(
            ServiceType::PowerState,
            ValueKind::OnOff,
            Transformer::new(power_to_on_off, on_off_to_power),
        );
        registry.register(
            ServiceType::BrightnessState,
            ValueKind::Percent,
            Transformer::new(brightness_to_percent, percent_to_brightness),
        );
        registry.register(
            ServiceType::BrightnessState,
            ValueKind::OnOff,
            Transformer::new(brightness_to_on_off, on_off_to_brightness),
        );
        registry.register(
            ServiceType::ColorState,
            ValueKind::Hsb,
            Transformer::new(color_to_hsb, hsb_to_color),
        );
        registry.register(
            ServiceType::ColorState,
            ValueKind::Percent,
            Transformer::new(color_to_percent, percent_to_color),
        );
        registry.register(
            ServiceType::ColorState,
            ValueKind::OnOff,
            Transformer::new(color_to_on_off, on_off_to_color),
        );
        registry.register(
            ServiceType::TargetTemperature,
            ValueKind::Decimal,
            Transformer::new(target_temperature_to_decimal, decimal_to_target_temperature),
        );
        registry.register(
            ServiceType::TemperatureState,
            ValueKind::Decimal,
            Transformer::new(temperature_to_decimal, decimal_to_temperature),
        );
        registry.register(
            ServiceType::BlindState,
            ValueKind::Percent,
            Transformer::new(blind_to_percent, percent_to_blind),
        );
        registry.register(
            ServiceType::BlindState,
            ValueKind::UpDown,
            Transformer::new(blind_to_up_down, up_down_to_blind),
        );
        registry.register(
            ServiceType::BlindState,
            ValueKind::StopMove,
            Transformer::new(blind_to_stop_move, stop_move_to_blind),
        );
        registry.register(
            ServiceType::BatteryState,
            ValueKind::Decimal,
            Transformer::new(battery_to_decimal, decimal_to_battery),
        );
        registry.register(
            ServiceType::MotionState,
            ValueKind::OnOff,
            Transformer::new(motion_to_on_off, on_off_to_motion),
        );
        registry.register(
            ServiceType::IlluminanceState,
            ValueKind::Decimal,
            Transformer::new(illuminance_to_decimal, decimal_to_illuminance),
        );

        registry.verify_complete()?;
        Ok(registry)
    }

    /// Register a transformer for a pair. Re-registration replaces.
    pub fn register(&self, service: ServiceType, kind: ValueKind, transformer: Transformer) {
        self.transformers.insert((service, kind), transformer);
    }

    /// Look up the transformer for a pair.
    pub fn get(&self, service: ServiceType, kind: ValueKind) -> Option<Transformer> {
        self.transformers
            .get(&(service, kind))
            .map(|entry| *entry.value())
    }

    /// Whether a transformer is registered for the pair.
    pub fn contains(&self, service: ServiceType, kind: ValueKind) -> bool {
        self.transformers.contains_key(&(service, kind))
    }

    /// Number of registered transformers.
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Check that every pair named by the mapping table has a transformer.
    fn verify_complete(&self) -> Result<(), TransformError> {
        for service in ServiceType::ALL {
            for kind in value_kinds_for(service) {
                if !self.contains(service, *kind) {
                    return Err(TransformError::NoTransformer {
                        service,
                        kind: *kind,
                    });
                }
            }
        }
        Ok(())
    }
}
