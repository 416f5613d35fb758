//! Typed service states.
//!
//! One variant per [`ServiceType`]. These are the values read from and
//! written to the live unit handle; channels never carry them directly.

use serde::{Deserialize, Serialize};

use homelink_model::ServiceType;

/// Power switch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerValue {
    On,
    Off,
}

/// Motion detection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionValue {
    Motion,
    NoMotion,
}

/// Blind drive state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlindMovement {
    Up,
    Down,
    Stopped,
}

/// Typed state of a single service on a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServiceState {
    Power(PowerValue),
    Brightness {
        /// Brightness, 0.0 to 100.0
        percent: f64,
    },
    Color {
        /// Hue in degrees, 0.0 to 360.0
        hue: f64,
        /// Saturation, 0.0 to 100.0
        saturation: f64,
        /// Brightness, 0.0 to 100.0
        brightness: f64,
    },
    TargetTemperature {
        celsius: f64,
    },
    Temperature {
        celsius: f64,
    },
    Blind {
        /// Opening ratio, 0.0 (open) to 100.0 (closed)
        opening_ratio: f64,
        movement: BlindMovement,
    },
    Battery {
        /// Charge level, 0.0 to 100.0
        level: f64,
    },
    Motion(MotionValue),
    Illuminance {
        lux: f64,
    },
    /// Activation flag; carries no channel representation.
    Activation {
        active: bool,
    },
}

impl ServiceState {
    /// The service this state belongs to.
    pub fn service_type(&self) -> ServiceType {
        match self {
            ServiceState::Power(_) => ServiceType::PowerState,
            ServiceState::Brightness { .. } => ServiceType::BrightnessState,
            ServiceState::Color { .. } => ServiceType::ColorState,
            ServiceState::TargetTemperature { .. } => ServiceType::TargetTemperature,
            ServiceState::Temperature { .. } => ServiceType::TemperatureState,
            ServiceState::Blind { .. } => ServiceType::BlindState,
            ServiceState::Battery { .. } => ServiceType::BatteryState,
            ServiceState::Motion(_) => ServiceType::MotionState,
            ServiceState::Illuminance { .. } => ServiceType::IlluminanceState,
            ServiceState::Activation { .. } => ServiceType::ActivationState,
        }
    }
}
