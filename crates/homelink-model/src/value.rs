//! Generic channel values.
//!
//! A [`ChannelValue`] is the weakly-typed representation the surrounding
//! framework uses for both state snapshots and write requests. The original
//! system dispatched converters by runtime class; here the variants are
//! statically enumerated and keyed by their [`ValueKind`] discriminant.

use serde::{Deserialize, Serialize};

/// On/off switch value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    /// Whether this is the on value.
    pub fn is_on(&self) -> bool {
        matches!(self, OnOff::On)
    }
}

/// Rollershutter direction value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpDown {
    Up,
    Down,
}

/// Momentary stop/move action. Has no meaningful "current state" form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopMove {
    Stop,
    Move,
}

/// Generic value carried on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChannelValue {
    /// Switch value
    OnOff(OnOff),
    /// Percentage value, 0.0 to 100.0
    Percent(f64),
    /// Plain decimal value
    Decimal(f64),
    /// Hue/saturation/brightness color value
    Hsb {
        /// Hue in degrees, 0.0 to 360.0
        hue: f64,
        /// Saturation, 0.0 to 100.0
        saturation: f64,
        /// Brightness, 0.0 to 100.0
        brightness: f64,
    },
    /// Rollershutter direction command
    UpDown(UpDown),
    /// Momentary stop/move command
    StopMove(StopMove),
    /// State refresh probe; never a state, dropped by handlers
    Refresh,
}

impl ChannelValue {
    /// The discriminant used as transformer registry key.
    pub fn kind(&self) -> ValueKind {
        match self {
            ChannelValue::OnOff(_) => ValueKind::OnOff,
            ChannelValue::Percent(_) => ValueKind::Percent,
            ChannelValue::Decimal(_) => ValueKind::Decimal,
            ChannelValue::Hsb { .. } => ValueKind::Hsb,
            ChannelValue::UpDown(_) => ValueKind::UpDown,
            ChannelValue::StopMove(_) => ValueKind::StopMove,
            ChannelValue::Refresh => ValueKind::Refresh,
        }
    }
}

impl std::fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelValue::OnOff(OnOff::On) => write!(f, "ON"),
            ChannelValue::OnOff(OnOff::Off) => write!(f, "OFF"),
            ChannelValue::Percent(p) => write!(f, "{}%", p),
            ChannelValue::Decimal(d) => write!(f, "{}", d),
            ChannelValue::Hsb {
                hue,
                saturation,
                brightness,
            } => write!(f, "{},{},{}", hue, saturation, brightness),
            ChannelValue::UpDown(UpDown::Up) => write!(f, "UP"),
            ChannelValue::UpDown(UpDown::Down) => write!(f, "DOWN"),
            ChannelValue::StopMove(StopMove::Stop) => write!(f, "STOP"),
            ChannelValue::StopMove(StopMove::Move) => write!(f, "MOVE"),
            ChannelValue::Refresh => write!(f, "REFRESH"),
        }
    }
}

/// Fieldless discriminant of [`ChannelValue`], used as registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    OnOff,
    Percent,
    Decimal,
    Hsb,
    UpDown,
    StopMove,
    Refresh,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnOff => write!(f, "OnOff"),
            Self::Percent => write!(f, "Percent"),
            Self::Decimal => write!(f, "Decimal"),
            Self::Hsb => write!(f, "Hsb"),
            Self::UpDown => write!(f, "UpDown"),
            Self::StopMove => write!(f, "StopMove"),
            Self::Refresh => write!(f, "Refresh"),
        }
    }
}
