//! Unit registry records and related value types.
//!
//! A [`UnitEntity`] is the remote registry's source-of-truth record for a
//! managed unit. The bridge only observes these records; they are created,
//! updated and removed exclusively by the remote side.

use serde::{Deserialize, Serialize};

use crate::service::{ItemKind, ServiceType};

/// Stable identifier of a unit in the remote registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

impl UnitId {
    /// Create a unit ID from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit kind classification.
///
/// `Group` and `Location` are composite kinds: they aggregate member units
/// and expose the union of the members' capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Physical device hosting one or more units
    Device,
    /// Light unit (also used as the scope of the synthetic power channel)
    Light,
    /// Group aggregate
    Group,
    /// Location aggregate
    Location,
    /// User identity unit
    User,
    /// Any other unit kind
    Other,
}

impl UnitKind {
    /// Whether this kind aggregates member units.
    pub fn is_composite(&self) -> bool {
        matches!(self, UnitKind::Group | UnitKind::Location)
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::Light => write!(f, "light"),
            Self::Group => write!(f, "group"),
            Self::Location => write!(f, "location"),
            Self::User => write!(f, "user"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Localized label with best-match resolution.
///
/// Labels arrive from the registry as a list of per-language entries. The
/// first entry is the registry's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedLabel {
    /// `(language tag, text)` entries in registry order
    pub entries: Vec<(String, String)>,
}

impl LocalizedLabel {
    /// Create a label with a single entry.
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            entries: vec![(language.into(), text.into())],
        }
    }

    /// Add another language entry.
    pub fn with_entry(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.push((language.into(), text.into()));
        self
    }

    /// Resolve the best matching text for the preferred languages.
    ///
    /// Preferred languages are tried in order; if none matches, the first
    /// entry wins. Returns `None` only for an empty label.
    pub fn best_match(&self, preferred: &[String]) -> Option<&str> {
        for language in preferred {
            if let Some((_, text)) = self
                .entries
                .iter()
                .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
            {
                return Some(text);
            }
        }
        self.entries.first().map(|(_, text)| text.as_str())
    }
}

/// Remote registry record for a single unit.
///
/// Owned by the remote registry. The bridge never mutates these; it observes
/// snapshots and per-unit change streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEntity {
    /// Stable identifier
    pub id: UnitId,
    /// Unit kind
    pub kind: UnitKind,
    /// Declared service capabilities
    pub services: Vec<ServiceType>,
    /// Localized display label
    pub label: LocalizedLabel,
    /// Hosting unit (e.g. the device a light unit belongs to)
    pub host_id: Option<UnitId>,
    /// Placement location unit
    pub location_id: Option<UnitId>,
    /// Reserved system identity (only meaningful for `UnitKind::User`)
    pub system_user: bool,
    /// Integration that owns this unit (only meaningful for `UnitKind::Device`)
    pub binding_id: Option<String>,
}

impl UnitEntity {
    /// Create a unit entity with the given id and kind.
    pub fn new(id: impl Into<UnitId>, kind: UnitKind) -> Self {
        Self {
            id: id.into(),
            kind,
            services: Vec::new(),
            label: LocalizedLabel::default(),
            host_id: None,
            location_id: None,
            system_user: false,
            binding_id: None,
        }
    }

    /// Add a declared service capability.
    pub fn with_service(mut self, service: ServiceType) -> Self {
        self.services.push(service);
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: LocalizedLabel) -> Self {
        self.label = label;
        self
    }

    /// Set the hosting unit.
    pub fn with_host(mut self, host_id: impl Into<UnitId>) -> Self {
        self.host_id = Some(host_id.into());
        self
    }

    /// Set the placement location.
    pub fn with_location(mut self, location_id: impl Into<UnitId>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    /// Mark as a reserved system user.
    pub fn as_system_user(mut self) -> Self {
        self.system_user = true;
        self
    }

    /// Set the owning integration.
    pub fn with_binding(mut self, binding_id: impl Into<String>) -> Self {
        self.binding_id = Some(binding_id.into());
        self
    }

    /// Resolve the display label, falling back to the id.
    pub fn display_label(&self, preferred: &[String]) -> String {
        self.label
            .best_match(preferred)
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Connection state of a live unit handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Connected,
    Connecting,
    Disconnected,
    Unknown,
}

impl ConnectionState {
    /// Binary online/offline mapping: only `Connected` counts as online.
    pub fn thing_status(&self) -> ThingStatus {
        match self {
            ConnectionState::Connected => ThingStatus::Online,
            _ => ThingStatus::Offline,
        }
    }
}

/// Status reflected into the generic thing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThingStatus {
    Online,
    Offline,
}

/// A channel derived for a unit: identifier plus generic item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Channel identifier (derived from the service type naming transform)
    pub channel_id: String,
    /// Generic item kind exposed on the channel
    pub item_kind: ItemKind,
}

impl ChannelSpec {
    /// Create a channel spec.
    pub fn new(channel_id: impl Into<String>, item_kind: ItemKind) -> Self {
        Self {
            channel_id: channel_id.into(),
            item_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_best_match_prefers_requested_language() {
        let label = LocalizedLabel::new("de", "Deckenlampe").with_entry("en", "Ceiling Lamp");

        let preferred = vec!["en".to_string()];
        assert_eq!(label.best_match(&preferred), Some("Ceiling Lamp"));
    }

    #[test]
    fn test_label_best_match_falls_back_to_first_entry() {
        let label = LocalizedLabel::new("de", "Deckenlampe");

        let preferred = vec!["fr".to_string()];
        assert_eq!(label.best_match(&preferred), Some("Deckenlampe"));
    }

    #[test]
    fn test_display_label_falls_back_to_id() {
        let unit = UnitEntity::new("unit-1", UnitKind::Light);
        assert_eq!(unit.display_label(&["en".to_string()]), "unit-1");
    }

    #[test]
    fn test_composite_kinds() {
        assert!(UnitKind::Group.is_composite());
        assert!(UnitKind::Location.is_composite());
        assert!(!UnitKind::Light.is_composite());
        assert!(!UnitKind::Device.is_composite());
    }

    #[test]
    fn test_connection_state_binary_mapping() {
        assert_eq!(
            ConnectionState::Connected.thing_status(),
            ThingStatus::Online
        );
        assert_eq!(
            ConnectionState::Connecting.thing_status(),
            ThingStatus::Offline
        );
        assert_eq!(
            ConnectionState::Disconnected.thing_status(),
            ThingStatus::Offline
        );
        assert_eq!(ConnectionState::Unknown.thing_status(), ThingStatus::Offline);
    }
}
