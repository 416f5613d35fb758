//! Bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Scan timeout advertised to the discovery sink, in seconds.
    pub scan_timeout_secs: u64,
    /// One-time grace delay before the first discovery pass, giving the
    /// channel model time to register the handled thing types.
    pub startup_grace_ms: u64,
    /// Integration id whose devices are excluded from discovery.
    pub foreign_binding_id: String,
    /// Preferred label languages, in order.
    pub preferred_languages: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            scan_timeout_secs: 30,
            startup_grace_ms: 5_000,
            foreign_binding_id: "openhab".to_string(),
            preferred_languages: vec!["en".to_string()],
        }
    }
}

impl BridgeConfig {
    /// The advertised scan timeout.
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    /// The one-time startup grace delay.
    pub fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.scan_timeout(), Duration::from_secs(30));
        assert_eq!(config.startup_grace(), Duration::from_millis(5_000));
        assert_eq!(config.foreign_binding_id, "openhab");
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"scan_timeout_secs": 60}"#).unwrap();
        assert_eq!(config.scan_timeout_secs, 60);
        assert_eq!(config.startup_grace_ms, 5_000);
        assert_eq!(config.preferred_languages, vec!["en".to_string()]);
    }
}
