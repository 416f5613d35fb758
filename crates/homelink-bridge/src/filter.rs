//! Unit inclusion policy for discovery.
//!
//! Decides which registry units this bridge handles. Applied before the
//! diff pass, so filtered units never enter the discovery snapshot.

use homelink_model::{RegistryError, UnitEntity, UnitKind};

use crate::remote::UnitRegistry;

/// Inclusion filter configuration.
///
/// Excluded are:
/// - units with zero declared service capabilities,
/// - reserved system user identities,
/// - units whose hosting device is owned by a foreign integration
///   (avoids double-registering devices another binding already manages).
#[derive(Debug, Clone)]
pub struct DiscoveryFilter {
    foreign_binding_id: String,
}

impl DiscoveryFilter {
    /// Create a filter excluding devices owned by the given integration.
    pub fn new(foreign_binding_id: impl Into<String>) -> Self {
        Self {
            foreign_binding_id: foreign_binding_id.into(),
        }
    }

    /// Whether a single unit passes the filter.
    ///
    /// Walks to the hosting unit via the registry when the unit declares one;
    /// a failed walk is an error for the whole pass (the caller retries on
    /// the next trigger) rather than a silent inclusion.
    pub async fn includes(
        &self,
        registry: &dyn UnitRegistry,
        unit: &UnitEntity,
    ) -> Result<bool, RegistryError> {
        // ignore all units without services
        if unit.services.is_empty() {
            return Ok(false);
        }

        // ignore system users
        if unit.kind == UnitKind::User && unit.system_user {
            return Ok(false);
        }

        // ignore units hosted by a device handled by a foreign integration
        if unit.host_id.is_some() {
            if let Some(host) = registry.resolve_host(unit).await? {
                if host.kind == UnitKind::Device {
                    if let Some(binding_id) = &host.binding_id {
                        if binding_id.eq_ignore_ascii_case(&self.foreign_binding_id) {
                            return Ok(false);
                        }
                    }
                }
            }
        }

        Ok(true)
    }

    /// Produce the list of units handled by this bridge.
    pub async fn handled_units(
        &self,
        registry: &dyn UnitRegistry,
    ) -> Result<Vec<UnitEntity>, RegistryError> {
        let mut handled = Vec::new();
        for unit in registry.list_units(None).await? {
            if self.includes(registry, &unit).await? {
                handled.push(unit);
            }
        }
        Ok(handled)
    }
}
