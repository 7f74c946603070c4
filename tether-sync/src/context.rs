//! Per-run parameters handed from the driver to the engine.

use chrono::{DateTime, Utc};

use tether_core::{DeviceDefaults, RegistryFilter};

/// Everything one run needs besides the two clients.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub started_at: DateTime<Utc>,
    /// Report mutations as planned instead of issuing them.
    pub dry_run: bool,
    pub filter: RegistryFilter,
    /// Protocol defaults for devices the engine creates.
    pub defaults: DeviceDefaults,
}

impl RunContext {
    pub fn new(filter: RegistryFilter, defaults: DeviceDefaults, dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            filter,
            defaults,
        }
    }
}
