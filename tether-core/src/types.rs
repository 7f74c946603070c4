//! Device types shared by the clients and the reconciliation engine.
//!
//! Snapshots are plain owned values: they are fetched once per run, never
//! mutated in place, and dropped when the run ends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidRegistryId;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable numeric identity of a registry device.
///
/// Rendered as a plain decimal string when stored as a link label; that
/// rendering is the only thing that lets a later run recognise the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistryId(pub u64);

impl RegistryId {
    /// Label text stored on the link component.
    pub fn to_label(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RegistryId {
    type Err = InvalidRegistryId;

    /// Strict decimal parse: ASCII digits only, no sign or whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidRegistryId(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidRegistryId(s.to_string()))
    }
}

impl From<u64> for RegistryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Primary key of a device inside the monitor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hostname(pub String);

impl Hostname {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Hostname {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Hostname {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier the monitor generates for a component record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// A device as seen by the registry (source of truth).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDevice {
    pub id: RegistryId,
    pub name: String,
    /// Dotted address without prefix length.
    pub primary_ip: String,
    /// Only used for upstream filtering.
    pub role: String,
}

/// A device as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorDevice {
    pub hostname: Hostname,
    /// Configured address: the overwrite address when one is set, else the
    /// polled one.
    pub ip: String,
}

/// Cross-reference record carried by a monitor device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkComponent {
    pub component_id: ComponentId,
    pub label: String,
}

impl LinkComponent {
    /// Registry id held in the label, if the label is a decimal id.
    pub fn registry_id(&self) -> Option<RegistryId> {
        self.label.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Monitoring protocol defaults applied to every device the engine creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDefaults {
    pub snmp_version: String,
    pub snmp_community: String,
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            snmp_version: "v2c".to_string(),
            snmp_community: "public".to_string(),
        }
    }
}

/// Which registry devices are eligible for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistryFilter {
    /// Every role whose name contains this term is eligible.
    pub role_search: Option<String>,
    /// Role slugs that are eligible regardless of `role_search`.
    pub extra_roles: Vec<String>,
    pub tenant_group: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
