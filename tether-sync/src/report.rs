//! What a run did, device by device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tether_core::{ClientError, ComponentId, Hostname, Operation, RegistryId};

// ---------------------------------------------------------------------------
// Actions and failures
// ---------------------------------------------------------------------------

/// A mutation issued (or planned) against the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Link component created and labelled. `component_id` is `None` when
    /// only planned.
    Linked {
        hostname: Hostname,
        component_id: Option<ComponentId>,
        label: String,
    },
    Renamed { from: Hostname, to: Hostname },
    IpOverwritten {
        hostname: Hostname,
        from: String,
        to: String,
    },
    Created { hostname: Hostname, ip: String },
}

/// Outcome of a single mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "action", rename_all = "snake_case")]
pub enum ActionResult {
    /// The monitor accepted the call.
    Applied(Action),
    /// Dry run: the call *would* have been issued.
    Planned(Action),
}

impl ActionResult {
    pub fn action(&self) -> &Action {
        match self {
            ActionResult::Applied(a) | ActionResult::Planned(a) => a,
        }
    }
}

/// A per-device monitor call that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub operation: Operation,
    pub hostname: Hostname,
    pub message: String,
}

impl Failure {
    /// Build from a client error, falling back to the caller's view of the
    /// call for kinds that carry no device context.
    pub fn from_client(err: ClientError, hostname: &Hostname, operation: Operation) -> Self {
        match err {
            ClientError::MonitorDevice {
                hostname,
                operation,
                message,
            } => Failure {
                operation,
                hostname,
                message,
            },
            other => Failure {
                operation,
                hostname: hostname.clone(),
                message: other.to_string(),
            },
        }
    }
}

/// Data-integrity findings. Logged at warn; never abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// More than one link component on one monitor device.
    MultipleLinks {
        hostname: Hostname,
        labels: Vec<String>,
        /// Id the device was classified under (the last valid label).
        chosen: Option<RegistryId>,
    },
    /// A link component whose label is not a registry id.
    InvalidLabel {
        hostname: Hostname,
        component_id: ComponentId,
        label: String,
    },
    /// One registry id carried by two monitor devices.
    DuplicateRegistryId {
        registry_id: RegistryId,
        kept: Hostname,
        displaced: Hostname,
    },
}

// ---------------------------------------------------------------------------
// Per-device outcome
// ---------------------------------------------------------------------------

/// How a registry device found (or got) its monitor entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    AlreadyLinked { hostname: Hostname },
    Matched { hostname: Hostname },
    Created,
}

/// The three observable end states of a registry device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Linked and field-synced.
    Synced,
    /// Linked, but a rename or IP overwrite failed.
    Degraded,
    /// Link or creation failed; the next run retries through matching.
    Unlinked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOutcome {
    pub registry_id: RegistryId,
    pub name: String,
    pub resolution: Resolution,
    pub state: DeviceState,
    pub actions: Vec<ActionResult>,
    pub failures: Vec<Failure>,
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub registry_devices: usize,
    pub monitor_devices: usize,
    pub devices: Vec<DeviceOutcome>,
    pub anomalies: Vec<Anomaly>,
    /// Monitor devices left out of the index because their component lookup
    /// failed.
    pub skipped: Vec<Failure>,
}

impl RunReport {
    pub fn count(&self, state: DeviceState) -> usize {
        self.devices.iter().filter(|d| d.state == state).count()
    }

    /// Applied or planned mutations across all devices.
    pub fn mutation_count(&self) -> usize {
        self.devices.iter().map(|d| d.actions.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.devices.iter().map(|d| d.failures.len()).sum::<usize>() + self.skipped.len()
    }

    pub fn outcome(&self, id: RegistryId) -> Option<&DeviceOutcome> {
        self.devices.iter().find(|d| d.registry_id == id)
    }
}
