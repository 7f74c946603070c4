//! Capability interfaces consumed by the reconciliation engine.
//!
//! The engine never talks HTTP; it only sees these two traits. Concrete
//! implementations live in `tether-client`, in-memory fakes in the tests.

use crate::error::ClientError;
use crate::types::{
    ComponentId, DeviceDefaults, Hostname, LinkComponent, MonitorDevice,
    RegistryDevice, RegistryFilter,
};

/// Read-only view of the source-of-truth inventory.
pub trait RegistryApi {
    /// Devices matching `filter` that hold a primary address.
    ///
    /// Fails only with [`ClientError::RegistryUnavailable`].
    fn list_eligible_devices(
        &self,
        filter: &RegistryFilter,
    ) -> Result<Vec<RegistryDevice>, ClientError>;
}

/// The monitoring system's device list and the mutations the engine needs.
///
/// `list_devices` fails with [`ClientError::MonitorUnavailable`]; every other
/// method fails with [`ClientError::MonitorDevice`].
pub trait MonitorApi {
    fn list_devices(&self) -> Result<Vec<MonitorDevice>, ClientError>;

    /// Link components on `hostname`, in the order the monitor returns them.
    fn link_components(&self, hostname: &Hostname) -> Result<Vec<LinkComponent>, ClientError>;

    /// Create an empty link component and return its generated id.
    fn create_link_component(&self, hostname: &Hostname) -> Result<ComponentId, ClientError>;

    /// Write `label` onto `component` and mark it active.
    fn set_component_label(
        &self,
        hostname: &Hostname,
        component: ComponentId,
        label: &str,
    ) -> Result<(), ClientError>;

    fn rename_device(&self, hostname: &Hostname, new_name: &str) -> Result<(), ClientError>;

    fn set_overwrite_ip(&self, hostname: &Hostname, ip: &str) -> Result<(), ClientError>;

    /// Create a device and return the hostname the monitor keys it by.
    fn create_device(
        &self,
        hostname: &str,
        ip: &str,
        defaults: &DeviceDefaults,
    ) -> Result<Hostname, ClientError>;
}
