//! Step 1: split the monitor snapshot into linked and unlinked devices.

use std::collections::HashMap;

use tether_core::{MonitorApi, MonitorDevice, Operation, RegistryId};

use crate::report::{Anomaly, Failure};

/// Monitor snapshot keyed by the link each device carries.
#[derive(Debug, Default)]
pub struct DeviceIndex {
    pub linked: HashMap<RegistryId, MonitorDevice>,
    /// Unlinked devices in fetch order.
    pub unlinked: Vec<MonitorDevice>,
    pub anomalies: Vec<Anomaly>,
    /// Devices whose component lookup failed. They are neither linked nor
    /// unlinked for this run, so nothing can be matched onto them.
    pub skipped: Vec<Failure>,
}

/// Query every device's link components and classify it.
///
/// - no valid component → unlinked
/// - one or more → linked under the last valid label; two or more components
///   also record [`Anomaly::MultipleLinks`]
/// - labels that are not decimal ids are ignored with [`Anomaly::InvalidLabel`]
/// - a registry id seen twice keeps the later device and records
///   [`Anomaly::DuplicateRegistryId`]
pub fn build_index<M>(monitor: &M, devices: Vec<MonitorDevice>) -> DeviceIndex
where
    M: MonitorApi + ?Sized,
{
    let mut index = DeviceIndex::default();

    for device in devices {
        let components = match monitor.link_components(&device.hostname) {
            Ok(components) => components,
            Err(err) => {
                tracing::warn!(
                    hostname = %device.hostname,
                    error = %err,
                    "link component lookup failed; device skipped this run"
                );
                index.skipped.push(Failure::from_client(
                    err,
                    &device.hostname,
                    Operation::LookupComponents,
                ));
                continue;
            }
        };

        let mut chosen = None;
        for component in &components {
            match component.registry_id() {
                Some(id) => chosen = Some(id),
                None => {
                    tracing::warn!(
                        hostname = %device.hostname,
                        component_id = %component.component_id,
                        label = %component.label,
                        "link component label is not a registry id; ignored"
                    );
                    index.anomalies.push(Anomaly::InvalidLabel {
                        hostname: device.hostname.clone(),
                        component_id: component.component_id,
                        label: component.label.clone(),
                    });
                }
            }
        }

        if components.len() >= 2 {
            let labels: Vec<String> = components.iter().map(|c| c.label.clone()).collect();
            tracing::warn!(
                hostname = %device.hostname,
                labels = ?labels,
                chosen = ?chosen,
                "more than one link component attached to monitor device"
            );
            index.anomalies.push(Anomaly::MultipleLinks {
                hostname: device.hostname.clone(),
                labels,
                chosen,
            });
        }

        match chosen {
            None => index.unlinked.push(device),
            Some(id) => {
                let kept = device.hostname.clone();
                if let Some(previous) = index.linked.insert(id, device) {
                    tracing::warn!(
                        registry_id = %id,
                        kept = %kept,
                        displaced = %previous.hostname,
                        "registry id linked from more than one monitor device"
                    );
                    index.anomalies.push(Anomaly::DuplicateRegistryId {
                        registry_id: id,
                        kept,
                        displaced: previous.hostname,
                    });
                }
            }
        }
    }

    tracing::info!(
        linked = index.linked.len(),
        unlinked = index.unlinked.len(),
        skipped = index.skipped.len(),
        "indexed monitor devices"
    );
    index
}
