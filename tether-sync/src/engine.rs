//! Step 2: resolve every registry device against the indexed monitor snapshot.
//!
//! ## Per-device protocol
//!
//! 1. Already linked → **update**.
//! 2. Unlinked candidate with the same IP or name → **link**, then **update**.
//! 3. No candidate → **create**, then **link**.
//!
//! Every monitor call is its own failure domain: a failure is logged, recorded
//! on the device outcome, and the next independent step still runs. Nothing is
//! ever deleted or unlinked.

use chrono::Utc;

use tether_core::{
    Hostname, MonitorApi, MonitorDevice, Operation, RegistryDevice, RegistryId,
};

use crate::context::RunContext;
use crate::index::build_index;
use crate::matcher::take_match;
use crate::report::{
    Action, ActionResult, DeviceOutcome, DeviceState, Failure, Resolution, RunReport,
};

/// Drives one reconciliation over a monitor capability.
pub struct Reconciler<'a, M: MonitorApi + ?Sized> {
    monitor: &'a M,
    ctx: &'a RunContext,
}

/// Mutable state for one registry device while it is being resolved.
struct Pending {
    actions: Vec<ActionResult>,
    failures: Vec<Failure>,
    linked: bool,
}

impl Pending {
    fn new(linked: bool) -> Self {
        Self {
            actions: Vec::new(),
            failures: Vec::new(),
            linked,
        }
    }

    fn finish(self, device: &RegistryDevice, resolution: Resolution) -> DeviceOutcome {
        let state = if !self.linked {
            DeviceState::Unlinked
        } else if self.failures.is_empty() {
            DeviceState::Synced
        } else {
            DeviceState::Degraded
        };
        DeviceOutcome {
            registry_id: device.id,
            name: device.name.clone(),
            resolution,
            state,
            actions: self.actions,
            failures: self.failures,
        }
    }
}

impl<'a, M: MonitorApi + ?Sized> Reconciler<'a, M> {
    pub fn new(monitor: &'a M, ctx: &'a RunContext) -> Self {
        Self { monitor, ctx }
    }

    /// Reconcile `registry` (eligible devices, fetch order) against the full
    /// monitor snapshot.
    pub fn reconcile(
        &self,
        registry: &[RegistryDevice],
        monitor_devices: Vec<MonitorDevice>,
    ) -> RunReport {
        let monitor_count = monitor_devices.len();
        let mut index = build_index(self.monitor, monitor_devices);

        let mut devices = Vec::with_capacity(registry.len());
        for device in registry {
            let outcome = match index.linked.get(&device.id) {
                Some(linked) => {
                    let mut pending = Pending::new(true);
                    self.update(linked, device, &mut pending);
                    pending.finish(
                        device,
                        Resolution::AlreadyLinked {
                            hostname: linked.hostname.clone(),
                        },
                    )
                }
                None => match take_match(&mut index.unlinked, device) {
                    Some(candidate) => self.adopt(candidate, device),
                    None => self.create(device),
                },
            };
            devices.push(outcome);
        }

        RunReport {
            started_at: self.ctx.started_at,
            finished_at: Utc::now(),
            dry_run: self.ctx.dry_run,
            registry_devices: registry.len(),
            monitor_devices: monitor_count,
            devices,
            anomalies: index.anomalies,
            skipped: index.skipped,
        }
    }

    /// Link an unlinked monitor device to `device`, then sync its fields.
    fn adopt(&self, candidate: MonitorDevice, device: &RegistryDevice) -> DeviceOutcome {
        tracing::info!(
            registry_id = %device.id,
            name = %device.name,
            hostname = %candidate.hostname,
            "matched unlinked monitor device"
        );
        let mut pending = Pending::new(false);
        pending.linked = self.link(&candidate.hostname, device.id, &mut pending);
        self.update(&candidate, device, &mut pending);
        pending.finish(
            device,
            Resolution::Matched {
                hostname: candidate.hostname,
            },
        )
    }

    /// Create the monitor device, then link it. Creation failure skips the link.
    fn create(&self, device: &RegistryDevice) -> DeviceOutcome {
        let mut pending = Pending::new(false);
        let created = Action::Created {
            hostname: Hostname::from(device.name.as_str()),
            ip: device.primary_ip.clone(),
        };

        let hostname = if self.ctx.dry_run {
            pending.actions.push(ActionResult::Planned(created));
            Hostname::from(device.name.as_str())
        } else {
            match self
                .monitor
                .create_device(&device.name, &device.primary_ip, &self.ctx.defaults)
            {
                Ok(hostname) => {
                    tracing::info!(
                        registry_id = %device.id,
                        hostname = %hostname,
                        ip = %device.primary_ip,
                        "created monitor device"
                    );
                    pending.actions.push(ActionResult::Applied(created));
                    hostname
                }
                Err(err) => {
                    tracing::error!(
                        registry_id = %device.id,
                        name = %device.name,
                        ip = %device.primary_ip,
                        error = %err,
                        "failed to create monitor device"
                    );
                    pending.failures.push(Failure::from_client(
                        err,
                        &Hostname::from(device.name.as_str()),
                        Operation::CreateDevice,
                    ));
                    return pending.finish(device, Resolution::Created);
                }
            }
        };

        pending.linked = self.link(&hostname, device.id, &mut pending);
        pending.finish(device, Resolution::Created)
    }

    /// Create a link component on `hostname` and label it with `id`.
    ///
    /// Returns whether the device ends up linked.
    fn link(&self, hostname: &Hostname, id: RegistryId, pending: &mut Pending) -> bool {
        let label = id.to_label();
        if self.ctx.dry_run {
            pending.actions.push(ActionResult::Planned(Action::Linked {
                hostname: hostname.clone(),
                component_id: None,
                label,
            }));
            return true;
        }

        let component = match self.monitor.create_link_component(hostname) {
            Ok(component) => component,
            Err(err) => {
                tracing::error!(
                    hostname = %hostname,
                    registry_id = %id,
                    error = %err,
                    "failed to create link component"
                );
                pending
                    .failures
                    .push(Failure::from_client(err, hostname, Operation::CreateComponent));
                return false;
            }
        };

        match self.monitor.set_component_label(hostname, component, &label) {
            Ok(()) => {
                tracing::info!(
                    hostname = %hostname,
                    registry_id = %id,
                    component_id = %component,
                    "linked monitor device"
                );
                pending.actions.push(ActionResult::Applied(Action::Linked {
                    hostname: hostname.clone(),
                    component_id: Some(component),
                    label,
                }));
                true
            }
            Err(err) => {
                tracing::error!(
                    hostname = %hostname,
                    registry_id = %id,
                    component_id = %component,
                    error = %err,
                    "failed to label link component"
                );
                pending
                    .failures
                    .push(Failure::from_client(err, hostname, Operation::LabelComponent));
                false
            }
        }
    }

    /// Bring hostname and IP in line with the registry. Rename and IP
    /// overwrite fail independently; the IP call uses the new hostname only
    /// if the rename went through.
    fn update(&self, current: &MonitorDevice, device: &RegistryDevice, pending: &mut Pending) {
        let mut hostname = current.hostname.clone();

        if hostname.as_str() != device.name {
            let renamed = Action::Renamed {
                from: hostname.clone(),
                to: Hostname::from(device.name.as_str()),
            };
            if self.ctx.dry_run {
                pending.actions.push(ActionResult::Planned(renamed));
                hostname = Hostname::from(device.name.as_str());
            } else {
                match self.monitor.rename_device(&hostname, &device.name) {
                    Ok(()) => {
                        tracing::info!(
                            registry_id = %device.id,
                            from = %hostname,
                            to = %device.name,
                            "renamed monitor device"
                        );
                        pending.actions.push(ActionResult::Applied(renamed));
                        hostname = Hostname::from(device.name.as_str());
                    }
                    Err(err) => {
                        tracing::error!(
                            registry_id = %device.id,
                            from = %hostname,
                            to = %device.name,
                            error = %err,
                            "failed to rename monitor device"
                        );
                        pending
                            .failures
                            .push(Failure::from_client(err, &hostname, Operation::Rename));
                    }
                }
            }
        }

        if current.ip != device.primary_ip {
            let overwritten = Action::IpOverwritten {
                hostname: hostname.clone(),
                from: current.ip.clone(),
                to: device.primary_ip.clone(),
            };
            if self.ctx.dry_run {
                pending.actions.push(ActionResult::Planned(overwritten));
                return;
            }
            match self.monitor.set_overwrite_ip(&hostname, &device.primary_ip) {
                Ok(()) => {
                    tracing::info!(
                        registry_id = %device.id,
                        hostname = %hostname,
                        from = %current.ip,
                        to = %device.primary_ip,
                        "updated monitor device IP"
                    );
                    pending.actions.push(ActionResult::Applied(overwritten));
                }
                Err(err) => {
                    tracing::error!(
                        registry_id = %device.id,
                        hostname = %hostname,
                        from = %current.ip,
                        to = %device.primary_ip,
                        error = %err,
                        "failed to update monitor device IP"
                    );
                    pending
                        .failures
                        .push(Failure::from_client(err, &hostname, Operation::OverwriteIp));
                }
            }
        }
    }
}
