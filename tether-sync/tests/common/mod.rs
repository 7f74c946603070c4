//! In-memory registry and monitor used by the scenario tests.
//!
//! `FakeMonitor` keeps real state (devices, components) so a second run sees
//! the effect of the first, and records every call in order.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;

use tether_core::{
    ClientError, ComponentId, DeviceDefaults, Hostname, LinkComponent,
    MonitorApi, MonitorDevice, Operation, RegistryApi, RegistryDevice, RegistryFilter, RegistryId,
};
use tether_sync::RunContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    LinkComponents(String),
    CreateComponent(String),
    SetLabel(String, u64, String),
    Rename(String, String),
    OverwriteIp(String, String),
    CreateDevice(String, String, DeviceDefaults),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::List | Call::LinkComponents(_))
    }
}

#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub hostname: String,
    pub ip: String,
    pub components: Vec<LinkComponent>,
}

#[derive(Default)]
struct State {
    devices: Vec<FakeDevice>,
    next_component: u64,
    calls: Vec<Call>,
    failing: HashSet<(Operation, String)>,
    listing_down: bool,
}

#[derive(Default)]
pub struct FakeMonitor {
    state: RefCell<State>,
}

impl FakeMonitor {
    pub fn new() -> Self {
        let monitor = Self::default();
        monitor.state.borrow_mut().next_component = 100;
        monitor
    }

    pub fn with_device(self, hostname: &str, ip: &str) -> Self {
        self.state.borrow_mut().devices.push(FakeDevice {
            hostname: hostname.to_string(),
            ip: ip.to_string(),
            components: Vec::new(),
        });
        self
    }

    /// Attach a link component carrying `label` to an existing device.
    pub fn with_link(self, hostname: &str, label: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.next_component += 1;
            let id = state.next_component;
            let device = state
                .devices
                .iter_mut()
                .find(|d| d.hostname == hostname)
                .expect("with_link on unknown device");
            device.components.push(LinkComponent {
                component_id: ComponentId(id),
                label: label.to_string(),
            });
        }
        self
    }

    /// Make `operation` fail for `hostname` until [`FakeMonitor::heal`].
    pub fn fail_on(self, operation: Operation, hostname: &str) -> Self {
        self.state
            .borrow_mut()
            .failing
            .insert((operation, hostname.to_string()));
        self
    }

    pub fn listing_down(self) -> Self {
        self.state.borrow_mut().listing_down = true;
        self
    }

    pub fn heal(&self) {
        self.state.borrow_mut().failing.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn device(&self, hostname: &str) -> Option<FakeDevice> {
        self.state
            .borrow()
            .devices
            .iter()
            .find(|d| d.hostname == hostname)
            .cloned()
    }

    pub fn device_count(&self) -> usize {
        self.state.borrow().devices.len()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn check(&self, operation: Operation, hostname: &str) -> Result<(), ClientError> {
        if self
            .state
            .borrow()
            .failing
            .contains(&(operation, hostname.to_string()))
        {
            return Err(ClientError::device(
                &Hostname::from(hostname),
                operation,
                "rejected by fake monitor",
            ));
        }
        Ok(())
    }

    fn with_device_mut<T>(
        &self,
        hostname: &Hostname,
        operation: Operation,
        f: impl FnOnce(&mut FakeDevice) -> T,
    ) -> Result<T, ClientError> {
        let mut state = self.state.borrow_mut();
        match state
            .devices
            .iter_mut()
            .find(|d| d.hostname == hostname.as_str())
        {
            Some(device) => Ok(f(device)),
            None => Err(ClientError::device(hostname, operation, "no such device")),
        }
    }
}

impl MonitorApi for FakeMonitor {
    fn list_devices(&self) -> Result<Vec<MonitorDevice>, ClientError> {
        self.record(Call::List);
        let state = self.state.borrow();
        if state.listing_down {
            return Err(ClientError::MonitorUnavailable("connection refused".into()));
        }
        Ok(state
            .devices
            .iter()
            .map(|d| MonitorDevice {
                hostname: Hostname::from(d.hostname.as_str()),
                ip: d.ip.clone(),
            })
            .collect())
    }

    fn link_components(&self, hostname: &Hostname) -> Result<Vec<LinkComponent>, ClientError> {
        self.record(Call::LinkComponents(hostname.to_string()));
        self.check(Operation::LookupComponents, hostname.as_str())?;
        self.with_device_mut(hostname, Operation::LookupComponents, |d| {
            d.components.clone()
        })
    }

    fn create_link_component(&self, hostname: &Hostname) -> Result<ComponentId, ClientError> {
        self.record(Call::CreateComponent(hostname.to_string()));
        self.check(Operation::CreateComponent, hostname.as_str())?;
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_component += 1;
            ComponentId(state.next_component)
        };
        self.with_device_mut(hostname, Operation::CreateComponent, |d| {
            d.components.push(LinkComponent {
                component_id: id,
                label: String::new(),
            });
            id
        })
    }

    fn set_component_label(
        &self,
        hostname: &Hostname,
        component: ComponentId,
        label: &str,
    ) -> Result<(), ClientError> {
        self.record(Call::SetLabel(
            hostname.to_string(),
            component.0,
            label.to_string(),
        ));
        self.check(Operation::LabelComponent, hostname.as_str())?;
        self.with_device_mut(hostname, Operation::LabelComponent, |d| {
            d.components
                .iter_mut()
                .find(|c| c.component_id == component)
                .map(|c| c.label = label.to_string())
                .is_some()
        })
        .and_then(|found| {
            if found {
                Ok(())
            } else {
                Err(ClientError::device(
                    hostname,
                    Operation::LabelComponent,
                    "no such component",
                ))
            }
        })
    }

    fn rename_device(&self, hostname: &Hostname, new_name: &str) -> Result<(), ClientError> {
        self.record(Call::Rename(hostname.to_string(), new_name.to_string()));
        self.check(Operation::Rename, hostname.as_str())?;
        self.with_device_mut(hostname, Operation::Rename, |d| {
            d.hostname = new_name.to_string()
        })
    }

    fn set_overwrite_ip(&self, hostname: &Hostname, ip: &str) -> Result<(), ClientError> {
        self.record(Call::OverwriteIp(hostname.to_string(), ip.to_string()));
        self.check(Operation::OverwriteIp, hostname.as_str())?;
        self.with_device_mut(hostname, Operation::OverwriteIp, |d| d.ip = ip.to_string())
    }

    fn create_device(
        &self,
        hostname: &str,
        ip: &str,
        defaults: &DeviceDefaults,
    ) -> Result<Hostname, ClientError> {
        self.record(Call::CreateDevice(
            hostname.to_string(),
            ip.to_string(),
            defaults.clone(),
        ));
        self.check(Operation::CreateDevice, hostname)?;
        let mut state = self.state.borrow_mut();
        if state.devices.iter().any(|d| d.hostname == hostname) {
            return Err(ClientError::device(
                &Hostname::from(hostname),
                Operation::CreateDevice,
                "device already exists",
            ));
        }
        state.devices.push(FakeDevice {
            hostname: hostname.to_string(),
            ip: ip.to_string(),
            components: Vec::new(),
        });
        Ok(Hostname::from(hostname))
    }
}

/// Registry fake returning a fixed, already-filtered device list.
pub struct FakeRegistry {
    devices: Vec<RegistryDevice>,
    down: bool,
}

impl FakeRegistry {
    pub fn new(devices: Vec<RegistryDevice>) -> Self {
        Self {
            devices,
            down: false,
        }
    }

    pub fn down() -> Self {
        Self {
            devices: Vec::new(),
            down: true,
        }
    }
}

impl RegistryApi for FakeRegistry {
    fn list_eligible_devices(
        &self,
        _filter: &RegistryFilter,
    ) -> Result<Vec<RegistryDevice>, ClientError> {
        if self.down {
            return Err(ClientError::RegistryUnavailable("401 invalid token".into()));
        }
        Ok(self.devices.clone())
    }
}

pub fn reg(id: u64, name: &str, ip: &str) -> RegistryDevice {
    RegistryDevice {
        id: RegistryId(id),
        name: name.to_string(),
        primary_ip: ip.to_string(),
        role: "core-switch".to_string(),
    }
}

pub fn ctx() -> RunContext {
    RunContext::new(RegistryFilter::default(), DeviceDefaults::default(), false)
}

pub fn dry_ctx() -> RunContext {
    RunContext::new(RegistryFilter::default(), DeviceDefaults::default(), true)
}
