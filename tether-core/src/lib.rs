//! Tether core library: device types, capability traits, config, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and device structs shared by clients and engine
//! - [`api`]: [`RegistryApi`] / [`MonitorApi`] capability traits
//! - [`error`]: [`ClientError`], [`ConfigError`]
//! - [`config`]: load / validate / template
//! - [`paths`]: `~/.tether/` layout

pub mod api;
pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use api::{MonitorApi, RegistryApi};
pub use config::Config;
pub use error::{ClientError, ConfigError, InvalidRegistryId, Operation};
pub use types::{
    ComponentId, DeviceDefaults, Hostname, LinkComponent, MonitorDevice,
    RegistryDevice, RegistryFilter, RegistryId,
};
