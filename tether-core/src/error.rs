//! Error types for tether-core.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Hostname;

/// Monitor-side operation attempted for a single device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    LookupComponents,
    CreateComponent,
    LabelComponent,
    Rename,
    OverwriteIp,
    CreateDevice,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::LookupComponents => "component lookup",
            Operation::CreateComponent => "component creation",
            Operation::LabelComponent => "component labelling",
            Operation::Rename => "rename",
            Operation::OverwriteIp => "IP overwrite",
            Operation::CreateDevice => "device creation",
        };
        f.write_str(s)
    }
}

/// Failure model of both capability interfaces.
///
/// Transport errors, undecodable payloads and application-level rejections
/// all collapse into one of these three kinds at the client boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The registry listing could not be fetched or decoded. Fatal to a run.
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// The monitor listing could not be fetched or decoded. Fatal to a run.
    #[error("monitor unavailable: {0}")]
    MonitorUnavailable(String),

    /// A per-device monitor call failed.
    #[error("{operation} failed for '{hostname}': {message}")]
    MonitorDevice {
        hostname: Hostname,
        operation: Operation,
        message: String,
    },
}

impl ClientError {
    pub fn device(hostname: &Hostname, operation: Operation, message: impl Into<String>) -> Self {
        ClientError::MonitorDevice {
            hostname: hostname.clone(),
            operation,
            message: message.into(),
        }
    }
}

/// A link label that is not the decimal rendering of a registry id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a registry id")]
pub struct InvalidRegistryId(pub String);

/// All errors that can arise while loading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; serde_yaml supplies the line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("config not found at {path}; run `tether init` to create one")]
    ConfigNotFound { path: PathBuf },

    #[error("config already exists at {path}; pass --force to overwrite")]
    AlreadyExists { path: PathBuf },

    /// A field is present but unusable.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
