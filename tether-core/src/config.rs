//! YAML run configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.tether/
//!   config.yaml        (mode 0600, holds API tokens)
//!   logs/tether.log
//!   runs/last_run.json
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tokens may be omitted from the file and supplied through
//! `TETHER_REGISTRY_TOKEN` / `TETHER_MONITOR_TOKEN` instead; the environment
//! wins when both are present.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::paths;
use crate::types::{DeviceDefaults, RegistryFilter};

pub const REGISTRY_TOKEN_ENV: &str = "TETHER_REGISTRY_TOKEN";
pub const MONITOR_TOKEN_ENV: &str = "TETHER_MONITOR_TOKEN";

/// Default link component type used as the cross-reference carrier.
pub const DEFAULT_COMPONENT_TYPE: &str = "netbox_id";

/// Rotate the log once it reaches 5 MiB.
pub const DEFAULT_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Template written by `tether init`.
pub const TEMPLATE: &str = r#"# tether configuration
registry:
  url: https://netbox.example.net/api
  # token: "..."            # or set TETHER_REGISTRY_TOKEN
  role_search: switch
  extra_roles: [router, pdu]
  tenant_group: rig
monitor:
  url: https://librenms.example.net/api/v0
  # token: "..."            # or set TETHER_MONITOR_TOKEN
  component_type: netbox_id
  snmp_version: v2c
  snmp_community: public
http:
  timeout_secs: 30
log:
  # path: /var/log/tether/tether.log
  max_bytes: 5242880
  backups: 1
"#;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub registry: RegistryConfig,
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// API root, e.g. `https://netbox.example.net/api`.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub role_search: Option<String>,
    #[serde(default)]
    pub extra_roles: Vec<String>,
    #[serde(default)]
    pub tenant_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// API root, e.g. `https://librenms.example.net/api/v0`.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_component_type")]
    pub component_type: String,
    #[serde(default = "default_snmp_version")]
    pub snmp_version: String,
    #[serde(default = "default_snmp_community")]
    pub snmp_community: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Absolute log file path; defaults to `~/.tether/logs/tether.log`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_log_max_bytes")]
    pub max_bytes: u64,
    /// Rotated copies kept next to the live file.
    #[serde(default = "default_log_backups")]
    pub backups: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_bytes: default_log_max_bytes(),
            backups: default_log_backups(),
        }
    }
}

impl LogConfig {
    pub fn path_at(&self, home: &Path) -> PathBuf {
        self.path.clone().unwrap_or_else(|| paths::log_path(home))
    }
}

fn default_component_type() -> String {
    DEFAULT_COMPONENT_TYPE.to_string()
}
fn default_snmp_version() -> String {
    DeviceDefaults::default().snmp_version
}
fn default_snmp_community() -> String {
    DeviceDefaults::default().snmp_community
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_log_max_bytes() -> u64 {
    DEFAULT_LOG_MAX_BYTES
}
fn default_log_backups() -> usize {
    1
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

impl Config {
    /// Eligibility filter handed to the registry client.
    pub fn registry_filter(&self) -> RegistryFilter {
        RegistryFilter {
            role_search: self.registry.role_search.clone(),
            extra_roles: self.registry.extra_roles.clone(),
            tenant_group: self.registry.tenant_group.clone(),
        }
    }

    /// Protocol defaults for devices created in the monitor.
    pub fn device_defaults(&self) -> DeviceDefaults {
        DeviceDefaults {
            snmp_version: self.monitor.snmp_version.clone(),
            snmp_community: self.monitor.snmp_community.clone(),
        }
    }

    /// Replace tokens with values from `lookup` (normally the process env).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(REGISTRY_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.registry.token = Some(token);
        }
        if let Some(token) = lookup(MONITOR_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.monitor.token = Some(token);
        }
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("registry.url", &self.registry.url)?;
        check_url("monitor.url", &self.monitor.url)?;
        check_token("registry.token", &self.registry.token, REGISTRY_TOKEN_ENV)?;
        check_token("monitor.token", &self.monitor.token, MONITOR_TOKEN_ENV)?;

        let has_search = self
            .registry
            .role_search
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_search && self.registry.extra_roles.is_empty() {
            return Err(ConfigError::Invalid {
                field: "registry.role_search",
                reason: "set role_search or extra_roles; an empty role set selects nothing"
                    .to_string(),
            });
        }
        if self.monitor.component_type.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "monitor.component_type",
                reason: "must not be empty".to_string(),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "http.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.log.max_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "log.max_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn check_url(field: &'static str, raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("'{raw}' is not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("'{raw}' must use http or https, not {}", parsed.scheme()),
        });
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("'{raw}' has no host"),
        });
    }
    Ok(())
}

fn check_token(field: &'static str, token: &Option<String>, env: &str) -> Result<(), ConfigError> {
    match token.as_deref() {
        Some(t) if !t.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Invalid {
            field,
            reason: format!("missing; set it in the config file or via {env}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Parse, apply env overrides from the process environment and validate.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    load_from_with_env(path, |key| std::env::var(key).ok())
}

/// [`load_from`] with an explicit environment lookup.
pub fn load_from_with_env<F>(path: &Path, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.apply_env_overrides(lookup);
    config.validate()?;
    Ok(config)
}

/// Load `<home>/.tether/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&paths::config_path(home))
}


// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Write [`TEMPLATE`] to `<home>/.tether/config.yaml`.
///
/// Refuses to overwrite an existing file unless `force` is set. Write flow:
/// `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn write_template_at(home: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = paths::config_path(home);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists { path });
    }
    let dir = paths::tether_root(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_permissions(&dir, 0o700)?;
    }

    let tmp = path.with_file_name(format!("{}.tmp", paths::CONFIG_FILE));
    std::fs::write(&tmp, TEMPLATE).map_err(|e| io_err(&tmp, e))?;
    set_permissions(&tmp, 0o600)?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

/// `write_template_at` convenience wrapper.
pub fn write_template(force: bool) -> Result<PathBuf, ConfigError> {
    write_template_at(&home()?, force)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
