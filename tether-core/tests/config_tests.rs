//! Config load error messages, template writing and validation cases.

use std::fs;

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use tether_core::{config, paths, ConfigError};

fn no_env(_: &str) -> Option<String> {
    None
}

const VALID: &str = "\
registry:
  url: https://netbox.example.net/api
  token: nb-token
  role_search: switch
  extra_roles: [router, pdu]
  tenant_group: rig
monitor:
  url: https://librenms.example.net/api/v0
  token: nms-token
  snmp_community: private
";

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
    assert!(err.to_string().contains("tether init"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child(".tether/config.yaml");
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_from_with_env(file.path(), no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"), "must name the file, got: {err}");
}

#[test]
fn load_valid_config_applies_values() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child("custom.yaml");
    file.write_str(VALID).expect("write");

    let cfg = config::load_from_with_env(file.path(), no_env).expect("load");
    assert_eq!(cfg.registry.tenant_group.as_deref(), Some("rig"));
    assert_eq!(cfg.device_defaults().snmp_community, "private");
    assert_eq!(cfg.device_defaults().snmp_version, "v2c");
    assert_eq!(cfg.monitor.component_type, "netbox_id");
}

#[test]
fn env_token_satisfies_missing_file_token() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child("custom.yaml");
    file.write_str(&VALID.replace("  token: nms-token\n", ""))
        .expect("write");

    let err = config::load_from_with_env(file.path(), no_env).unwrap_err();
    assert!(err.to_string().contains("monitor.token"), "got: {err}");

    let cfg = config::load_from_with_env(file.path(), |key| {
        (key == config::MONITOR_TOKEN_ENV).then(|| "env-token".to_string())
    })
    .expect("load with env token");
    assert_eq!(cfg.monitor.token.as_deref(), Some("env-token"));
}

#[rstest]
#[case("url: https://netbox.example.net/api", "url: netbox.example.net", "registry.url")]
#[case("url: https://librenms.example.net/api/v0", "url: ftp://nms", "monitor.url")]
#[case("url: https://netbox.example.net/api", "url: https://", "registry.url")]
#[case("url: https://librenms.example.net/api/v0", "url: \"mailto:ops@nms\"", "monitor.url")]
#[case("url: https://librenms.example.net/api/v0", "url: \"https://nms:notaport/api\"", "monitor.url")]
#[case("snmp_community: private", "component_type: \"\"", "monitor.component_type")]
fn invalid_fields_are_named(#[case] from: &str, #[case] to: &str, #[case] field: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child("custom.yaml");
    file.write_str(&VALID.replace(from, to)).expect("write");

    let err = config::load_from_with_env(file.path(), no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "got: {err}");
    assert!(err.to_string().contains(field), "expected {field} in: {err}");
}

// ---------------------------------------------------------------------------
// 2. Template
// ---------------------------------------------------------------------------

#[test]
fn write_template_creates_config_and_refuses_overwrite() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = config::write_template_at(home.path(), false).expect("write template");
    assert_eq!(path, paths::config_path(home.path()));

    home.child(".tether/config.yaml")
        .assert(predicate::str::contains("component_type: netbox_id"));
    assert!(!path.with_file_name("config.yaml.tmp").exists(), ".tmp must be renamed away");

    let err = config::write_template_at(home.path(), false).unwrap_err();
    assert!(matches!(err, ConfigError::AlreadyExists { .. }), "got: {err}");

    fs::write(&path, "edited").expect("edit");
    config::write_template_at(home.path(), true).expect("force overwrite");
    home.child(".tether/config.yaml")
        .assert(predicate::str::contains("registry:"));
}

#[cfg(unix)]
#[test]
fn template_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = config::write_template_at(home.path(), false).expect("write template");
    let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}
