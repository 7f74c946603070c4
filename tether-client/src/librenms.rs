//! LibreNMS API v0 as the monitor.
//!
//! LibreNMS answers every call with an envelope carrying `"status"`. An
//! `"error"` status with HTTP 200 and a non-2xx transport status are treated
//! the same: both become [`ClientError::MonitorDevice`] for per-device calls
//! and [`ClientError::MonitorUnavailable`] for the device listing.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use tether_core::{
    ClientError, ComponentId, DeviceDefaults, Hostname, LinkComponent, MonitorApi,
    MonitorDevice, Operation,
};

use crate::http::{self, encode_segment, Session};

#[derive(Debug, Deserialize)]
struct DeviceList {
    devices: Vec<DeviceDto>,
}

#[derive(Debug, Deserialize)]
struct DeviceDto {
    hostname: String,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    overwrite_ip: Option<String>,
}

/// Monitor client backed by the LibreNMS REST API.
#[derive(Debug, Clone)]
pub struct LibreNmsClient {
    session: Session,
    component_type: String,
}

impl LibreNmsClient {
    /// `base_url` is the API root, e.g. `https://librenms.example.net/api/v0`.
    pub fn new(agent: ureq::Agent, base_url: &str, token: &str, component_type: &str) -> Self {
        Self {
            session: Session::new(agent, base_url, "X-Auth-Token", token),
            component_type: component_type.to_string(),
        }
    }

    fn device_url(&self, hostname: &str, suffix: &str) -> String {
        let base = self
            .session
            .url(&format!("devices/{}", encode_segment(hostname)));
        if suffix.is_empty() {
            base
        } else {
            format!("{base}/{suffix}")
        }
    }

    fn device_call(
        &self,
        hostname: &Hostname,
        operation: Operation,
        method: &str,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let req = self.session.request(method, url);
        http::send(req, body)
            .and_then(check_status)
            .map_err(|message| ClientError::device(hostname, operation, message))
    }
}

impl MonitorApi for LibreNmsClient {
    fn list_devices(&self) -> Result<Vec<MonitorDevice>, ClientError> {
        let req = self.session.request("GET", &self.session.url("devices"));
        let body = http::send(req, None)
            .and_then(check_status)
            .map_err(ClientError::MonitorUnavailable)?;
        let devices = parse_devices(body).map_err(ClientError::MonitorUnavailable)?;
        tracing::info!(count = devices.len(), "fetched monitor devices");
        Ok(devices)
    }

    fn link_components(&self, hostname: &Hostname) -> Result<Vec<LinkComponent>, ClientError> {
        let url = format!(
            "{}?type={}",
            self.device_url(hostname.as_str(), "components"),
            encode_segment(&self.component_type)
        );
        let body = self.device_call(hostname, Operation::LookupComponents, "GET", &url, None)?;
        parse_components(&body)
            .map_err(|message| ClientError::device(hostname, Operation::LookupComponents, message))
    }

    fn create_link_component(&self, hostname: &Hostname) -> Result<ComponentId, ClientError> {
        let url = self.device_url(
            hostname.as_str(),
            &format!("components/{}", encode_segment(&self.component_type)),
        );
        let body = self.device_call(hostname, Operation::CreateComponent, "POST", &url, None)?;
        parse_created_component(&body)
            .map_err(|message| ClientError::device(hostname, Operation::CreateComponent, message))
    }

    fn set_component_label(
        &self,
        hostname: &Hostname,
        component: ComponentId,
        label: &str,
    ) -> Result<(), ClientError> {
        let url = self.device_url(hostname.as_str(), "components");
        let body = label_payload(component, &self.component_type, label);
        self.device_call(hostname, Operation::LabelComponent, "PUT", &url, Some(&body))?;
        Ok(())
    }

    fn rename_device(&self, hostname: &Hostname, new_name: &str) -> Result<(), ClientError> {
        let url = self.device_url(
            hostname.as_str(),
            &format!("rename/{}", encode_segment(new_name)),
        );
        self.device_call(hostname, Operation::Rename, "PATCH", &url, None)?;
        Ok(())
    }

    fn set_overwrite_ip(&self, hostname: &Hostname, ip: &str) -> Result<(), ClientError> {
        let url = self.device_url(hostname.as_str(), "");
        let body = json!({ "field": "overwrite_ip", "data": ip });
        self.device_call(hostname, Operation::OverwriteIp, "PATCH", &url, Some(&body))?;
        Ok(())
    }

    fn create_device(
        &self,
        hostname: &str,
        ip: &str,
        defaults: &DeviceDefaults,
    ) -> Result<Hostname, ClientError> {
        let created = Hostname::from(hostname);
        let body = create_device_payload(hostname, ip, defaults);
        let url = self.session.url("devices");
        self.device_call(&created, Operation::CreateDevice, "POST", &url, Some(&body))?;
        Ok(created)
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// `Err(message)` when the envelope reports `"status": "error"`.
pub fn check_status(body: Value) -> Result<Value, String> {
    match body.get("status").and_then(Value::as_str) {
        Some("error") => Err(http::error_message(&body)
            .unwrap_or_else(|| "monitor reported an error without a message".to_string())),
        _ => Ok(body),
    }
}

pub fn parse_devices(body: Value) -> Result<Vec<MonitorDevice>, String> {
    let list: DeviceList =
        serde_json::from_value(body).map_err(|e| format!("unexpected device list payload: {e}"))?;
    Ok(list
        .devices
        .into_iter()
        .map(|dto| {
            let ip = dto
                .overwrite_ip
                .filter(|ip| !ip.is_empty())
                .or(dto.ip)
                .unwrap_or_default();
            MonitorDevice {
                hostname: Hostname(dto.hostname),
                ip,
            }
        })
        .collect())
}

/// Components in response order.
///
/// LibreNMS serialises an empty component set as `[]` rather than `{}`, and
/// may omit the key entirely.
pub fn parse_components(body: &Value) -> Result<Vec<LinkComponent>, String> {
    let map = match body.get("components") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) if items.is_empty() => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(other) => return Err(format!("unexpected components payload: {other}")),
    };
    map.iter()
        .map(|(key, component)| {
            let component_id = parse_component_id(key)?;
            let label = match component.get("label") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };
            Ok(LinkComponent {
                component_id,
                label,
            })
        })
        .collect()
}

/// Id of the component returned by a create call (the first key).
pub fn parse_created_component(body: &Value) -> Result<ComponentId, String> {
    body.get("components")
        .and_then(Value::as_object)
        .and_then(|map| map.keys().next())
        .ok_or_else(|| "create response carried no component".to_string())
        .and_then(|key| parse_component_id(key))
}

fn parse_component_id(key: &str) -> Result<ComponentId, String> {
    key.parse::<u64>()
        .map(ComponentId)
        .map_err(|_| format!("component id '{key}' is not numeric"))
}

/// Label update for one component; links are always written enabled.
pub fn label_payload(component: ComponentId, component_type: &str, label: &str) -> Value {
    let mut map = Map::new();
    map.insert(
        component.to_string(),
        json!({
            "type": component_type,
            "label": label,
            "status": 1,
            "ignore": 0,
            "disabled": 0,
            "error": "",
        }),
    );
    Value::Object(map)
}

pub fn create_device_payload(hostname: &str, ip: &str, defaults: &DeviceDefaults) -> Value {
    json!({
        "hostname": hostname,
        "overwrite_ip": ip,
        "version": defaults.snmp_version,
        "community": defaults.snmp_community,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_is_rejected_with_server_message() {
        let err = check_status(json!({"status": "error", "message": "Device sw9 not found"}))
            .unwrap_err();
        assert_eq!(err, "Device sw9 not found");
        assert!(check_status(json!({"status": "ok", "devices": []})).is_ok());
    }

    #[test]
    fn device_ip_prefers_overwrite_address() {
        let devices = parse_devices(json!({
            "status": "ok",
            "devices": [
                {"hostname": "sw1", "ip": "10.0.0.1", "overwrite_ip": "10.0.0.9"},
                {"hostname": "sw2", "ip": "10.0.0.2", "overwrite_ip": null},
                {"hostname": "sw3", "ip": null, "overwrite_ip": ""}
            ]
        }))
        .expect("parse");
        let ips: Vec<_> = devices.iter().map(|d| d.ip.as_str()).collect();
        assert_eq!(ips, ["10.0.0.9", "10.0.0.2", ""]);
        assert_eq!(devices[0].hostname, Hostname::from("sw1"));
    }

    #[test]
    fn device_list_without_devices_is_an_error() {
        assert!(parse_devices(json!({"status": "ok"})).is_err());
    }

    #[test]
    fn components_keep_response_order() {
        let body = json!({
            "status": "ok",
            "components": {
                "31": {"type": "netbox_id", "label": "7"},
                "4": {"type": "netbox_id", "label": "5"}
            }
        });
        let components = parse_components(&body).expect("parse");
        let labels: Vec<_> = components.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["7", "5"]);
        assert_eq!(components[1].component_id, ComponentId(4));
    }

    #[test]
    fn empty_component_sets_decode_to_nothing() {
        for body in [
            json!({"status": "ok", "components": []}),
            json!({"status": "ok", "components": {}}),
            json!({"status": "ok"}),
        ] {
            assert!(parse_components(&body).expect("parse").is_empty(), "{body}");
        }
    }

    #[test]
    fn created_component_id_is_first_key() {
        let body = json!({"status": "ok", "components": {"88": {"type": "netbox_id"}}});
        assert_eq!(parse_created_component(&body), Ok(ComponentId(88)));
        assert!(parse_created_component(&json!({"status": "ok", "components": {}})).is_err());
    }

    #[test]
    fn device_urls_encode_hostname_segment() {
        let agent = crate::http::build_agent(std::time::Duration::from_secs(1));
        let client = LibreNmsClient::new(agent, "https://nms/api/v0/", "t", "netbox_id");
        assert_eq!(
            client.device_url("core sw/1", "components"),
            "https://nms/api/v0/devices/core%20sw%2F1/components"
        );
        assert_eq!(client.device_url("sw1", ""), "https://nms/api/v0/devices/sw1");
    }

    #[test]
    fn label_payload_keys_by_component_id() {
        let body = label_payload(ComponentId(88), "netbox_id", "10");
        assert_eq!(
            body,
            json!({"88": {"type": "netbox_id", "label": "10", "status": 1,
                          "ignore": 0, "disabled": 0, "error": ""}})
        );
    }

    #[test]
    fn create_payload_carries_protocol_defaults() {
        let body = create_device_payload("sw1", "10.0.0.1", &DeviceDefaults::default());
        assert_eq!(body["overwrite_ip"], "10.0.0.1");
        assert_eq!(body["version"], "v2c");
        assert_eq!(body["community"], "public");
    }
}
