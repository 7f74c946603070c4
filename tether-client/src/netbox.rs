//! NetBox DCIM API as the registry.
//!
//! Eligible roles are resolved first (every role whose name matches the
//! configured search term, slugified, plus the extra role slugs), then devices
//! are listed for those roles and the tenant group, following pagination.
//! Devices without a primary address never leave this module.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use tether_core::{ClientError, RegistryApi, RegistryDevice, RegistryFilter, RegistryId};

use crate::http::{self, Session};

const PAGE_LIMIT: &str = "1000";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Page<T> {
    results: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoleDto {
    name: String,
}

#[derive(Debug, Deserialize)]
struct NestedRef {
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpRef {
    address: String,
}

#[derive(Debug, Deserialize)]
struct DeviceDto {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    /// `device_role` before NetBox 4.0.
    #[serde(default, alias = "device_role")]
    role: Option<NestedRef>,
    #[serde(default)]
    primary_ip: Option<IpRef>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Registry client backed by the NetBox REST API.
#[derive(Debug, Clone)]
pub struct NetBoxClient {
    session: Session,
}

impl NetBoxClient {
    /// `base_url` is the API root, e.g. `https://netbox.example.net/api`.
    pub fn new(agent: ureq::Agent, base_url: &str, token: &str) -> Self {
        Self {
            session: Session::new(agent, base_url, "Authorization", format!("Token {token}")),
        }
    }

    fn get_all<T: DeserializeOwned>(
        &self,
        first_url: String,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ClientError> {
        let mut items = Vec::new();
        let mut next = Some(first_url);
        let mut first = true;
        while let Some(url) = next.take() {
            let mut req = self.session.request("GET", &url);
            // `next` links already carry the query string.
            if first {
                for (key, value) in query {
                    req = req.query(key, value);
                }
                first = false;
            }
            let body = http::send(req, None).map_err(ClientError::RegistryUnavailable)?;
            let page: Page<T> = decode_page(body)?;
            items.extend(page.results);
            next = page.next;
        }
        Ok(items)
    }

    fn eligible_roles(&self, filter: &RegistryFilter) -> Result<Vec<String>, ClientError> {
        let mut roles = Vec::new();
        if let Some(term) = filter.role_search.as_deref().filter(|t| !t.trim().is_empty()) {
            let found: Vec<RoleDto> = self.get_all(
                self.session.url("dcim/device-roles/"),
                &[("q", term.to_string()), ("limit", PAGE_LIMIT.to_string())],
            )?;
            roles.extend(found.iter().map(|r| role_slug(&r.name)));
        }
        for extra in &filter.extra_roles {
            if !roles.contains(extra) {
                roles.push(extra.clone());
            }
        }
        Ok(roles)
    }
}

impl RegistryApi for NetBoxClient {
    fn list_eligible_devices(
        &self,
        filter: &RegistryFilter,
    ) -> Result<Vec<RegistryDevice>, ClientError> {
        let roles = self.eligible_roles(filter)?;
        if roles.is_empty() {
            tracing::warn!("no registry roles matched the filter; nothing is eligible");
            return Ok(Vec::new());
        }
        tracing::debug!(roles = ?roles, "resolved eligible roles");

        let mut query: Vec<(&str, String)> = roles.iter().map(|r| ("role", r.clone())).collect();
        if let Some(group) = &filter.tenant_group {
            query.push(("tenant_group", group.clone()));
        }
        query.push(("limit", PAGE_LIMIT.to_string()));

        let raw: Vec<DeviceDto> = self.get_all(self.session.url("dcim/devices/"), &query)?;
        let total = raw.len();
        let devices = into_eligible(raw);
        tracing::info!(
            listed = total,
            eligible = devices.len(),
            "fetched registry devices"
        );
        Ok(devices)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn decode_page<T: DeserializeOwned>(body: Value) -> Result<Page<T>, ClientError> {
    serde_json::from_value(body)
        .map_err(|e| ClientError::RegistryUnavailable(format!("unexpected registry payload: {e}")))
}

/// Role name as used in the device filter: lower-case, spaces become `-`.
pub fn role_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// `10.0.0.1/24` → `10.0.0.1`.
pub fn strip_prefix_len(address: &str) -> &str {
    address.split('/').next().unwrap_or(address)
}

/// Keep devices that carry both a name and a primary address.
fn into_eligible(raw: Vec<DeviceDto>) -> Vec<RegistryDevice> {
    raw.into_iter()
        .filter_map(|dto| {
            let Some(ip) = dto.primary_ip else {
                tracing::debug!(id = dto.id, "skipping registry device without primary address");
                return None;
            };
            let Some(name) = dto.name.filter(|n| !n.is_empty()) else {
                tracing::warn!(id = dto.id, "skipping unnamed registry device");
                return None;
            };
            let role = dto
                .role
                .and_then(|r| r.slug.or(r.name))
                .unwrap_or_default();
            Some(RegistryDevice {
                id: RegistryId(dto.id),
                name,
                primary_ip: strip_prefix_len(&ip.address).to_string(),
                role,
            })
        })
        .collect()
}
