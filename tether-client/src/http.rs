//! Shared request plumbing for both clients.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// Build the blocking agent shared by both clients for one run.
///
/// TLS trust comes from the platform store (`native-certs`).
pub fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout(timeout)
        .user_agent(concat!("tether/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// An agent bound to one API root and its credential header.
#[derive(Clone)]
pub struct Session {
    agent: ureq::Agent,
    base_url: String,
    auth_header: &'static str,
    auth_value: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("auth_header", &self.auth_header)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        agent: ureq::Agent,
        base_url: &str,
        auth_header: &'static str,
        auth_value: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
            auth_value: auth_value.into(),
        }
    }

    /// `<base>/<path>`; `path` segments must already be encoded.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set(self.auth_header, &self.auth_value)
            .set("Accept", "application/json")
    }
}

/// Send `req` (with an optional JSON body) and decode the JSON response.
///
/// Non-2xx responses become `Err` carrying the status code and, when the body
/// is JSON, the server's own message.
pub fn send(req: ureq::Request, body: Option<&Value>) -> Result<Value, String> {
    let method = req.method().to_string();
    let url = req.url().to_string();
    tracing::debug!(%method, %url, "request");

    let result = match body {
        Some(body) => req.send_json(body),
        None => req.call(),
    };
    match result {
        Ok(resp) => resp
            .into_json::<Value>()
            .map_err(|e| format!("invalid JSON from {method} {url}: {e}")),
        Err(ureq::Error::Status(code, resp)) => {
            let detail = resp
                .into_json::<Value>()
                .ok()
                .and_then(|v| error_message(&v));
            Err(match detail {
                Some(message) => format!("HTTP {code} from {method} {url}: {message}"),
                None => format!("HTTP {code} from {method} {url}"),
            })
        }
        Err(ureq::Error::Transport(t)) => Err(format!("{method} {url}: {t}")),
    }
}

/// Human message carried by an error payload (`message` or `detail`).
pub fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Percent-encode one URL path segment (hostnames, component types).
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
