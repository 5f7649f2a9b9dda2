use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP status metadata attached to every [`Envelope`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpStatus {
    pub code: u16,
    pub ok: bool,
    pub reason: String,
}

/// Normalized return value of every API call.
///
/// Proxmox wraps each response payload as `{"data": ...}`; `data` here is that
/// payload, untouched (object, array, or scalar - task-spawning calls return a
/// UPID string). The status metadata lives in its own field rather than being
/// merged into the payload map, so a payload that itself carries a `status`
/// key (task status responses do) can never collide with the wrapper.
///
/// Non-2xx responses with valid JSON bodies still produce an `Envelope`;
/// callers decide what a failure means by looking at `http_status` and, for
/// 4xx parameter errors, the `errors` object Proxmox attaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    pub http_status: HttpStatus,
}

impl Envelope {
    pub(crate) fn from_json(body: Value, status: StatusCode) -> Self {
        let (data, errors) = match body {
            Value::Object(mut map) => (
                map.remove("data").unwrap_or(Value::Null),
                map.remove("errors"),
            ),
            other => (other, None),
        };
        Self {
            data,
            errors,
            http_status: HttpStatus {
                code: status.as_u16(),
                ok: status.is_success(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            },
        }
    }

    /// Whether the remote call itself succeeded (2xx).
    pub fn is_ok(&self) -> bool {
        self.http_status.ok
    }

    /// The task identifier for long-running operations (start, stop, migrate,
    /// create), when the payload is a UPID string.
    pub fn upid(&self) -> Option<&str> {
        self.data.as_str().filter(|s| s.starts_with("UPID:"))
    }
}
