//! Uniform success/failure wrapper around every remote or local outcome.
//!
//! # Design
//! Whatever happens (a clean exchange, a remote-reported failure, a dead
//! socket, rejected input) the caller receives an [`ApiResponse`]. `success`
//! is true only when the exchange completed with a 200-class status AND the
//! body carried no failure marker; the remote service is known to answer 200
//! with `{"status": "Failed", ...}`. Whichever error text the remote body
//! provides is carried verbatim, never synthesized.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::casing;
use crate::error::{FetchError, TransportError};

/// Status code reported when no remote exchange took place (transport fault,
/// or a patch-merge fetch that died on the wire).
pub const STATUS_NO_EXCHANGE: u16 = 0;

/// Status code reported for failures detected locally, before any transport
/// call: rejected input and missing required fields.
pub const STATUS_VALIDATION: u16 = 400;

/// Status code reported when a patch-merge target does not exist.
pub const STATUS_NOT_FOUND: u16 = 404;

/// The uniform result of one engine call.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    status_code: u16,
    success: bool,
    payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    /// Wrap a completed transport exchange. The body must parse as JSON;
    /// object payloads get their top-level keys normalized to snake_case.
    pub fn from_exchange(status_code: u16, body: &str) -> Self {
        let payload: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                return Self::from_transport_error(TransportError::BadBody(e.to_string()));
            }
        };
        Self::from_payload(status_code, snake_case_keys(payload))
    }

    /// Wrap an already-structured payload, applying the same success/failure
    /// determination as [`from_exchange`](Self::from_exchange). Used when an
    /// operation synthesizes a response from another operation's payload
    /// (single-record extraction from a listing).
    pub fn from_payload(status_code: u16, payload: Value) -> Self {
        let error = detect_error(status_code, &payload);
        Self {
            status_code,
            success: error.is_none() && (200..300).contains(&status_code),
            payload,
            error,
        }
    }

    /// Wrap a transport-level fault: no remote status code is available.
    pub fn from_transport_error(error: TransportError) -> Self {
        Self {
            status_code: STATUS_NO_EXCHANGE,
            success: false,
            payload: Value::Object(Map::new()),
            error: Some(error.to_string()),
        }
    }

    /// Wrap a local validation failure. The payload is the ordered
    /// field-name → message map; the transport was never invoked.
    pub fn validation_failure(errors: Map<String, Value>) -> Self {
        Self {
            status_code: STATUS_VALIDATION,
            success: false,
            payload: Value::Object(errors),
            error: Some("validation error".to_string()),
        }
    }

    /// Wrap a failed patch-merge fetch.
    pub fn merge_failure(error: FetchError) -> Self {
        let status_code = match &error {
            FetchError::NotFound(_) => STATUS_NOT_FOUND,
            FetchError::Transport(_) => STATUS_NO_EXCHANGE,
            FetchError::Remote { status_code, .. } => *status_code,
        };
        Self {
            status_code,
            success: false,
            payload: Value::Object(Map::new()),
            error: Some(error.to_string()),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The payload as an object map, when it is one. List payloads and bare
    /// scalars return `None`.
    pub fn payload_object(&self) -> Option<&Map<String, Value>> {
        self.payload.as_object()
    }

    /// Interpret this response as the outcome of a patch-merge fetch: the
    /// current field map on success, a [`FetchError`] otherwise.
    pub fn into_fetched_state(self) -> Result<Map<String, Value>, FetchError> {
        if !self.success {
            return Err(FetchError::Remote {
                status_code: self.status_code,
                message: self
                    .error
                    .unwrap_or_else(|| "fetch of current state failed".to_string()),
            });
        }
        match self.payload {
            Value::Object(map) => Ok(map),
            other => Err(FetchError::Remote {
                status_code: self.status_code,
                message: format!("expected an object payload, got: {other}"),
            }),
        }
    }

    /// The structured `{status_code, success, payload[, error]}` rendering.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The JSON-string form of [`to_json`](Self::to_json).
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

impl std::fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

/// Locate the failure, if any, in a completed exchange. Checked in order: an
/// explicit `error` key, the HTTP status class, then the remote's
/// `status: Failed` marker with its own description.
fn detect_error(status_code: u16, payload: &Value) -> Option<String> {
    if let Some(obj) = payload.as_object() {
        if let Some(error) = obj.get("error") {
            return Some(match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }
    }

    if !(200..300).contains(&status_code) {
        return Some(format!("HTTP response {status_code}"));
    }

    let obj = payload.as_object()?;
    if obj.get("status").and_then(Value::as_str) == Some("Failed") {
        let description = obj
            .get("status_description")
            .and_then(Value::as_str)
            .unwrap_or("Failed");
        return Some(description.to_string());
    }
    None
}

/// Normalize the top-level keys of an object payload to snake_case. Nested
/// objects keep the remote spelling; list and scalar payloads pass through.
fn snake_case_keys(payload: Value) -> Value {
    match payload {
        Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(key, value)| (casing::from_remote(&key), value))
                .collect(),
        ),
        other => other,
    }
}
