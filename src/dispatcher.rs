// src/dispatcher.rs

use crate::error::{AppError, Result};
use crate::transport::{RequestMethod, Transport, TransportRequest};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_STATUS_PATH: &str = "/";

/// Body the remote API sends as a bare acknowledgement.
const ACK_BODY: &str = "OK";

/// Sends single requests to one host and normalizes what comes back.
///
/// Host, timeout, headers and status path are fixed at construction.
#[derive(Clone)]
pub struct RequestDispatcher {
    host: String,
    timeout: Duration,
    headers: BTreeMap<String, String>,
    status_path: String,
    transport: Arc<dyn Transport>,
}

impl RequestDispatcher {
    pub fn new(host: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            host: host.into(),
            timeout: timeout_from_millis(DEFAULT_TIMEOUT_MS),
            headers: BTreeMap::new(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            transport,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = timeout_from_millis(timeout_ms);
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_status_path(mut self, status_path: impl Into<String>) -> Self {
        self.status_path = status_path.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn status_path(&self) -> &str {
        &self.status_path
    }

    /// Performs one call and returns the normalized body.
    ///
    /// # Errors
    ///
    /// * [`AppError::Configuration`] for methods other than GET/POST, before any I/O
    /// * [`AppError::Transport`] when no response was received
    /// * [`AppError::NotFound`] when the server answered 404
    pub async fn dispatch(
        &self,
        path: &str,
        payload: Map<String, Value>,
        method: &str,
    ) -> Result<Map<String, Value>> {
        let method: RequestMethod = method.parse()?;
        let url = join_url(&self.host, path);

        let request = TransportRequest {
            method,
            url: url.clone(),
            headers: self.headers.clone(),
            timeout: self.timeout,
            payload,
        };

        let response = self.transport.perform(request).await.map_err(|failure| {
            warn!(http.method = %method, url = %url, error = %failure, "Request to remote API failed");
            AppError::from(failure)
        })?;

        debug!(http.method = %method, url = %url, http.status_code = response.status, "Received response");
        if response.status == 404 {
            return Err(AppError::NotFound {
                path: path.to_string(),
            });
        }

        Ok(normalize_body(&response.body))
    }

    pub async fn get(&self, path: &str, payload: Map<String, Value>) -> Result<Map<String, Value>> {
        self.dispatch(path, payload, RequestMethod::Get.as_str()).await
    }

    pub async fn post(&self, path: &str, payload: Map<String, Value>) -> Result<Map<String, Value>> {
        self.dispatch(path, payload, RequestMethod::Post.as_str()).await
    }

    /// Probes the status path. Any failure reads as "not connected", and so
    /// does a `blockID`/`status` field that is present but null.
    pub async fn check_connected(&self) -> bool {
        match self.get(&self.status_path, Map::new()).await {
            Ok(result) => {
                let connected = has_value(&result, "blockID") || has_value(&result, "status");
                info!(host = %self.host, connected, "Connectivity probe finished");
                connected
            }
            Err(e) => {
                info!(host = %self.host, error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}

/// Turns a response body into a result map.
///
/// `OK` becomes `{"status": 1}`, a JSON object is returned unchanged and
/// anything else becomes an empty map.
pub fn normalize_body(body: &str) -> Map<String, Value> {
    if body == ACK_BODY {
        let mut ack = Map::new();
        ack.insert("status".to_string(), Value::from(1));
        return ack;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            debug!(kind = json_kind(&other), "Response body is not a JSON object; treating as empty");
            Map::new()
        }
        Err(e) => {
            debug!(error = %e, "Response body is not valid JSON; treating as empty");
            Map::new()
        }
    }
}

fn has_value(result: &Map<String, Value>, field: &str) -> bool {
    result.get(field).is_some_and(|v| !v.is_null())
}

/// Millisecond timeout as a `Duration`, never zero.
pub fn timeout_from_millis(timeout_ms: u64) -> Duration {
    Duration::from_millis(timeout_ms.max(1))
}

fn join_url(host: &str, path: &str) -> String {
    if path.is_empty() {
        return host.to_string();
    }
    format!(
        "{}/{}",
        host.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
