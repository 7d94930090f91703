// src/transport.rs

use crate::error::AppError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// HTTP methods the remote API is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            other => Err(AppError::configuration(format!(
                "The method is not defined: {other}"
            ))),
        }
    }
}

/// One fully-resolved outgoing call.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: RequestMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Query parameters for GET, JSON body for POST
    pub payload: Map<String, Value>,
}

/// Raw outcome of a call that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// The call never produced a response: DNS, connect, TLS or timeout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
    pub code: Option<u16>,
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            code: err.status().map(|s| s.as_u16()),
        }
    }
}

impl From<TransportFailure> for AppError {
    fn from(failure: TransportFailure) -> Self {
        AppError::Transport {
            message: failure.message,
            code: failure.code,
        }
    }
}

/// Performs HTTP calls on behalf of a dispatcher.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportFailure>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        let headers = build_header_map(&request.headers);
        let builder = match request.method {
            RequestMethod::Get => self
                .client
                .get(&request.url)
                .query(&query_pairs(&request.payload)),
            RequestMethod::Post => self.client.post(&request.url).json(&request.payload),
        };

        debug!(http.method = %request.method, url = %request.url, timeout = ?request.timeout, "Sending request");
        let response = builder
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await?;

        // Keep the status even when the body cannot be read.
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_else(|e| {
            warn!(http.status_code = status, url = %request.url, error = %e, "Failed to read response body");
            String::new()
        });
        Ok(TransportResponse { status, body })
    }
}

/// Flattens a JSON payload into query pairs.
///
/// Strings are sent verbatim, booleans as `1`/`0`, nulls are dropped and
/// anything else is sent as its JSON text.
pub fn query_pairs(payload: &Map<String, Value>) -> Vec<(String, String)> {
    payload
        .iter()
        .filter_map(|(name, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(b) => String::from(if *b { "1" } else { "0" }),
                other => other.to_string(),
            };
            Some((name.clone(), rendered))
        })
        .collect()
}

fn build_header_map(headers: &BTreeMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => {
                warn!(header = %name, "Skipping header with invalid name or value");
            }
        }
    }
    map
}
