// src/config/app.rs

use crate::dispatcher::{DEFAULT_STATUS_PATH, DEFAULT_TIMEOUT_MS};
use crate::rotation::ApiKeys;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const MAINNET: &str = "mainnet";
pub const SHASTA: &str = "shasta";
pub const NILE: &str = "nile";

/// Root of the configuration file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TronConfig {
    /// Connection used when the caller does not name one
    #[serde(default = "default_connection_name")]
    pub default: String,
    #[serde(default = "default_connections")]
    pub connections: BTreeMap<String, ConnectionConfig>,
    /// Rotation cursors go to Redis when set, otherwise they stay in memory
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default)]
    pub redis_key_prefix: Option<String>,
}

impl Default for TronConfig {
    fn default() -> Self {
        Self {
            default: default_connection_name(),
            connections: default_connections(),
            redis_url: None,
            redis_key_prefix: None,
        }
    }
}

impl TronConfig {
    pub fn connection(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.get(name)
    }
}

/// One named target network.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Single key or comma-separated list
    #[serde(default)]
    pub api_key: Option<String>,
    /// Explicit list; takes precedence over `api_key` when non-empty
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            endpoints: Endpoints::default(),
            timeout_ms: default_timeout_ms(),
            headers: BTreeMap::new(),
            api_key: None,
            api_keys: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

impl ConnectionConfig {
    /// Builds a connection whose three endpoints share one host.
    pub fn for_host(network: &str, host: &str) -> Self {
        Self {
            network: network.to_string(),
            endpoints: Endpoints::uniform(host),
            ..Self::default()
        }
    }

    /// Rotation candidates for this connection.
    pub fn candidate_keys(&self) -> ApiKeys {
        if !self.api_keys.is_empty() {
            return ApiKeys::List(self.api_keys.clone());
        }
        ApiKeys::Joined(self.api_key.clone().unwrap_or_default())
    }

    pub fn has_keys(&self) -> bool {
        !self.candidate_keys().normalized().is_empty()
    }
}

/// Hosts of the three TRON node services.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Endpoints {
    #[serde(default = "default_host")]
    pub full_node: String,
    #[serde(default = "default_host")]
    pub solidity_node: String,
    #[serde(default = "default_host")]
    pub event_server: String,
    #[serde(default = "default_status_page")]
    pub status_page: String,
}

impl Endpoints {
    pub fn uniform(host: &str) -> Self {
        Self {
            full_node: host.to_string(),
            solidity_node: host.to_string(),
            event_server: host.to_string(),
            status_page: default_status_page(),
        }
    }

    /// `(label, host)` pairs, used for validation and reporting.
    pub fn hosts(&self) -> [(&'static str, &str); 3] {
        [
            ("full_node", self.full_node.as_str()),
            ("solidity_node", self.solidity_node.as_str()),
            ("event_server", self.event_server.as_str()),
        ]
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::uniform(&default_host())
    }
}

/// Static credentials sent with every request.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default)]
    pub basic: Option<BasicAuth>,
    #[serde(default)]
    pub bearer: Option<Secret<String>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BasicAuth {
    pub username: String,
    pub password: Secret<String>,
}

impl AuthConfig {
    /// Value of the `Authorization` header, if any. Bearer wins over basic.
    pub fn authorization_header(&self) -> Option<String> {
        if let Some(token) = &self.bearer {
            return Some(format!("Bearer {}", token.expose_secret()));
        }
        self.basic.as_ref().map(|basic| {
            let credentials = format!("{}:{}", basic.username, basic.password.expose_secret());
            format!("Basic {}", STANDARD.encode(credentials))
        })
    }
}

// Default value functions
fn default_connection_name() -> String {
    MAINNET.to_string()
}

fn default_network() -> String {
    MAINNET.to_string()
}

fn default_host() -> String {
    "https://api.trongrid.io".to_string()
}

fn default_status_page() -> String {
    DEFAULT_STATUS_PATH.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_connections() -> BTreeMap<String, ConnectionConfig> {
    BTreeMap::from([
        (
            MAINNET.to_string(),
            ConnectionConfig::for_host(MAINNET, "https://api.trongrid.io"),
        ),
        (
            SHASTA.to_string(),
            ConnectionConfig::for_host(SHASTA, "https://api.shasta.trongrid.io"),
        ),
        (
            NILE.to_string(),
            ConnectionConfig::for_host(NILE, "https://nile.trongrid.io"),
        ),
    ])
}
