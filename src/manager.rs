// src/manager.rs

use crate::config::{AuthConfig, ConnectionConfig, Endpoints, TronConfig};
use crate::dispatcher::RequestDispatcher;
use crate::error::{AppError, Result};
use crate::rotation::{preview_key, CredentialRotator};
use crate::storage::{CursorStore, InMemoryCursorStore};
use crate::transport::{ReqwestTransport, Transport};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Header TronGrid reads the API key from.
pub const API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

/// Per-call replacements for configured connection values.
///
/// Every `Some` field takes precedence over the named connection's
/// configuration, which in turn takes precedence over built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub network: Option<String>,
    pub endpoints: Option<Endpoints>,
    pub timeout_ms: Option<u64>,
    /// Replaces the configured header set; the API key header is still added
    pub headers: Option<BTreeMap<String, String>>,
    pub auth: Option<AuthConfig>,
    /// Bypasses rotation entirely
    pub api_key: Option<String>,
}

impl ConnectionOverrides {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// Which of a connection's three services to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    FullNode,
    SolidityNode,
    EventServer,
}

/// A resolved connection: one dispatcher per node service, all sharing the
/// same headers, timeout and selected API key.
#[derive(Clone)]
pub struct Connection {
    pub name: String,
    pub network: String,
    pub api_key: Option<String>,
    full_node: RequestDispatcher,
    solidity_node: RequestDispatcher,
    event_server: RequestDispatcher,
}

/// Connectivity of each service of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub full_node: bool,
    pub solidity_node: bool,
    pub event_server: bool,
}

impl ConnectionStatus {
    pub fn all_connected(&self) -> bool {
        self.full_node && self.solidity_node && self.event_server
    }
}

impl Connection {
    pub fn dispatcher(&self, endpoint: Endpoint) -> &RequestDispatcher {
        match endpoint {
            Endpoint::FullNode => &self.full_node,
            Endpoint::SolidityNode => &self.solidity_node,
            Endpoint::EventServer => &self.event_server,
        }
    }

    pub fn full_node(&self) -> &RequestDispatcher {
        &self.full_node
    }

    pub fn solidity_node(&self) -> &RequestDispatcher {
        &self.solidity_node
    }

    pub fn event_server(&self) -> &RequestDispatcher {
        &self.event_server
    }

    /// Probes all three services concurrently.
    pub async fn check_connections(&self) -> ConnectionStatus {
        let (full_node, solidity_node, event_server) = tokio::join!(
            self.full_node.check_connected(),
            self.solidity_node.check_connected(),
            self.event_server.check_connected(),
        );
        ConnectionStatus {
            full_node,
            solidity_node,
            event_server,
        }
    }
}

/// Builds [`Connection`]s from configuration, rotating API keys per call.
#[derive(Clone)]
pub struct ConnectionManager {
    config: Arc<TronConfig>,
    rotator: CredentialRotator,
    transport: Arc<dyn Transport>,
}

impl ConnectionManager {
    pub fn new(
        config: TronConfig,
        store: Arc<dyn CursorStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            rotator: CredentialRotator::new(store),
            transport,
        }
    }

    /// Wires the configured cursor store and a `reqwest` transport.
    pub fn from_config(config: TronConfig) -> Result<Self> {
        let store = cursor_store_for(&config)?;
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::default());
        Ok(Self::new(config, store, transport))
    }

    /// The default connection with no overrides.
    pub async fn default_connection(&self) -> Result<Connection> {
        self.make(None, ConnectionOverrides::default()).await
    }

    /// Selects the next API key of a named connection without building it.
    pub async fn next_key(&self, name: Option<&str>, override_key: Option<&str>) -> Result<Option<String>> {
        let (name, connection) = self.lookup(name)?;
        self.rotator
            .next_key(name, &connection.candidate_keys(), override_key)
            .await
    }

    /// Builds a fresh connection. Each call rotates the API key once.
    #[instrument(level = "debug", skip(self, overrides))]
    pub async fn make(&self, name: Option<&str>, overrides: ConnectionOverrides) -> Result<Connection> {
        let (name, connection) = self.lookup(name)?;

        let api_key = self
            .rotator
            .next_key(name, &connection.candidate_keys(), overrides.api_key.as_deref())
            .await?;

        let mut headers = overrides
            .headers
            .unwrap_or_else(|| connection.headers.clone());
        if let Some(key) = api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert(API_KEY_HEADER.to_string(), key.to_string());
        }
        let auth = overrides.auth.as_ref().unwrap_or(&connection.auth);
        if let Some(value) = auth.authorization_header() {
            headers.insert("Authorization".to_string(), value);
        }

        let endpoints = overrides
            .endpoints
            .unwrap_or_else(|| connection.endpoints.clone());
        let timeout_ms = overrides.timeout_ms.unwrap_or(connection.timeout_ms);
        let network = overrides
            .network
            .unwrap_or_else(|| connection.network.clone());

        let build = |host: &str| {
            RequestDispatcher::new(host, self.transport.clone())
                .with_timeout_ms(timeout_ms)
                .with_headers(headers.clone())
                .with_status_path(endpoints.status_page.clone())
        };

        info!(
            connection = name,
            network = %network,
            api_key.preview = %api_key.as_deref().map(preview_key).unwrap_or_else(|| "none".to_string()),
            timeout_ms,
            "Connection resolved"
        );

        Ok(Connection {
            name: name.to_string(),
            network,
            full_node: build(&endpoints.full_node),
            solidity_node: build(&endpoints.solidity_node),
            event_server: build(&endpoints.event_server),
            api_key,
        })
    }

    fn lookup<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a ConnectionConfig)> {
        let name = name.unwrap_or(&self.config.default);
        self.config
            .connection(name)
            .map(|connection| (name, connection))
            .ok_or_else(|| AppError::UnknownConnection {
                name: name.to_string(),
            })
    }
}

/// Redis when configured and compiled in, in-memory otherwise.
pub fn cursor_store_for(config: &TronConfig) -> Result<Arc<dyn CursorStore>> {
    match &config.redis_url {
        Some(redis_url) => redis_cursor_store(redis_url, config.redis_key_prefix.clone()),
        None => {
            info!("Rotation cursors kept in memory.");
            Ok(Arc::new(InMemoryCursorStore::new()))
        }
    }
}

#[cfg(feature = "redis")]
fn redis_cursor_store(redis_url: &str, key_prefix: Option<String>) -> Result<Arc<dyn CursorStore>> {
    let store = crate::storage::RedisCursorStore::from_url(redis_url, key_prefix)?;
    info!("Rotation cursors persisted in Redis.");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
fn redis_cursor_store(_redis_url: &str, _key_prefix: Option<String>) -> Result<Arc<dyn CursorStore>> {
    Err(AppError::configuration(
        "redis_url is set but the crate was built without the `redis` feature",
    ))
}
