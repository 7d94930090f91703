//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tron_http::{
    config::{ConnectionConfig, TronConfig},
    storage::CursorStore,
    transport::{Transport, TransportFailure, TransportRequest, TransportResponse},
    InMemoryCursorStore, Result,
};

/// Cursor store that counts every call before delegating to memory.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryCursorStore,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub advances: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn total_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
            + self.sets.load(Ordering::SeqCst)
            + self.advances.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.sets.load(Ordering::SeqCst) + self.advances.load(Ordering::SeqCst)
    }

    pub async fn seed(&self, key: &str, value: &str) {
        self.inner.set(key, value).await.unwrap();
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }
}

#[async_trait]
impl CursorStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn advance(&self, key: &str, modulus: usize) -> Result<usize> {
        self.advances.fetch_add(1, Ordering::SeqCst);
        self.inner.advance(key, modulus).await
    }
}

/// Store whose backend is always down.
pub struct UnavailableStore;

#[async_trait]
impl CursorStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(tron_http::AppError::store("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(tron_http::AppError::store("connection refused"))
    }

    async fn advance(&self, _key: &str, _modulus: usize) -> Result<usize> {
        Err(tron_http::AppError::store("connection refused"))
    }
}

/// Transport returning a fixed outcome and recording every request.
pub struct ScriptedTransport {
    outcome: std::result::Result<TransportResponse, TransportFailure>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn respond(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn fail(message: &str, code: Option<u16>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(TransportFailure {
                message: message.to_string(),
                code,
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn perform(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

/// Config with a single connection pointing every service at `host`.
pub fn single_connection_config(name: &str, host: &str, keys: &[&str]) -> TronConfig {
    let mut connection = ConnectionConfig::for_host(name, host);
    connection.api_keys = keys.iter().map(|k| k.to_string()).collect();
    TronConfig {
        default: name.to_string(),
        connections: [(name.to_string(), connection)].into_iter().collect(),
        redis_url: None,
        redis_key_prefix: None,
    }
}

/// Environment setup for tests
pub fn setup_test_env() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
