// tests/manager_tests.rs

mod common;

use common::{single_connection_config, CountingStore, ScriptedTransport};
use secrecy::Secret;
use serde_json::Map;
use std::collections::BTreeMap;
use std::sync::Arc;
use tron_http::{
    config::{AuthConfig, Endpoints},
    manager::API_KEY_HEADER,
    AppError, ConnectionManager, ConnectionOverrides, Endpoint, InMemoryCursorStore,
};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn manager_with(
    config: tron_http::TronConfig,
    transport: Arc<ScriptedTransport>,
) -> ConnectionManager {
    ConnectionManager::new(config, Arc::new(InMemoryCursorStore::new()), transport)
}

#[tokio::test]
async fn test_each_connection_carries_next_key() {
    let transport = ScriptedTransport::respond(200, "{}");
    let manager = manager_with(
        single_connection_config("mainnet", "https://api.trongrid.io", &["a", "b", "c"]),
        transport.clone(),
    );

    let mut seen = Vec::new();
    for _ in 0..4 {
        let conn = manager.default_connection().await.unwrap();
        seen.push(conn.api_key.clone().unwrap());
        conn.full_node().get("/wallet/getnowblock", Map::new()).await.unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.headers.get(API_KEY_HEADER), conn.api_key.as_ref());
    }
    assert_eq!(seen, vec!["a", "b", "c", "a"]);
}

#[tokio::test]
async fn test_all_services_share_one_key() {
    let transport = ScriptedTransport::respond(200, "{}");
    let manager = manager_with(
        single_connection_config("mainnet", "https://api.trongrid.io", &["a", "b"]),
        transport.clone(),
    );

    let conn = manager.default_connection().await.unwrap();
    for endpoint in [Endpoint::FullNode, Endpoint::SolidityNode, Endpoint::EventServer] {
        let headers = conn.dispatcher(endpoint).headers();
        assert_eq!(headers.get(API_KEY_HEADER).map(String::as_str), Some("a"));
    }
}

#[tokio::test]
async fn test_no_key_omits_header() {
    let transport = ScriptedTransport::respond(200, "{}");
    let manager = manager_with(
        single_connection_config("nile", "https://nile.trongrid.io", &[]),
        transport.clone(),
    );

    let conn = manager.make(Some("nile"), ConnectionOverrides::default()).await.unwrap();
    assert_eq!(conn.api_key, None);
    conn.full_node().get("/", Map::new()).await.unwrap();
    assert!(!transport.last_request().unwrap().headers.contains_key(API_KEY_HEADER));
}

#[tokio::test]
async fn test_override_key_skips_rotation() {
    let store = CountingStore::new();
    let transport = ScriptedTransport::respond(200, "{}");
    let manager = ConnectionManager::new(
        single_connection_config("mainnet", "https://api.trongrid.io", &["a", "b"]),
        store.clone(),
        transport,
    );

    let conn = manager
        .make(None, ConnectionOverrides::with_api_key("HARDCODED"))
        .await
        .unwrap();
    assert_eq!(conn.api_key.as_deref(), Some("HARDCODED"));
    assert_eq!(
        conn.full_node().headers().get(API_KEY_HEADER).map(String::as_str),
        Some("HARDCODED")
    );
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_overrides_take_precedence_over_config() {
    let transport = ScriptedTransport::respond(200, "{}");
    let mut config = single_connection_config("mainnet", "https://api.trongrid.io", &["a"]);
    let connection = config.connections.get_mut("mainnet").unwrap();
    connection.headers.insert("X-Configured".into(), "yes".into());
    connection.timeout_ms = 10_000;
    let manager = manager_with(config, transport);

    let mut headers = BTreeMap::new();
    headers.insert("X-Override".to_string(), "1".to_string());
    let mut endpoints = Endpoints::uniform("http://127.0.0.1:8090");
    endpoints.status_page = "/wallet/getnowblock".into();
    let overrides = ConnectionOverrides {
        network: Some("private".into()),
        endpoints: Some(endpoints),
        timeout_ms: Some(250),
        headers: Some(headers),
        auth: Some(AuthConfig {
            basic: None,
            bearer: Some(Secret::new("tok".to_string())),
        }),
        api_key: None,
    };

    let conn = manager.make(None, overrides).await.unwrap();
    let full_node = conn.full_node();
    assert_eq!(conn.network, "private");
    assert_eq!(full_node.host(), "http://127.0.0.1:8090");
    assert_eq!(full_node.status_path(), "/wallet/getnowblock");
    assert_eq!(full_node.timeout().as_millis(), 250);
    assert!(!full_node.headers().contains_key("X-Configured"));
    assert_eq!(full_node.headers().get("X-Override").map(String::as_str), Some("1"));
    assert_eq!(full_node.headers().get(API_KEY_HEADER).map(String::as_str), Some("a"));
    assert_eq!(
        full_node.headers().get("Authorization").map(String::as_str),
        Some("Bearer tok")
    );
}

#[tokio::test]
async fn test_unknown_connection_is_configuration_error() {
    let manager = manager_with(
        single_connection_config("mainnet", "https://api.trongrid.io", &[]),
        ScriptedTransport::respond(200, "{}"),
    );

    let err = manager
        .make(Some("devnet"), ConnectionOverrides::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppError::UnknownConnection { ref name } if name == "devnet"));
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_next_key_uses_connection_keys() {
    let manager = manager_with(
        single_connection_config("shasta", "https://api.shasta.trongrid.io", &["x", "y"]),
        ScriptedTransport::respond(200, "{}"),
    );

    assert_eq!(manager.next_key(None, None).await.unwrap().as_deref(), Some("x"));
    assert_eq!(manager.next_key(Some("shasta"), None).await.unwrap().as_deref(), Some("y"));
    assert_eq!(
        manager.next_key(None, Some("fixed")).await.unwrap().as_deref(),
        Some("fixed")
    );
    assert_eq!(manager.next_key(None, None).await.unwrap().as_deref(), Some("x"));
}

#[tokio::test]
async fn test_check_connections_against_live_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(API_KEY_HEADER, "live-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"blockID":"0000abc"}"#))
        .expect(3)
        .mount(&server)
        .await;

    let config = single_connection_config("mainnet", &server.uri(), &["live-key"]);
    let manager = ConnectionManager::from_config(config).unwrap();
    let conn = manager.default_connection().await.unwrap();

    let status = conn.check_connections().await;
    assert!(status.all_connected());
}

#[tokio::test]
async fn test_rotation_reaches_the_wire() {
    let server = MockServer::start().await;
    Mock::given(path("/wallet/getnowblock"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"blockID":"1"}"#))
        .mount(&server)
        .await;

    let config = single_connection_config("mainnet", &server.uri(), &["k1", "k2"]);
    let manager = ConnectionManager::from_config(config).unwrap();
    for _ in 0..4 {
        let conn = manager.default_connection().await.unwrap();
        conn.full_node().post("/wallet/getnowblock", Map::new()).await.unwrap();
    }

    let received = server.received_requests().await.unwrap();
    let keys: Vec<String> = received
        .iter()
        .map(|r| {
            r.headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        })
        .collect();
    assert_eq!(keys, vec!["k1", "k2", "k1", "k2"]);
}
