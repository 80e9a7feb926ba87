//! Integration tests for the mock server over real HTTP
//!
//! Each test starts a server in-process on an ephemeral port and drives it
//! with reqwest.

use mock_rest_server::config::{Config, StorageBackend, StorageConfig};
use mock_rest_server::store::create_mock_store;
use mock_rest_server::{serve, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use uuid::Uuid;

const MOCK_NOT_FOUND: &str = "Mock data not found for this endpoint";

struct TestServer {
    base: String,
    state: Arc<AppState>,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(Config::default()).await
    }

    async fn start_with(config: Config) -> Self {
        let store = create_mock_store(&config.storage).expect("Failed to create store");
        let state = Arc::new(AppState::new(store, &config));
        state.lifecycle.restore().await.expect("Failed to restore");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::clone(&state)));

        Self {
            base: format!("http://{addr}"),
            state,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn create(&self, mock: Value) -> Value {
        let response = self
            .client
            .post(self.url("/mocks"))
            .json(&mock)
            .send()
            .await
            .expect("Failed to create mock");

        assert_eq!(
            response.status(),
            StatusCode::CREATED,
            "create failed: {}",
            response.text().await.unwrap_or_default()
        );
        response.json().await.expect("Failed to parse created mock")
    }

    async fn call(&self, method: &str, path: &str, req_id: Option<&str>) -> reqwest::Response {
        let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap();
        let mut request = self.client.request(method, self.url(path));
        if let Some(id) = req_id {
            request = request.header("x-req-id", id);
        }
        request.send().await.expect("Request failed")
    }
}

async fn detail(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["detail"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_create_and_serve_orders() {
    let server = TestServer::start().await;
    let created = server
        .create(json!({"method": "POST", "path": "/orders", "statusCode": 201, "body": {"id": 1}}))
        .await;
    assert_eq!(created["method"], "POST");
    assert!(Uuid::parse_str(created["id"].as_str().unwrap()).is_ok());

    let response = server.call("POST", "/orders", None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    assert_eq!(response.json::<Value>().await.unwrap(), json!({"id": 1}));

    let unknown = Uuid::new_v4().to_string();
    let response = server.call("POST", "/orders", Some(&unknown)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(response).await, MOCK_NOT_FOUND);
}

#[tokio::test]
async fn test_latest_mock_wins_and_correlation_selects_older() {
    let server = TestServer::start().await;
    let first = server
        .create(json!({"method": "GET", "path": "/users", "statusCode": 200, "body": ["a"]}))
        .await;
    server
        .create(json!({"method": "GET", "path": "/users", "statusCode": 200, "body": ["a", "b"]}))
        .await;

    let response = server.call("GET", "/users", None).await;
    assert_eq!(response.json::<Value>().await.unwrap(), json!(["a", "b"]));

    let id = first["id"].as_str().unwrap();
    let response = server.call("GET", "/users", Some(id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!(["a"]));
}

#[tokio::test]
async fn test_correlation_errors() {
    let server = TestServer::start().await;
    let created = server
        .create(json!({"method": "GET", "path": "/a", "statusCode": 200}))
        .await;
    let id = created["id"].as_str().unwrap();

    let response = server.call("GET", "/a", Some("12345")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await, "Invalid UUID format: 12345");

    let response = server.call("DELETE", "/a", Some(id)).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        detail(response).await,
        "Method DELETE not allowed for this endpoint"
    );

    let response = server.call("GET", "/b", Some(id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(response).await, "Path /b not allowed for this endpoint");
}

#[tokio::test]
async fn test_paths_with_encoded_characters() {
    let server = TestServer::start().await;
    for (path, wire) in [
        ("/users/john doe", "/users/john%20doe"),
        ("/café", "/caf%C3%A9"),
        ("/a?b", "/a%3Fb"),
    ] {
        server
            .create(json!({"method": "GET", "path": path, "statusCode": 218, "body": path}))
            .await;

        let response = server.call("GET", wire, None).await;
        assert_eq!(response.status().as_u16(), 218, "GET {wire}");
        assert_eq!(response.json::<Value>().await.unwrap(), json!(path));
    }
}

#[tokio::test]
async fn test_mock_without_body_or_headers() {
    let server = TestServer::start().await;
    server
        .create(json!({"method": "DELETE", "path": "/orders/1", "statusCode": 204}))
        .await;

    let response = server.call("DELETE", "/orders/1", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get("content-type").is_none());
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_headers_and_delay() {
    let server = TestServer::start().await;
    server
        .create(json!({
            "method": "GET",
            "path": "/slow",
            "statusCode": 200,
            "headers": {"X-Mock": "yes"},
            "body": {"ok": true},
            "delayMillis": 100
        }))
        .await;

    let started = Instant::now();
    let response = server.call("GET", "/slow", None).await;
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(response.headers()["x-mock"], "yes");
    assert_eq!(response.json::<Value>().await.unwrap(), json!({"ok": true}));
}

#[tokio::test]
async fn test_delete_twice_and_stale_route() {
    let server = TestServer::start().await;
    let created = server
        .create(json!({"method": "GET", "path": "/temp", "statusCode": 200}))
        .await;
    let id = created["id"].as_str().unwrap();

    let response = server.call("DELETE", &format!("/mocks?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = server.call("DELETE", &format!("/mocks?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.call("GET", "/temp", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(response).await, MOCK_NOT_FOUND);
}

#[tokio::test]
async fn test_admin_endpoints() {
    let server = TestServer::start().await;

    let response = server.call("GET", "/", None).await;
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"message": "Hello World"})
    );

    let response = server.call("GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.call("GET", "/mocks", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(response).await, "No mocks found");

    let response = server.call("PUT", "/mocks", None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = server.call("GET", "/nowhere", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(response).await, "Not Found");

    let created = server
        .create(json!({"method": "GET", "path": "/x", "statusCode": 200}))
        .await;
    let id = created["id"].as_str().unwrap();

    let response = server.call("GET", &format!("/mocks?uuid={id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), created);

    let response = server.call("GET", "/mocks", None).await;
    assert_eq!(response.json::<Value>().await.unwrap(), json!([created]));
}

#[tokio::test]
async fn test_create_validation() {
    let server = TestServer::start().await;
    let response = server
        .client
        .post(server.url("/mocks"))
        .json(&json!({"method": "get", "path": "/a/", "statusCode": 200}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["method", "path"]);
    assert_eq!(server.state.registry.route_count(), 0);
}

#[tokio::test]
async fn test_concurrent_creates_share_one_route() {
    let server = TestServer::start().await;
    let requests = (0..20).map(|n| {
        server
            .client
            .post(server.url("/mocks"))
            .json(&json!({"method": "PUT", "path": "/race", "statusCode": 200, "body": n}))
            .send()
    });

    for response in futures::future::join_all(requests).await {
        assert_eq!(response.unwrap().status(), StatusCode::CREATED);
    }

    assert_eq!(server.state.registry.route_count(), 1);
    assert_eq!(server.state.registry.mock_count(), 20);
    let all: Vec<Value> = server.call("GET", "/mocks", None).await.json().await.unwrap();
    assert_eq!(all.len(), 20);
}

#[tokio::test]
async fn test_sqlite_mocks_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        storage: StorageConfig {
            backend: StorageBackend::Sqlite,
            path: dir.path().join("mocks.db"),
        },
        ..Config::default()
    };

    let id = {
        let server = TestServer::start_with(config.clone()).await;
        let created = server
            .create(json!({"method": "PATCH", "path": "/profile", "statusCode": 202, "body": "ok"}))
            .await;
        created["id"].as_str().unwrap().to_string()
    };

    let server = TestServer::start_with(config).await;
    let response = server.call("PATCH", "/profile", Some(&id)).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(response.json::<Value>().await.unwrap(), json!("ok"));
}
