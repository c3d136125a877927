//! Integration tests for the Router service

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use lapse_janitor::{ChannelNotifier, ExpirySettings, Janitor, DEFAULT_REPLACEMENT_TEXT};
use lapse_router::{
    config::RouterConfig,
    handlers::{create_router, AppState, HealthCheckResponse, TtlResponse},
    start_expiry,
};
use lapse_store::SqliteStore;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tower::ServiceExt; // for oneshot

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Helper to create test application state over an in-memory store
fn create_test_state(store: Arc<SqliteStore>) -> AppState {
    let config = ExpirySettings {
        delay: Some(3600),
        loop_enabled: false,
        delete_at_start: false,
        ..Default::default()
    }
    .validate()
    .unwrap();

    let janitor = Janitor::new(store, config, Arc::new(ChannelNotifier::new(16)));
    AppState::enabled(janitor.status_query(), Arc::clone(janitor.metrics()))
}

async fn get_ttl(state: AppState, document_id: &str) -> (StatusCode, Option<String>, TtlResponse) {
    let app = create_router(state);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/ttl/{}", document_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let cors = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .map(|v| v.to_str().unwrap().to_string());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let ttl: TtlResponse = serde_json::from_slice(&body).unwrap();

    (status, cors, ttl)
}

#[tokio::test]
async fn test_ttl_for_active_document() {
    let store = Arc::new(SqliteStore::new(":memory:").unwrap());
    store.record_edit("notes", "hello", now_ms() - 1_800_000).unwrap();

    let (status, cors, body) = get_ttl(create_test_state(store), "notes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cors.as_deref(), Some("*"));
    let ttl = body.ttl.unwrap();
    assert!((1790..=1800).contains(&ttl), "unexpected ttl {}", ttl);
    assert_eq!(body.msg, None);
}

#[tokio::test]
async fn test_ttl_for_expired_document_is_negative() {
    let store = Arc::new(SqliteStore::new(":memory:").unwrap());
    store.record_edit("old", "hello", now_ms() - 7_200_000).unwrap();

    let (status, _, body) = get_ttl(create_test_state(store), "old").await;

    assert_eq!(status, StatusCode::OK);
    let ttl = body.ttl.unwrap();
    assert!((-3610..=-3600).contains(&ttl), "unexpected ttl {}", ttl);
}

#[tokio::test]
async fn test_ttl_for_missing_document() {
    let store = Arc::new(SqliteStore::new(":memory:").unwrap());

    let (status, cors, body) = get_ttl(create_test_state(store), "ghost").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cors.as_deref(), Some("*"));
    assert_eq!(body.ttl, None);
    assert_eq!(body.msg.as_deref(), Some("Empty document"));
}

#[tokio::test]
async fn test_ttl_for_new_document() {
    let store = Arc::new(SqliteStore::new(":memory:").unwrap());
    {
        use lapse_domain::traits::DocumentStore;
        store.get_document("blank", Some("")).unwrap();
    }

    let (status, _, body) = get_ttl(create_test_state(store), "blank").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.ttl, None);
    assert_eq!(body.msg.as_deref(), Some("New or empty document"));
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let store = Arc::new(SqliteStore::new(":memory:").unwrap());
    let app = create_router(create_test_state(store));

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: HealthCheckResponse = serde_json::from_slice(&body).unwrap();

    assert_eq!(health.status, "enabled");
    assert_eq!(health.metrics.unwrap().passes, 0);
}

#[tokio::test]
async fn test_startup_sweep_expires_and_reports() {
    let store = Arc::new(SqliteStore::new(":memory:").unwrap());
    store.record_edit("old", "secret", now_ms() - 7_200_000).unwrap();
    store.record_edit("recent", "draft", now_ms() - 60_000).unwrap();

    let config = RouterConfig::from_toml(
        r#"
        [delete_after_delay]
        delay = 3600
        loop = false
        deleteAtStart = true
        "#,
    )
    .unwrap();

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let state = start_expiry(Arc::clone(&store), &config, shutdown_rx);

    // Deletion runs in the background; poll until the placeholder appears
    let mut replaced = false;
    for _ in 0..100 {
        if store.content("old").unwrap().as_deref() == Some(DEFAULT_REPLACEMENT_TEXT) {
            replaced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(replaced, "expired document should be replaced");
    assert_eq!(store.content("recent").unwrap().as_deref(), Some("draft"));

    let (_, _, body) = get_ttl(state, "old").await;
    assert_eq!(body.msg.as_deref(), Some("New or empty document"));
}

#[tokio::test]
async fn test_disabled_expiry_returns_unavailable() {
    let config = RouterConfig::from_toml("[delete_after_delay]\ndelay = 0").unwrap();
    let store = Arc::new(SqliteStore::new(":memory:").unwrap());
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let app = create_router(start_expiry(store, &config, shutdown_rx));

    let request = Request::builder()
        .uri("/ttl/anything")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_file_backed_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lapse.toml");
    std::fs::write(
        &path,
        "bind_port = 9400\ndatabase_path = \"docs.db\"\n\n[delete_after_delay]\ndelay = 120\n",
    )
    .unwrap();

    let config = RouterConfig::from_file(&path).unwrap();
    assert_eq!(config.bind_port, 9400);
    assert_eq!(config.expiry().unwrap().delay_secs(), 120);
}
