use axum::http::StatusCode;
use agencyops::api;
use agencyops::config::Config;
use agencyops::db::init_db;
use agencyops::Repository;
use serde_json::{json, Value};
use std::net::IpAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup_test_app() -> (axum::Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        bind_addr: IpAddr::from([127, 0, 0, 1]),
        database_path: db_path,
        admin: None,
        seed_fixtures: false,
    };

    (
        api::create_router(api::AppState::new(repo, config)),
        temp_dir,
    )
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_credentials_never_expose_secret() {
    let (app, _temp) = setup_test_app().await;
    let secret = "sk_live_51Habcdefgh7890";

    let (status, created) = send(
        app.clone(),
        "POST",
        "/api/credentials",
        Some(json!({"name": "Stripe", "provider": "stripe", "secret": secret})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["hint"], "••••7890");
    assert_eq!(created["fingerprint"].as_str().unwrap().len(), 16);
    assert!(created.get("secret").is_none());

    let (status, listed) = send(app, "GET", "/api/credentials", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0], created);
    assert!(!listed.to_string().contains(secret));
}

#[tokio::test]
async fn test_credential_requires_secret() {
    let (app, _temp) = setup_test_app().await;

    let (status, body) = send(
        app,
        "POST",
        "/api/credentials",
        Some(json!({"name": "Stripe", "provider": "stripe", "secret": "  "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: secret");
}

#[tokio::test]
async fn test_create_automation_linked_to_workflow() {
    let (app, _temp) = setup_test_app().await;

    let (_, workflow) = send(
        app.clone(),
        "POST",
        "/api/workflows",
        Some(json!({"name": "Reminders"})),
    )
    .await;
    let workflow_id = workflow["workflow"]["id"].as_str().unwrap();

    let (status, created) = send(
        app.clone(),
        "POST",
        "/api/automations",
        Some(json!({
            "name": "Overdue reminder",
            "trigger": "invoice.overdue",
            "workflowId": workflow_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["enabled"], false);
    assert_eq!(created["trigger"], "invoice.overdue");

    let (_, listed) = send(app.clone(), "GET", "/api/automations", None).await;
    assert_eq!(listed[0]["workflowId"], workflow_id);

    let (status, body) = send(
        app,
        "POST",
        "/api/automations",
        Some(json!({"name": "Orphan", "trigger": "x", "workflowId": "ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("FOREIGN KEY"), "{body}");
}
