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

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
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

    let app = api::create_router(api::AppState::new(repo.clone(), config));
    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
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
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_create_and_fetch_client() {
    let t = setup_test_app().await;

    let (status, created) = send(
        t.app.clone(),
        "POST",
        "/api/clients",
        Some(json!({
            "name": "  Northwind Films ",
            "email": "producer@northwind.example",
            "status": "lead"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Northwind Films");
    assert_eq!(created["status"], "lead");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(t.app.clone(), "GET", &format!("/api/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, listed) = send(t.app, "GET", "/api/clients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_clients_listed_newest_first() {
    let t = setup_test_app().await;

    for name in ["First", "Second"] {
        let (status, _) = send(
            t.app.clone(),
            "POST",
            "/api/clients",
            Some(json!({"name": name})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (_, listed) = send(t.app, "GET", "/api/clients", None).await;
    assert_eq!(listed[0]["name"], "Second");
    assert_eq!(listed[1]["name"], "First");
}

#[tokio::test]
async fn test_unknown_client_is_404() {
    let t = setup_test_app().await;

    let (status, body) = send(t.app, "GET", "/api/clients/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_missing_name_is_400() {
    let t = setup_test_app().await;

    let (status, body) = send(
        t.app.clone(),
        "POST",
        "/api/clients",
        Some(json!({"email": "a@b.example"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (status, body) = send(
        t.app,
        "POST",
        "/api/clients",
        Some(json!({"name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: name");
}

#[tokio::test]
async fn test_invalid_status_is_400() {
    let t = setup_test_app().await;

    let (status, _) = send(
        t.app,
        "POST",
        "/api/clients",
        Some(json!({"name": "Acme", "status": "prospect"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_read_failure_returns_empty_list() {
    let t = setup_test_app().await;
    let (status, _) = send(
        t.app.clone(),
        "POST",
        "/api/proposals",
        Some(json!({"title": "Promo", "amount": 1200})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    sqlx::query("DROP TABLE proposals")
        .execute(t.repo.pool())
        .await
        .unwrap();

    let (status, body) = send(t.app, "GET", "/api/proposals", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_write_failure_returns_raw_message() {
    let t = setup_test_app().await;
    sqlx::query("DROP TABLE proposals")
        .execute(t.repo.pool())
        .await
        .unwrap();

    let (status, body) = send(
        t.app,
        "POST",
        "/api/proposals",
        Some(json!({"title": "Promo", "amount": 1200})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"].as_str().unwrap().contains("no such table"),
        "{body}"
    );
}

#[tokio::test]
async fn test_unknown_client_reference_is_400() {
    let t = setup_test_app().await;

    let (status, body) = send(
        t.app,
        "POST",
        "/api/proposals",
        Some(json!({"title": "Promo", "amount": 1200, "clientId": "ghost"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("FOREIGN KEY"), "{body}");
}
