//! Integration tests for ch-analytics endpoints
//!
//! Each test builds throwaway annotation and datastore databases in a temp
//! directory, opens them read-only and drives the router with `oneshot`.
//!
//! Tests cover:
//! - Health endpoint (no auth required)
//! - Basic authentication
//! - Statistics page and JSON
//! - Actions/documents pagination and redirects
//! - Dataset export in every format, expert exclusion, invalid labels

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ch_analytics::{build_router, db, AppState};
use ch_common::api::auth::hash_password;
use ch_common::config::{Credential, DashboardConfig};
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const ANNOTATION_SCHEMA: &[&str] = &[
    "CREATE TABLE auth_user (id INTEGER PRIMARY KEY, username TEXT NOT NULL)",
    "CREATE TABLE api_project (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    "CREATE TABLE api_project_users (id INTEGER PRIMARY KEY, project_id INTEGER NOT NULL, user_id INTEGER NOT NULL)",
    "CREATE TABLE api_document (id INTEGER PRIMARY KEY, text TEXT NOT NULL, meta TEXT NOT NULL, project_id INTEGER NOT NULL)",
    "CREATE TABLE api_label (id INTEGER PRIMARY KEY, text TEXT NOT NULL)",
    "CREATE TABLE api_documentannotation (id INTEGER PRIMARY KEY, document_id INTEGER NOT NULL, user_id INTEGER NOT NULL, label_id INTEGER NOT NULL)",
    "INSERT INTO auth_user (id, username) VALUES (1, 'alice'), (2, 'bob'), (3, 'carol'), (4, 'expert')",
    "INSERT INTO api_project (id, name) VALUES (1, 'covid')",
    "INSERT INTO api_project_users (project_id, user_id) VALUES (1, 1), (1, 2), (1, 3)",
    r#"INSERT INTO api_document (id, text, meta, project_id) VALUES
        (1, 'Wash your hands', '{"id": 1001, "created_at": "2020-03-01"}', 1),
        (2, 'Lovely weather', '{"id": 1002, "created_at": "2020-03-02"}', 1),
        (3, 'Masks in short supply', '{"id": 1003, "created_at": "2020-03-03"}', 1),
        (4, 'Hospitals overloaded', '{"id": 1004, "created_at": "2020-03-04"}', 1),
        (5, 'Not yet annotated', '{"id": 1005, "created_at": "2020-03-05"}', 1)"#,
    "INSERT INTO api_label (id, text) VALUES (1, 'Risks'), (2, 'Prevention'), (3, 'Irrelevant'), (4, 'Negative Sentiment'), (5, 'Positive Sentiment')",
    // doc 1: Risks by majority; doc 2: Irrelevant; doc 3: two annotators;
    // doc 4: expert involved
    "INSERT INTO api_documentannotation (document_id, user_id, label_id) VALUES
        (1, 1, 1), (1, 1, 4), (1, 2, 1), (1, 3, 2),
        (2, 1, 3), (2, 2, 3), (2, 3, 1),
        (3, 1, 1), (3, 2, 1),
        (4, 1, 1), (4, 2, 1), (4, 4, 1)",
];

const DATASTORE_SCHEMA: &[&str] = &[
    "CREATE TABLE document_annotations (id INTEGER PRIMARY KEY, user TEXT NOT NULL, document_id INTEGER NOT NULL, action TEXT NOT NULL, timestamp TEXT NOT NULL)",
    "INSERT INTO document_annotations (user, document_id, action, timestamp) VALUES
        ('alice', 1, 'label-first', '2020-03-01T09:00:00'),
        ('bob', 1, 'label-second', '2020-03-01T10:00:00'),
        ('carol', 2, 'label-third', '2020-03-01T11:00:00')",
];

/// Test helper: create a SQLite file and run `statements`
async fn create_db(path: &Path, statements: &[&str]) {
    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true),
    )
    .await
    .expect("Should create test database");
    for statement in statements {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("Should run setup statement");
    }
    pool.close().await;
}

struct TestApp {
    _dir: TempDir,
    router: Router,
}

/// Test helper: build both databases and the router
async fn setup_app_with(
    extra_statements: &[&str],
    users: Vec<Credential>,
    expert: Option<&str>,
) -> TestApp {
    let dir = TempDir::new().unwrap();
    let annotations_path = dir.path().join("doccano.db");
    let datastore_path = dir.path().join("datastore.db");

    let mut statements: Vec<&str> = ANNOTATION_SCHEMA.to_vec();
    statements.extend_from_slice(extra_statements);
    create_db(&annotations_path, &statements).await;
    create_db(&datastore_path, DATASTORE_SCHEMA).await;

    let config = DashboardConfig {
        title: "CitizenHelper".to_string(),
        annotations_db: annotations_path.clone(),
        datastore_db: datastore_path.clone(),
        port: 0,
        page_size: 2,
        expert_username: expert.map(str::to_string),
        users,
    };

    let annotations = db::connect_readonly(&annotations_path).await.unwrap();
    let datastore = db::connect_readonly(&datastore_path).await.unwrap();
    let router = build_router(AppState::new(annotations, datastore, config));

    TestApp { _dir: dir, router }
}

/// Test helper: auth disabled, expert configured
async fn setup_app() -> TestApp {
    setup_app_with(&[], Vec::new(), Some("expert")).await
}

fn admin() -> Vec<Credential> {
    vec![Credential {
        username: "admin".to_string(),
        password_sha256: hash_password("password"),
    }]
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

/// Test helper: GET request without credentials
fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get_as(uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

async fn body_json(body: Body) -> Value {
    serde_json::from_str(&body_text(body).await).expect("Should parse JSON")
}

// =============================================================================
// Health and authentication
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = setup_app_with(&[], admin(), None).await;

    let response = app.router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ch-analytics");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_protected_route_requires_credentials() {
    let app = setup_app_with(&[], admin(), None).await;

    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .expect("401 carries a challenge")
        .to_str()
        .unwrap();
    assert!(challenge.starts_with("Basic realm="));
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let app = setup_app_with(&[], admin(), None).await;

    let response = app
        .router
        .oneshot(get_as("/export", &basic("admin", "guess")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid username or password"));
}

#[tokio::test]
async fn test_valid_credentials_accepted() {
    let app = setup_app_with(&[], admin(), None).await;

    let response = app
        .router
        .oneshot(get_as("/", &basic("admin", "password")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Statistics
// =============================================================================

#[tokio::test]
async fn test_statistics_page() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("<title>CitizenHelper - Home</title>"));
    assert!(html.contains("80.0%"), "4 of 5 documents annotated");
    assert!(html.contains("alice"));
}

#[tokio::test]
async fn test_statistics_json() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/api/statistics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["annotations"]["completed"], 4);
    assert_eq!(body["annotations"]["count"], 5);

    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 3, "expert is not a project member");
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[0]["completed"], 4);
    assert_eq!(users[0]["total"], 5);
    assert_eq!(users[2]["username"], "carol");
    assert_eq!(users[2]["completed"], 2);

    let agreement = body["agreement"].as_array().unwrap();
    let risks = agreement.iter().find(|a| a["label"] == "Risks").unwrap();
    // Risks used on docs 1, 2, 3, 4; majority on 1, 3, 4
    assert_eq!(risks["documents"], 4);
    assert_eq!(risks["agreed"], 3);
    assert!(body.get("agreement_error").is_none());
}

#[tokio::test]
async fn test_statistics_survive_unknown_label() {
    let app = setup_app_with(
        &[
            "INSERT INTO api_label (id, text) VALUES (6, 'Spam')",
            "INSERT INTO api_documentannotation (document_id, user_id, label_id) VALUES (5, 1, 6)",
        ],
        Vec::new(),
        None,
    )
    .await;

    let response = app.router.oneshot(get("/api/statistics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["annotations"]["completed"], 5);
    assert!(body["agreement_error"].as_str().unwrap().contains("Spam"));
}

// =============================================================================
// Browse pages
// =============================================================================

#[tokio::test]
async fn test_actions_redirect() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/actions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/actions/1");
}

#[tokio::test]
async fn test_actions_newest_first_paginated() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/actions/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("3 rows"));
    let third = html.find("label-third").expect("newest action shown");
    let second = html.find("label-second").expect("second newest shown");
    assert!(third < second);
    assert!(!html.contains("label-first"), "page size is 2");
    assert!(html.contains("<a href=\"/actions/3\">Next &raquo;</a>"));
}

#[tokio::test]
async fn test_actions_last_page() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/actions/3")).await.unwrap();
    let html = body_text(response.into_body()).await;
    assert!(html.contains("label-first"));
    assert!(!html.contains("Next &raquo;"));
    assert!(html.contains("&laquo; Prev"));
}

#[tokio::test]
async fn test_actions_offset_past_end_shows_last_row() {
    let app = setup_app().await;

    let response = app
        .router
        .oneshot(get("/actions/9223372036854775807"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("label-first"), "offset clamps to the last row");
    assert!(!html.contains("Next &raquo;"));
}

#[tokio::test]
async fn test_documents_page() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/documents/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("5 rows"));
    assert!(html.contains("Wash your hands"));
    assert!(html.contains("<th>meta</th>"));
}

#[tokio::test]
async fn test_documents_non_numeric_offset() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/documents/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_without_format_returns_instructions() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/export")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text = body_text(response.into_body()).await;
    assert!(text.contains("format=json"));
    assert!(text.contains("format=jsonl"));
    assert!(text.contains("format=csv"));
}

#[tokio::test]
async fn test_export_json_applies_policy() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/export?format=json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let summary = response
        .headers()
        .get("x-export-summary")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(summary.contains("exported 2 documents"));
    assert!(summary.contains("skipped 1"));
    assert!(summary.contains("excluded 1"));

    let body = body_json(response.into_body()).await;
    let decisions = body.as_array().unwrap();
    assert_eq!(decisions.len(), 2);

    assert_eq!(decisions[0]["tweet_id"], "1001");
    assert_eq!(decisions[0]["labels"], serde_json::json!(["Risks"]));
    assert_eq!(decisions[0]["votes"]["Risks"], 2);
    assert_eq!(decisions[0]["votes"]["Negative Sentiment"], 1);
    assert_eq!(decisions[0]["text"], "Wash your hands");
    assert_eq!(decisions[0]["annotations"]["alice"]["Negative Sentiment"], true);

    assert_eq!(decisions[1]["tweet_id"], "1002");
    assert_eq!(decisions[1]["labels"], serde_json::json!(["Irrelevant"]));
}

#[tokio::test]
async fn test_export_expert_override_per_request() {
    let app = setup_app().await;

    let response = app
        .router
        .oneshot(get("/export?format=json&expert=nobody"))
        .await
        .unwrap();
    let body = body_json(response.into_body()).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["tweet_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1001", "1002", "1004"]);
}

#[tokio::test]
async fn test_export_jsonl_one_line_per_decision() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/export?format=jsonl")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text = body_text(response.into_body()).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let value: Value = serde_json::from_str(line).unwrap();
        assert!(value["labels"].is_array());
    }
}

#[tokio::test]
async fn test_export_csv() {
    let app = setup_app().await;

    let response = app.router.oneshot(get("/export?format=csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("dataset.csv"));

    let text = body_text(response.into_body()).await;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("tweet_id,labels,votes,annotations,text"));
    assert!(lines.next().unwrap().starts_with("1001,Risks,"));
}

#[tokio::test]
async fn test_export_invalid_label_fails_whole_pass() {
    let app = setup_app_with(
        &[
            "INSERT INTO api_label (id, text) VALUES (6, 'Spam')",
            "INSERT INTO api_documentannotation (document_id, user_id, label_id) VALUES (5, 1, 6)",
        ],
        Vec::new(),
        None,
    )
    .await;

    let response = app.router.oneshot(get("/export?format=json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("'Spam'"));
}
