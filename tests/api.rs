use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use toolkithub::config::Config;
use toolkithub::handlers;
use toolkithub::services::AuthService;
use toolkithub::store::Store;
use toolkithub::types::AppState;

fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Arc::new(Config::new());
    let store = Arc::new(Store::open(dir.path().join("data")).expect("store"));
    AuthService::new(store.clone(), &config)
        .ensure_bootstrap_admin(&config.bootstrap_admin_email, &config.bootstrap_admin_password)
        .expect("bootstrap admin");
    let app = handlers::router(AppState { store, config });
    (dir, app)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).expect("request")
}

fn authed(method: &str, path: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(value) => builder.body(Body::from(value.to_string())).expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn login(app: &Router) -> String {
    let config = Config::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": config.bootstrap_admin_email,
                "password": config.bootstrap_admin_password,
            })
            .to_string(),
        ))
        .expect("request");
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

async fn create_category(app: &Router, token: &str, name: &str) -> Value {
    let (status, body) = send(
        app,
        authed("POST", "/api/admin/categories", token, Some(json!({ "name": name }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "category create failed: {body}");
    body
}

async fn create_article(app: &Router, token: &str, payload: Value) -> (StatusCode, Value) {
    send(app, authed("POST", "/api/admin/articles", token, Some(payload))).await
}

#[tokio::test]
async fn admin_endpoints_require_a_token() {
    let (_dir, app) = test_app();

    let (status, _) = send(&app, get("/api/admin/dashboard")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        authed("POST", "/api/admin/categories", "bogus-token", Some(json!({ "name": "X" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let (_dir, app) = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "admin@toolkithub.local", "password": "wrong" }).to_string(),
        ))
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_verify_returns_the_principal() {
    let (_dir, app) = test_app();
    let token = login(&app).await;

    let (status, body) = send(&app, authed("GET", "/api/admin/verify", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "admin@toolkithub.local");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn publish_browse_and_view_count_flow() {
    let (_dir, app) = test_app();
    let token = login(&app).await;
    create_category(&app, &token, "Dev Tools").await;

    let (status, created) = create_article(
        &app,
        &token,
        json!({
            "title": "X",
            "slug": "X",
            "excerpt": "say hi to readers",
            "content": "<p>hi</p><script>alert(1)</script>",
            "category": "Dev Tools",
            "status": "published",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    assert_eq!(created["slug"], "x", "slug is stored lowercase");
    assert_eq!(created["content"], "<p>hi</p>", "content is sanitized on write");
    assert!(created["published_at"].is_string(), "publish time is stamped");
    assert_eq!(created["category"]["name"], "Dev Tools");

    // public list sees it, without the content field
    let (status, listed) = send(&app, get("/api/articles")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["pagination"]["total"], 1);
    assert_eq!(listed["articles"][0]["slug"], "x");
    assert!(listed["articles"][0].get("content").is_none());

    // search matches the excerpt substring
    let (_, searched) = send(&app, get("/api/articles?search=hi&limit=10")).await;
    assert_eq!(searched["pagination"]["total"], 1);

    // each public fetch increments the view counter by exactly one
    let (status, first) = send(&app, get("/api/articles/x")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["views"], 1);
    let (_, second) = send(&app, get("/api/articles/x")).await;
    assert_eq!(second["views"], 2);

    let (status, _) = send(&app, get("/api/articles/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn draft_articles_stay_private() {
    let (_dir, app) = test_app();
    let token = login(&app).await;
    create_category(&app, &token, "Guides").await;

    let (status, created) = create_article(
        &app,
        &token,
        json!({
            "title": "Hidden",
            "slug": "hidden",
            "excerpt": "e",
            "content": "<p>draft</p>",
            "category": "Guides",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["published_at"].is_null());

    let (_, listed) = send(&app, get("/api/articles")).await;
    assert_eq!(listed["pagination"]["total"], 0);

    let (status, _) = send(&app, get("/api/articles/hidden")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the admin list still sees it
    let (_, admin_listed) =
        send(&app, authed("GET", "/api/admin/articles", &token, None)).await;
    assert_eq!(admin_listed["pagination"]["total"], 1);
}

#[tokio::test]
async fn validation_errors_name_the_constraint() {
    let (_dir, app) = test_app();
    let token = login(&app).await;
    create_category(&app, &token, "Dev Tools").await;

    let (status, body) = create_article(
        &app,
        &token,
        json!({
            "title": "X",
            "slug": "x",
            "excerpt": "",
            "content": "<p>hi</p>",
            "category": "Dev Tools",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("excerpt"));

    let (status, body) = create_article(
        &app,
        &token,
        json!({
            "title": "X",
            "slug": "x",
            "excerpt": "e",
            "content": "<p>hi</p>",
            "category": "Nope",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Nope"));
}

#[tokio::test]
async fn duplicate_slug_is_rejected_case_insensitively() {
    let (_dir, app) = test_app();
    let token = login(&app).await;
    create_category(&app, &token, "Dev Tools").await;

    let payload = json!({
        "title": "X",
        "slug": "taken",
        "excerpt": "e",
        "content": "<p>hi</p>",
        "category": "Dev Tools",
    });
    let (status, _) = create_article(&app, &token, payload).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create_article(
        &app,
        &token,
        json!({
            "title": "Y",
            "slug": "TAKEN",
            "excerpt": "e",
            "content": "<p>hi</p>",
            "category": "Dev Tools",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("taken"));
}

#[tokio::test]
async fn category_delete_is_blocked_while_referenced() {
    let (_dir, app) = test_app();
    let token = login(&app).await;
    let category = create_category(&app, &token, "Dev Tools").await;
    let category_id = category["id"].as_str().expect("id").to_string();

    let (status, created) = create_article(
        &app,
        &token,
        json!({
            "title": "X",
            "slug": "x",
            "excerpt": "e",
            "content": "<p>hi</p>",
            "category": "Dev Tools",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        authed("DELETE", &format!("/api/admin/categories/{category_id}"), &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains('1'), "error names the blocking count: {message}");

    // removing the article unblocks the delete
    let article_id = created["id"].as_str().expect("id").to_string();
    let (status, _) = send(
        &app,
        authed("DELETE", &format!("/api/admin/articles/{article_id}"), &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        authed("DELETE", &format!("/api/admin/categories/{category_id}"), &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn featured_toggle_is_a_partial_update() {
    let (_dir, app) = test_app();
    let token = login(&app).await;
    create_category(&app, &token, "Dev Tools").await;

    let (_, created) = create_article(
        &app,
        &token,
        json!({
            "title": "X",
            "slug": "x",
            "excerpt": "keep me",
            "content": "<p>keep me too</p>",
            "category": "Dev Tools",
            "status": "published",
        }),
    )
    .await;
    let article_id = created["id"].as_str().expect("id").to_string();

    let (status, _) = send(
        &app,
        authed(
            "PATCH",
            &format!("/api/admin/articles/{article_id}/featured"),
            &token,
            Some(json!({ "featured": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // the toggle did not clobber any other field
    let (_, detail) = send(
        &app,
        authed("GET", &format!("/api/admin/articles/{article_id}"), &token, None),
    )
    .await;
    assert_eq!(detail["featured"], true);
    assert_eq!(detail["excerpt"], "keep me");
    assert_eq!(detail["content"], "<p>keep me too</p>");

    // and the public featured filter now matches
    let (_, listed) = send(&app, get("/api/articles?featured=true")).await;
    assert_eq!(listed["pagination"]["total"], 1);
}

#[tokio::test]
async fn public_category_listing_is_active_only() {
    let (_dir, app) = test_app();
    let token = login(&app).await;
    create_category(&app, &token, "Visible").await;

    let (status, _) = send(
        &app,
        authed(
            "POST",
            "/api/admin/categories",
            &token,
            Some(json!({ "name": "Hidden", "is_active": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, listed) = send(&app, get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Visible"]);
}

#[tokio::test]
async fn dashboard_reports_aggregates() {
    let (_dir, app) = test_app();
    let token = login(&app).await;
    create_category(&app, &token, "Dev Tools").await;

    for (slug, status_value) in [("a", "published"), ("b", "published"), ("c", "draft")] {
        let (status, _) = create_article(
            &app,
            &token,
            json!({
                "title": slug,
                "slug": slug,
                "excerpt": "e",
                "content": "<p>hi</p>",
                "category": "Dev Tools",
                "status": status_value,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // two public reads of one article
    send(&app, get("/api/articles/a")).await;
    send(&app, get("/api/articles/a")).await;

    let (status, body) = send(&app, authed("GET", "/api/admin/dashboard", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_articles"], 3);
    assert_eq!(body["published_articles"], 2);
    assert_eq!(body["draft_articles"], 1);
    assert_eq!(body["total_categories"], 1);
    assert_eq!(body["total_views"], 2);
    assert_eq!(body["recent_articles"].as_array().unwrap().len(), 3);
    assert_eq!(body["categories"][0]["article_count"], 3);
}
