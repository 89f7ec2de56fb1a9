use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::infrastructure::jwt::JwtService;
use crate::presentation::AppState;
use crate::server::build_router;

fn app() -> Router {
    let jwt = Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 3600));
    build_router(AppState::in_memory(jwt))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request must build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@x.com"),
            "password": "secret1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["token"]
        .as_str()
        .expect("token must be a string")
        .to_string()
}

async fn create_post(app: &Router, token: &str, slug: &str, published: bool) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/posts",
        Some(token),
        Some(json!({
            "title": format!("Post {slug}"),
            "content": "Body",
            "slug": slug,
            "published": published,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    body["id"].as_i64().expect("post id")
}

async fn comment(app: &Router, token: &str, post_id: i64, parent_id: Option<i64>) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/comments",
        Some(token),
        Some(json!({
            "content": "nice post",
            "postId": post_id,
            "parentId": parent_id,
        })),
    )
    .await
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_comment_scenario() {
    let app = app();
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@x.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@x.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"]["created_at"].is_string());
    let token = body["token"].as_str().expect("token").to_string();

    let post_id = create_post(&app, &token, "first-post", true).await;
    let (status, created) = comment(&app, &token, post_id, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["author"]["username"], "alice");

    let (status, thread) = send(
        &app,
        Method::GET,
        &format!("/api/comments/post/{post_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let thread = thread.as_array().expect("thread is an array");
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0]["content"], "nice post");
    assert_eq!(thread[0]["author"]["username"], "alice");
    assert_eq!(thread[0]["replies"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let app = app();
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"username": "alice", "email": "other@x.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let app = app();
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@x.com", "password": "wrong-one"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_credentials");
}

#[tokio::test]
async fn short_password_fails_validation() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"username": "alice", "email": "alice@x.com", "password": "12345"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    assert_eq!(body["fields"][0]["field"], "password");
}

#[tokio::test]
async fn draft_round_trip_is_visible_only_to_author() {
    let app = app();
    let token = register(&app, "alice").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(&token),
        Some(json!({"title": "Hello", "content": "World", "slug": "hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/posts/hello", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["content"], "World");
    assert_eq!(body["slug"], "hello");
    assert_eq!(body["published"], false);

    let (status, body) = send(&app, Method::GET, "/api/posts/hello", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = send(&app, Method::GET, "/api/posts/hello", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = send(&app, Method::GET, "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn listing_shows_published_posts_newest_first() {
    let app = app();
    let token = register(&app, "alice").await;
    create_post(&app, &token, "older", true).await;
    create_post(&app, &token, "draft", false).await;
    create_post(&app, &token, "newer", true).await;

    let (status, list) = send(&app, Method::GET, "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = list
        .as_array()
        .expect("list is an array")
        .iter()
        .filter_map(|post| post["slug"].as_str())
        .collect();
    assert_eq!(slugs, vec!["newer", "older"]);
    assert_eq!(list[0]["author"]["username"], "alice");
    assert!(list[0]["author"].get("bio").is_none());
}

#[tokio::test]
async fn concurrent_creates_with_same_slug_admit_one() {
    let app = app();
    let token = register(&app, "alice").await;
    let body = json!({"title": "Race", "content": "Body", "slug": "race"});

    let (first, second) = tokio::join!(
        send(&app, Method::POST, "/api/posts", Some(&token), Some(body.clone())),
        send(&app, Method::POST, "/api/posts", Some(&token), Some(body.clone())),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);
    let rejected = if first.0 == StatusCode::BAD_REQUEST {
        first.1
    } else {
        second.1
    };
    assert_eq!(rejected["code"], "conflict");
}

#[tokio::test]
async fn only_the_author_may_change_a_post() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post_id = create_post(&app, &alice, "alices-post", true).await;
    let uri = format!("/api/posts/{post_id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({"title": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");

    let (status, body) = send(&app, Method::DELETE, &uri, Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credential");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({"title": "Renamed", "excerpt": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["version"], 2);
}

#[tokio::test]
async fn update_reports_missing_and_foreign_posts_before_body_errors() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post_id = create_post(&app, &alice, "alices-post", true).await;
    let uri = format!("/api/posts/{post_id}");

    let (status, body) = send(&app, Method::PUT, &uri, Some(&bob), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({"title": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/posts/9999",
        Some(&alice),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, body) = send(&app, Method::PUT, &uri, Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn non_numeric_ids_get_a_json_error_body() {
    let app = app();
    let token = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/posts/abc",
        Some(&token),
        Some(json!({"title": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::DELETE, "/api/comments/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");

    let (status, body) = send(&app, Method::GET, "/api/comments/post/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn update_rejects_unknown_fields_and_stale_versions() {
    let app = app();
    let token = register(&app, "alice").await;
    let post_id = create_post(&app, &token, "versioned", true).await;
    let uri = format!("/api/posts/{post_id}");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({"author_id": 99})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({"content": "v2", "expected_version": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({"content": "late", "expected_version": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn slug_change_to_taken_slug_is_a_conflict() {
    let app = app();
    let token = register(&app, "alice").await;
    create_post(&app, &token, "taken", true).await;
    let post_id = create_post(&app, &token, "free", true).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/posts/{post_id}"),
        Some(&token),
        Some(json!({"slug": "taken"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn replies_are_one_level_deep_and_survive_parent_deletion() {
    let app = app();
    let token = register(&app, "alice").await;
    let post_id = create_post(&app, &token, "threaded", true).await;

    let (_, parent) = comment(&app, &token, post_id, None).await;
    let parent_id = parent["id"].as_i64().expect("comment id");
    let (status, reply) = comment(&app, &token, post_id, Some(parent_id)).await;
    assert_eq!(status, StatusCode::OK);
    let reply_id = reply["id"].as_i64().expect("reply id");

    let (status, body) = comment(&app, &token, post_id, Some(reply_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "parent_id");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/comments/{parent_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment removed");

    let (_, thread) = send(
        &app,
        Method::GET,
        &format!("/api/comments/post/{post_id}"),
        None,
        None,
    )
    .await;
    let thread = thread.as_array().expect("thread is an array");
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0]["id"].as_i64(), Some(reply_id));
    assert!(thread[0]["parent_id"].is_null());
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let app = app();
    let token = register(&app, "alice").await;

    let (status, body) = comment(&app, &token, 4242, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() {
    let app = app();
    let token = register(&app, "alice").await;
    let post_id = create_post(&app, &token, "short-lived", true).await;
    comment(&app, &token, post_id, None).await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/posts/{post_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post removed");

    let (status, thread) = send(
        &app,
        Method::GET,
        &format!("/api/comments/post/{post_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread.as_array().map(Vec::len), Some(0));

    let (status, _) = send(&app, Method::GET, "/api/posts/short-lived", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request must build");

    let response = app.oneshot(request).await.expect("router is infallible");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
