use super::*;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use crate::storage::TodoStore;

struct TestApp {
    app: Router,
    _static_dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    test_app_with(TodoStore::open_in_memory().unwrap())
}

fn test_app_with(store: TodoStore) -> TestApp {
    let static_dir = tempfile::tempdir().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>todos</h1>").unwrap();
    std::fs::write(static_dir.path().join("main.js"), "console.log(1);").unwrap();
    std::fs::write(static_dir.path().join("secret.txt"), "s3cret").unwrap();

    let state = Arc::new(AppState {
        store: SharedStore::new(store),
        static_dir: static_dir.path().to_path_buf(),
    });
    TestApp { app: router(state), _static_dir: static_dir }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn json(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create(&self, text: &str) -> Value {
        let body = json!({ "text": text }).to_string();
        let (status, item) = self.json(Method::POST, "/items", Some(&body)).await;
        assert_eq!(status, StatusCode::CREATED);
        item
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = app.json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn test_create_then_list() {
    let app = test_app();

    let created = app.create("buy milk").await;
    assert_eq!(created["text"], "buy milk");
    assert_eq!(created["done"], false);
    assert!(created["id"].as_i64().unwrap() > 0);

    let (status, list) = app.json(Method::GET, "/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created]));
}

#[tokio::test]
async fn test_list_empty() {
    let app = test_app();
    let (status, list) = app.json(Method::GET, "/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_without_content_type() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/items")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"text":"plain"}"#))
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_rejects_bad_bodies() {
    let app = test_app();

    let cases = [
        ("not json", "invalid json"),
        ("", "invalid json"),
        (r#"{"title":"x"}"#, "missing text"),
        (r#"{"text":5}"#, "missing text"),
        (r#"{"text":null}"#, "missing text"),
    ];
    for (body, message) in cases {
        let (status, err) = app.json(Method::POST, "/items", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body:?}");
        assert_eq!(err, json!({"error": message}));
    }

    let (_, list) = app.json(Method::GET, "/items", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_query_bounds() {
    let app = test_app();
    let mut ids = Vec::new();
    for text in ["a", "b", "c"] {
        ids.push(app.create(text).await["id"].clone());
    }

    let (_, list) = app.json(Method::GET, "/items?limit=2", None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (_, list) = app.json(Method::GET, "/items?limit=abc&offset=-4", None).await;
    assert_eq!(list.as_array().unwrap().len(), 3);

    let (_, list) = app.json(Method::GET, "/items?limit=0", None).await;
    assert_eq!(list.as_array().unwrap().len(), 3);

    let (_, list) = app.json(Method::GET, "/items?limit=1&offset=1", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], ids[1]);
}

#[tokio::test]
async fn test_update_done_only() {
    let app = test_app();
    let created = app.create("walk dog").await;
    let uri = format!("/items/{}", created["id"]);

    let (status, updated) = app.json(Method::PUT, &uri, Some(r#"{"done":true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["text"], "walk dog");
    assert_eq!(updated["done"], true);
    assert_eq!(updated["id"], created["id"]);
}

#[tokio::test]
async fn test_update_text_and_trailing_slash() {
    let app = test_app();
    let created = app.create("draft").await;
    let uri = format!("/items/{}/", created["id"]);

    let (status, updated) = app.json(Method::PUT, &uri, Some(r#"{"text":"final","done":"yes"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["text"], "final");
    assert_eq!(updated["done"], false);
}

#[tokio::test]
async fn test_update_empty_patch_returns_item() {
    let app = test_app();
    let created = app.create("same").await;
    let uri = format!("/items/{}", created["id"]);

    let (status, item) = app.json(Method::PUT, &uri, Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item, created);
}

#[tokio::test]
async fn test_update_missing_item() {
    let app = test_app();
    let (status, err) = app.json(Method::PUT, "/items/42", Some(r#"{"done":true}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err, json!({"error": "not found or update failed"}));

    let (_, list) = app.json(Method::GET, "/items", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_update_rejects_bad_input() {
    let app = test_app();
    app.create("x").await;

    for uri in ["/items/abc", "/items/0", "/items/-1", "/items/1a"] {
        let (status, err) = app.json(Method::PUT, uri, Some(r#"{"done":true}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(err, json!({"error": "invalid id"}));
    }

    let (status, err) = app.json(Method::PUT, "/items/1", Some("{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err, json!({"error": "invalid json"}));
}

#[tokio::test]
async fn test_delete_twice() {
    let app = test_app();
    let keep = app.create("keep").await;
    let gone = app.create("gone").await;
    let uri = format!("/items/{}", gone["id"]);

    for _ in 0..2 {
        let (status, body) = app.json(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "deleted"}));
    }

    let (_, list) = app.json(Method::GET, "/items", None).await;
    assert_eq!(list, json!([keep]));
}

#[tokio::test]
async fn test_undecodable_id_is_json_error() {
    let app = test_app();
    app.create("x").await;

    let (status, err) = app.json(Method::PUT, "/items/%FF", Some(r#"{"done":true}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err, json!({"error": "invalid id"}));

    let (status, err) = app.json(Method::DELETE, "/api/todos/%FF", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err, json!({"error": "invalid id"}));
}

#[tokio::test]
async fn test_wrong_method_is_json_error() {
    let app = test_app();

    for (method, uri) in [(Method::GET, "/items/1"), (Method::PATCH, "/items"), (Method::POST, "/health")] {
        let (status, err) = app.json(method, uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert_eq!(err, json!({"error": "method not allowed"}));
    }
}

#[tokio::test]
async fn test_store_failures() {
    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("todos.db");
    let store = TodoStore::open(&db_path).unwrap();
    let created = store.create("before").unwrap();

    rusqlite::Connection::open(&db_path)
        .unwrap()
        .execute_batch("DROP TABLE todos;")
        .unwrap();
    let app = test_app_with(store);

    let (status, err) = app.json(Method::POST, "/items", Some(r#"{"text":"after"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err, json!({"error": "db create error"}));

    let (status, err) = app.json(Method::GET, "/items", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err, json!({"error": "db list error"}));

    let uri = format!("/items/{}", created.id);
    let (status, err) = app.json(Method::PUT, &uri, Some(r#"{"done":true}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err, json!({"error": "not found or update failed"}));
}

#[tokio::test]
async fn test_delete_invalid_id() {
    let app = test_app();
    let (status, err) = app.json(Method::DELETE, "/items/zero", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err, json!({"error": "invalid id"}));
}

#[tokio::test]
async fn test_api_todos_alias() {
    let app = test_app();
    let (status, created) = app.json(Method::POST, "/api/todos", Some(r#"{"text":"alias"}"#)).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/todos/{}", created["id"]);
    let (status, _) = app.json(Method::PUT, &uri, Some(r#"{"done":true}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = app.json(Method::GET, "/items", None).await;
    assert_eq!(list[0]["done"], true);

    let (status, _) = app.json(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_static_files() {
    let app = test_app();

    let response = app.app.clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"), "{content_type}");

    let (status, bytes) = app.send(Method::GET, "/static/main.js", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"console.log(1);");
}

#[tokio::test]
async fn test_static_only_fixed_files() {
    let app = test_app();

    // style.css is a served path, but the file is absent
    let (status, err) = app.json(Method::GET, "/static/style.css", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err, json!({"error": "not found"}));

    for uri in ["/static/secret.txt", "/static/index.html", "/static/..%2Fsecret.txt"] {
        let (status, err) = app.json(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(err, json!({"error": "not found"}));
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let app = test_app();
    let (status, err) = app.json(Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err, json!({"error": "not found"}));
}
