use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use std::path::Path;
use std::sync::Arc;
use todo_app::store::{MemoryStorage, Storage, StoreError, StoreFormat};
use todo_app::web::{AppState, create_router};
use todo_app::{Status, Todo, TodoService};
use tower::ServiceExt;

/// Test context holding the app and the buffer it writes to.
struct TestContext {
    app: Router,
    storage: Arc<MemoryStorage>,
}

const SERVER_ERROR_MESSAGE: &str =
    "An unexpected error occurred while processing your request. Please try again later.";

/// Storage that loads normally but refuses every save.
struct ReadOnlyStorage(Arc<MemoryStorage>);

impl Storage for ReadOnlyStorage {
    fn load_all(&self) -> Result<Vec<Todo>, StoreError> {
        self.0.load_all()
    }

    fn save_all(&self, _todos: &[Todo]) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/var/lib/todos.json is read-only",
        )))
    }
}

fn build_app(storage: impl Storage + 'static) -> Router {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let state = AppState::new(TodoService::new(storage));
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("web/static");
    create_router(state, &static_dir)
}

fn setup_with(storage: MemoryStorage) -> TestContext {
    let storage = Arc::new(storage);
    TestContext {
        app: build_app(storage.clone()),
        storage,
    }
}

/// Same as [`setup`], but every save fails with an I/O error.
fn setup_read_only() -> TestContext {
    let storage = Arc::new(MemoryStorage::new(StoreFormat::Json));
    TestContext {
        app: build_app(ReadOnlyStorage(storage.clone())),
        storage,
    }
}

fn setup() -> TestContext {
    setup_with(MemoryStorage::new(StoreFormat::Json))
}

/// Test helper to seed the store with two items.
fn create_test_todos(storage: &MemoryStorage) -> Vec<Todo> {
    let todos = vec![
        Todo::new(1, "buy milk".to_string(), Status::NotStarted),
        Todo::new(2, "walk dog".to_string(), Status::Started),
    ];
    storage.save_all(&todos).unwrap();
    todos
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_get_returns_all_todos_as_json() {
    let ctx = setup();
    let todos = create_test_todos(&ctx.storage);

    let (status, body) = send(&ctx.app, Method::GET, "/get", None).await;

    assert_eq!(status, StatusCode::OK);
    let returned: Vec<Todo> = serde_json::from_str(&body).unwrap();
    assert_eq!(returned, todos);
}

#[tokio::test]
async fn test_get_on_empty_store_returns_empty_array() {
    let ctx = setup();

    let (status, body) = send(&ctx.app, Method::GET, "/get", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_get_with_corrupt_store_is_server_error() {
    let ctx = setup_with(MemoryStorage::with_contents(StoreFormat::Json, "{broken"));

    let (status, _) = send(&ctx.app, Method::GET, "/get", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn can_create_todo() {
    let ctx = setup();
    create_test_todos(&ctx.storage);

    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/create",
        Some(r#"{"description": "read book", "status": "completed"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let created: Todo = serde_json::from_str(&body).unwrap();
    assert_eq!(
        created,
        Todo::new(3, "read book".to_string(), Status::Completed)
    );
    assert_eq!(ctx.storage.load_all().unwrap().last(), Some(&created));
}

#[tokio::test]
async fn rejects_create_with_invalid_body() {
    let ctx = setup();

    let (status, _) = send(&ctx.app, Method::POST, "/create", Some("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &ctx.app,
        Method::POST,
        "/create",
        Some(r#"{"description": "no status"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(ctx.storage.contents(), None, "nothing should be written");
}

#[tokio::test]
async fn rejects_create_with_invalid_status() {
    let ctx = setup();
    create_test_todos(&ctx.storage);
    let before = ctx.storage.contents();

    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/create",
        Some(r#"{"description": "x", "status": "eventually"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("invalid status"), "{body}");
    assert_eq!(ctx.storage.contents(), before);
}

#[tokio::test]
async fn test_failed_save_is_server_error() {
    let ctx = setup_read_only();
    create_test_todos(&ctx.storage);
    let before = ctx.storage.contents();

    let requests = [
        (
            Method::POST,
            "/create",
            Some(r#"{"description": "read book", "status": "started"}"#),
        ),
        (
            Method::PUT,
            "/update",
            Some(r#"{"id": 1, "status": "completed"}"#),
        ),
        (Method::DELETE, "/delete?id=2", None),
    ];
    for (method, uri, body) in requests {
        let (status, body) = send(&ctx.app, method, uri, body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(
            body,
            serde_json::json!({ "message": SERVER_ERROR_MESSAGE }).to_string(),
            "{uri}"
        );
    }
    assert_eq!(ctx.storage.contents(), before);
}

#[tokio::test]
async fn rejects_create_with_wrong_method() {
    let ctx = setup();

    let (status, _) = send(&ctx.app, Method::GET, "/create", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn can_update_todo_status_only() {
    let ctx = setup();
    create_test_todos(&ctx.storage);

    let (status, body) = send(
        &ctx.app,
        Method::PUT,
        "/update",
        Some(r#"{"id": 2, "status": "completed"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let updated: Todo = serde_json::from_str(&body).unwrap();
    assert_eq!(
        updated,
        Todo::new(2, "walk dog".to_string(), Status::Completed)
    );
    assert_eq!(ctx.storage.load_all().unwrap()[1], updated);
}

#[tokio::test]
async fn rejects_update_without_id() {
    let ctx = setup();
    create_test_todos(&ctx.storage);

    let (status, body) = send(
        &ctx.app,
        Method::PUT,
        "/update",
        Some(r#"{"description": "who am I"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Missing ID"), "{body}");

    let (status, _) = send(
        &ctx.app,
        Method::PUT,
        "/update",
        Some(r#"{"id": 0, "description": "who am I"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejects_update_of_missing_todo() {
    let ctx = setup();
    create_test_todos(&ctx.storage);
    let before = ctx.storage.contents();

    let (status, body) = send(
        &ctx.app,
        Method::PUT,
        "/update",
        Some(r#"{"id": 99, "description": "ghost"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("not found"), "{body}");
    assert_eq!(ctx.storage.contents(), before);
}

#[tokio::test]
async fn rejects_update_with_invalid_status() {
    let ctx = setup();
    create_test_todos(&ctx.storage);
    let before = ctx.storage.contents();

    let (status, _) = send(
        &ctx.app,
        Method::PUT,
        "/update",
        Some(r#"{"id": 1, "description": "changed", "status": "nope"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.storage.contents(), before);
}

#[tokio::test]
async fn can_delete_todo() {
    let ctx = setup();
    create_test_todos(&ctx.storage);

    let (status, _) = send(&ctx.app, Method::DELETE, "/delete?id=1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ctx.storage.load_all().unwrap(),
        vec![Todo::new(2, "walk dog".to_string(), Status::Started)]
    );
}

#[tokio::test]
async fn rejects_delete_with_bad_id() {
    let ctx = setup();
    create_test_todos(&ctx.storage);
    let before = ctx.storage.contents();

    for uri in [
        "/delete",
        "/delete?id=",
        "/delete?id=abc",
        "/delete?id=0",
        "/delete?id=-3",
        "/delete?id=7",
    ] {
        let (status, _) = send(&ctx.app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
    assert_eq!(ctx.storage.contents(), before);
}

#[tokio::test]
async fn can_render_list_page() {
    let ctx = setup();
    create_test_todos(&ctx.storage);

    let (status, body) = send(&ctx.app, Method::GET, "/list", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<td>buy milk</td>"), "{body}");
    assert!(body.contains("<td>walk dog</td>"), "{body}");
}

#[tokio::test]
async fn can_serve_static_files() {
    let ctx = setup();

    let (status, body) = send(&ctx.app, Method::GET, "/static/about.html", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>About</h1>"));

    let (status, _) = send(&ctx.app, Method::GET, "/static/missing.html", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_every_response_carries_a_trace_id() {
    let ctx = setup();

    let response = ctx
        .app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let trace_id = response.headers().get("x-trace-id").unwrap();
    assert!(trace_id.to_str().unwrap().starts_with("trace-"));
}
