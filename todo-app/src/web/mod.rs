use askama::Template;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::Html;
use axum::{Router, extract::Extension, extract::State, routing::get};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinError;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::{StoreError, TodoService};
use crate::todo::Todo;
use crate::trace::TraceId;

pub mod api;
pub mod middleware;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TodoService>,
}

impl AppState {
    pub fn new(service: TodoService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Runs a store operation on the blocking thread pool.
    pub async fn run<T, F>(&self, operation: F) -> Result<Result<T, StoreError>, JoinError>
    where
        F: FnOnce(&TodoService) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || operation(service.as_ref())).await
    }
}

/// Custom error type for HTML page handlers.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    /// The specific `askama::Error` is captured as the source of this error.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    #[error("Failed to retrieve todo items")]
    Store(#[from] StoreError),
    #[error("Store task failed")]
    Join(#[from] JoinError),
}

impl axum::response::IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Page rendering failed: {:?}", self);
        let user_facing_error_message =
            "An unexpected error occurred while processing your request. Please try again later.";
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!(
                "<h1>Internal Server Error</h1><p>{}</p>",
                user_facing_error_message
            )),
        )
            .into_response()
    }
}

#[derive(Template)]
#[template(path = "list.html")]
struct ListTemplate {
    todos: Vec<Todo>,
}

impl ListTemplate {
    pub fn new(todos: Vec<Todo>) -> Self {
        Self { todos }
    }
}

/// Builds the full application: JSON API, list page, health check and static files.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    let pages = Router::new()
        .route("/list", get(list_handler))
        .route("/health", get(health_check_handler))
        .with_state(state.clone());

    Router::new()
        .merge(api::create_api_router(state))
        .merge(pages)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::trace_id_middleware)),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let state = AppState::new(TodoService::new(config.storage()));
    let app = create_router(state, &config.static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for interrupt: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for the /list page that renders all todo items as HTML.
#[tracing::instrument(skip(state))]
pub async fn list_handler(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
) -> Result<Html<String>, WebError> {
    let todos = state.run(move |service| service.list(&trace_id)).await??;
    let template = ListTemplate::new(todos);
    template.render().map(Html).map_err(WebError::from)
}
