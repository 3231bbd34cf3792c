use super::AppState;
use crate::store::StoreError;
use crate::todo::Todo;
use crate::trace::TraceId;
use axum::{
    Router,
    extract::{
        Extension, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};

/// Body of `POST /create`.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    description: String,
    status: String,
}

/// Body of `PUT /update`. Absent or empty fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    id: Option<u32>,
    description: Option<String>,
    status: Option<String>,
}

/// Query of `DELETE /delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteTodoQuery {
    id: Option<String>,
}

/// JSON body returned for every failed API request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    message: String,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Custom error type for JSON API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Missing ID")]
    MissingId,
    #[error("Invalid or missing ID")]
    InvalidId,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiError::InvalidBody(_) | ApiError::MissingId | ApiError::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(StoreError::NotFound(_) | StoreError::InvalidStatus(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(_) | ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status_code.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "An unexpected error occurred while processing your request. Please try again later."
                .to_string()
        } else {
            self.to_string()
        };

        (status_code, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Handler for GET /get - Returns all todo items as a JSON array.
#[tracing::instrument(skip(state))]
pub async fn get_todos_handler(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.run(move |service| service.list(&trace_id)).await??;
    Ok(Json(todos))
}

/// Handler for POST /create - Adds a todo item and returns it with its new ID.
#[tracing::instrument(skip(state, payload))]
pub async fn create_todo_handler(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;

    let created = state
        .run(move |service| service.add(&trace_id, request.description, &request.status))
        .await??;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /update - Changes the supplied fields of one todo item.
#[tracing::instrument(skip(state, payload))]
pub async fn update_todo_handler(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    let id = request
        .id
        .filter(|id| *id > 0)
        .ok_or(ApiError::MissingId)?;

    let updated = state
        .run(move |service| {
            service.update(
                &trace_id,
                id,
                request.description.as_deref(),
                request.status.as_deref(),
            )
        })
        .await??;
    Ok(Json(updated))
}

/// Handler for DELETE /delete?id=N - Removes one todo item.
#[tracing::instrument(skip(state, query))]
pub async fn delete_todo_handler(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    query: Result<Query<DeleteTodoQuery>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let id = query
        .ok()
        .and_then(|Query(query)| query.id)
        .and_then(|id| id.trim().parse::<u32>().ok())
        .filter(|id| *id > 0)
        .ok_or(ApiError::InvalidId)?;

    state.run(move |service| service.delete(&trace_id, id)).await??;
    Ok(StatusCode::OK)
}

/// Creates and returns the JSON API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/get", get(get_todos_handler))
        .route("/create", post(create_todo_handler))
        .route("/update", put(update_todo_handler))
        .route("/delete", delete(delete_todo_handler))
        .with_state(state)
}
