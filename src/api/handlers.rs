use crate::api::errors::{api_error, ApiError};
use crate::api::routes::AppState;
use crate::db::{Todo, TodoFilter, TodoRepository};
use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Liveness payload
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Raw query string of the list endpoint, validated by `into_filter`
#[derive(Debug, Default, Deserialize)]
pub struct ListTodosQuery {
    pub completed: Option<String>,
    pub window: Option<String>,
}

impl ListTodosQuery {
    /// Converts the query parameters into a store filter
    ///
    /// `completed` must be exactly `true` or `false`; `window` must be a
    /// non-negative whole number of days.
    pub fn into_filter(self) -> Result<TodoFilter, ApiError> {
        let completed = match self.completed.as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                return Err(ApiError::bad_request(&format!(
                    "Invalid value for 'completed': '{}' (expected 'true' or 'false')",
                    other
                )))
            }
        };

        let window_days = match self.window.as_deref() {
            None => None,
            Some(raw) => Some(parse_window(raw).ok_or_else(|| {
                ApiError::bad_request(&format!(
                    "Invalid value for 'window': '{}' (expected a non-negative number of days)",
                    raw
                ))
            })?),
        };

        Ok(TodoFilter {
            completed,
            window_days,
        })
    }
}

/// Parses a day count; digit strings too long for `u64` saturate
fn parse_window(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(raw.parse::<u64>().unwrap_or(u64::MAX))
}

/// Extracts the todo id from the path; anything that is not an integer
/// cannot name a todo
fn todo_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            debug!("Unusable todo id: {}", rejection);
            Err(ApiError::todo_not_found())
        }
    }
}

/// Reports that the service is up
#[axum::debug_handler]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Lists todos, optionally filtered by completion and deadline window
///
/// # Returns
/// * `Result<Json<Vec<Todo>>, ApiError>` - Matching todos (possibly empty) or a 400
#[axum::debug_handler]
pub async fn list_todos(
    Extension(state): Extension<AppState>,
    query: Result<Query<ListTodosQuery>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(&rejection.body_text()))?;
    let filter = query.into_filter()?;

    let mut conn = state.database.get_conn().map_err(|e| state.internal(e))?;
    let mut repo = TodoRepository::new(&mut conn);

    let todos = repo.list(&filter).map_err(|e| state.internal(e))?;
    debug!("Listed {} todos with {:?}", todos.len(), filter);
    Ok(Json(todos))
}

/// Retrieves a todo by its ID
///
/// # Returns
/// * `Result<Json<Todo>, ApiError>` - The todo or a 404
#[axum::debug_handler]
pub async fn get_todo(
    Extension(state): Extension<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(path)?;

    let mut conn = state.database.get_conn().map_err(|e| state.internal(e))?;
    let mut repo = TodoRepository::new(&mut conn);

    repo.get(id)
        .map_err(|e| state.internal(e))?
        .map(Json)
        .ok_or_else(ApiError::todo_not_found)
}

/// Creates a new todo from a JSON body
///
/// # Returns
/// * `Result<(StatusCode, Json<Todo>), ApiError>` - 201 with the stored todo, or a 400
#[axum::debug_handler]
pub async fn create_todo(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let draft = state.payloads.new_todo(&body)?;

    let mut conn = state.database.get_conn().map_err(|e| state.internal(e))?;
    let mut repo = TodoRepository::new(&mut conn);

    let todo = repo.insert(&draft).map_err(|e| state.internal(e))?;
    info!("Created todo {}", todo.id);
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Applies a partial update to a todo
///
/// Keys missing from the body keep their current value.
///
/// # Returns
/// * `Result<Json<Todo>, ApiError>` - The updated todo, a 404 or a 400
#[axum::debug_handler]
pub async fn update_todo(
    Extension(state): Extension<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(path)?;

    let mut conn = state.database.get_conn().map_err(|e| state.internal(e))?;
    let mut repo = TodoRepository::new(&mut conn);

    if repo.get(id).map_err(|e| state.internal(e))?.is_none() {
        return Err(ApiError::todo_not_found());
    }

    let changes = state.payloads.todo_changes(&body)?;

    let todo = repo
        .update(id, &changes)
        .map_err(|e| state.internal(e))?
        .ok_or_else(ApiError::todo_not_found)?;
    info!("Updated todo {}", todo.id);
    Ok(Json(todo))
}

/// Deletes a todo and returns it as it was before removal
///
/// # Returns
/// * `Result<Json<Todo>, ApiError>` - The removed todo or a 404
#[axum::debug_handler]
pub async fn delete_todo(
    Extension(state): Extension<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(path)?;

    let mut conn = state.database.get_conn().map_err(|e| state.internal(e))?;
    let mut repo = TodoRepository::new(&mut conn);

    let todo = repo
        .delete(id)
        .map_err(|e| state.internal(e))?
        .ok_or_else(ApiError::todo_not_found)?;
    info!("Deleted todo {}", todo.id);
    Ok(Json(todo))
}

/// Fallback for paths outside the API
pub async fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Not found")
}
