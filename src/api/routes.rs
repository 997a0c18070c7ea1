//! API routes configuration module

use crate::api::errors::ApiError;
use crate::api::handlers::{
    create_todo, delete_todo, get_todo, health, list_todos, not_found, update_todo,
};
use crate::api::middleware::trace_requests;
use crate::api::validation::PayloadValidator;
use crate::db::Database;
use crate::errors::Error;
use axum::{middleware, routing::get, Extension, Router};
use std::sync::Arc;

/// Path prefix shared by every endpoint
pub const API_PREFIX: &str = "/api/v1";

/// Everything a handler needs, injected through an `Extension` layer
#[derive(Clone)]
pub struct AppState {
    /// Connection pool of the todo store
    pub database: Database,
    /// Compiled payload schemas
    pub payloads: Arc<PayloadValidator>,
    /// Test mode: internal error details are returned to the client
    pub testing: bool,
}

impl AppState {
    /// Bundles the store handle with freshly compiled payload schemas
    ///
    /// # Errors
    /// Returns an Error if the payload schemas do not compile
    pub fn new(database: Database, testing: bool) -> Result<Self, Error> {
        Ok(AppState {
            database,
            payloads: Arc::new(PayloadValidator::new()?),
            testing,
        })
    }

    /// Turns a store failure into a 500 response
    pub fn internal(&self, err: Error) -> ApiError {
        ApiError::internal(&err, self.testing)
    }
}

/// Creates and configures the API router with all routes
///
/// # Arguments
/// * `state` - Store handle and validators shared across handlers
///
/// # Returns
/// * `Router` - Configured router with all API endpoints and middleware
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .fallback(not_found)
        .layer(middleware::from_fn(trace_requests))
        .layer(Extension(state))
}
