/// API error types and handling
pub mod errors;
/// HTTP handlers for the todo endpoints
pub mod handlers;
/// Per-request tracing
pub mod middleware;
/// Routes configuration and setup
pub mod routes;
/// HTTP server implementation
pub mod server;
/// Request body validation
pub mod validation;
