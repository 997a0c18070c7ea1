//! HTTP service for managing todo items.
//!
//! Todos live in a SQLite database accessed through Diesel. The `api` module
//! exposes them as a JSON API under `/api/v1`: a health check plus list,
//! fetch, create, update and delete.

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;
