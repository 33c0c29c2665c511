// Handlers module
// HTTP handlers for the REST API

pub mod schools;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::{db::Database, error::ApiError, middleware::apply_middleware};
use self::schools::{add_school, list_schools};

/// Health check handler
/// Reports liveness and the current time without touching the database,
/// so it stays green even while PostgreSQL is unreachable
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })),
    )
}

/// Fallback handler producing the uniform 404 envelope
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Create the axum router with all endpoints and middleware.
/// Unsupported methods on known paths fall through to the same 404 envelope
/// as unknown paths.
pub fn create_router(database: Arc<Database>) -> Router {
    let router = Router::new()
        // Health check endpoint
        .route("/health", get(health_check).fallback(not_found))
        // School endpoints
        .route("/addSchool", post(add_school).fallback(not_found))
        .route("/listSchools", get(list_schools).fallback(not_found))
        // Everything else gets the 404 envelope
        .fallback(not_found)
        // Add shared state (database connection pool)
        .with_state(database);

    apply_middleware(router)
}
