// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET / - service banner and route overview
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Forum API",
        "endpoints": {
            "posts": "GET /posts, GET /posts/:id, POST /posts, DELETE /posts/:id",
            "comments": "POST /posts/:id/comments, DELETE /comments/:id",
            "likes": "POST /posts/:id/like, POST /comments/:id/like",
            "health": "GET /health"
        }
    }))
}

/// GET /health - reports whether the repository answers
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.repository.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "status": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "status": "unavailable", "message": "Database unavailable" })),
            )
        }
    }
}
