//! Placeholder AI service: two static endpoints, no logic.
//!
//! Kept separate from the extraction router; it shares no state with it.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the placeholder router.
pub fn router(cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/ai/test", get(test_endpoint))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "AI Service is running" }))
}

async fn test_endpoint() -> Json<Value> {
    Json(json!({ "message": "Hello from the AI service!" }))
}
