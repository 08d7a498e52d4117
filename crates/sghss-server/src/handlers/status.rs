//! Service status endpoint.

use axum::Json;
use axum::response::IntoResponse;
use serde_json::json;

pub async fn api_status() -> impl IntoResponse {
    Json(json!({
        "status": "online",
        "message": "SGHSS API está funcionando",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
