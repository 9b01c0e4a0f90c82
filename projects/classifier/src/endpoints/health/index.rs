use axum::{extract::Json, response::IntoResponse};
use serde_json::json;

/// Axum handler: GET /health
pub async fn handler() -> impl IntoResponse {
	Json(json!({
		"status": "ok",
		"version": env!("CARGO_PKG_VERSION"),
	}))
}
