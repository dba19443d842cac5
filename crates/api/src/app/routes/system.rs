use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::app::AppInfo;
use crate::app::errors::json_error;

pub async fn root(Extension(info): Extension<Arc<AppInfo>>) -> String {
    format!("{} {} is running", info.service_name, info.version)
}

pub async fn health(Extension(info): Extension<Arc<AppInfo>>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "service": info.service_name,
            "version": info.version,
            "timestamp": Utc::now(),
        }
    }))
}

pub async fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "Route not found")
}
