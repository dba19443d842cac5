use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

/// `{ "success": false, "message": .. }` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}
