use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

/// `{status, message}` body with no further detail.
pub fn status_message(status: StatusCode, ok: bool, message: &str) -> Response {
    (status, axum::Json(json!({ "status": ok, "message": message }))).into_response()
}

/// Any serialisable envelope with the given status code.
pub fn reply<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, axum::Json(body)).into_response()
}
