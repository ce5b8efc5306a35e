use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

/// Body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status_code: u16,
    pub timestamp: String,
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn error(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message,
            status_code: status.as_u16(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}
