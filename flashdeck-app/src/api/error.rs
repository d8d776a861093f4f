use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flashdeck_core::CoreError;
use serde_json::json;

#[derive(Debug)]
pub struct AppError(pub StatusCode, pub anyhow::Error);

impl AppError {
    pub fn new(status: StatusCode, err: impl Into<anyhow::Error>) -> Self {
        Self(status, err.into())
    }

    pub fn bad_request(msg: &'static str) -> Self {
        Self(StatusCode::BAD_REQUEST, anyhow::anyhow!(msg))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            tracing::error!("CODE: {}, MESSAGE: {}", self.0.as_u16(), self.1);
        } else {
            tracing::debug!("CODE: {}, MESSAGE: {}", self.0.as_u16(), self.1);
        }
        let body = json!({ "status": self.0.as_u16(), "message": self.1.to_string() });
        (self.0, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let status = match &err {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
            CoreError::Storage(_) | CoreError::Blob(_) | CoreError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err)
    }
}
