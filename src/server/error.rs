use crate::utils::error::RelayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.is_upstream_error() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Downstream validation messages go out as a list, everything else as a
    /// single string.
    fn error_payload(&self) -> Value {
        match self {
            RelayError::ExpenseRejected { errors } => json!(errors),
            other => json!(other.user_friendly_message()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        }

        let body = json!({
            "success": false,
            "error": self.error_payload(),
        });

        (status, axum::Json(body)).into_response()
    }
}
