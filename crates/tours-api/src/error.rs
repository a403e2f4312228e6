use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tours_collection::CollectionError;

use crate::config::Environment;

/// Shown to clients in place of unexpected failures outside development.
pub const GENERIC_MESSAGE: &str = "Something went wrong :(";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No document found with that ID")]
    NotFound,
    #[error("Can't find {0} on this server")]
    RouteNotFound(String),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Collection(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Expected failures caused by the request rather than by a bug.
    pub fn is_operational(&self) -> bool {
        self.status().is_client_error()
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Collection(CollectionError::Cast { field, value }) => {
                format!("Invalid {field}: {value}")
            }
            AppError::Collection(CollectionError::InvalidQuery(msg)) => {
                format!("Invalid query: {msg}")
            }
            other => other.to_string(),
        }
    }
}

/// The full story behind an error response, kept as a response extension so
/// [`expose_details`] can rebuild the body in development.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub detail: String,
}

fn status_label(status: StatusCode) -> &'static str {
    if status.is_client_error() { "fail" } else { "error" }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let report = ErrorReport {
            message: self.message(),
            detail: format!("{self:?}"),
        };

        let message = if self.is_operational() {
            tracing::debug!(error = %self, %status, "request failed");
            report.message.clone()
        } else {
            tracing::error!(error = ?self, %status, "unexpected error");
            GENERIC_MESSAGE.to_string()
        };

        let body = json!({ "status": status_label(status), "message": message });
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Middleware: in development, error bodies carry the real message and an
/// `error` field with the debug representation.
pub async fn expose_details(State(environment): State<Environment>, mut response: Response) -> Response {
    if !environment.is_development() {
        return response;
    }
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };
    let status = response.status();
    let body = json!({
        "status": status_label(status),
        "message": report.message,
        "error": report.detail,
    });
    (status, Json(body)).into_response()
}
