use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatops_core::ChatOpsError;

/// Explicit 400 carried through `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct BadRequest(String);

/// Explicit 404 carried through `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct NotFound(String);

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequest(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFound(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequest>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        if self.0.downcast_ref::<NotFound>().is_some() {
            return StatusCode::NOT_FOUND;
        }
        match self.0.downcast_ref::<ChatOpsError>() {
            Some(e) => match e {
                ChatOpsError::UnknownCommand(_) | ChatOpsError::TaskNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                ChatOpsError::UserInput(_)
                | ChatOpsError::InvalidParameters { .. }
                | ChatOpsError::NotInitialized(_) => StatusCode::BAD_REQUEST,
                ChatOpsError::ResolverStalled(_)
                | ChatOpsError::TaskFailed { .. }
                | ChatOpsError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ChatOpsError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
                ChatOpsError::Http(_) => StatusCode::BAD_GATEWAY,
                ChatOpsError::Config(_)
                | ChatOpsError::Io(_)
                | ChatOpsError::Yaml(_)
                | ChatOpsError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
