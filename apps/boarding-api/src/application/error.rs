use axum::{
    Json,
    response::{IntoResponse, Response},
};
use boarding_core::CoreError;
use http::StatusCode;
use serde_json::json;
use tracing::{error, warn};

// Top-level error type for the application layer; every handler returns it
#[derive(thiserror::Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::InvalidAmount(_) | CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::NotAuthenticated | CoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::NoTenantsInRoom(_)
        | CoreError::AlreadyPaidConflict { .. }
        | CoreError::AlreadyExists(_)
        | CoreError::Concurrency { .. } => StatusCode::CONFLICT,
        CoreError::RemoteFailure(_) => StatusCode::BAD_GATEWAY,
        CoreError::Configuration(_) | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let ApplicationError::Core(err) = &self;
        let status = status_for(err);
        let mut body = json!({ "error": err.kind(), "message": err.to_string() });
        if let CoreError::AlreadyPaidConflict { tenant_id, tenant_name } = err {
            body["tenant_id"] = json!(tenant_id);
            body["tenant_name"] = json!(tenant_name);
        }

        if status.is_server_error() {
            error!(status = %status, "Request failed: {}", self);
        } else {
            warn!(status = %status, "Request rejected: {}", self);
        }
        (status, Json(body)).into_response()
    }
}
