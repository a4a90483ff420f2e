use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ErrorResponse;
use crate::forward::ForwardError;
use crate::model::ModelError;

pub const FORWARD_REJECTED_DETAIL: &str = "Failed to send response to external server";

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("Expected request with `Content-Type: application/json`")]
    UnsupportedContentType,

    #[error(transparent)]
    Unreadable(#[from] BytesRejection),

    #[error("Failed to parse the request body as JSON: {0}")]
    Syntax(serde_json::Error),

    #[error("Failed to deserialize the JSON body into the target type: {0}")]
    Shape(serde_json::Error),
}

/// Everything a `/receive_question/` call can fail with, mapped to a
/// `{"detail": ...}` body at the handler boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    InvalidBody(#[from] BodyError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(BodyError::UnsupportedContentType) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::InvalidBody(BodyError::Unreadable(rejection)) => rejection.status(),
            Self::InvalidBody(BodyError::Syntax(_)) => StatusCode::BAD_REQUEST,
            Self::InvalidBody(BodyError::Shape(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Forward(ForwardError::Rejected(status)) => *status,
            Self::Model(_) | Self::Forward(ForwardError::Transport(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::InvalidBody(BodyError::Unreadable(rejection)) => rejection.body_text(),
            Self::Forward(ForwardError::Rejected(_)) => FORWARD_REJECTED_DETAIL.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer failure logging is off; this is the only record of the error
        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Question rejected");
        } else {
            tracing::error!(status = status.as_u16(), error = %self, "Question relay failed");
        }

        (
            status,
            Json(ErrorResponse {
                detail: self.detail(),
            }),
        )
            .into_response()
    }
}
