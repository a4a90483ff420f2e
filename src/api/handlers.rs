use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::error::RelayError;
use crate::{AppState, Delivery};

use super::extract::JsonBody;
use super::models::{Answer, ErrorResponse, ForwardStatus, Question, FORWARDED_STATUS};
use super::RECEIVE_QUESTION_PATH;

pub async fn receive_question(
    State(state): State<AppState>,
    JsonBody(Question { question }): JsonBody<Question>,
) -> Result<Response, RelayError> {
    tracing::info!(question_len = question.len(), "Received question");
    let answer = Answer {
        answer: state.model.complete(&question).await?,
    };
    tracing::info!(answer_len = answer.answer.len(), "Model answered");

    match &state.delivery {
        Delivery::Reply => Ok(Json(answer).into_response()),
        Delivery::Forward(forwarder) => {
            forwarder.send(&answer).await?;
            tracing::info!(url = forwarder.url(), "Answer forwarded");
            Ok(Json(ForwardStatus {
                status: FORWARDED_STATUS,
            })
            .into_response())
        }
    }
}

/// `POST /receive_question` keeps working for clients that drop the slash.
pub async fn redirect_to_slash() -> Redirect {
    Redirect::temporary(RECEIVE_QUESTION_PATH)
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: "Not Found".to_string(),
        }),
    )
        .into_response()
}
