mod extract;
mod handlers;
mod models;

use axum::{routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use extract::JsonBody;
pub use handlers::{not_found, receive_question, redirect_to_slash};
pub use models::{Answer, ErrorResponse, ForwardStatus, Question, FORWARDED_STATUS};

pub const RECEIVE_QUESTION_PATH: &str = "/receive_question/";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(RECEIVE_QUESTION_PATH, post(receive_question))
        .route("/receive_question", post(redirect_to_slash))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http().on_failure(()))
        .with_state(state)
}
