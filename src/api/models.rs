use serde::{Deserialize, Serialize};

pub const FORWARDED_STATUS: &str = "Question processed and response sent";

#[derive(Debug, Deserialize)]
pub struct Question {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct Answer {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ForwardStatus {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
