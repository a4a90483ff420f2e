use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::api::Answer;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("external server answered {0}")]
    Rejected(StatusCode),

    #[error("failed to reach external server: {0}")]
    Transport(#[from] reqwest::Error),
}

// No timeout and no retry; only a `200 OK` counts as delivered.
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    url: String,
}

impl Forwarder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn send(&self, answer: &Answer) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(answer)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ForwardError::Rejected(status)),
        }
    }
}
