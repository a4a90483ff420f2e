use std::io::{self, Write};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ModelConfig;

const MAX_PENDING_LINE: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model runtime returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("{0}")]
    Runtime(String),

    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("model stream ended before the answer was complete")]
    Incomplete,

    #[error("model stream line exceeded {0} bytes")]
    LineTooLong(usize),
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

pub struct OllamaChatClient {
    client: Client,
    endpoint: String,
    model: String,
    stream_to_console: bool,
}

impl OllamaChatClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}/api/chat", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            stream_to_console: config.stream_to_console,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn read_stream(&self, response: Response) -> Result<String, ModelError> {
        let mut body = response.bytes_stream();
        let mut assembler = StreamAssembler::default();

        while let Some(bytes) = body.next().await {
            for fragment in assembler.feed(&bytes?)? {
                echo(&fragment);
            }
        }
        echo("\n");

        assembler.finish()
    }
}

#[async_trait]
impl ModelClient for OllamaChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: self.stream_to_console,
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            stream = self.stream_to_console,
            "Sending chat request to Ollama"
        );

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody { error }) => ModelError::Runtime(error),
                Err(_) => ModelError::Status { status, body },
            });
        }

        if self.stream_to_console {
            return self.read_stream(response).await;
        }

        let chunk: ChatChunk = serde_json::from_slice(&response.bytes().await?)?;
        let (content, _) = chunk.into_content()?;
        Ok(content)
    }
}

fn echo(text: &str) {
    let mut out = io::stdout().lock();
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

impl ChatChunk {
    fn into_content(self) -> Result<(String, bool), ModelError> {
        if let Some(error) = self.error {
            return Err(ModelError::Runtime(error));
        }
        let content = self.message.map(|m| m.content).unwrap_or_default();
        Ok((content, self.done))
    }
}

// Network reads split NDJSON lines (and UTF-8 sequences) anywhere; bytes are
// held until a newline arrives.
#[derive(Default)]
struct StreamAssembler {
    pending: Vec<u8>,
    answer: String,
    done: bool,
}

impl StreamAssembler {
    fn feed(&mut self, bytes: &[u8]) -> Result<Vec<String>, ModelError> {
        self.pending.extend_from_slice(bytes);

        let mut fragments = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(fragment) = self.decode_line(&line[..pos])? {
                fragments.push(fragment);
            }
        }
        if self.pending.len() > MAX_PENDING_LINE {
            return Err(ModelError::LineTooLong(MAX_PENDING_LINE));
        }
        Ok(fragments)
    }

    fn decode_line(&mut self, line: &[u8]) -> Result<Option<String>, ModelError> {
        if self.done || line.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let (content, done) = serde_json::from_slice::<ChatChunk>(line)?.into_content()?;
        self.done = done;
        if content.is_empty() {
            return Ok(None);
        }
        self.answer.push_str(&content);
        Ok(Some(content))
    }

    fn finish(mut self) -> Result<String, ModelError> {
        // final chunk may arrive without a trailing newline
        let rest = std::mem::take(&mut self.pending);
        self.decode_line(&rest)?;

        if self.done {
            Ok(self.answer)
        } else {
            Err(ModelError::Incomplete)
        }
    }
}
