use crate::decoder::Framing;
use crate::session::{SessionClose, StreamSession};
use crate::state::SessionState;
use crate::types::ApiError;
use crate::EventCallback;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use std::time::Instant;
use tracing::{debug, trace};

/// A source of decoded text chunks (real HTTP response or scripted test
/// input), so the pump loop behaves identically for both.
#[async_trait]
pub trait ChunkSource: Send {
    /// Next chunk, or `None` when the stream is done.
    async fn next_chunk(&mut self) -> Result<Option<String>>;
}

pub struct HttpChunkSource {
    response: Response,
}

impl HttpChunkSource {
    pub fn new(response: Response) -> Self {
        Self { response }
    }
}

#[async_trait]
impl ChunkSource for HttpChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<String>> {
        match self.response.chunk().await {
            Ok(Some(bytes)) => Ok(Some(std::str::from_utf8(&bytes)?.to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(ApiError::NetworkError(e.to_string()).into()),
        }
    }
}

/// Map a non-success response to the error taxonomy.
async fn check_response_error(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let response_text = response
        .text()
        .await
        .map_err(|e| ApiError::NetworkError(e.to_string()))?;

    let error = match status {
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(response_text),
        StatusCode::UNAUTHORIZED => ApiError::Authentication(response_text),
        StatusCode::BAD_REQUEST => ApiError::InvalidRequest(response_text),
        status if status.is_server_error() => ApiError::ServiceError(response_text),
        status => ApiError::Unknown(format!("Status {status}: {response_text}")),
    };
    Err(error.into())
}

/// Drive one session to completion: pull chunks from the source, decode,
/// reconcile, and notify the optional observer per event.
pub async fn pump<S: ChunkSource>(
    source: &mut S,
    framing: Framing,
    state: &mut SessionState,
    on_event: Option<&EventCallback>,
) -> Result<SessionClose> {
    let mut session = StreamSession::new(framing);

    while let Some(chunk) = source.next_chunk().await? {
        trace!("received {} bytes", chunk.len());
        for event in session.push_chunk(&chunk) {
            if let Some(callback) = on_event {
                callback(&event)?;
            }
            state.apply(&event);
        }
    }

    Ok(session.finish())
}

/// Thin client for one agent backend.
///
/// Owns no retry policy; a failed request is terminal for the turn and the
/// caller decides what to surface.
pub struct AgentClient {
    client: Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, framing: Framing) -> String {
        match framing {
            Framing::JsonStream => format!("{}/api/research/stream", self.base_url),
            Framing::Sse => format!("{}/api/research/sse", self.base_url),
        }
    }

    /// Run one conversation turn against the backend, reconciling into
    /// `state` as frames arrive.
    pub async fn run_turn(
        &self,
        query: &str,
        framing: Framing,
        state: &mut SessionState,
        on_event: Option<&EventCallback>,
    ) -> Result<SessionClose> {
        state.begin_turn(query);
        let started = Instant::now();

        let response = self
            .client
            .post(self.endpoint(framing))
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;
        let response = check_response_error(response).await?;

        let mut source = HttpChunkSource::new(response);
        let close = pump(&mut source, framing, state, on_event).await?;
        if let SessionClose::Truncated { discarded_bytes } = close {
            debug!("turn ended truncated ({} bytes dropped)", discarded_bytes);
        }

        state.finish_turn(Some(started.elapsed().as_millis() as u64));
        Ok(close)
    }
}
