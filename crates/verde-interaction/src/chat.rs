//! Streaming chat session with the Verde persona.
//!
//! The Gemini REST API is stateless, so the session owns the transcript so
//! far and re-sends it with every call. A reply arrives as an SSE stream of
//! text fragments; the user turn and the accumulated reply are committed to
//! the transcript only once the stream completes cleanly, which keeps the
//! session usable after a mid-stream failure.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use reqwest::Client;
use tokio::sync::RwLock;
use verde_core::VerdeError;
use verde_core::chat::ChatMessage;
use verde_core::error::Result;
use verde_infrastructure::SecretStorage;

use crate::gemini::{
    BASE_URL, Content, DEFAULT_GEMINI_MODEL, GenerateContentRequest, GenerateContentResponse,
    candidate_text, read_error_response,
};
use crate::persona::VERDE_PERSONA;

type ByteChunks = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// A conversational context with the Verde persona baked in at creation.
#[derive(Clone)]
pub struct ChatSession {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    system_instruction: String,
    transcript: Arc<RwLock<Vec<ChatMessage>>>,
}

impl ChatSession {
    /// Opens a session with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
            system_instruction: VERDE_PERSONA.to_string(),
            transcript: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Loads configuration from secret.json or environment variables,
    /// with the same priority as [`crate::PlantIdentifier::try_from_env`].
    pub fn try_from_env() -> Result<Self> {
        if let Ok(storage) = SecretStorage::new()
            && let Ok(config) = storage.load()
            && let Some(gemini) = config.gemini
        {
            let model = gemini
                .model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
            return Ok(Self::new(gemini.api_key, model));
        }

        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            VerdeError::config(
                "GEMINI_API_KEY not found in ~/.config/verde/secret.json or environment variables",
            )
        })?;
        let model = std::env::var("GEMINI_MODEL_NAME")
            .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the endpoint base URL (used to point tests at a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns a snapshot of the committed transcript.
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.read().await.clone()
    }

    /// Sends a user message and returns the streamed reply.
    ///
    /// The returned [`ReplyStream`] yields ordered text fragments; chunk
    /// boundaries carry no semantic meaning. Nothing is committed to the
    /// transcript until the stream completes cleanly.
    ///
    /// # Errors
    ///
    /// Returns `VerdeError::Api` when the request cannot be sent or the
    /// service answers with a non-success status. The session itself stays
    /// usable for the next attempt.
    pub async fn send(&self, text: impl Into<String>) -> Result<ReplyStream> {
        let text = text.into();

        let mut contents: Vec<Content> = {
            let transcript = self.transcript.read().await;
            transcript
                .iter()
                .map(|msg| Content::text(msg.role.as_str(), msg.content.clone()))
                .collect()
        };
        contents.push(Content::text("user", text.clone()));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text("system", self.system_instruction.clone())),
            generation_config: None,
        };

        let url = format!(
            "{}/{model}:streamGenerateContent?key={api_key}&alt=sse",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| VerdeError::api(None, format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(read_error_response(response).await);
        }

        let chunks = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|err| VerdeError::api(None, format!("Chat stream failed: {err}")))
        });

        Ok(ReplyStream::new(
            chunks,
            text,
            Arc::clone(&self.transcript),
        ))
    }
}

/// Line buffer reassembling SSE `data:` payloads from raw byte chunks.
///
/// Bytes are only converted to text once a full line is available, so
/// multi-byte characters split across network chunks survive intact.
#[derive(Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    /// Feeds a chunk and returns every complete `data:` payload it closed.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes).trim().to_string();
            if line.is_empty() {
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

/// The streamed reply to a single `send` call.
///
/// Consumed exactly once, in order. Each fragment is already accumulated
/// internally, so the concatenation committed at stream end equals what the
/// caller assembled.
pub struct ReplyStream {
    chunks: ByteChunks,
    buffer: SseBuffer,
    queued: VecDeque<String>,
    user_text: String,
    reply: String,
    transcript: Arc<RwLock<Vec<ChatMessage>>>,
    closed: bool,
}

impl ReplyStream {
    fn new(
        chunks: impl Stream<Item = Result<Vec<u8>>> + Send + 'static,
        user_text: String,
        transcript: Arc<RwLock<Vec<ChatMessage>>>,
    ) -> Self {
        Self {
            chunks: Box::pin(chunks),
            buffer: SseBuffer::default(),
            queued: VecDeque::new(),
            user_text,
            reply: String::new(),
            transcript,
            closed: false,
        }
    }

    /// Yields the next text fragment, or `None` once the reply is complete.
    ///
    /// On clean completion the exchange is committed to the session
    /// transcript. Any terminal error leaves the transcript untouched and
    /// ends the stream.
    pub async fn next_fragment(&mut self) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }

        loop {
            if let Some(fragment) = self.queued.pop_front() {
                self.reply.push_str(&fragment);
                return Ok(Some(fragment));
            }

            match self.chunks.next().await {
                Some(Ok(chunk)) => {
                    for payload in self.buffer.push(&chunk) {
                        match serde_json::from_str::<GenerateContentResponse>(&payload) {
                            Ok(event) => {
                                if let Some(text) = candidate_text(event) {
                                    self.queued.push_back(text);
                                }
                            }
                            Err(err) => {
                                tracing::warn!(
                                    "[ChatSession] Skipping malformed stream event: {err}"
                                );
                            }
                        }
                    }
                }
                Some(Err(err)) => {
                    self.closed = true;
                    return Err(err);
                }
                None => {
                    self.closed = true;
                    self.commit().await;
                    return Ok(None);
                }
            }
        }
    }

    async fn commit(&mut self) {
        let mut transcript = self.transcript.write().await;
        transcript.push(ChatMessage::user(std::mem::take(&mut self.user_text)));
        transcript.push(ChatMessage::model(std::mem::take(&mut self.reply)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use verde_core::chat::MessageRole;

    fn event(text: &str) -> String {
        format!(
            "data: {{\"candidates\": [{{\"content\": {{\"parts\": [{{\"text\": \"{text}\"}}]}}}}]}}\n\n"
        )
    }

    fn reply_stream(
        chunks: Vec<Result<Vec<u8>>>,
        transcript: Arc<RwLock<Vec<ChatMessage>>>,
    ) -> ReplyStream {
        ReplyStream::new(stream::iter(chunks), "how often to water?".to_string(), transcript)
    }

    #[test]
    fn test_sse_buffer_reassembles_split_events() {
        let mut buffer = SseBuffer::default();
        let payload = event("Hi");
        let (head, tail) = payload.as_bytes().split_at(12);

        assert!(buffer.push(head).is_empty());
        let payloads = buffer.push(tail);
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].starts_with('{'));
    }

    #[test]
    fn test_sse_buffer_ignores_non_data_lines() {
        let mut buffer = SseBuffer::default();
        let payloads = buffer.push(b": keep-alive\n\ndata: {\"x\":1}\n");
        assert_eq!(payloads, vec!["{\"x\":1}".to_string()]);
    }

    #[tokio::test]
    async fn test_fragments_arrive_in_order_and_commit() {
        let transcript = Arc::new(RwLock::new(Vec::new()));
        let chunks = vec![
            Ok(event("Hel").into_bytes()),
            Ok(event("lo!").into_bytes()),
        ];
        let mut stream = reply_stream(chunks, Arc::clone(&transcript));

        let mut assembled = String::new();
        while let Some(fragment) = stream.next_fragment().await.unwrap() {
            assembled.push_str(&fragment);
        }
        assert_eq!(assembled, "Hello!");

        let committed = transcript.read().await;
        assert_eq!(committed.len(), 2);
        assert_eq!(committed[0].role, MessageRole::User);
        assert_eq!(committed[0].content, "how often to water?");
        assert_eq!(committed[1].role, MessageRole::Model);
        assert_eq!(committed[1].content, "Hello!");
    }

    #[tokio::test]
    async fn test_terminal_error_leaves_transcript_untouched() {
        let transcript = Arc::new(RwLock::new(Vec::new()));
        let chunks = vec![
            Ok(event("partial").into_bytes()),
            Err(VerdeError::api(None, "connection reset")),
        ];
        let mut stream = reply_stream(chunks, Arc::clone(&transcript));

        assert_eq!(
            stream.next_fragment().await.unwrap(),
            Some("partial".to_string())
        );
        assert!(stream.next_fragment().await.is_err());
        // The stream is done; further polls answer None instead of erroring again.
        assert_eq!(stream.next_fragment().await.unwrap(), None);
        assert!(transcript.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_event_is_skipped() {
        let transcript = Arc::new(RwLock::new(Vec::new()));
        let chunks = vec![
            Ok(b"data: {broken\n\n".to_vec()),
            Ok(event("fine").into_bytes()),
        ];
        let mut stream = reply_stream(chunks, transcript);

        assert_eq!(
            stream.next_fragment().await.unwrap(),
            Some("fine".to_string())
        );
        assert_eq!(stream.next_fragment().await.unwrap(), None);
    }
}
