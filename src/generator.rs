//! Blog post generation from a transcript.
//!
//! Prompt assembly is fully deterministic: the same transcript and
//! metadata always produce the same request. Over-length transcripts are
//! truncated to exactly `max_transcript_chars` characters before the
//! prompt is built; this is a documented policy choice (cheap and
//! reproducible) rather than summarization. The outbound HTTP call sits
//! behind [`ChatTransport`] so tests can swap in a canned response.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PipelineConfig;
use crate::downloader::VideoMetadata;
use crate::error::GenerateError;

/// The generated post, mirroring the shape the web layer persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "Technology".to_string()
}

/// Third pipeline stage: produce a [`BlogPost`] from transcript plus
/// metadata.
pub trait PostWriter {
    fn generate(
        &self,
        transcript: &str,
        metadata: &VideoMetadata,
    ) -> Result<BlogPost, GenerateError>;
}

/// One chat-completion round trip: request body in, assistant message
/// content out.
pub trait ChatTransport {
    fn complete(&self, request: &serde_json::Value) -> Result<String, GenerateError>;
}

/// Chat-completions response envelope; only the first choice's content is
/// read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// `ureq`-backed [`ChatTransport`] with bearer auth.
pub struct HttpChatTransport {
    api_url: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl HttpChatTransport {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(300))
            .build();
        Self { api_url, api_key, agent }
    }
}

impl ChatTransport for HttpChatTransport {
    fn complete(&self, request: &serde_json::Value) -> Result<String, GenerateError> {
        let api_key = self.api_key.as_deref().ok_or(GenerateError::CredentialMissing)?;

        let response = self
            .agent
            .post(&self.api_url)
            .set("Authorization", &format!("Bearer {api_key}"))
            .send_json(request.clone());

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(429, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(GenerateError::RateLimited(
                    body.lines().next().unwrap_or("API quota exhausted").trim().to_string(),
                ));
            }
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(GenerateError::Api(format!(
                    "generation API returned status {code}: {}",
                    body.lines().next().unwrap_or("").trim()
                )));
            }
            Err(err) => {
                return Err(GenerateError::Api(format!("generation API unreachable: {err}")));
            }
        };

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|err| GenerateError::BadFormat(format!("unreadable API response: {err}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerateError::BadFormat("response contained no choices".to_string()))
    }
}

/// [`PostWriter`] that assembles the prompt and parses the model's JSON
/// reply.
pub struct ChatGenerator {
    model: String,
    max_transcript_chars: usize,
    transport: Box<dyn ChatTransport>,
}

impl ChatGenerator {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            model: config.generation_model.clone(),
            max_transcript_chars: config.max_transcript_chars,
            transport: Box::new(HttpChatTransport::new(
                config.generation_api_url.clone(),
                config.generation_api_key.clone(),
            )),
        }
    }

    /// Constructor with an injected transport, used by tests and by callers
    /// pointing at non-HTTP backends.
    pub fn with_transport(
        model: String,
        max_transcript_chars: usize,
        transport: Box<dyn ChatTransport>,
    ) -> Self {
        Self { model, max_transcript_chars, transport }
    }

    fn build_request(&self, transcript: &str, metadata: &VideoMetadata) -> serde_json::Value {
        let transcript = truncate_transcript(transcript, self.max_transcript_chars);
        json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a professional blog writer. Reply with a single JSON \
                                object with the string fields \"title\", \"description\", \
                                \"content\" and \"category\". No other text.",
                },
                {
                    "role": "user",
                    "content": build_prompt(transcript, metadata),
                },
            ],
        })
    }
}

impl PostWriter for ChatGenerator {
    fn generate(
        &self,
        transcript: &str,
        metadata: &VideoMetadata,
    ) -> Result<BlogPost, GenerateError> {
        let request = self.build_request(transcript, metadata);
        let content = self.transport.complete(&request)?;
        parse_blog_post(&content)
    }
}

/// Cuts the transcript to exactly `max_chars` characters when it is
/// longer. Character-based, not byte-based, so multi-byte text never
/// splits a code point.
pub fn truncate_transcript(transcript: &str, max_chars: usize) -> &str {
    match transcript.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &transcript[..byte_index],
        None => transcript,
    }
}

/// Deterministic user prompt from transcript plus metadata. Field order
/// and wording are fixed; no timestamps, ids, or randomness.
fn build_prompt(transcript: &str, metadata: &VideoMetadata) -> String {
    let title = metadata.title.as_deref().unwrap_or("(unknown title)");
    let channel = metadata.channel.as_deref().unwrap_or("(unknown channel)");
    let duration = metadata.duration.as_deref().unwrap_or("(unknown duration)");
    format!(
        "Write a blog post based on the transcript of the YouTube video below.\n\
         Video title: {title}\n\
         Channel: {channel}\n\
         Duration: {duration}\n\n\
         Transcript:\n{transcript}\n"
    )
}

/// Parses the assistant's reply into a [`BlogPost`], tolerating a
/// markdown-fenced JSON block around the object.
fn parse_blog_post(content: &str) -> Result<BlogPost, GenerateError> {
    let stripped = strip_code_fences(content);
    serde_json::from_str(stripped).map_err(|err| {
        GenerateError::BadFormat(format!("expected a JSON blog post object: {err}"))
    })
}

/// Removes a surrounding markdown code fence, with or without a language
/// tag, and returns the inner text.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
