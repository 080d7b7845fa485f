//! Stage-local error types for the blog pipeline.
//!
//! Each pipeline stage owns its own error enum; the orchestrator is the
//! only place where they are flattened into a uniform failure result. The
//! flat [`ErrorKind`] tag survives that flattening so callers can tell a
//! throttled API (worth retrying later) from a removed video (not worth
//! retrying ever) without parsing error strings.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// The three sequential steps of a pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Download,
    Transcribe,
    Generate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Download => "download",
            Stage::Transcribe => "transcribe",
            Stage::Generate => "generate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat error tag carried in failure results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Download,
    Conversion,
    ModelUnavailable,
    CredentialMissing,
    Transcription,
    RateLimit,
    GenerationFormat,
    Generation,
}

/// Failures raised while fetching audio and metadata from the video host.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid video url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported video host: {0}")]
    UnsupportedHost(String),

    #[error("video duration {actual}s exceeds the configured cap of {cap}s")]
    DurationExceeded { actual: i64, cap: u64 },

    #[error("download failed: {message}")]
    Fetch { message: String, permanent: bool },

    #[error("audio conversion failed: {0}")]
    Conversion(String),
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::Conversion(_) => ErrorKind::Conversion,
            _ => ErrorKind::Download,
        }
    }

    /// True when retrying the same URL cannot succeed (bad URL, removed or
    /// private video, operator-imposed cap).
    pub fn is_permanent(&self) -> bool {
        match self {
            DownloadError::Fetch { permanent, .. } => *permanent,
            _ => true,
        }
    }
}

/// Failures raised while turning an audio file into text.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("audio file missing or empty: {}", .0.display())]
    MissingAudio(PathBuf),

    #[error("transcription model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("remote transcription selected but no API key is configured")]
    CredentialMissing,

    #[error("transcription failed: {0}")]
    Engine(String),
}

impl TranscribeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscribeError::ModelUnavailable(_) => ErrorKind::ModelUnavailable,
            TranscribeError::CredentialMissing => ErrorKind::CredentialMissing,
            TranscribeError::MissingAudio(_) | TranscribeError::Engine(_) => {
                ErrorKind::Transcription
            }
        }
    }
}

/// Failures raised while generating the blog post from a transcript.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("content generation selected but no API key is configured")]
    CredentialMissing,

    #[error("content generation rate limited: {0}")]
    RateLimited(String),

    #[error("malformed generation response: {0}")]
    BadFormat(String),

    #[error("content generation request failed: {0}")]
    Api(String),
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::CredentialMissing => ErrorKind::CredentialMissing,
            GenerateError::RateLimited(_) => ErrorKind::RateLimit,
            GenerateError::BadFormat(_) => ErrorKind::GenerationFormat,
            GenerateError::Api(_) => ErrorKind::Generation,
        }
    }
}
