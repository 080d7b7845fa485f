//! Pipeline orchestration.
//!
//! [`BlogPipeline`] sequences download, transcription and generation,
//! stops at the first failing stage, and flattens every stage error into
//! a uniform [`PipelineResult`]. Nothing below this boundary escapes as a
//! raw error, and the audio artifact is removed on every exit path: it is
//! owned by `process_video`'s scope, so dropping it (normally or on an
//! early return) deletes the scratch directory exactly once.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::downloader::{AudioArtifact, AudioDownloader, MediaSource, VideoMetadata};
use crate::error::{DownloadError, ErrorKind, GenerateError, Stage, TranscribeError};
use crate::generator::{BlogPost, ChatGenerator, PostWriter};
use crate::transcriber::{self, SpeechToText};

/// Uniform outcome of one pipeline invocation, serializable for the web
/// caller. Failures carry the stage, a flat error kind tag, and whether
/// the caller may reasonably retry later.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    Success {
        blog_post: BlogPost,
        video_metadata: VideoMetadata,
    },
    Failure {
        stage: Stage,
        kind: ErrorKind,
        transient: bool,
        error: String,
    },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success { .. })
    }
}

impl From<DownloadError> for PipelineResult {
    fn from(err: DownloadError) -> Self {
        PipelineResult::Failure {
            stage: Stage::Download,
            kind: err.kind(),
            transient: !err.is_permanent(),
            error: err.to_string(),
        }
    }
}

impl From<TranscribeError> for PipelineResult {
    fn from(err: TranscribeError) -> Self {
        PipelineResult::Failure {
            stage: Stage::Transcribe,
            kind: err.kind(),
            transient: false,
            error: err.to_string(),
        }
    }
}

impl From<GenerateError> for PipelineResult {
    fn from(err: GenerateError) -> Self {
        let transient = matches!(err, GenerateError::RateLimited(_));
        PipelineResult::Failure {
            stage: Stage::Generate,
            kind: err.kind(),
            transient,
            error: err.to_string(),
        }
    }
}

/// The dependency-injected pipeline object. Holds one boxed implementation
/// per stage; stateless across invocations, so one instance may serve
/// concurrent callers.
pub struct BlogPipeline {
    downloader: Box<dyn MediaSource>,
    transcriber: Box<dyn SpeechToText>,
    generator: Box<dyn PostWriter>,
}

impl BlogPipeline {
    /// Wires the production stages from configuration.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            downloader: Box::new(AudioDownloader::new(config.clone())),
            transcriber: transcriber::from_config(&config),
            generator: Box::new(ChatGenerator::from_config(&config)),
        }
    }

    /// Assembles a pipeline from explicit stage implementations.
    pub fn new(
        downloader: Box<dyn MediaSource>,
        transcriber: Box<dyn SpeechToText>,
        generator: Box<dyn PostWriter>,
    ) -> Self {
        Self { downloader, transcriber, generator }
    }

    /// Runs the full pipeline for one URL: download, transcribe, generate.
    /// Each stage runs to completion before the next starts; the first
    /// failure short-circuits the rest.
    pub fn process_video(&self, url: &str) -> PipelineResult {
        let (artifact, metadata) = match self.downloader.fetch(url) {
            Ok(fetched) => fetched,
            Err(err) => return err.into(),
        };

        // `artifact` is dropped on every path out of this function, which
        // removes the scratch directory.
        let transcript = match self.transcriber.transcribe(artifact.path()) {
            Ok(transcript) => transcript,
            Err(err) => return err.into(),
        };

        let blog_post = match self.generator.generate(&transcript, &metadata) {
            Ok(post) => post,
            Err(err) => return err.into(),
        };

        drop(artifact);
        PipelineResult::Success { blog_post, video_metadata: metadata }
    }

    /// Audio-only capability: download without transcribing or generating.
    /// The caller owns the returned artifact and its cleanup.
    pub fn download_audio(&self, url: &str) -> Result<AudioArtifact, DownloadError> {
        self.downloader.download_audio(url)
    }
}
