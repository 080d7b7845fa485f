#![forbid(unsafe_code)]

//! Video-to-blog generation pipeline.
//!
//! Given a YouTube URL, the pipeline downloads the best available audio
//! track, transcribes it (locally via Whisper or through a remote HTTPS
//! API), and asks a generative-text API to turn the transcript into a
//! structured blog post. The web layer that authenticates users and
//! persists posts lives elsewhere; this crate only exposes
//! [`pipeline::BlogPipeline`] and the stage building blocks it is wired
//! from.

pub mod config;
pub mod downloader;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod transcriber;

pub use config::{ModelSize, PipelineConfig, TranscriptionStrategy};
pub use downloader::{AudioArtifact, AudioDownloader, VideoMetadata};
pub use error::{DownloadError, ErrorKind, GenerateError, Stage, TranscribeError};
pub use generator::BlogPost;
pub use pipeline::{BlogPipeline, PipelineResult};
