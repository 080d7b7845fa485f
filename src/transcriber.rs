//! Speech-to-text stage.
//!
//! Two interchangeable engines sit behind [`SpeechToText`]: a local
//! Whisper CLI invocation (no network, latency proportional to audio
//! length) and a remote HTTPS transcription API (needs a bearer
//! credential). The configuration's `transcription_strategy` picks one.
//! Either way, a single attempt per invocation; the pipeline does not
//! retry transcription.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;

use crate::config::{PipelineConfig, TranscriptionStrategy};
use crate::error::TranscribeError;

/// How long we are willing to wait on the remote transcription API. Kept
/// generous because processing time scales with audio duration.
const REMOTE_READ_TIMEOUT: Duration = Duration::from_secs(600);

/// Fixed multipart boundary for the remote upload. Audio payloads are
/// binary media, not attacker-chosen text that could embed the marker.
const MULTIPART_BOUNDARY: &str = "blogpipe-7d1e9c4a2f8b";

/// Second pipeline stage: turn an audio file into plain text.
pub trait SpeechToText {
    fn transcribe(&self, audio_path: &Path) -> Result<String, TranscribeError>;
}

/// Builds the transcriber selected by the configuration.
pub fn from_config(config: &PipelineConfig) -> Box<dyn SpeechToText> {
    match config.transcription_strategy {
        TranscriptionStrategy::Local => Box::new(WhisperTranscriber::new(config.clone())),
        TranscriptionStrategy::Remote => Box::new(RemoteTranscriber::new(config.clone())),
    }
}

/// Checks the audio input constraint shared by both engines: the file must
/// exist and be non-empty.
fn check_audio_input(audio_path: &Path) -> Result<(), TranscribeError> {
    match fs::metadata(audio_path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(TranscribeError::MissingAudio(audio_path.to_path_buf())),
    }
}

/// Local engine driving the `whisper` CLI.
pub struct WhisperTranscriber {
    config: PipelineConfig,
}

impl WhisperTranscriber {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Runs `whisper --help` to distinguish "model tooling missing" from a
    /// genuine transcription failure.
    fn ensure_whisper_available(&self) -> Result<(), TranscribeError> {
        let status = Command::new(&self.config.whisper_path)
            .arg("--help")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(_) => Err(TranscribeError::ModelUnavailable(format!(
                "{} is installed but returned a failure status",
                self.config.whisper_path.display()
            ))),
            Err(err) => Err(TranscribeError::ModelUnavailable(format!(
                "{} is not installed or not in PATH: {err}",
                self.config.whisper_path.display()
            ))),
        }
    }
}

impl SpeechToText for WhisperTranscriber {
    fn transcribe(&self, audio_path: &Path) -> Result<String, TranscribeError> {
        check_audio_input(audio_path)?;
        self.ensure_whisper_available()?;

        let output_dir = audio_path
            .parent()
            .ok_or_else(|| TranscribeError::MissingAudio(audio_path.to_path_buf()))?;

        let output = Command::new(&self.config.whisper_path)
            .arg(audio_path)
            .arg("--model")
            .arg(self.config.model_size.as_str())
            .arg("--output_format")
            .arg("txt")
            .arg("--output_dir")
            .arg(output_dir)
            .output()
            .map_err(|err| TranscribeError::Engine(format!("spawning whisper: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.lines().next().unwrap_or("").trim().to_string();
            // Failed weight downloads and checksum mismatches surface here.
            if stderr.contains("model") && (stderr.contains("download") || stderr.contains("SHA256"))
            {
                return Err(TranscribeError::ModelUnavailable(message));
            }
            return Err(TranscribeError::Engine(format!(
                "whisper exited with {}: {message}",
                output.status
            )));
        }

        let transcript_path = audio_path.with_extension("txt");
        let text = fs::read_to_string(&transcript_path).map_err(|err| {
            TranscribeError::Engine(format!(
                "whisper produced no transcript at {}: {err}",
                transcript_path.display()
            ))
        })?;

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(TranscribeError::Engine(
                "transcription produced no text".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Payload returned by the remote transcription endpoint.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Remote engine uploading the audio with a bearer credential.
///
/// The request follows the OpenAI audio-transcription contract the
/// default endpoint expects: `multipart/form-data` with a `model` field
/// and a `file` part. The file is streamed from disk rather than read
/// into memory, since an hour of audio is easily hundreds of megabytes.
pub struct RemoteTranscriber {
    config: PipelineConfig,
    agent: ureq::Agent,
}

impl RemoteTranscriber {
    pub fn new(config: PipelineConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(REMOTE_READ_TIMEOUT)
            .build();
        Self { config, agent }
    }
}

impl SpeechToText for RemoteTranscriber {
    fn transcribe(&self, audio_path: &Path) -> Result<String, TranscribeError> {
        check_audio_input(audio_path)?;

        let api_key = self
            .config
            .transcription_api_key
            .as_deref()
            .ok_or(TranscribeError::CredentialMissing)?;

        let file = fs::File::open(audio_path)
            .map_err(|err| TranscribeError::Engine(format!("opening audio file: {err}")))?;
        let file_len = file
            .metadata()
            .map_err(|err| TranscribeError::Engine(format!("inspecting audio file: {err}")))?
            .len();

        let filename = audio_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio");
        let prologue = multipart_prologue(
            MULTIPART_BOUNDARY,
            &self.config.transcription_model,
            filename,
            content_type_for(audio_path),
        );
        let epilogue = multipart_epilogue(MULTIPART_BOUNDARY);
        let body_len = prologue.len() as u64 + file_len + epilogue.len() as u64;
        let body = Cursor::new(prologue)
            .chain(file)
            .chain(Cursor::new(epilogue));

        let response = self
            .agent
            .post(&self.config.transcription_api_url)
            .set("Authorization", &format!("Bearer {api_key}"))
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .set("Content-Length", &body_len.to_string())
            .send(body);

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(TranscribeError::Engine(format!(
                    "transcription API returned status {code}: {}",
                    body.lines().next().unwrap_or("").trim()
                )));
            }
            Err(err) => {
                return Err(TranscribeError::Engine(format!(
                    "transcription API unreachable: {err}"
                )));
            }
        };

        let parsed: TranscriptionResponse = response
            .into_json()
            .map_err(|err| TranscribeError::Engine(format!("unreadable API response: {err}")))?;

        let text = parsed.text.trim().to_string();
        if text.is_empty() {
            return Err(TranscribeError::Engine(
                "transcription produced no text".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Everything preceding the file bytes in the multipart body: the `model`
/// field and the `file` part headers.
fn multipart_prologue(
    boundary: &str,
    model: &str,
    filename: &str,
    content_type: &str,
) -> Vec<u8> {
    format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"model\"\r\n\
         \r\n\
         {model}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\
         \r\n"
    )
    .into_bytes()
}

/// Closing boundary after the file bytes.
fn multipart_epilogue(boundary: &str) -> Vec<u8> {
    format!("\r\n--{boundary}--\r\n").into_bytes()
}

/// Content type declared for the uploaded file part, derived from the
/// file extension.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") | Some("opus") => "audio/ogg",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}
