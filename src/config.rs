//! Pipeline configuration.
//!
//! Settings are read from a plain `KEY=VALUE` env file so the web layer and
//! the CLI share one format. Every field has a sensible default; the only
//! values an operator normally has to provide are the API credentials.

use anyhow::{Context, Result, anyhow};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/blogpipe-env";
pub const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 12_000;
pub const DEFAULT_GENERATION_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";
/// The default transcription endpoint speaks the OpenAI audio contract:
/// a `multipart/form-data` POST with `file` and `model` parts. The remote
/// transcriber builds that body; point this at another URL only if it
/// accepts the same request shape.
pub const DEFAULT_TRANSCRIPTION_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Where transcription happens: a locally installed Whisper model or a
/// remote HTTPS API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriptionStrategy {
    #[default]
    Local,
    Remote,
}

impl TranscriptionStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Some(TranscriptionStrategy::Local),
            "remote" => Some(TranscriptionStrategy::Remote),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TranscriptionStrategy::Local => "local",
            TranscriptionStrategy::Remote => "remote",
        }
    }
}

/// Whisper model selector. Larger models are slower and more accurate;
/// `base` is the recommended balance for blog-length videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "tiny" => Some(ModelSize::Tiny),
            "base" => Some(ModelSize::Base),
            "small" => Some(ModelSize::Small),
            "medium" => Some(ModelSize::Medium),
            "large" => Some(ModelSize::Large),
            _ => None,
        }
    }

    /// Name passed to the Whisper CLI's `--model` flag.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }
}

/// Raw, partially filled view of the env file. Everything is optional so a
/// minimal file (or none at all) still resolves to a usable configuration.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub transcription_strategy: Option<TranscriptionStrategy>,
    pub model_size: Option<ModelSize>,
    pub max_transcript_chars: Option<usize>,
    pub temp_dir: Option<PathBuf>,
    pub transcription_api_url: Option<String>,
    pub transcription_api_key: Option<String>,
    pub transcription_model: Option<String>,
    pub generation_api_url: Option<String>,
    pub generation_api_key: Option<String>,
    pub generation_model: Option<String>,
    pub max_duration_secs: Option<u64>,
    pub ytdlp_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub whisper_path: Option<PathBuf>,
}

/// Fully resolved configuration handed to the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub transcription_strategy: TranscriptionStrategy,
    pub model_size: ModelSize,
    /// Transcripts longer than this are truncated to exactly this many
    /// characters before prompt assembly. Truncation, not summarization:
    /// the policy is deliberately deterministic.
    pub max_transcript_chars: usize,
    /// Parent directory for per-invocation scratch directories.
    pub temp_dir: PathBuf,
    pub transcription_api_url: String,
    pub transcription_api_key: Option<String>,
    /// Model name sent as the `model` part of the remote transcription
    /// request.
    pub transcription_model: String,
    pub generation_api_url: String,
    pub generation_api_key: Option<String>,
    pub generation_model: String,
    /// Optional operator cap; videos longer than this are rejected before
    /// any audio is downloaded.
    pub max_duration_secs: Option<u64>,
    pub ytdlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub whisper_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            transcription_strategy: TranscriptionStrategy::default(),
            model_size: ModelSize::default(),
            max_transcript_chars: DEFAULT_MAX_TRANSCRIPT_CHARS,
            temp_dir: env::temp_dir(),
            transcription_api_url: DEFAULT_TRANSCRIPTION_API_URL.to_string(),
            transcription_api_key: None,
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            generation_api_url: DEFAULT_GENERATION_API_URL.to_string(),
            generation_api_key: None,
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            max_duration_secs: None,
            ytdlp_path: PathBuf::from("yt-dlp"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            whisper_path: PathBuf::from("whisper"),
        }
    }
}

/// Parses the env file at `path`. Returns `Ok(None)` when the file does not
/// exist so callers can fall back to defaults.
pub fn read_env_config(path: &Path) -> Result<Option<EnvConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let mut cfg = EnvConfig::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value_raw)) = trimmed.split_once('=') {
            let value = value_raw.trim().trim_matches('"');
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "TRANSCRIPTION_STRATEGY" => {
                    cfg.transcription_strategy =
                        Some(TranscriptionStrategy::parse(value).ok_or_else(|| {
                            anyhow!("Unknown TRANSCRIPTION_STRATEGY {value:?} in {}", path.display())
                        })?);
                }
                "WHISPER_MODEL_SIZE" => {
                    cfg.model_size = Some(ModelSize::parse(value).ok_or_else(|| {
                        anyhow!("Unknown WHISPER_MODEL_SIZE {value:?} in {}", path.display())
                    })?);
                }
                "MAX_TRANSCRIPT_CHARS" => {
                    let chars: usize = value.parse().with_context(|| {
                        format!("Parsing MAX_TRANSCRIPT_CHARS from {}", path.display())
                    })?;
                    cfg.max_transcript_chars = Some(chars);
                }
                "TEMP_DIR" => cfg.temp_dir = Some(PathBuf::from(value)),
                "TRANSCRIPTION_API_URL" => {
                    cfg.transcription_api_url = Some(value.to_string());
                }
                "TRANSCRIPTION_API_KEY" => {
                    cfg.transcription_api_key = Some(value.to_string());
                }
                "TRANSCRIPTION_MODEL" => {
                    cfg.transcription_model = Some(value.to_string());
                }
                "GENERATION_API_URL" => cfg.generation_api_url = Some(value.to_string()),
                "GENERATION_API_KEY" => cfg.generation_api_key = Some(value.to_string()),
                "GENERATION_MODEL" => cfg.generation_model = Some(value.to_string()),
                "MAX_VIDEO_DURATION_SECS" => {
                    let secs: u64 = value.parse().with_context(|| {
                        format!("Parsing MAX_VIDEO_DURATION_SECS from {}", path.display())
                    })?;
                    cfg.max_duration_secs = Some(secs);
                }
                "YTDLP_PATH" => cfg.ytdlp_path = Some(PathBuf::from(value)),
                "FFMPEG_PATH" => cfg.ffmpeg_path = Some(PathBuf::from(value)),
                "WHISPER_PATH" => cfg.whisper_path = Some(PathBuf::from(value)),
                _ => {}
            }
        }
    }
    Ok(Some(cfg))
}

/// Loads the pipeline configuration from the default env file location.
pub fn load_config() -> Result<PipelineConfig> {
    load_config_from(Path::new(DEFAULT_CONFIG_PATH))
}

/// Loads the configuration from `path`, filling gaps with defaults. A
/// missing file resolves to the full default configuration.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let cfg = read_env_config(path.as_ref())?.unwrap_or_default();
    let defaults = PipelineConfig::default();

    Ok(PipelineConfig {
        transcription_strategy: cfg
            .transcription_strategy
            .unwrap_or(defaults.transcription_strategy),
        model_size: cfg.model_size.unwrap_or(defaults.model_size),
        max_transcript_chars: cfg
            .max_transcript_chars
            .unwrap_or(defaults.max_transcript_chars),
        temp_dir: cfg.temp_dir.unwrap_or(defaults.temp_dir),
        transcription_api_url: cfg
            .transcription_api_url
            .unwrap_or(defaults.transcription_api_url),
        transcription_api_key: cfg.transcription_api_key,
        transcription_model: cfg.transcription_model.unwrap_or(defaults.transcription_model),
        generation_api_url: cfg.generation_api_url.unwrap_or(defaults.generation_api_url),
        generation_api_key: cfg.generation_api_key,
        generation_model: cfg.generation_model.unwrap_or(defaults.generation_model),
        max_duration_secs: cfg.max_duration_secs,
        ytdlp_path: cfg.ytdlp_path.unwrap_or(defaults.ytdlp_path),
        ffmpeg_path: cfg.ffmpeg_path.unwrap_or(defaults.ffmpeg_path),
        whisper_path: cfg.whisper_path.unwrap_or(defaults.whisper_path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn read_env_config_extracts_strategy_and_key() {
        let cfg = make_config(
            "TRANSCRIPTION_STRATEGY=\"remote\"\nTRANSCRIPTION_API_KEY=\"sk-123\"\n# comment\n",
        );
        let parsed = read_env_config(cfg.path()).unwrap().unwrap();
        assert_eq!(parsed.transcription_strategy, Some(TranscriptionStrategy::Remote));
        assert_eq!(parsed.transcription_api_key.as_deref(), Some("sk-123"));
        assert!(parsed.transcription_model.is_none());
        assert!(parsed.generation_api_key.is_none());
    }

    #[test]
    fn load_config_defaults_missing_fields() {
        let cfg = make_config("GENERATION_API_KEY=\"sk-xyz\"\nMAX_TRANSCRIPT_CHARS=\"500\"\n");
        let resolved = load_config_from(cfg.path()).unwrap();
        assert_eq!(resolved.transcription_strategy, TranscriptionStrategy::Local);
        assert_eq!(resolved.model_size, ModelSize::Base);
        assert_eq!(resolved.max_transcript_chars, 500);
        assert_eq!(resolved.generation_api_key.as_deref(), Some("sk-xyz"));
        assert_eq!(resolved.generation_model, DEFAULT_GENERATION_MODEL);
        assert!(resolved.max_duration_secs.is_none());
    }

    #[test]
    fn load_config_missing_file_uses_defaults() {
        let resolved = load_config_from("/nonexistent/blogpipe-env").unwrap();
        assert_eq!(resolved.max_transcript_chars, DEFAULT_MAX_TRANSCRIPT_CHARS);
        assert_eq!(resolved.ytdlp_path, PathBuf::from("yt-dlp"));
    }

    #[test]
    fn read_env_config_rejects_unknown_model_size() {
        let cfg = make_config("WHISPER_MODEL_SIZE=\"gigantic\"\n");
        assert!(read_env_config(cfg.path()).is_err());
    }

    #[test]
    fn duration_cap_and_tool_paths_parse() {
        let cfg = make_config(
            "MAX_VIDEO_DURATION_SECS=3600\nYTDLP_PATH=/opt/bin/yt-dlp\nWHISPER_MODEL_SIZE=small\n\
             TRANSCRIPTION_MODEL=whisper-large-v3\n",
        );
        let resolved = load_config_from(cfg.path()).unwrap();
        assert_eq!(resolved.max_duration_secs, Some(3600));
        assert_eq!(resolved.ytdlp_path, PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(resolved.model_size, ModelSize::Small);
        assert_eq!(resolved.transcription_model, "whisper-large-v3");
    }
}
