//! Audio and metadata acquisition from the video host.
//!
//! All host interaction goes through `yt-dlp` as a subprocess: one
//! `--dump-single-json` call for metadata and one download call for the
//! best available audio track. Each invocation gets its own scratch
//! directory under the configured temp dir, so concurrent pipeline runs
//! never share a path, and dropping the [`AudioArtifact`] removes the
//! whole directory on every exit path.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use url::Url;

use crate::config::{PipelineConfig, TranscriptionStrategy};
use crate::error::DownloadError;

/// How many times a failed audio download is attempted in total. Permanent
/// failures (private/removed videos) are never retried.
const DOWNLOAD_ATTEMPTS: u32 = 2;

/// Containers that remote transcription APIs commonly reject; these get a
/// best-effort conversion to 16 kHz mono WAV after download.
const CONVERT_EXTENSIONS: [&str; 2] = ["webm", "opus"];

/// Best-effort description of the source video, shaped after what the blog
/// post stores: a display title, the channel name, and a human-readable
/// duration such as `10:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
}

/// A transient audio file owned by exactly one pipeline invocation.
///
/// The backing scratch directory is deleted when the artifact is dropped,
/// whether the invocation succeeded or failed. Callers that want to keep
/// the audio (the audio-only CLI mode) must move it out with
/// [`AudioArtifact::persist_to`] before the artifact goes away.
#[derive(Debug)]
pub struct AudioArtifact {
    dir: TempDir,
    path: PathBuf,
    byte_size: u64,
}

impl AudioArtifact {
    /// Wraps an audio file living inside `dir`. The directory's lifetime
    /// becomes the artifact's lifetime.
    pub fn from_dir(dir: TempDir, path: PathBuf) -> std::io::Result<Self> {
        let byte_size = fs::metadata(&path)?.len();
        Ok(Self { dir, path, byte_size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Scratch directory the audio (and any stage by-products such as
    /// transcript text files) live in.
    pub fn scratch_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Copies the audio out of the scratch directory, then releases the
    /// artifact. Copy-then-drop rather than rename so `dest` may be on a
    /// different filesystem than the temp dir.
    pub fn persist_to(self, dest: &Path) -> std::io::Result<PathBuf> {
        fs::copy(&self.path, dest)?;
        Ok(dest.to_path_buf())
    }

    /// Swaps the artifact's file for a converted sibling, removing the
    /// original.
    fn replace_file(&mut self, new_path: PathBuf) -> std::io::Result<()> {
        let byte_size = fs::metadata(&new_path)?.len();
        fs::remove_file(&self.path)?;
        self.path = new_path;
        self.byte_size = byte_size;
        Ok(())
    }
}

/// First pipeline stage: fetch audio and metadata by URL.
pub trait MediaSource {
    fn fetch(&self, url: &str) -> Result<(AudioArtifact, VideoMetadata), DownloadError>;

    /// Audio-only variant, kept as a first-class operation for callers that
    /// do not need the rest of the pipeline.
    fn download_audio(&self, url: &str) -> Result<AudioArtifact, DownloadError> {
        self.fetch(url).map(|(artifact, _)| artifact)
    }
}

/// Subset of yt-dlp's `--dump-single-json` payload. Everything is optional
/// because older or region-locked videos may lack metadata.
#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: Option<String>,
    fulltitle: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<i64>,
    #[serde(rename = "duration_string")]
    duration_string: Option<String>,
}

/// `yt-dlp`-backed [`MediaSource`].
pub struct AudioDownloader {
    config: PipelineConfig,
}

impl AudioDownloader {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Runs `yt-dlp --dump-single-json` and maps the payload into
    /// [`VideoMetadata`].
    pub fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
        let parsed = parse_video_url(url)?;

        let output = Command::new(&self.config.ytdlp_path)
            .arg("--dump-single-json")
            .arg("--skip-download")
            .arg("--no-warnings")
            .arg("--no-progress")
            .arg("--no-playlist")
            .arg(parsed.as_str())
            .output()
            .map_err(|err| DownloadError::Fetch {
                message: format!("yt-dlp is not installed or not in PATH: {err}"),
                permanent: true,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::Fetch {
                message: format!("metadata fetch failed for {url}: {}", first_line(&stderr)),
                permanent: is_permanent_failure(&stderr),
            });
        }

        let info: VideoInfo =
            serde_json::from_slice(&output.stdout).map_err(|err| DownloadError::Fetch {
                message: format!("unreadable metadata JSON for {url}: {err}"),
                permanent: true,
            })?;

        Ok(build_metadata(info))
    }

    /// Downloads the best available audio track into a fresh scratch
    /// directory and returns the owning artifact.
    ///
    /// A bounded retry (one extra attempt) covers transient host hiccups;
    /// private or removed videos fail immediately. When the host hands back
    /// a container the remote transcription API would reject, the audio is
    /// converted to WAV via ffmpeg; a missing or failing ffmpeg is only
    /// fatal if the remote strategy actually needs the conversion.
    pub fn download_audio_track(&self, url: &str) -> Result<AudioArtifact, DownloadError> {
        let parsed = parse_video_url(url)?;

        if self.config.max_duration_secs.is_some() {
            self.enforce_duration_cap(&self.fetch_metadata(url)?)?;
        }

        self.download_into_scratch(&parsed)
    }

    fn download_into_scratch(&self, parsed: &Url) -> Result<AudioArtifact, DownloadError> {
        let dir = tempfile::Builder::new()
            .prefix("blogpipe-")
            .tempdir_in(&self.config.temp_dir)
            .map_err(|err| DownloadError::Fetch {
                message: format!(
                    "creating scratch directory under {}: {err}",
                    self.config.temp_dir.display()
                ),
                permanent: true,
            })?;

        self.run_audio_download(parsed, dir.path())?;

        let audio_path = locate_audio_file(dir.path())?;
        let mut artifact = AudioArtifact::from_dir(dir, audio_path).map_err(|err| {
            DownloadError::Fetch {
                message: format!("inspecting downloaded audio: {err}"),
                permanent: true,
            }
        })?;

        self.maybe_convert(&mut artifact)?;
        Ok(artifact)
    }

    fn enforce_duration_cap(&self, metadata: &VideoMetadata) -> Result<(), DownloadError> {
        if let Some(cap) = self.config.max_duration_secs
            && let Some(actual) = metadata.duration_secs
            && actual > cap as i64
        {
            return Err(DownloadError::DurationExceeded { actual, cap });
        }
        Ok(())
    }

    fn run_audio_download(&self, url: &Url, scratch: &Path) -> Result<(), DownloadError> {
        let output_template = scratch.join("audio.%(ext)s");
        let mut last_error = String::new();

        for _attempt in 1..=DOWNLOAD_ATTEMPTS {
            let output = Command::new(&self.config.ytdlp_path)
                .arg("--format")
                .arg("bestaudio/best")
                .arg("--no-playlist")
                .arg("--no-warnings")
                .arg("--no-progress")
                .arg("--output")
                .arg(&output_template)
                .arg(url.as_str())
                .output()
                .map_err(|err| DownloadError::Fetch {
                    message: format!("yt-dlp is not installed or not in PATH: {err}"),
                    permanent: true,
                })?;

            if output.status.success() {
                return Ok(());
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_permanent_failure(&stderr) {
                return Err(DownloadError::Fetch {
                    message: format!("download failed for {url}: {}", first_line(&stderr)),
                    permanent: true,
                });
            }
            last_error = first_line(&stderr).to_string();
        }

        Err(DownloadError::Fetch {
            message: format!(
                "download failed for {url} after {DOWNLOAD_ATTEMPTS} attempts: {last_error}"
            ),
            permanent: false,
        })
    }

    /// Converts containers the remote transcription API rejects. Keeping
    /// the compressed original is acceptable for the local strategy, since
    /// Whisper decodes it with its own ffmpeg.
    fn maybe_convert(&self, artifact: &mut AudioArtifact) -> Result<(), DownloadError> {
        let ext = artifact
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !CONVERT_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(());
        }

        let conversion_required =
            self.config.transcription_strategy == TranscriptionStrategy::Remote;
        let wav_path = artifact.scratch_dir().join("audio.wav");

        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(artifact.path())
            .arg("-ar")
            .arg("16000")
            .arg("-ac")
            .arg("1")
            .arg(&wav_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        let failure = match result {
            Ok(status) if status.success() => {
                return artifact.replace_file(wav_path).map_err(|err| {
                    DownloadError::Conversion(format!("swapping in converted audio: {err}"))
                });
            }
            Ok(status) => format!("ffmpeg exited with {status}"),
            Err(err) => format!("ffmpeg is not installed or not in PATH: {err}"),
        };

        if conversion_required {
            Err(DownloadError::Conversion(failure))
        } else {
            Ok(())
        }
    }
}

impl MediaSource for AudioDownloader {
    fn fetch(&self, url: &str) -> Result<(AudioArtifact, VideoMetadata), DownloadError> {
        let parsed = parse_video_url(url)?;
        let metadata = self.fetch_metadata(url)?;
        self.enforce_duration_cap(&metadata)?;
        let artifact = self.download_into_scratch(&parsed)?;
        Ok((artifact, metadata))
    }

    fn download_audio(&self, url: &str) -> Result<AudioArtifact, DownloadError> {
        self.download_audio_track(url)
    }
}

/// Validates that `url` is a well-formed HTTP(S) URL pointing at a YouTube
/// video we can extract an id from.
pub fn parse_video_url(url: &str) -> Result<Url, DownloadError> {
    let parsed = Url::parse(url).map_err(|err| DownloadError::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        })?;

    if !is_supported_host(host) {
        return Err(DownloadError::UnsupportedHost(host.to_string()));
    }

    if video_id(&parsed).is_none() {
        return Err(DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: "no video id in URL".to_string(),
        });
    }

    Ok(parsed)
}

pub fn is_supported_host(host: &str) -> bool {
    let h = host.to_ascii_lowercase();
    h == "youtube.com" || h == "youtu.be" || h.ends_with(".youtube.com")
}

/// Extracts the video id from the URL forms YouTube serves:
/// `watch?v=<id>`, `youtu.be/<id>`, `/shorts/<id>`, `/embed/<id>`.
pub fn video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    if !is_supported_host(host) {
        return None;
    }

    if host.eq_ignore_ascii_case("youtu.be") {
        let seg = url.path_segments()?.next()?.trim();
        if !seg.is_empty() {
            return Some(seg.to_string());
        }
    }

    if url.path().starts_with("/watch") {
        for (key, value) in url.query_pairs() {
            if key == "v" && !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }

    if let Some(mut segs) = url.path_segments() {
        let first = segs.next().unwrap_or("");
        let second = segs.next().unwrap_or("");
        if (first == "shorts" || first == "embed" || first == "live") && !second.trim().is_empty() {
            return Some(second.to_string());
        }
    }

    None
}

fn build_metadata(info: VideoInfo) -> VideoMetadata {
    let title = info
        .fulltitle
        .or(info.title)
        .filter(|t| !t.is_empty());
    let channel = info.channel.or(info.uploader).filter(|c| !c.is_empty());
    let duration = info
        .duration_string
        .or_else(|| info.duration.map(format_duration));

    VideoMetadata {
        title,
        channel,
        duration,
        duration_secs: info.duration,
    }
}

/// Renders durations as `H:MM:SS` or `M:SS` for short clips.
pub fn format_duration(duration: i64) -> String {
    let hours = duration / 3600;
    let minutes = (duration % 3600) / 60;
    let seconds = duration % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Failure modes no amount of retrying fixes, as yt-dlp reports them.
fn is_permanent_failure(stderr: &str) -> bool {
    const MARKERS: [&str; 6] = [
        "Private video",
        "Video unavailable",
        "has been removed",
        "This video is not available",
        "Sign in to confirm your age",
        "account associated with this video has been terminated",
    ];
    MARKERS.iter().any(|marker| stderr.contains(marker))
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

/// Finds the file the `audio.%(ext)s` output template produced.
fn locate_audio_file(scratch: &Path) -> Result<PathBuf, DownloadError> {
    let entries = fs::read_dir(scratch).map_err(|err| DownloadError::Fetch {
        message: format!("reading scratch directory {}: {err}", scratch.display()),
        permanent: true,
    })?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with("audio.") {
            return Ok(entry.path());
        }
    }

    Err(DownloadError::Fetch {
        message: format!("yt-dlp reported success but produced no audio file in {}", scratch.display()),
        permanent: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use std::fs;
    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn config_with(temp_dir: &Path, ytdlp: &Path) -> PipelineConfig {
        PipelineConfig {
            temp_dir: temp_dir.to_path_buf(),
            ytdlp_path: ytdlp.to_path_buf(),
            ..PipelineConfig::default()
        }
    }

    #[cfg(unix)]
    fn install_stub(dir: &Path, name: &str, script: &str) -> PathBuf {
        let script_path = dir.join(name);
        fs::write(&script_path, script).unwrap();
        let mut perms = fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms).unwrap();
        script_path
    }

    /// Stub that answers `--dump-single-json` with fixed metadata and
    /// otherwise writes an m4a file to the `--output` template.
    #[cfg(unix)]
    const YTDLP_STUB: &str = r#"#!/usr/bin/env bash
set -euo pipefail
prev=""
output=""
for arg in "$@"; do
    if [[ "$prev" == "--output" ]]; then
        output="$arg"
    fi
    prev="$arg"
done
if [[ " $* " == *" --dump-single-json "* ]]; then
cat <<'JSON'
{
  "id": "abc123",
  "fulltitle": "Alpha Title",
  "channel": "Alpha Channel",
  "duration": 600,
  "duration_string": "10:00"
}
JSON
exit 0
fi
dest="${output//'%(ext)s'/m4a}"
printf 'fake audio bytes' > "$dest"
exit 0
"#;

    #[test]
    fn rejects_syntactically_invalid_urls() {
        assert!(matches!(
            parse_video_url("not a url"),
            Err(DownloadError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_video_url("ftp://youtube.com/watch?v=abc"),
            Err(DownloadError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_video_url("https://example.com/video/abc123"),
            Err(DownloadError::UnsupportedHost(_))
        ));
        assert!(matches!(
            parse_video_url("https://www.youtube.com/feed/library"),
            Err(DownloadError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn extracts_video_ids_from_known_url_shapes() {
        let cases = [
            ("https://www.youtube.com/watch?v=skMzCAga-dg", "skMzCAga-dg"),
            ("https://youtu.be/skMzCAga-dg", "skMzCAga-dg"),
            ("https://www.youtube.com/shorts/xyz789", "xyz789"),
            ("https://www.youtube.com/embed/xyz789", "xyz789"),
        ];
        for (url, expected) in cases {
            let parsed = parse_video_url(url).unwrap();
            assert_eq!(video_id(&parsed).as_deref(), Some(expected), "{url}");
        }
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(600), "10:00");
        assert_eq!(format_duration(3661), "1:01:01");
    }

    #[test]
    fn classifies_permanent_failures() {
        assert!(is_permanent_failure("ERROR: Private video"));
        assert!(is_permanent_failure("ERROR: Video unavailable"));
        assert!(!is_permanent_failure("ERROR: connection timed out"));
    }

    #[test]
    fn metadata_prefers_fulltitle_and_formats_duration() {
        let info = VideoInfo {
            title: Some("short".into()),
            fulltitle: Some("Full Title".into()),
            channel: None,
            uploader: Some("Uploader".into()),
            duration: Some(90),
            duration_string: None,
        };
        let metadata = build_metadata(info);
        assert_eq!(metadata.title.as_deref(), Some("Full Title"));
        assert_eq!(metadata.channel.as_deref(), Some("Uploader"));
        assert_eq!(metadata.duration.as_deref(), Some("1:30"));
        assert_eq!(metadata.duration_secs, Some(90));
    }

    #[cfg(unix)]
    #[test]
    fn fetch_metadata_parses_stub_payload() {
        let dir = tempdir().unwrap();
        let stub = install_stub(dir.path(), "yt-dlp", YTDLP_STUB);
        let downloader = AudioDownloader::new(config_with(dir.path(), &stub));

        let metadata = downloader
            .fetch_metadata("https://www.youtube.com/watch?v=abc123")
            .unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Alpha Title"));
        assert_eq!(metadata.channel.as_deref(), Some("Alpha Channel"));
        assert_eq!(metadata.duration.as_deref(), Some("10:00"));
        assert_eq!(metadata.duration_secs, Some(600));
    }

    #[cfg(unix)]
    #[test]
    fn download_produces_artifact_and_drop_cleans_up() {
        let dir = tempdir().unwrap();
        let stub = install_stub(dir.path(), "yt-dlp", YTDLP_STUB);
        let downloader = AudioDownloader::new(config_with(dir.path(), &stub));

        let artifact = downloader
            .download_audio_track("https://www.youtube.com/watch?v=abc123")
            .unwrap();
        let audio_path = artifact.path().to_path_buf();
        assert!(audio_path.exists());
        assert_eq!(artifact.byte_size(), "fake audio bytes".len() as u64);

        drop(artifact);
        assert!(!audio_path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn duration_cap_rejects_long_videos_before_download() {
        let dir = tempdir().unwrap();
        let stub = install_stub(dir.path(), "yt-dlp", YTDLP_STUB);
        let mut config = config_with(dir.path(), &stub);
        config.max_duration_secs = Some(60);
        let downloader = AudioDownloader::new(config);

        let err = downloader
            .fetch("https://www.youtube.com/watch?v=abc123")
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::DurationExceeded { actual: 600, cap: 60 }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn permanent_failures_are_not_retried() {
        let dir = tempdir().unwrap();
        let counter = dir.path().join("calls");
        let script = format!(
            "#!/usr/bin/env bash\necho x >> {}\necho 'ERROR: Private video' >&2\nexit 1\n",
            counter.display()
        );
        let stub = install_stub(dir.path(), "yt-dlp", &script);
        let downloader = AudioDownloader::new(config_with(dir.path(), &stub));

        let err = downloader
            .download_audio_track("https://www.youtube.com/watch?v=abc123")
            .unwrap_err();
        assert!(err.is_permanent());
        let calls = fs::read_to_string(&counter).unwrap();
        assert_eq!(calls.lines().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn transient_failures_get_one_retry() {
        let dir = tempdir().unwrap();
        let counter = dir.path().join("calls");
        let script = format!(
            "#!/usr/bin/env bash\necho x >> {}\necho 'ERROR: connection timed out' >&2\nexit 1\n",
            counter.display()
        );
        let stub = install_stub(dir.path(), "yt-dlp", &script);
        let downloader = AudioDownloader::new(config_with(dir.path(), &stub));

        let err = downloader
            .download_audio_track("https://www.youtube.com/watch?v=abc123")
            .unwrap_err();
        assert!(!err.is_permanent());
        let calls = fs::read_to_string(&counter).unwrap();
        assert_eq!(calls.lines().count(), DOWNLOAD_ATTEMPTS as usize);
    }

    /// Stub that hands back a webm container, which triggers the
    /// conversion path.
    #[cfg(unix)]
    const YTDLP_WEBM_STUB: &str = r#"#!/usr/bin/env bash
set -euo pipefail
prev=""
output=""
for arg in "$@"; do
    if [[ "$prev" == "--output" ]]; then
        output="$arg"
    fi
    prev="$arg"
done
dest="${output//'%(ext)s'/webm}"
printf 'opus-in-webm' > "$dest"
exit 0
"#;

    #[cfg(unix)]
    #[test]
    fn failed_conversion_is_not_fatal_for_local_strategy() {
        let dir = tempdir().unwrap();
        let stub = install_stub(dir.path(), "yt-dlp", YTDLP_WEBM_STUB);
        let mut config = config_with(dir.path(), &stub);
        config.ffmpeg_path = PathBuf::from("/nonexistent/ffmpeg");
        let downloader = AudioDownloader::new(config);

        let artifact = downloader
            .download_audio_track("https://www.youtube.com/watch?v=abc123")
            .unwrap();
        assert!(artifact.path().to_string_lossy().ends_with("audio.webm"));
    }

    #[cfg(unix)]
    #[test]
    fn failed_conversion_is_fatal_for_remote_strategy() {
        let dir = tempdir().unwrap();
        let stub = install_stub(dir.path(), "yt-dlp", YTDLP_WEBM_STUB);
        let mut config = config_with(dir.path(), &stub);
        config.transcription_strategy = TranscriptionStrategy::Remote;
        config.ffmpeg_path = PathBuf::from("/nonexistent/ffmpeg");
        let downloader = AudioDownloader::new(config);

        let err = downloader
            .download_audio_track("https://www.youtube.com/watch?v=abc123")
            .unwrap_err();
        assert!(matches!(err, DownloadError::Conversion(_)));
    }

    #[cfg(unix)]
    #[test]
    fn persist_to_copies_audio_out_of_scratch() {
        let dir = tempdir().unwrap();
        let stub = install_stub(dir.path(), "yt-dlp", YTDLP_STUB);
        let downloader = AudioDownloader::new(config_with(dir.path(), &stub));

        let artifact = downloader
            .download_audio_track("https://www.youtube.com/watch?v=abc123")
            .unwrap();
        let scratch_path = artifact.path().to_path_buf();
        let dest = dir.path().join("kept.m4a");
        artifact.persist_to(&dest).unwrap();

        assert!(dest.exists());
        assert!(!scratch_path.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "fake audio bytes");
    }
}
