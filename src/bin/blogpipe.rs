//! Operator CLI for the video-to-blog pipeline.
//!
//! Runs the same pipeline the web layer calls, for manual testing and
//! one-off conversions: pass a YouTube URL, get the JSON result on
//! stdout. `--audio-only` exercises the standalone download capability
//! without transcribing or generating anything.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use blogpipe::config::{self, DEFAULT_CONFIG_PATH};
use blogpipe::pipeline::BlogPipeline;
use clap::Parser;

#[derive(Parser)]
#[command(name = "blogpipe", about = "Generate a blog post from a YouTube video")]
struct Args {
    /// YouTube video URL to process.
    url: String,

    /// Env-file with pipeline settings (defaults to /etc/blogpipe-env,
    /// falling back to built-in defaults when absent).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only download the audio track; do not transcribe or generate.
    #[arg(long)]
    audio_only: bool,

    /// With --audio-only, copy the audio to this path instead of letting
    /// it be cleaned up.
    #[arg(long, value_name = "PATH", requires = "audio_only")]
    keep: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = config::load_config_from(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    println!("===================================");
    println!("YouTube Blog Generator");
    println!("===================================");
    println!("URL: {}", args.url);
    println!("Transcription: {}", config.transcription_strategy.as_str());
    println!();

    let pipeline = BlogPipeline::from_config(config);

    if args.audio_only {
        println!("Downloading audio only...");
        let artifact = pipeline
            .download_audio(&args.url)
            .context("downloading audio")?;
        let size_mb = artifact.byte_size() as f64 / (1024.0 * 1024.0);
        println!("Downloaded {} ({size_mb:.2} MB)", artifact.path().display());

        if let Some(dest) = args.keep {
            let kept = artifact
                .persist_to(&dest)
                .with_context(|| format!("copying audio to {}", dest.display()))?;
            println!("Audio kept at {}", kept.display());
        } else {
            println!("Audio discarded (pass --keep <path> to retain it)");
        }
        return Ok(true);
    }

    println!("Processing video (download, transcribe, generate)...");
    println!();

    let result = pipeline.process_video(&args.url);
    let success = result.is_success();

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("serializing pipeline result")?
    );

    Ok(success)
}
