use clap::Parser;
use std::path::PathBuf;

use subdown::whisper::WhisperModel;

#[derive(Parser)]
#[command(
    name = "subdown",
    about = "YouTube subtitle downloader with Whisper transcription fallback",
    version,
)]
pub struct Cli {
    /// YouTube video URL or video ID (prompts interactively if omitted)
    pub url: Option<String>,

    /// Output file; ".txt" is appended if missing (default: transcription.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Whisper model size: tiny, base, small, medium, large
    #[arg(short, long)]
    pub model: Option<WhisperModel>,

    /// Transcription language hint (default: auto-detect)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Skip caption download, always transcribe with Whisper
    #[arg(long)]
    pub skip_captions: bool,

    /// Comma-separated caption language preference order
    #[arg(long)]
    pub sub_langs: Option<String>,

    /// Show pipeline progress and metadata
    #[arg(short, long)]
    pub verbose: bool,
}
