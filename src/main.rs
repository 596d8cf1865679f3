use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::Command;

use eyre::{Result, bail};
use log::{debug, info, warn};

mod cli;

use cli::Cli;
use subdown::pipeline::{self, Outcome, PipelineOptions};
use subdown::whisper::{WhisperCli, WhisperModel};
use subdown::ytdlp::YtDlp;

const DEFAULT_OUTPUT: &str = "transcription.txt";
const DEFAULT_SUB_LANGS: &str = "zh-Hant,zh-TW,zh,en";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("subdown.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subdown")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn build_after_help() -> String {
    let tool_line = |name: &str, hint: &str| match tool_version(name) {
        Some(v) => format!("  \x1b[32m✅\x1b[0m {name:<10} {v}"),
        None => format!("  \x1b[31m❌\x1b[0m {name:<10} (not found — {hint})"),
    };

    let yt_dlp_line = tool_line("yt-dlp", "needed for captions and audio download");
    let whisper_line = tool_line("whisper", "needed for transcription fallback");
    let ffmpeg_line = tool_line("ffmpeg", "needed by yt-dlp for audio extraction");

    let log_path = log_dir().join("subdown.log");

    format!(
        "\nREQUIRED TOOLS:\n{yt_dlp_line}\n{whisper_line}\n{ffmpeg_line}\n\nLogs are written to: {}",
        log_path.display()
    )
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{label}");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// CLI flag beats config default; an unparseable config value is ignored with
/// a warning rather than aborting the run (config problems are non-fatal).
fn resolve_model(flag: Option<WhisperModel>, config_default: Option<&str>) -> WhisperModel {
    if let Some(model) = flag {
        return model;
    }
    match config_default {
        Some(name) => name.parse().unwrap_or_else(|e: String| {
            warn!("Ignoring config default_model: {e}");
            WhisperModel::default()
        }),
        None => WhisperModel::default(),
    }
}

fn parse_sub_langs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = subdown::config::Config::load().unwrap_or_default();

    // Interactive adapter: prompt for the two inputs when no URL was given
    let (url_input, output_input) = match cli.url {
        Some(ref url) => (url.clone(), cli.output.clone()),
        None => {
            let url = prompt("Video URL: ")?;
            if url.is_empty() {
                bail!("no URL or video ID provided\n\nUsage: subdown <URL>");
            }
            let output = match cli.output {
                Some(ref path) => Some(path.clone()),
                None => {
                    let name = prompt(&format!("Output file [{DEFAULT_OUTPUT}]: "))?;
                    if name.is_empty() { None } else { Some(PathBuf::from(name)) }
                }
            };
            (url, output)
        }
    };

    let video_id = subdown::extract_video_id(&url_input).ok_or_else(|| {
        eyre::eyre!(
            "could not extract video ID from: {url_input}\n\nSupported formats:\n  \
             https://www.youtube.com/watch?v=ID\n  \
             https://youtu.be/ID\n  \
             https://www.youtube.com/embed/ID\n  \
             https://www.youtube.com/shorts/ID\n  \
             <11-character video ID>"
        )
    })?;
    let url = format!("https://www.youtube.com/watch?v={video_id}");

    // CLI flags take priority over config defaults
    let model = resolve_model(cli.model, config.default_model.as_deref());
    let language = cli.lang.clone().or_else(|| config.default_lang.clone());
    let sub_langs = parse_sub_langs(
        cli.sub_langs
            .as_deref()
            .or(config.default_sub_langs.as_deref())
            .unwrap_or(DEFAULT_SUB_LANGS),
    );

    let output = subdown::ensure_txt_extension(output_input.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)));

    if cli.verbose {
        eprintln!("Video: {video_id}");
        eprintln!("Output: {}", output.display());
        eprintln!("Whisper model: {model}");
        if let Some(ref lang) = language {
            eprintln!("Language hint: {lang}");
        }
        eprintln!("Caption languages: {}", sub_langs.join(", "));
    }
    debug!("Processing {url} -> {}", output.display());

    let opts = PipelineOptions {
        url,
        output,
        model,
        language,
        skip_captions: cli.skip_captions,
        sub_langs,
    };

    let ytdlp = YtDlp::default();
    let whisper = WhisperCli::default();

    match pipeline::process(&ytdlp, &ytdlp, &whisper, &opts).await? {
        Outcome::CaptionsSaved => {
            println!("Captions saved to {}", opts.output.display());
        }
        Outcome::TranscriptionSaved => {
            println!("Transcription saved to {}", opts.output.display());
        }
    }

    Ok(())
}
