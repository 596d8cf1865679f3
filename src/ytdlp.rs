use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use crate::catalog::{CaptionCatalog, TrackCategory};
use crate::pipeline::{AudioProvider, CaptionProvider};

/// Fixed working-directory names; two concurrent runs in the same directory
/// would trample each other, which is out of scope for a single-run tool.
pub const SUB_PREFIX: &str = "temp_sub";
pub const AUDIO_FILE: &str = "temp_audio.mp3";
const AUDIO_TEMPLATE: &str = "temp_audio.%(ext)s";

/// External downloader collaborator, invoked as a subprocess
#[derive(Debug, Clone)]
pub struct YtDlp {
    pub program: String,
}

impl Default for YtDlp {
    fn default() -> Self {
        YtDlp {
            program: "yt-dlp".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    subtitles: BTreeMap<String, Vec<TrackFormat>>,
    #[serde(default)]
    automatic_captions: BTreeMap<String, Vec<TrackFormat>>,
}

#[derive(Debug, Deserialize)]
struct TrackFormat {
    #[serde(default)]
    ext: Option<String>,
}

fn build_catalog(info: VideoInfo) -> CaptionCatalog {
    let formats = |tracks: BTreeMap<String, Vec<TrackFormat>>| {
        tracks
            .into_iter()
            .map(|(lang, fmts)| (lang, fmts.into_iter().filter_map(|f| f.ext).collect()))
            .collect()
    };
    CaptionCatalog {
        manual: formats(info.subtitles),
        automatic: formats(info.automatic_captions),
    }
}

/// Caption files yt-dlp wrote under the temp prefix, in lexical order so the
/// "first file" choice is deterministic. Partial downloads are skipped.
fn locate_caption_files() -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(".")? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(SUB_PREFIX) && !name.ends_with(".part") {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

impl YtDlp {
    async fn run(&self, args: &[String]) -> Result<std::process::Output> {
        debug!("Running {} {}", self.program, args.join(" "));
        match Command::new(&self.program).args(args).output().await {
            Ok(o) => Ok(o),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!(
                    "yt-dlp not found. Install it:\n  \
                     pip install yt-dlp\n  \
                     or: brew install yt-dlp"
                );
            }
            Err(e) => bail!("failed to run yt-dlp: {e}"),
        }
    }

    fn check(&self, output: &std::process::Output, context: &str) -> Result<()> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("yt-dlp {context} failed with status {}: {}", output.status, stderr.trim());
        }
        Ok(())
    }
}

#[async_trait]
impl CaptionProvider for YtDlp {
    async fn query_catalog(&self, url: &str) -> Result<CaptionCatalog> {
        let args: Vec<String> = ["-J", "--skip-download", "--no-playlist", url]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let output = self.run(&args).await?;
        self.check(&output, "metadata query")?;

        let info: VideoInfo = serde_json::from_slice(&output.stdout)?;
        Ok(build_catalog(info))
    }

    async fn fetch_track(
        &self,
        url: &str,
        category: TrackCategory,
        languages: &[String],
    ) -> Result<Vec<PathBuf>> {
        let mut args: Vec<String> = vec![
            "--skip-download".to_string(),
            "--write-subs".to_string(),
        ];
        if category == TrackCategory::Automatic {
            args.push("--write-auto-subs".to_string());
        }
        args.push("--sub-langs".to_string());
        args.push(languages.join(","));
        args.push("--no-playlist".to_string());
        args.push("-o".to_string());
        args.push(SUB_PREFIX.to_string());
        args.push(url.to_string());

        let output = self.run(&args).await?;
        self.check(&output, "caption download")?;

        locate_caption_files()
    }
}

#[async_trait]
impl AudioProvider for YtDlp {
    async fn download_audio(&self, url: &str) -> Result<PathBuf> {
        let args: Vec<String> = [
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "192K",
            "--no-playlist",
            "-o",
            AUDIO_TEMPLATE,
            url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let output = self.run(&args).await?;
        self.check(&output, "audio download")?;

        let path = PathBuf::from(AUDIO_FILE);
        if !path.exists() {
            bail!("yt-dlp did not produce expected audio file: {}", path.display());
        }
        Ok(path)
    }
}
