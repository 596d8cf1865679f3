use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use crate::Segment;
use crate::pipeline::Transcriber;

/// Whisper model size, as understood by the `whisper` CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
    #[default]
    Large,
}

impl WhisperModel {
    pub fn name(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Small => "small",
            WhisperModel::Medium => "medium",
            WhisperModel::Large => "large",
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "small" => Ok(WhisperModel::Small),
            "medium" => Ok(WhisperModel::Medium),
            "large" => Ok(WhisperModel::Large),
            other => Err(format!(
                "unknown model size '{other}' (expected tiny, base, small, medium, or large)"
            )),
        }
    }
}

/// Transcription via the openai-whisper command-line tool
#[derive(Debug, Clone)]
pub struct WhisperCli {
    pub program: String,
    /// Conditioning on prior text makes long recordings prone to repetition
    /// loops; the original tool always disables it.
    pub condition_on_previous_text: bool,
}

impl Default for WhisperCli {
    fn default() -> Self {
        WhisperCli {
            program: "whisper".to_string(),
            condition_on_previous_text: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<RawSegment>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    text: String,
    start: f64,
    end: f64,
}

fn parse_whisper_output(json: &str) -> Result<Vec<Segment>> {
    let output: WhisperOutput = serde_json::from_str(json)?;

    if let Some(lang) = &output.language {
        debug!("Whisper detected language: {lang}");
    }

    Ok(output
        .segments
        .into_iter()
        .filter_map(|seg| {
            let text = seg.text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(Segment {
                text,
                start: seg.start,
                end: seg.end,
            })
        })
        .collect())
}

#[async_trait]
impl Transcriber for WhisperCli {
    async fn transcribe(
        &self,
        audio: &Path,
        model: WhisperModel,
        language: Option<&str>,
    ) -> Result<Vec<Segment>> {
        debug!("Transcribing {} with whisper model {model}", audio.display());

        let mut args: Vec<String> = vec![
            audio.to_string_lossy().to_string(),
            "--model".to_string(),
            model.name().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            ".".to_string(),
            "--condition_on_previous_text".to_string(),
            if self.condition_on_previous_text { "True" } else { "False" }.to_string(),
        ];
        if let Some(lang) = language {
            args.push("--language".to_string());
            args.push(lang.to_string());
        }

        let output = match Command::new(&self.program).args(&args).output().await {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!(
                    "whisper not found. Install it to enable transcription:\n  \
                     pip install -U openai-whisper"
                );
            }
            Err(e) => bail!("failed to run whisper: {e}"),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("whisper exited with status {}: {}", output.status, stderr.trim());
        }

        let json_path = self.result_path(audio);
        if !json_path.exists() {
            bail!("whisper did not produce expected output file: {}", json_path.display());
        }

        let json = std::fs::read_to_string(&json_path)?;
        let segments = parse_whisper_output(&json)?;
        let _ = std::fs::remove_file(&json_path);

        Ok(segments)
    }
}

impl WhisperCli {
    /// whisper writes `<stem>.json` next to the audio file (via --output_dir .)
    fn result_path(&self, audio: &Path) -> PathBuf {
        audio.with_extension("json")
    }
}
