use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use log::{debug, info, warn};

use crate::Segment;
use crate::catalog::{self, CaptionCatalog, Decision, TrackCategory};
use crate::normalize;
use crate::whisper::WhisperModel;

/// Queries and fetches caption tracks for a video
#[async_trait]
pub trait CaptionProvider {
    async fn query_catalog(&self, url: &str) -> Result<CaptionCatalog>;

    /// Fetch the requested track(s) and return the paths actually written,
    /// in deterministic (lexical) order.
    async fn fetch_track(
        &self,
        url: &str,
        category: TrackCategory,
        languages: &[String],
    ) -> Result<Vec<PathBuf>>;
}

/// Downloads the audio-only artifact for a video
#[async_trait]
pub trait AudioProvider {
    async fn download_audio(&self, url: &str) -> Result<PathBuf>;
}

/// Turns an audio file into ordered, timed text segments
#[async_trait]
pub trait Transcriber {
    async fn transcribe(
        &self,
        audio: &Path,
        model: WhisperModel,
        language: Option<&str>,
    ) -> Result<Vec<Segment>>;
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub url: String,
    pub output: PathBuf,
    pub model: WhisperModel,
    /// Transcription language hint; None lets Whisper auto-detect
    pub language: Option<String>,
    pub skip_captions: bool,
    /// Caption language preference order for the selector
    pub sub_langs: Vec<String>,
}

/// How the output file was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    CaptionsSaved,
    TranscriptionSaved,
}

/// Run the two-step pipeline: try captions first, fall back to transcription.
///
/// Caption-side failures (catalog query, track fetch, no file located) degrade
/// to the transcription fallback. Failures past that point are fatal and carry
/// the collaborator's message.
pub async fn process<C, A, T>(
    captions: &C,
    audio: &A,
    transcriber: &T,
    opts: &PipelineOptions,
) -> Result<Outcome>
where
    C: CaptionProvider + Sync,
    A: AudioProvider + Sync,
    T: Transcriber + Sync,
{
    if !opts.skip_captions {
        if let Some(outcome) = try_captions(captions, opts).await? {
            return Ok(outcome);
        }
        info!("No usable captions, falling back to transcription");
    } else {
        info!("Caption download skipped by request");
    }

    transcribe_audio(audio, transcriber, opts).await
}

/// Caption path. Ok(None) means "no captions, take the fallback"; Err means
/// the run is over (I/O failure after a successful fetch).
async fn try_captions<C>(captions: &C, opts: &PipelineOptions) -> Result<Option<Outcome>>
where
    C: CaptionProvider + Sync,
{
    let catalog = match captions.query_catalog(&opts.url).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Caption catalog query failed, treating as no captions: {e}");
            return Ok(None);
        }
    };

    let Decision::FetchTrack { category, languages } = catalog::select(&catalog, &opts.sub_langs)
    else {
        info!("No caption tracks available");
        return Ok(None);
    };
    info!("Fetching {category} captions: {}", languages.join(", "));

    let files = match captions.fetch_track(&opts.url, category, &languages).await {
        Ok(f) => f,
        Err(e) => {
            warn!("Caption fetch failed: {e}");
            return Ok(None);
        }
    };

    let Some(first) = files.first() else {
        warn!("Caption fetch produced no locatable file");
        return Ok(None);
    };

    // Only the first file survives; the rest came from the "all" sweep
    for extra in &files[1..] {
        debug!("Removing extra caption file: {}", extra.display());
        let _ = std::fs::remove_file(extra);
    }

    if opts.output.exists() {
        std::fs::remove_file(&opts.output)?;
    }
    std::fs::rename(first, &opts.output)
        .wrap_err_with(|| format!("failed to move caption file to {}", opts.output.display()))?;

    normalize::clean_caption_file(&opts.output)
        .wrap_err_with(|| format!("failed to clean caption file {}", opts.output.display()))?;

    Ok(Some(Outcome::CaptionsSaved))
}

async fn transcribe_audio<A, T>(
    audio: &A,
    transcriber: &T,
    opts: &PipelineOptions,
) -> Result<Outcome>
where
    A: AudioProvider + Sync,
    T: Transcriber + Sync,
{
    let audio_path = audio.download_audio(&opts.url).await?;
    info!("Audio downloaded: {}", audio_path.display());

    let result = transcriber
        .transcribe(&audio_path, opts.model, opts.language.as_deref())
        .await;

    // Temp audio goes away whether transcription worked or not
    if audio_path.exists() {
        let _ = std::fs::remove_file(&audio_path);
    }

    let segments = result?;
    write_transcript(&opts.output, &segments)?;

    Ok(Outcome::TranscriptionSaved)
}

/// One trimmed dialogue line per segment, chronological order, replacing any
/// existing file at `path`.
fn write_transcript(path: &Path, segments: &[Segment]) -> Result<()> {
    let mut out = String::new();
    for segment in segments {
        let text = segment.text.trim();
        if !text.is_empty() {
            out.push_str(text);
            out.push('\n');
        }
    }
    std::fs::write(path, out)?;
    Ok(())
}
