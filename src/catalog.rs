use std::collections::BTreeMap;

/// Caption tracks available for a video, split by how they were authored.
/// Keys are language tags, values are the track format identifiers yt-dlp
/// reports for that language (e.g. "vtt", "srv3").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionCatalog {
    pub manual: BTreeMap<String, Vec<String>>,
    pub automatic: BTreeMap<String, Vec<String>>,
}

impl CaptionCatalog {
    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.automatic.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackCategory {
    Manual,
    Automatic,
}

impl std::fmt::Display for TrackCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackCategory::Manual => write!(f, "manual"),
            TrackCategory::Automatic => write!(f, "automatic"),
        }
    }
}

/// What the pipeline should do about captions for this video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No tracks in either category; the caller falls back to transcription
    NoCaptionsAvailable,
    /// Fetch the given languages (in preference order) from the given category
    FetchTrack {
        category: TrackCategory,
        languages: Vec<String>,
    },
}

/// Pick which caption track(s) to request.
///
/// Manual tracks beat automatic tracks unconditionally: a manual track in an
/// unwanted language still wins over an automatic track in a preferred one.
/// Within the chosen category, `languages` is the ordered, deduplicated subset
/// of `preferences` that is actually available; if none of the preferred
/// languages is available, the literal "all" sweep is requested instead.
pub fn select(catalog: &CaptionCatalog, preferences: &[String]) -> Decision {
    let (category, available) = if !catalog.manual.is_empty() {
        (TrackCategory::Manual, &catalog.manual)
    } else if !catalog.automatic.is_empty() {
        (TrackCategory::Automatic, &catalog.automatic)
    } else {
        return Decision::NoCaptionsAvailable;
    };

    let mut languages: Vec<String> = Vec::new();
    for lang in preferences {
        if available.contains_key(lang) && !languages.contains(lang) {
            languages.push(lang.clone());
        }
    }

    if languages.is_empty() {
        languages.push("all".to_string());
    }

    Decision::FetchTrack { category, languages }
}
