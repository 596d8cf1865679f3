use std::path::Path;

use eyre::Result;

/// True if the trimmed line is subtitle structure rather than dialogue:
/// a cue sequence number, a time range, a blank separator, or a
/// WEBVTT/NOTE header line.
fn is_structural(line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    // Known false positive: dialogue that is purely numeric (a spoken year,
    // a countdown) is indistinguishable from a cue sequence number here.
    // Only ASCII digits count; the cue numbers yt-dlp writes are ASCII, so
    // full-width or other Unicode digit lines stay dialogue.
    if line.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if line.contains("-->") {
        return true;
    }
    line.starts_with("WEBVTT") || line.starts_with("NOTE")
}

/// Strip subtitle structure, keeping one trimmed dialogue line per entry.
/// Lines come out in input order; nothing is merged or deduplicated.
pub fn normalize_lines<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !is_structural(line))
        .map(String::from)
        .collect()
}

/// Rewrite a caption file in place, leaving only dialogue lines.
///
/// The whole file is read before the destination is truncated, so an
/// unreadable source never clobbers anything. If the write itself fails the
/// unclean file may remain on disk.
pub fn clean_caption_file(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)?;

    let mut out = String::new();
    for line in normalize_lines(raw.lines()) {
        out.push_str(&line);
        out.push('\n');
    }

    std::fs::write(path, out)?;
    Ok(())
}
