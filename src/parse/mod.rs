//! Playlist file parsing.
//!
//! Supported inputs:
//! - Plain text, one `track <delimiter> artist` per line (`.txt`)
//! - iTunes library exports (`.xml` mentioning `www.apple.com`)
//!
//! The format is picked from the extension, with content sniffing for iTunes exports
//! under other names. Track names are cleaned of `(feat. ...)` suffixes, which tend to
//! confuse remote search.

mod itunes;
mod txt;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ITUNES_XML_MARKER;
use crate::error_handling::ImportError;
use crate::models::Track;

pub use itunes::parse_itunes_xml;
pub use txt::parse_txt;

static FEAT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(.+) \(feat\.")
        .map_err(|e| log::error!("Failed to compile feat. pattern: {}", e))
        .ok()
});

/// Recognized playlist file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    /// Delimited plain text
    Txt,
    /// iTunes library XML
    ItunesXml,
}

fn looks_like_itunes(content: &str) -> bool {
    content.contains("<plist") && content.contains(ITUNES_XML_MARKER)
}

/// Picks the parser for a file from its name and content.
///
/// # Errors
///
/// Returns `ImportError::UnsupportedFormat` when no parser applies.
pub fn detect_format(path: &Path, content: &str) -> Result<PlaylistFormat, ImportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("txt") => Ok(PlaylistFormat::Txt),
        Some("xml") if content.contains(ITUNES_XML_MARKER) => Ok(PlaylistFormat::ItunesXml),
        _ if looks_like_itunes(content) => Ok(PlaylistFormat::ItunesXml),
        _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Strips a trailing `(feat. ...)` from the track name.
pub fn fix_feat_tags(mut track: Track) -> Track {
    if !track.name.to_lowercase().contains("feat.") {
        return track;
    }
    if let Some(pattern) = FEAT_PATTERN.as_ref() {
        if let Some(head) = pattern.captures(&track.name).and_then(|c| c.get(1)) {
            track.name = head.as_str().trim().to_string();
        }
    }
    track
}

/// Parses already-loaded playlist content.
///
/// # Errors
///
/// - `UnsupportedFormat` when no parser applies
/// - `Xml` for an iTunes export without a track section
/// - `EmptyPlaylist` when the file yields no tracks
pub fn parse_playlist(path: &Path, content: &str, delimiter: &str) -> Result<Vec<Track>, ImportError> {
    let format = detect_format(path, content)?;
    log::debug!("Parsing {} as {:?}", path.display(), format);

    let tracks = match format {
        PlaylistFormat::Txt => parse_txt(content, delimiter),
        PlaylistFormat::ItunesXml => parse_itunes_xml(content)?,
    };
    if tracks.is_empty() {
        return Err(ImportError::EmptyPlaylist);
    }

    log::debug!("Parsed {} tracks", tracks.len());
    Ok(tracks.into_iter().map(fix_feat_tags).collect())
}

/// Reads and parses a playlist file.
///
/// # Errors
///
/// `ImportError::Io` if the file cannot be read, otherwise as [`parse_playlist`].
pub fn parse_playlist_file(path: &Path, delimiter: &str) -> Result<Vec<Track>, ImportError> {
    let content = std::fs::read_to_string(path)?;
    parse_playlist(path, &content, delimiter)
}
