//! Plain-text playlists: one `track <delimiter> artist` per line.

use crate::models::Track;

/// Parses a plain-text playlist.
///
/// A line without the delimiter is a track with no artist. Anything after a second
/// delimiter is ignored. Blank lines are skipped.
pub fn parse_txt(content: &str, delimiter: &str) -> Vec<Track> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if delimiter.is_empty() {
                return Track::new(line, "");
            }
            let mut parts = line.split(delimiter);
            let name = parts.next().unwrap_or_default();
            let artist = parts.next().unwrap_or_default();
            Track::new(name, artist)
        })
        .filter(|track| !track.name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_txt_lines() {
        let content = "Hey Jude - The Beatles\n\n  Smells Like Teen Spirit -  Nirvana  \nInstrumental\n";
        let tracks = parse_txt(content, " - ");
        assert_eq!(
            tracks,
            vec![
                Track::new("Hey Jude", "The Beatles"),
                Track::new("Smells Like Teen Spirit", "Nirvana"),
                Track::new("Instrumental", ""),
            ]
        );
    }

    #[test]
    fn test_parse_txt_ignores_extra_fields_and_crlf() {
        let tracks = parse_txt("Song | Artist | 2001\r\nOther | Band\r\n", " | ");
        assert_eq!(
            tracks,
            vec![Track::new("Song", "Artist"), Track::new("Other", "Band")]
        );
    }

    #[test]
    fn test_parse_txt_empty_input() {
        assert!(parse_txt("\n   \n", " - ").is_empty());
    }
}
