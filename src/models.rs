//! Core data types shared across parsing, resolution and import.

use std::fmt;

/// A track read from a playlist file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    /// Track title
    pub name: String,
    /// Performing artist; empty when the source line had none
    pub artist: String,
}

impl Track {
    /// Creates a track, trimming surrounding whitespace from both fields.
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Track {
            name: name.into().trim().to_string(),
            artist: artist.into().trim().to_string(),
        }
    }

    /// Free-text search query: name followed by artist.
    pub fn search_query(&self) -> String {
        if self.artist.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.artist)
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artist.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} - {}", self.name, self.artist)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_fields() {
        let track = Track::new("  Hey Jude ", " The Beatles\t");
        assert_eq!(track.name, "Hey Jude");
        assert_eq!(track.artist, "The Beatles");
    }

    #[test]
    fn test_search_query_and_display() {
        let track = Track::new("Hey Jude", "The Beatles");
        assert_eq!(track.search_query(), "Hey Jude The Beatles");
        assert_eq!(track.to_string(), "Hey Jude - The Beatles");

        let solo = Track::new("Intro", "");
        assert_eq!(solo.search_query(), "Intro");
        assert_eq!(solo.to_string(), "Intro");
    }
}
