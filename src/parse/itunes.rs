//! iTunes library exports (XML property lists).
//!
//! The library is a `plist` whose top-level dict holds a `Tracks` dict of per-track
//! dicts, followed by a `Playlists` array. Only `Name` and `Artist` of each track are
//! read. Elements are visited in document order, which is all the format needs.

use scraper::{Html, Selector};

use crate::error_handling::ImportError;
use crate::models::Track;

#[derive(Clone, Copy)]
enum Field {
    Name,
    Artist,
}

#[derive(Default)]
struct PartialTrack {
    name: Option<String>,
    artist: Option<String>,
}

/// Extracts the tracks of an iTunes library export.
///
/// # Errors
///
/// Returns `ImportError::Xml` when the document has no `Tracks` section.
pub fn parse_itunes_xml(content: &str) -> Result<Vec<Track>, ImportError> {
    let selector =
        Selector::parse("dict, key, string").map_err(|e| ImportError::Xml(e.to_string()))?;
    let document = Html::parse_document(content);

    let mut seen_tracks_key = false;
    let mut importing = false;
    let mut pending: Option<Field> = None;
    let mut tracks: Vec<PartialTrack> = Vec::new();

    for element in document.select(&selector) {
        match element.value().name() {
            "dict" => {
                if importing {
                    tracks.push(PartialTrack::default());
                }
                pending = None;
            }
            "key" => {
                let key = element.text().collect::<String>();
                pending = None;
                match key.trim() {
                    "Tracks" => {
                        importing = true;
                        seen_tracks_key = true;
                    }
                    "Playlists" => importing = false,
                    "Name" if importing => pending = Some(Field::Name),
                    "Artist" if importing => pending = Some(Field::Artist),
                    _ => {}
                }
            }
            "string" => {
                if let (Some(field), Some(current)) = (pending.take(), tracks.last_mut()) {
                    let value = element.text().collect::<String>();
                    match field {
                        Field::Name => current.name = Some(value),
                        Field::Artist => current.artist = Some(value),
                    }
                }
            }
            _ => {}
        }
    }

    if !seen_tracks_key {
        return Err(ImportError::Xml("no Tracks section found".to_string()));
    }

    // The Tracks container dict itself has no name and drops out here.
    Ok(tracks
        .into_iter()
        .filter_map(|t| {
            t.name
                .map(|name| Track::new(name, t.artist.unwrap_or_default()))
        })
        .filter(|t| !t.name.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Major Version</key><integer>1</integer>
	<key>Application Version</key><string>12.9.5.5</string>
	<key>Show Content Ratings</key><true/>
	<key>Tracks</key>
	<dict>
		<key>1021</key>
		<dict>
			<key>Track ID</key><integer>1021</integer>
			<key>Name</key><string>Hey Jude</string>
			<key>Artist</key><string>The Beatles</string>
			<key>Kind</key><string>MPEG audio file</string>
		</dict>
		<key>1022</key>
		<dict>
			<key>Track ID</key><integer>1022</integer>
			<key>Name</key><string>Rock &amp; Roll</string>
			<key>Compilation</key><true/>
		</dict>
	</dict>
	<key>Playlists</key>
	<array>
		<dict>
			<key>Name</key><string>Library</string>
		</dict>
	</array>
</dict>
</plist>
"#;

    #[test]
    fn test_parse_itunes_library() {
        let tracks = parse_itunes_xml(LIBRARY).expect("library should parse");
        assert_eq!(
            tracks,
            vec![
                Track::new("Hey Jude", "The Beatles"),
                Track::new("Rock & Roll", ""),
            ]
        );
    }

    #[test]
    fn test_missing_tracks_section_is_an_error() {
        let doc = r#"<plist version="1.0"><dict><key>Playlists</key><array/></dict></plist>"#;
        assert!(matches!(parse_itunes_xml(doc), Err(ImportError::Xml(_))));
    }
}
