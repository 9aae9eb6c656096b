use serde::{Deserialize, Serialize};

/// A streaming service whose namespace playlists are copied from or into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Catalog {
    Spotify,
    YouTubeMusic,
}

impl Catalog {
    pub fn other(self) -> Self {
        match self {
            Catalog::Spotify => Catalog::YouTubeMusic,
            Catalog::YouTubeMusic => Catalog::Spotify,
        }
    }
}

impl std::fmt::Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Catalog::Spotify => write!(f, "Spotify"),
            Catalog::YouTubeMusic => write!(f, "YouTube Music"),
        }
    }
}

/// Result type a catalog attaches to an item, when it distinguishes official
/// audio from generic video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TrackKind {
    Song,
    Video,
    #[default]
    Unknown,
}

/// Canonical view of a track from either catalog.
///
/// Title, artist and album are case-folded by the normalizer so the scorer can
/// compare them with plain string equality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_seconds: f64,
    pub source_id: String,
    pub kind: TrackKind,
    pub is_top_result: bool,
}

impl TrackInfo {
    /// Human readable query used when reporting this track.
    pub fn search_label(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }
}

/// A saved album from either catalog, case-folded like [`TrackInfo`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumInfo {
    pub title: String,
    pub artist: String,
    /// Four digit release year, when the catalog exposes one.
    pub year: Option<String>,
    pub source_id: String,
}

impl AlbumInfo {
    /// `release` may be a bare year or a full `YYYY-MM-DD` date.
    pub fn new(title: &str, artist: &str, release: Option<&str>, source_id: &str) -> Self {
        Self {
            title: title.trim().to_lowercase(),
            artist: artist.trim().to_lowercase(),
            year: release.and_then(release_year),
            source_id: source_id.to_string(),
        }
    }

    pub fn search_label(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }
}

fn release_year(release: &str) -> Option<String> {
    let year = release.trim().get(..4)?;
    year.chars()
        .all(|c| c.is_ascii_digit())
        .then(|| year.to_string())
}

#[cfg(test)]
impl TrackInfo {
    pub fn mock(title: &str, artist: &str, duration_seconds: f64) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            album: None,
            duration_seconds,
            source_id: "mock_id".to_string(),
            kind: TrackKind::Unknown,
            is_top_result: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_release_year() {
        let album = AlbumInfo::new(" Abbey Road ", "The Beatles", Some("1969-09-26"), "a1");
        assert_eq!(album.title, "abbey road");
        assert_eq!(album.year.as_deref(), Some("1969"));
        assert_eq!(album.search_label(), "abbey road by the beatles");

        assert_eq!(AlbumInfo::new("A", "B", Some("2019"), "a2").year.as_deref(), Some("2019"));
        assert_eq!(AlbumInfo::new("A", "B", Some("12 songs"), "a3").year, None);
        assert_eq!(AlbumInfo::new("A", "B", None, "a4").year, None);
    }
}
