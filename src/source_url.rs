use url::Url;

use crate::error::{AppError, Result};
use crate::track::Catalog;

/// A playlist link pasted by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistUrl {
    pub catalog: Catalog,
    pub playlist_id: String,
}

/// Parse a Spotify or YouTube Music playlist link.
/// Supports formats:
/// - https://open.spotify.com/playlist/37i9dQZF1E8NC99vGqLsaH?si=...
/// - spotify:playlist:37i9dQZF1E8NC99vGqLsaH
/// - https://music.youtube.com/playlist?list=PLxxxxxxxx
pub fn parse_playlist_url(url_str: &str) -> Result<PlaylistUrl> {
    let url_str = url_str.trim();

    if let Some(id) = url_str.strip_prefix("spotify:playlist:") {
        return Ok(PlaylistUrl {
            catalog: Catalog::Spotify,
            playlist_id: id.to_string(),
        });
    }

    let url = Url::parse(url_str).map_err(|e| AppError::InvalidUrl(format!("{}: {}", url_str, e)))?;

    match url.host_str() {
        Some("open.spotify.com") => {
            let segments: Vec<&str> = url
                .path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                .unwrap_or_default();

            match segments.as_slice() {
                ["playlist", id, ..] => Ok(PlaylistUrl {
                    catalog: Catalog::Spotify,
                    playlist_id: id.to_string(),
                }),
                _ => Err(AppError::InvalidUrl(
                    "URL does not appear to be a Spotify playlist URL".into(),
                )),
            }
        }
        Some("music.youtube.com") => {
            let list = url
                .query_pairs()
                .find(|(key, _)| key == "list")
                .map(|(_, value)| value.into_owned());

            match (url.path(), list) {
                ("/playlist", Some(id)) if !id.is_empty() => Ok(PlaylistUrl {
                    catalog: Catalog::YouTubeMusic,
                    playlist_id: id,
                }),
                _ => Err(AppError::InvalidUrl(
                    "URL does not appear to be a YouTube Music playlist URL".into(),
                )),
            }
        }
        _ => Err(AppError::InvalidUrl(
            "URL must point to a Spotify or YouTube Music playlist".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spotify_urls() {
        let parsed =
            parse_playlist_url("https://open.spotify.com/playlist/37i9dQZF1E8NC99vGqLsaH?si=abc")
                .unwrap();
        assert_eq!(parsed.catalog, Catalog::Spotify);
        assert_eq!(parsed.playlist_id, "37i9dQZF1E8NC99vGqLsaH");

        let parsed = parse_playlist_url("spotify:playlist:37i9dQZF1E8NC99vGqLsaH").unwrap();
        assert_eq!(parsed.playlist_id, "37i9dQZF1E8NC99vGqLsaH");
    }

    #[test]
    fn test_youtube_music_url() {
        let parsed =
            parse_playlist_url("https://music.youtube.com/playlist?list=PLabc123&si=x").unwrap();
        assert_eq!(parsed.catalog, Catalog::YouTubeMusic);
        assert_eq!(parsed.playlist_id, "PLabc123");
    }

    #[test]
    fn test_rejects_other_links() {
        assert!(parse_playlist_url("https://open.spotify.com/album/123").is_err());
        assert!(parse_playlist_url("https://music.youtube.com/watch?v=abc").is_err());
        assert!(parse_playlist_url("https://example.com/playlist/1").is_err());
        assert!(parse_playlist_url("not a url").is_err());
    }
}
