use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::track::{TrackInfo, TrackKind};

const TOP_RESULT_CATEGORY: &str = "Top result";
const ATV_VIDEO_TYPE: &str = "MUSIC_VIDEO_TYPE_ATV";
const VIDEO_TYPE_PREFIX: &str = "MUSIC_VIDEO_TYPE_";

/// Why a raw record could not be turned into a `TrackInfo`.
///
/// The `Display` form doubles as the reason printed in the job report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedTrack {
    #[error("missing-track")]
    MissingTrack,

    #[error("missing-field({0})")]
    MissingField(&'static str),

    #[error("invalid-duration({0})")]
    InvalidDuration(String),

    #[error("unsupported-item({0})")]
    UnsupportedItem(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumRef {
    pub name: String,
}

/// Track object in the shape of the Spotify Web API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpotifyRawTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
    pub duration_ms: Option<u64>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

/// Search result or playlist entry in the shape YouTube Music clients expose.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YtmRawTrack {
    pub video_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
    pub duration: Option<String>,
    #[serde(rename = "duration_seconds")]
    pub duration_seconds: Option<u64>,
    pub result_type: Option<String>,
    pub category: Option<String>,
    pub video_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RawTrack {
    Spotify(SpotifyRawTrack),
    YouTubeMusic(YtmRawTrack),
}

impl RawTrack {
    /// Whether a search result is something that can sit in a playlist.
    ///
    /// Generic searches return albums, artists and podcasts next to songs;
    /// only catalogs that tag result types can be filtered.
    pub fn is_playable(&self) -> bool {
        match self {
            RawTrack::Spotify(track) => {
                matches!(track.item_type.as_deref(), None | Some("track"))
            }
            RawTrack::YouTubeMusic(track) => {
                matches!(track.result_type.as_deref(), None | Some("song") | Some("video"))
            }
        }
    }
}

/// Convert a raw catalog record into a `TrackInfo`.
///
/// `None` stands for a playlist slot whose track was removed from the catalog.
pub fn normalize(record: Option<&RawTrack>) -> Result<TrackInfo, MalformedTrack> {
    match record {
        None => Err(MalformedTrack::MissingTrack),
        Some(RawTrack::Spotify(track)) => normalize_spotify(track),
        Some(RawTrack::YouTubeMusic(track)) => normalize_ytmusic(track),
    }
}

fn normalize_spotify(track: &SpotifyRawTrack) -> Result<TrackInfo, MalformedTrack> {
    if let Some(item_type) = track.item_type.as_deref() {
        if item_type != "track" {
            return Err(MalformedTrack::UnsupportedItem(item_type.to_string()));
        }
    }

    let duration_ms = track
        .duration_ms
        .ok_or(MalformedTrack::MissingField("duration_ms"))?;

    Ok(TrackInfo {
        title: required(track.name.as_deref(), "name")?,
        artist: first_artist(&track.artists)?,
        album: album_name(track.album.as_ref()),
        duration_seconds: duration_ms as f64 / 1000.0,
        source_id: raw_id(track.id.as_deref(), "id")?,
        kind: TrackKind::Unknown,
        is_top_result: false,
    })
}

fn normalize_ytmusic(track: &YtmRawTrack) -> Result<TrackInfo, MalformedTrack> {
    let duration_seconds = match (track.duration_seconds, track.duration.as_deref()) {
        (Some(seconds), _) => seconds,
        (None, Some(text)) => parse_duration(text)?,
        (None, None) => return Err(MalformedTrack::MissingField("duration")),
    };

    Ok(TrackInfo {
        title: required(track.title.as_deref(), "title")?,
        artist: first_artist(&track.artists)?,
        album: album_name(track.album.as_ref()),
        duration_seconds: duration_seconds as f64,
        source_id: raw_id(track.video_id.as_deref(), "videoId")?,
        kind: ytmusic_kind(track),
        is_top_result: track.category.as_deref() == Some(TOP_RESULT_CATEGORY),
    })
}

fn ytmusic_kind(track: &YtmRawTrack) -> TrackKind {
    match track.result_type.as_deref() {
        Some("song") => return TrackKind::Song,
        Some("video") => return TrackKind::Video,
        _ => {}
    }

    match track.video_type.as_deref() {
        Some(ATV_VIDEO_TYPE) => TrackKind::Song,
        Some(other) if other.starts_with(VIDEO_TYPE_PREFIX) => TrackKind::Video,
        _ => TrackKind::Unknown,
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, MalformedTrack> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.to_lowercase()),
        _ => Err(MalformedTrack::MissingField(field)),
    }
}

fn raw_id(value: Option<&str>, field: &'static str) -> Result<String, MalformedTrack> {
    match value {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(MalformedTrack::MissingField(field)),
    }
}

fn first_artist(artists: &[ArtistRef]) -> Result<String, MalformedTrack> {
    required(artists.first().map(|a| a.name.as_str()), "artists")
}

fn album_name(album: Option<&AlbumRef>) -> Option<String> {
    album
        .map(|a| a.name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase)
}

/// Parse a `[[H:]M:]S` duration into whole seconds.
pub fn parse_duration(text: &str) -> Result<u64, MalformedTrack> {
    let invalid = || MalformedTrack::InvalidDuration(text.to_string());

    let tokens = text
        .trim()
        .split(':')
        .map(|token| token.trim().parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    if tokens.is_empty() || tokens.len() > 3 {
        return Err(invalid());
    }

    tokens
        .iter()
        .try_fold(0u64, |total, token| total.checked_mul(60)?.checked_add(*token))
        .ok_or_else(invalid)
}

/// Format seconds as `H:MM:SS`.
pub fn format_duration(seconds: u64) -> String {
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spotify_track() -> SpotifyRawTrack {
        SpotifyRawTrack {
            id: Some("4u7EnebtmKWzUH433cf5Qv".to_string()),
            name: Some("Bohemian Rhapsody".to_string()),
            artists: vec![ArtistRef { name: "Queen".to_string() }],
            album: Some(AlbumRef { name: "A Night at the Opera".to_string() }),
            duration_ms: Some(354_320),
            item_type: Some("track".to_string()),
        }
    }

    fn ytmusic_track() -> YtmRawTrack {
        YtmRawTrack {
            video_id: Some("fJ9rUzIMcZQ".to_string()),
            title: Some("Bohemian Rhapsody".to_string()),
            artists: vec![ArtistRef { name: "Queen".to_string() }],
            album: None,
            duration: Some("5:55".to_string()),
            duration_seconds: None,
            result_type: Some("song".to_string()),
            category: Some("Top result".to_string()),
            video_type: None,
        }
    }

    #[test]
    fn test_parse_duration_segments() {
        assert_eq!(parse_duration("1:02:03"), Ok(3723));
        assert_eq!(parse_duration("2:03"), Ok(123));
        assert_eq!(parse_duration("45"), Ok(45));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("1:2:3:4").is_err());
        assert!(parse_duration("3:").is_err());
    }

    #[test]
    fn test_parse_duration_overflow_is_invalid() {
        let huge = "9999999999999999999:00:00";
        assert_eq!(
            parse_duration(huge),
            Err(MalformedTrack::InvalidDuration(huge.to_string()))
        );
        assert!(parse_duration("18446744073709551615:1").is_err());
        assert_eq!(parse_duration("18446744073709551615"), Ok(u64::MAX));
    }

    #[test]
    fn test_duration_format_round_trip() {
        for seconds in [0, 45, 123, 3599, 3600, 3723, 86_399] {
            assert_eq!(parse_duration(&format_duration(seconds)), Ok(seconds));
        }
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn test_missing_track_is_rejected() {
        assert_eq!(normalize(None), Err(MalformedTrack::MissingTrack));
        assert_eq!(MalformedTrack::MissingTrack.to_string(), "missing-track");
    }

    #[test]
    fn test_normalize_spotify_folds_case_and_converts_ms() {
        let raw = RawTrack::Spotify(spotify_track());
        let info = normalize(Some(&raw)).unwrap();

        assert_eq!(info.title, "bohemian rhapsody");
        assert_eq!(info.artist, "queen");
        assert_eq!(info.album.as_deref(), Some("a night at the opera"));
        assert!((info.duration_seconds - 354.32).abs() < 1e-9);
        assert_eq!(info.kind, TrackKind::Unknown);
        assert!(!info.is_top_result);
        assert_eq!(info.source_id, "4u7EnebtmKWzUH433cf5Qv");
    }

    #[test]
    fn test_normalize_ytmusic_reads_tags() {
        let raw = RawTrack::YouTubeMusic(ytmusic_track());
        let info = normalize(Some(&raw)).unwrap();

        assert_eq!(info.title, "bohemian rhapsody");
        assert_eq!(info.duration_seconds, 355.0);
        assert_eq!(info.kind, TrackKind::Song);
        assert!(info.is_top_result);
        assert_eq!(info.album, None);
    }

    #[test]
    fn test_normalize_ytmusic_playlist_entry_uses_video_type() {
        let mut entry = ytmusic_track();
        entry.result_type = None;
        entry.category = None;
        entry.video_type = Some("MUSIC_VIDEO_TYPE_UGC".to_string());

        let info = normalize(Some(&RawTrack::YouTubeMusic(entry.clone()))).unwrap();
        assert_eq!(info.kind, TrackKind::Video);

        entry.video_type = Some("MUSIC_VIDEO_TYPE_ATV".to_string());
        let info = normalize(Some(&RawTrack::YouTubeMusic(entry))).unwrap();
        assert_eq!(info.kind, TrackKind::Song);
    }

    #[test]
    fn test_normalize_rejects_missing_fields() {
        let mut track = spotify_track();
        track.artists.clear();
        assert_eq!(
            normalize(Some(&RawTrack::Spotify(track))),
            Err(MalformedTrack::MissingField("artists"))
        );

        let mut track = ytmusic_track();
        track.title = Some("   ".to_string());
        assert_eq!(
            normalize(Some(&RawTrack::YouTubeMusic(track))),
            Err(MalformedTrack::MissingField("title"))
        );

        let mut track = ytmusic_track();
        track.duration = Some("live".to_string());
        assert_eq!(
            normalize(Some(&RawTrack::YouTubeMusic(track))),
            Err(MalformedTrack::InvalidDuration("live".to_string()))
        );
    }

    #[test]
    fn test_spotify_episode_is_unsupported() {
        let mut track = spotify_track();
        track.item_type = Some("episode".to_string());
        let raw = RawTrack::Spotify(track);

        assert!(!raw.is_playable());
        assert_eq!(
            normalize(Some(&raw)),
            Err(MalformedTrack::UnsupportedItem("episode".to_string()))
        );
    }

    #[test]
    fn test_playable_filter_drops_albums_and_artists() {
        let mut track = ytmusic_track();
        assert!(RawTrack::YouTubeMusic(track.clone()).is_playable());

        track.result_type = Some("video".to_string());
        assert!(RawTrack::YouTubeMusic(track.clone()).is_playable());

        track.result_type = Some("album".to_string());
        assert!(!RawTrack::YouTubeMusic(track.clone()).is_playable());

        track.result_type = Some("artist".to_string());
        assert!(!RawTrack::YouTubeMusic(track).is_playable());
    }
}
