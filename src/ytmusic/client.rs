use chrono::Utc;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, ORIGIN};
use serde_json::{Value, json};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::{
    AlbumLibrary, CatalogClient, LIKED_SONGS_ID, PlaylistMetadata, PlaylistSummary,
    PlaylistWriter, SourceCatalog, SourcePlaylist, TrackSearch,
};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::matcher::RawTrack;
use crate::track::{AlbumInfo, Catalog};
use crate::ytmusic::parse;

const YTM_API_BASE: &str = "https://music.youtube.com/youtubei/v1";
const YTM_CLIENT_NAME: &str = "WEB_REMIX";
const YTM_CLIENT_VERSION: &str = "1.20240918.01.00";
const YTM_ORIGIN: &str = "https://music.youtube.com";
const LIBRARY_PLAYLISTS_BROWSE_ID: &str = "FEmusic_liked_playlists";
const LIBRARY_ALBUMS_BROWSE_ID: &str = "FEmusic_liked_albums";
/// Search `params` restricting results to albums.
const ALBUM_SEARCH_PARAMS: &str = "EgWKAQIYAWoMEA4QChADEAQQCRAF";
const LIKED_MUSIC_PLAYLIST: &str = "LM";

/// Headers that must not be replayed from a captured browser request.
/// `authorization` is recomputed for every request.
const SKIPPED_HEADERS: &[&str] = &[
    "content-length",
    "content-encoding",
    "accept-encoding",
    "host",
    "authorization",
];

pub struct YtMusicClient {
    http_client: Client,
    headers: HeaderMap,
    sapisid: String,
    origin: String,
    search_limit: usize,
}

impl YtMusicClient {
    /// Build a client from the browser request headers stored at
    /// `config.ytmusic_headers_path` (a JSON object of header name to value).
    pub fn new(config: &Config) -> Result<Self> {
        let headers = load_headers(&config.ytmusic_headers_path)?;
        Self::from_headers(&headers, config.search_limit)
    }

    pub fn from_headers(raw: &HashMap<String, String>, search_limit: usize) -> Result<Self> {
        let mut headers = HeaderMap::new();

        for (name, value) in raw {
            if SKIPPED_HEADERS.contains(&name.to_lowercase().as_str()) {
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                AppError::Config(format!("Invalid value for header '{}': {}", name.as_str(), e))
            })?;
            headers.insert(name, value);
        }

        let cookie = headers
            .get("cookie")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Auth(
                    "YouTube Music headers must include a cookie from a signed-in browser session"
                        .into(),
                )
            })?;

        let sapisid = ["__Secure-3PAPISID", "SAPISID"]
            .iter()
            .find_map(|name| cookie_value(cookie, name))
            .ok_or_else(|| AppError::Auth("YouTube Music cookie has no SAPISID".into()))?
            .to_string();

        let origin = headers
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(YTM_ORIGIN)
            .to_string();

        info!("Loaded YouTube Music session headers");

        Ok(Self {
            http_client: Client::new(),
            headers,
            sapisid,
            origin,
            search_limit,
        })
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let hash = sapisid_hash(&self.sapisid, &self.origin, Utc::now().timestamp());
        let authorization = HeaderValue::from_str(&hash)
            .map_err(|e| AppError::Auth(format!("Invalid authorization header: {}", e)))?;

        let mut headers = self.headers.clone();
        headers.insert(AUTHORIZATION, authorization);
        Ok(headers)
    }

    fn context() -> Value {
        json!({
            "client": {
                "clientName": YTM_CLIENT_NAME,
                "clientVersion": YTM_CLIENT_VERSION,
                "hl": "en"
            },
            "user": {}
        })
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value> {
        body["context"] = Self::context();

        let response = self
            .http_client
            .post(format!("{}/{}", YTM_API_BASE, endpoint))
            .query(&[("prettyPrint", "false")])
            .headers(self.request_headers()?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::YouTubeMusicApi(format!(
                "{} failed ({}): {}",
                endpoint, status, error_text
            )));
        }

        Ok(response.json().await?)
    }

    async fn browse(&self, browse_id: &str) -> Result<Value> {
        self.post("browse", json!({ "browseId": browse_id })).await
    }
}

fn cookie_value<'a>(cookie: &'a str, name: &str) -> Option<&'a str> {
    cookie
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// `SAPISIDHASH <ts>_<sha1("<ts> <sapisid> <origin>")>`, the authorization
/// scheme of a signed-in browser session.
fn sapisid_hash(sapisid: &str, origin: &str, timestamp: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{} {} {}", timestamp, sapisid, origin));
    format!("SAPISIDHASH {}_{:x}", timestamp, hasher.finalize())
}

fn load_headers(path: &Path) -> Result<HashMap<String, String>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!(
            "Could not read YouTube Music headers from {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(serde_json::from_str(&contents)?)
}

impl CatalogClient for YtMusicClient {
    fn catalog(&self) -> Catalog {
        Catalog::YouTubeMusic
    }
}

impl SourceCatalog for YtMusicClient {
    async fn playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let response = self.browse(LIBRARY_PLAYLISTS_BROWSE_ID).await?;
        let playlists = parse::library_playlists(&response);
        info!("Found {} YouTube Music playlists", playlists.len());
        Ok(playlists)
    }

    async fn playlist(&self, id: &str) -> Result<SourcePlaylist> {
        let playlist_id = if id == LIKED_SONGS_ID {
            LIKED_MUSIC_PLAYLIST
        } else {
            id.strip_prefix("VL").unwrap_or(id)
        };

        let response = self.browse(&format!("VL{}", playlist_id)).await?;

        let name = if id == LIKED_SONGS_ID {
            "Liked Songs".to_string()
        } else {
            parse::playlist_title(&response).ok_or_else(|| AppError::NotFound(id.to_string()))?
        };

        // TODO: follow continuation tokens; only the first page (100 items) is read
        let items: Vec<Option<RawTrack>> = parse::playlist_items(&response)
            .into_iter()
            .map(|item| item.map(RawTrack::YouTubeMusic))
            .collect();

        info!("YouTube Music playlist detected: '{}' ({} items)", name, items.len());

        Ok(SourcePlaylist {
            id: id.to_string(),
            name,
            items,
        })
    }

    async fn liked_albums(&self) -> Result<Vec<AlbumInfo>> {
        let response = self.browse(LIBRARY_ALBUMS_BROWSE_ID).await?;
        let albums = parse::library_albums(&response);
        info!("Fetched {} saved albums", albums.len());
        Ok(albums)
    }
}

impl AlbumLibrary for YtMusicClient {
    async fn search_albums(&self, query: &str) -> Result<Vec<AlbumInfo>> {
        let response = self
            .post("search", json!({ "query": query, "params": ALBUM_SEARCH_PARAMS }))
            .await?;

        let albums: Vec<AlbumInfo> = parse::album_results(&response)
            .into_iter()
            .take(self.search_limit)
            .collect();

        debug!("Album search '{}' returned {} results", query, albums.len());
        Ok(albums)
    }

    async fn save_album(&self, album_id: &str) -> Result<()> {
        let album = self.browse(album_id).await?;
        let playlist_id = parse::album_playlist_id(&album)
            .ok_or_else(|| AppError::NotFound(format!("audio playlist of album {}", album_id)))?;

        self.post("like/like", json!({ "target": { "playlistId": playlist_id } }))
            .await?;
        Ok(())
    }
}

impl TrackSearch for YtMusicClient {
    async fn search(&self, query: &str) -> Result<Vec<RawTrack>> {
        let response = self.post("search", json!({ "query": query })).await?;

        let results: Vec<RawTrack> = parse::search_results(&response)
            .into_iter()
            .take(self.search_limit)
            .map(RawTrack::YouTubeMusic)
            .collect();

        debug!("Search '{}' returned {} results", query, results.len());
        Ok(results)
    }
}

impl PlaylistWriter for YtMusicClient {
    async fn create_playlist(
        &self,
        name: &str,
        ids: &[String],
        metadata: PlaylistMetadata,
    ) -> Result<String> {
        let response = self
            .post(
                "playlist/create",
                json!({
                    "title": name,
                    "description": metadata.description(),
                    "privacyStatus": "PRIVATE",
                    "videoIds": ids,
                }),
            )
            .await?;

        let playlist_id = response
            .get("playlistId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::YouTubeMusicApi("playlist/create returned no playlistId".into())
            })?;

        info!("Created YouTube Music playlist: {}", name);
        Ok(playlist_id.to_string())
    }

    async fn add_items(&self, playlist_id: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let actions: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "action": "ACTION_ADD_VIDEO", "addedVideoId": id }))
            .collect();

        let response = self
            .post(
                "browse/edit_playlist",
                json!({ "playlistId": playlist_id, "actions": actions }),
            )
            .await?;

        match response.get("status").and_then(Value::as_str) {
            Some("STATUS_SUCCEEDED") => {
                info!("Added {} tracks to playlist", ids.len());
                Ok(())
            }
            status => {
                warn!("Failed to add tracks to playlist: {:?}", status);
                Err(AppError::YouTubeMusicApi(format!(
                    "edit_playlist returned status {:?}",
                    status
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_require_cookie() {
        let mut raw = HashMap::new();
        raw.insert("User-Agent".to_string(), "Mozilla/5.0".to_string());
        assert!(matches!(YtMusicClient::from_headers(&raw, 10), Err(AppError::Auth(_))));

        raw.insert("Cookie".to_string(), "SAPISID=abc".to_string());
        raw.insert("Content-Length".to_string(), "42".to_string());
        let client = YtMusicClient::from_headers(&raw, 10).unwrap();
        assert!(client.headers.contains_key("user-agent"));
        assert!(!client.headers.contains_key("content-length"));
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let mut raw = HashMap::new();
        raw.insert("Cookie".to_string(), "a\nb".to_string());
        assert!(matches!(YtMusicClient::from_headers(&raw, 10), Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_sapisid_is_auth_error() {
        let mut raw = HashMap::new();
        raw.insert("Cookie".to_string(), "PREF=f6=8; HSID=x".to_string());
        assert!(matches!(YtMusicClient::from_headers(&raw, 10), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_authorization_is_rebuilt_from_cookie() {
        let mut raw = HashMap::new();
        raw.insert("Cookie".to_string(), "HSID=x; SAPISID=abc123; SSID=y".to_string());
        raw.insert("Authorization".to_string(), "SAPISIDHASH 1_stale".to_string());

        let client = YtMusicClient::from_headers(&raw, 10).unwrap();
        assert_eq!(client.sapisid, "abc123");
        assert_eq!(client.origin, "https://music.youtube.com");
        assert!(!client.headers.contains_key("authorization"));

        let headers = client.request_headers().unwrap();
        let authorization = headers[AUTHORIZATION].to_str().unwrap();
        assert!(authorization.starts_with("SAPISIDHASH "));
        assert_ne!(authorization, "SAPISIDHASH 1_stale");
    }

    #[test]
    fn test_sapisid_hash() {
        assert_eq!(
            sapisid_hash("abc123", "https://music.youtube.com", 1_700_000_000),
            "SAPISIDHASH 1700000000_597a8411c1c01f9c14cea84b6ec377b76d93be6e"
        );
        assert_eq!(cookie_value("a=1; __Secure-3PAPISID=zz", "__Secure-3PAPISID"), Some("zz"));
        assert_eq!(cookie_value("a=1", "SAPISID"), None);
    }
}
