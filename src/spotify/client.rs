use rspotify::{
    AuthCodeSpotify, Credentials, OAuth,
    model::{
        AlbumId, FullTrack, PlayableId, PlayableItem, PlaylistId, SearchResult, SearchType,
        SimplifiedArtist, TrackId, UserId,
    },
    prelude::*,
    scopes,
};
use std::io::{self, Write};
use tracing::{debug, info, warn};

use crate::catalog::{
    AlbumLibrary, CatalogClient, LIKED_SONGS_ID, MAX_BATCH_SIZE, PlaylistMetadata,
    PlaylistSummary, PlaylistWriter, SourceCatalog, SourcePlaylist, TrackSearch,
};
use crate::config::{Config, SPOTIFY_MAX_SEARCH_LIMIT};
use crate::error::{AppError, Result};
use crate::matcher::{AlbumRef, ArtistRef, RawTrack, SpotifyRawTrack};
use crate::track::{AlbumInfo, Catalog};

const PLAYLIST_PAGE_SIZE: u32 = 100;
const LIBRARY_PAGE_SIZE: u32 = 50;

pub struct SpotifyClient {
    client: AuthCodeSpotify,
    user_id: UserId<'static>,
    search_limit: u32,
}

impl SpotifyClient {
    pub async fn new(config: &Config) -> Result<Self> {
        let creds = Credentials::new(&config.spotify_client_id, &config.spotify_client_secret);

        let oauth = OAuth {
            redirect_uri: config.spotify_redirect_uri.clone(),
            scopes: scopes!(
                "user-library-read",
                "user-library-modify",
                "playlist-read-private",
                "playlist-read-collaborative",
                "playlist-modify-private",
                "playlist-modify-public"
            ),
            ..Default::default()
        };

        let client = AuthCodeSpotify::new(creds, oauth);

        let auth_url = client.get_authorize_url(false)?;
        println!("\nOpen this URL in your browser to authorize Spotify:");
        println!("{}\n", auth_url);

        print!("Enter the URL you were redirected to: ");
        io::stdout().flush()?;

        let mut redirect_url = String::new();
        io::stdin().read_line(&mut redirect_url)?;

        let code = client
            .parse_response_code(redirect_url.trim())
            .ok_or_else(|| AppError::Auth("Failed to parse authorization code".into()))?;

        client.request_token(&code).await?;

        let user = client.current_user().await?;
        let display_name = user
            .display_name
            .clone()
            .unwrap_or_else(|| user.id.id().to_string());

        info!("Successfully authenticated as Spotify user: {}", display_name);

        if config.search_limit > SPOTIFY_MAX_SEARCH_LIMIT {
            warn!(
                "SEARCH_LIMIT {} exceeds Spotify's maximum, using {}",
                config.search_limit, SPOTIFY_MAX_SEARCH_LIMIT
            );
        }

        Ok(Self {
            client,
            user_id: user.id,
            search_limit: config.spotify_search_limit(),
        })
    }

    async fn playlist_items(&self, playlist_id: &PlaylistId<'_>) -> Result<Vec<Option<RawTrack>>> {
        let mut items = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .client
                .playlist_items_manual(
                    playlist_id.clone_static(),
                    None,
                    None,
                    Some(PLAYLIST_PAGE_SIZE),
                    Some(offset),
                )
                .await?;

            for item in page.items {
                items.push(match item.track {
                    Some(PlayableItem::Track(track)) => Some(raw_track(&track)),
                    Some(PlayableItem::Episode(episode)) => {
                        debug!("Playlist contains podcast episode: {}", episode.name);
                        Some(RawTrack::Spotify(SpotifyRawTrack {
                            id: Some(episode.id.id().to_string()),
                            name: Some(episode.name),
                            item_type: Some("episode".to_string()),
                            ..Default::default()
                        }))
                    }
                    None => None,
                });
            }

            if page.next.is_none() {
                break;
            }
            offset += PLAYLIST_PAGE_SIZE;
        }

        Ok(items)
    }

    async fn liked_songs(&self) -> Result<Vec<Option<RawTrack>>> {
        let mut items = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .client
                .current_user_saved_tracks_manual(None, Some(LIBRARY_PAGE_SIZE), Some(offset))
                .await?;

            items.extend(page.items.iter().map(|saved| Some(raw_track(&saved.track))));

            if page.next.is_none() {
                break;
            }
            offset += LIBRARY_PAGE_SIZE;
        }

        Ok(items)
    }

    async fn add_tracks(&self, playlist_id: &PlaylistId<'_>, ids: &[String]) -> Result<()> {
        for chunk in ids.chunks(MAX_BATCH_SIZE) {
            let items = chunk
                .iter()
                .map(|id| TrackId::from_id(id.as_str()).map(PlayableId::Track))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            self.client
                .playlist_add_items(playlist_id.clone_static(), items, None)
                .await?;
        }

        info!("Added {} tracks to playlist", ids.len());
        Ok(())
    }
}

fn album_info(
    name: &str,
    artists: &[SimplifiedArtist],
    release_date: Option<&str>,
    id: &AlbumId<'_>,
) -> Option<AlbumInfo> {
    let artist = artists.first()?;
    Some(AlbumInfo::new(name, &artist.name, release_date, id.id()))
}

fn raw_track(track: &FullTrack) -> RawTrack {
    RawTrack::Spotify(SpotifyRawTrack {
        id: track.id.as_ref().map(|id| id.id().to_string()),
        name: Some(track.name.clone()),
        artists: track
            .artists
            .iter()
            .map(|a| ArtistRef { name: a.name.clone() })
            .collect(),
        album: Some(AlbumRef {
            name: track.album.name.clone(),
        }),
        duration_ms: u64::try_from(track.duration.num_milliseconds()).ok(),
        item_type: Some("track".to_string()),
    })
}

impl CatalogClient for SpotifyClient {
    fn catalog(&self) -> Catalog {
        Catalog::Spotify
    }
}

impl SourceCatalog for SpotifyClient {
    async fn playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let mut playlists = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .client
                .current_user_playlists_manual(Some(LIBRARY_PAGE_SIZE), Some(offset))
                .await?;

            playlists.extend(page.items.into_iter().map(|p| PlaylistSummary {
                id: p.id.id().to_string(),
                name: p.name,
                total_tracks: p.tracks.total as usize,
            }));

            if page.next.is_none() {
                break;
            }
            offset += LIBRARY_PAGE_SIZE;
        }

        info!("Found {} Spotify playlists", playlists.len());
        Ok(playlists)
    }

    async fn playlist(&self, id: &str) -> Result<SourcePlaylist> {
        if id == LIKED_SONGS_ID {
            let items = self.liked_songs().await?;
            info!("Fetched {} liked songs", items.len());
            return Ok(SourcePlaylist {
                id: id.to_string(),
                name: "Liked Songs".to_string(),
                items,
            });
        }

        let playlist_id = PlaylistId::from_id(id)?;
        let playlist = self
            .client
            .playlist(playlist_id.clone_static(), None, None)
            .await?;

        info!("Spotify playlist detected: '{}'", playlist.name);

        let items = self.playlist_items(&playlist_id).await?;

        Ok(SourcePlaylist {
            id: id.to_string(),
            name: playlist.name,
            items,
        })
    }

    async fn liked_albums(&self) -> Result<Vec<AlbumInfo>> {
        let mut albums = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .client
                .current_user_saved_albums_manual(None, Some(LIBRARY_PAGE_SIZE), Some(offset))
                .await?;

            albums.extend(page.items.iter().filter_map(|saved| {
                let album = &saved.album;
                album_info(&album.name, &album.artists, Some(&album.release_date), &album.id)
            }));

            if page.next.is_none() {
                break;
            }
            offset += LIBRARY_PAGE_SIZE;
        }

        info!("Fetched {} saved albums", albums.len());
        Ok(albums)
    }
}

impl TrackSearch for SpotifyClient {
    async fn search(&self, query: &str) -> Result<Vec<RawTrack>> {
        let result = self
            .client
            .search(query, SearchType::Track, None, None, Some(self.search_limit), None)
            .await?;

        Ok(match result {
            SearchResult::Tracks(page) => page.items.iter().map(raw_track).collect(),
            _ => Vec::new(),
        })
    }
}

impl AlbumLibrary for SpotifyClient {
    async fn search_albums(&self, query: &str) -> Result<Vec<AlbumInfo>> {
        let result = self
            .client
            .search(query, SearchType::Album, None, None, Some(self.search_limit), None)
            .await?;

        Ok(match result {
            SearchResult::Albums(page) => page
                .items
                .iter()
                .filter_map(|album| {
                    let id = album.id.as_ref()?;
                    album_info(&album.name, &album.artists, album.release_date.as_deref(), id)
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    async fn save_album(&self, album_id: &str) -> Result<()> {
        let album_id = AlbumId::from_id(album_id)?;
        self.client.current_user_saved_albums_add([album_id]).await?;
        Ok(())
    }
}

impl PlaylistWriter for SpotifyClient {
    async fn create_playlist(
        &self,
        name: &str,
        ids: &[String],
        metadata: PlaylistMetadata,
    ) -> Result<String> {
        let playlist = self
            .client
            .user_playlist_create(
                self.user_id.clone_static(),
                name,
                Some(false),
                Some(false),
                Some(metadata.description()),
            )
            .await?;

        info!("Created Spotify playlist: {}", name);

        self.add_tracks(&playlist.id, ids).await?;

        Ok(playlist.id.id().to_string())
    }

    async fn add_items(&self, playlist_id: &str, ids: &[String]) -> Result<()> {
        let playlist_id = PlaylistId::from_id(playlist_id)?;
        self.add_tracks(&playlist_id, ids).await
    }
}
