use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matcher::RawTrack;
use crate::track::{AlbumInfo, Catalog};

/// Playlist id used for a user's saved/liked songs.
pub const LIKED_SONGS_ID: &str = "LIKED_SONGS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub total_tracks: usize,
}

/// A playlist pulled from the source catalog, in source order.
///
/// `None` items are slots whose track no longer exists in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePlaylist {
    pub id: String,
    pub name: String,
    pub items: Vec<Option<RawTrack>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistMetadata {
    pub includes_duplicates: bool,
}

impl PlaylistMetadata {
    pub fn description(&self) -> &'static str {
        if self.includes_duplicates {
            "Includes duplicates"
        } else {
            "Does not include duplicates"
        }
    }
}

pub trait CatalogClient {
    fn catalog(&self) -> Catalog;
}

pub trait SourceCatalog: CatalogClient {
    /// Playlists in the user's library, not including liked songs.
    fn playlists(&self) -> impl Future<Output = Result<Vec<PlaylistSummary>>>;

    /// Fetch every item of a playlist. Accepts [`LIKED_SONGS_ID`].
    fn playlist(&self, id: &str) -> impl Future<Output = Result<SourcePlaylist>>;

    /// Albums saved in the user's library.
    fn liked_albums(&self) -> impl Future<Output = Result<Vec<AlbumInfo>>>;
}

pub trait TrackSearch {
    /// Full-text search. No results is an empty vector, never an error.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<RawTrack>>>;
}

pub trait PlaylistWriter {
    fn create_playlist(
        &self,
        name: &str,
        ids: &[String],
        metadata: PlaylistMetadata,
    ) -> impl Future<Output = Result<String>>;

    /// Append items to an existing playlist, duplicates allowed.
    /// Callers never pass more than [`MAX_BATCH_SIZE`] ids.
    fn add_items(&self, playlist_id: &str, ids: &[String]) -> impl Future<Output = Result<()>>;
}

pub const MAX_BATCH_SIZE: usize = 100;

pub trait AlbumLibrary {
    /// Album search, capped like track search.
    fn search_albums(&self, query: &str) -> impl Future<Output = Result<Vec<AlbumInfo>>>;

    /// Add an album to the user's saved albums.
    fn save_album(&self, album_id: &str) -> impl Future<Output = Result<()>>;
}

/// Destination side of a conversion.
pub trait DestinationCatalog: CatalogClient + TrackSearch + PlaylistWriter + AlbumLibrary {}

impl<T> DestinationCatalog for T where
    T: CatalogClient + TrackSearch + PlaylistWriter + AlbumLibrary
{
}
