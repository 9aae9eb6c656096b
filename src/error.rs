use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spotify API error: {0}")]
    SpotifyApi(#[from] rspotify::ClientError),

    #[error("Spotify ID error: {0}")]
    SpotifyId(#[from] rspotify::model::IdError),

    #[error("YouTube Music API error: {0}")]
    YouTubeMusicApi(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Playlist not found: {0}")]
    NotFound(String),

    #[error("Invalid playlist URL: {0}")]
    InvalidUrl(String),

    #[error("Search for '{query}' failed: {reason}")]
    SearchTransport { query: String, reason: String },

    #[error("Failed to create playlist '{name}': {reason}")]
    PlaylistCreation { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AppError>;
