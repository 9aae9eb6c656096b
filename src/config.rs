use std::path::PathBuf;

use crate::error::{AppError, Result};

const DEFAULT_SEARCH_LIMIT: usize = 10;
/// Largest `limit` the Spotify search endpoint accepts.
pub const SPOTIFY_MAX_SEARCH_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub ytmusic_headers_path: PathBuf,
    pub search_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let spotify_client_id = std::env::var("SPOTIFY_CLIENT_ID").unwrap_or_default();
        let spotify_client_secret = std::env::var("SPOTIFY_CLIENT_SECRET").unwrap_or_default();

        let spotify_redirect_uri = std::env::var("SPOTIFY_REDIRECT_URI")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/callback".to_string());

        let ytmusic_headers_path = std::env::var("YTMUSIC_HEADERS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("headers_auth.json"));

        let search_limit = match std::env::var("SEARCH_LIMIT") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| {
                    AppError::Config(format!("SEARCH_LIMIT is not a positive integer: {}", raw))
                })?,
            Err(_) => DEFAULT_SEARCH_LIMIT,
        };

        Ok(Self {
            spotify_client_id,
            spotify_client_secret,
            spotify_redirect_uri,
            ytmusic_headers_path,
            search_limit,
        })
    }

    pub fn get_missing_config(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.spotify_client_id.is_empty() {
            missing.push("SPOTIFY_CLIENT_ID".to_string());
        }
        if self.spotify_client_secret.is_empty() {
            missing.push("SPOTIFY_CLIENT_SECRET".to_string());
        }
        if !self.ytmusic_headers_path.exists() {
            missing.push(format!(
                "YTMUSIC_HEADERS (file not found: {})",
                self.ytmusic_headers_path.display()
            ));
        }

        missing
    }

    /// `search_limit` capped to what Spotify accepts.
    pub fn spotify_search_limit(&self) -> u32 {
        self.search_limit.min(SPOTIFY_MAX_SEARCH_LIMIT) as u32
    }

    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            search_limit: self.search_limit,
            ..MatchSettings::default()
        }
    }
}

/// Tunables for the matching engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSettings {
    /// Linear weight applied to the doubled major score.
    pub score_unit: f64,
    /// Bonus handed to the first candidate of every query, decremented per candidate.
    pub positional_bonus: u32,
    /// Maximum number of results requested per search.
    pub search_limit: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            score_unit: 100.0,
            positional_bonus: 2,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}
