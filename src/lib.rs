pub mod catalog;
pub mod config;
pub mod converter;
pub mod error;
pub mod matcher;
pub mod source_url;
pub mod spotify;
pub mod track;
pub mod ytmusic;

pub use catalog::{DestinationCatalog, SourceCatalog};
pub use config::{Config, MatchSettings};
pub use converter::{ConversionJob, ConversionOptions, JobReport, JobTally, VideoPolicy};
pub use error::{AppError, Result};
pub use matcher::{MatchResult, MatchSelector, QueryGenerator};
pub use spotify::SpotifyClient;
pub use track::{AlbumInfo, Catalog, TrackInfo, TrackKind};
pub use ytmusic::YtMusicClient;
