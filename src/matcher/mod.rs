pub mod album;
pub mod normalize;
pub mod query;
pub mod score;
pub mod select;

pub use album::AlbumScorer;
pub use normalize::{
    AlbumRef, ArtistRef, MalformedTrack, RawTrack, SpotifyRawTrack, YtmRawTrack, format_duration,
    normalize, parse_duration,
};
pub use query::{QueryGenerator, remove_parentheses};
pub use score::{ConservativeScorer, MatchSignals, ScoreContext, Scorer, SimilarityScorer};
pub use select::{MatchResult, MatchSelector};
