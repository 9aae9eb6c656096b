use strsim::jaro_winkler;

use crate::track::{TrackInfo, TrackKind};

/// Per-candidate information that does not come from the tracks themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreContext {
    /// Credit for appearing early in the originating query's result list.
    pub positional_bonus: u32,
}

/// A scoring formula. Higher is better; `f64::NEG_INFINITY` means the
/// candidate must never be selected.
pub trait Scorer {
    fn score(&self, source: &TrackInfo, candidate: &TrackInfo, context: &ScoreContext) -> f64;
}

/// Equality and containment checks between two case-folded tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSignals {
    pub same_title: bool,
    pub same_artist: bool,
    pub close_title: bool,
    pub close_artist: bool,
    pub same_album: bool,
}

impl MatchSignals {
    pub fn between(source: &TrackInfo, candidate: &TrackInfo) -> Self {
        Self {
            same_title: source.title == candidate.title,
            same_artist: source.artist == candidate.artist,
            close_title: contains_either(&source.title, &candidate.title),
            close_artist: contains_either(&source.artist, &candidate.artist),
            same_album: matches!(
                (&source.album, &candidate.album),
                (Some(a), Some(b)) if a == b
            ),
        }
    }
}

fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Default scorer: integer evidence points, a hard cutoff for unrelated
/// tracks, and an exponential penalty on duration difference.
#[derive(Debug, Clone, Copy)]
pub struct ConservativeScorer {
    score_unit: f64,
}

impl ConservativeScorer {
    pub const DEFAULT_SCORE_UNIT: f64 = 100.0;
    const SONG_BONUS: i64 = 30;
    const WEAK_SONG_BONUS: i64 = 1;

    pub fn new(score_unit: f64) -> Self {
        Self { score_unit }
    }

    /// Evidence points before the song bonus and doubling.
    pub fn major_score(
        signals: &MatchSignals,
        candidate: &TrackInfo,
        context: &ScoreContext,
    ) -> i64 {
        let mut major = 0;

        if candidate.is_top_result {
            major += 2;
        }
        major += i64::from(context.positional_bonus);

        major += if signals.same_title {
            2
        } else if signals.close_title {
            1
        } else {
            0
        };

        major += if signals.same_artist {
            2
        } else if signals.close_artist {
            1
        } else {
            0
        };

        if signals.same_album {
            major += 2;
        }

        major
    }
}

impl Default for ConservativeScorer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCORE_UNIT)
    }
}

impl Scorer for ConservativeScorer {
    fn score(&self, source: &TrackInfo, candidate: &TrackInfo, context: &ScoreContext) -> f64 {
        let signals = MatchSignals::between(source, candidate);
        let mut major = Self::major_score(&signals, candidate, context);

        // Not enough evidence, whatever the duration
        if major <= 1 {
            return f64::NEG_INFINITY;
        }

        if candidate.kind == TrackKind::Song {
            major += if major >= 3 {
                Self::SONG_BONUS
            } else {
                Self::WEAK_SONG_BONUS
            };
        }

        major *= 2;
        let linear_score = self.score_unit * major as f64;

        // exp overflows to +inf, which disqualifies the candidate
        let penalty = (source.duration_seconds - candidate.duration_seconds).abs().exp();

        linear_score - penalty
    }
}

/// Weighted Jaro-Winkler similarity: 40% title, 40% artist, 10% album,
/// 10% duration. Candidates below the threshold are rejected outright.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityScorer {
    threshold: f64,
}

impl SimilarityScorer {
    pub const DEFAULT_THRESHOLD: f64 = 0.85;
    const POSITION_WEIGHT: f64 = 0.01;

    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn similarity(source: &TrackInfo, candidate: &TrackInfo) -> f64 {
        let title_score = jaro_winkler(&source.title, &candidate.title);
        let artist_score = jaro_winkler(&source.artist, &candidate.artist);

        let album_score = match (&source.album, &candidate.album) {
            (Some(a), Some(b)) => jaro_winkler(a, b),
            _ => 0.0,
        };

        // Within 5s = 100%, within 15s = 80%, else 50%
        let duration_diff = (source.duration_seconds - candidate.duration_seconds).abs();
        let duration_score = if duration_diff <= 5.0 {
            1.0
        } else if duration_diff <= 15.0 {
            0.8
        } else {
            0.5
        };

        title_score * 0.4 + artist_score * 0.4 + album_score * 0.1 + duration_score * 0.1
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl Scorer for SimilarityScorer {
    fn score(&self, source: &TrackInfo, candidate: &TrackInfo, context: &ScoreContext) -> f64 {
        let similarity = Self::similarity(source, candidate);
        if similarity < self.threshold {
            return f64::NEG_INFINITY;
        }
        // Position only separates otherwise equal candidates
        similarity + f64::from(context.positional_bonus) * Self::POSITION_WEIGHT
    }
}
