use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::TrackSearch;
use crate::config::MatchSettings;
use crate::error::{AppError, Result};
use crate::matcher::normalize::{RawTrack, normalize};
use crate::matcher::query::QueryGenerator;
use crate::matcher::score::{ConservativeScorer, ScoreContext, Scorer};
use crate::track::TrackInfo;

/// Outcome of matching one source track against the destination catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// `None` when no candidate cleared the scorer's cutoff.
    pub destination_id: Option<String>,
    pub query_used: String,
    pub score: f64,
}

impl MatchResult {
    pub fn not_found(query: String) -> Self {
        Self {
            destination_id: None,
            query_used: query,
            score: f64::NEG_INFINITY,
        }
    }

    pub fn is_found(&self) -> bool {
        self.destination_id.is_some()
    }
}

#[derive(Debug)]
struct BestCandidate {
    score: f64,
    destination_id: String,
    query: String,
}

/// Runs every generated query and keeps the single best candidate across
/// all of them.
pub struct MatchSelector<S = ConservativeScorer> {
    queries: QueryGenerator,
    scorer: S,
    positional_bonus: u32,
    search_limit: usize,
}

impl MatchSelector<ConservativeScorer> {
    pub fn from_settings(queries: QueryGenerator, settings: &MatchSettings) -> Self {
        Self::new(queries, ConservativeScorer::new(settings.score_unit), settings)
    }
}

impl<S: Scorer> MatchSelector<S> {
    pub fn new(queries: QueryGenerator, scorer: S, settings: &MatchSettings) -> Self {
        Self {
            queries,
            scorer,
            positional_bonus: settings.positional_bonus,
            search_limit: settings.search_limit,
        }
    }

    pub fn queries_for(&self, source: &TrackInfo) -> Vec<String> {
        self.queries.generate(source)
    }

    /// Search the destination for `source` and pick the best candidate.
    ///
    /// A transport failure on any query fails the whole track.
    pub async fn select_best<T: TrackSearch>(
        &self,
        source: &TrackInfo,
        search: &T,
    ) -> Result<MatchResult> {
        let mut best: Option<BestCandidate> = None;

        for query in self.queries_for(source) {
            let results = search
                .search(&query)
                .await
                .map_err(|e| AppError::SearchTransport {
                    query: query.clone(),
                    reason: e.to_string(),
                })?;

            self.score_results(source, &query, &results, &mut best);
        }

        Ok(match best {
            Some(best) => {
                debug!(
                    "Best match for '{}': {} (score {:.2}, query '{}')",
                    source.search_label(),
                    best.destination_id,
                    best.score,
                    best.query
                );
                MatchResult {
                    destination_id: Some(best.destination_id),
                    query_used: best.query,
                    score: best.score,
                }
            }
            None => {
                debug!("No acceptable candidate for '{}'", source.search_label());
                MatchResult::not_found(source.search_label())
            }
        })
    }

    /// Score one query's results into the running maximum. Ties keep the
    /// earlier candidate.
    fn score_results(
        &self,
        source: &TrackInfo,
        query: &str,
        results: &[RawTrack],
        best: &mut Option<BestCandidate>,
    ) {
        // Budget resets for every query
        let mut budget = self.positional_bonus;

        for raw in results.iter().take(self.search_limit) {
            if !raw.is_playable() {
                continue;
            }

            let candidate = match normalize(Some(raw)) {
                Ok(candidate) => candidate,
                Err(reason) => {
                    debug!("Skipping malformed candidate for '{}': {}", query, reason);
                    continue;
                }
            };

            let context = ScoreContext {
                positional_bonus: budget,
            };
            budget = budget.saturating_sub(1);

            let score = self.scorer.score(source, &candidate, &context);
            debug!(
                "  [{}] {} by {} ({}s) -> {:.2}",
                candidate.source_id,
                candidate.title,
                candidate.artist,
                candidate.duration_seconds,
                score
            );

            let best_score = best.as_ref().map_or(f64::NEG_INFINITY, |b| b.score);
            if score > best_score {
                *best = Some(BestCandidate {
                    score,
                    destination_id: candidate.source_id,
                    query: query.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::matcher::normalize::{ArtistRef, YtmRawTrack};

    fn ytm_result(id: &str, title: &str, artist: &str, duration: &str) -> RawTrack {
        RawTrack::YouTubeMusic(YtmRawTrack {
            video_id: Some(id.to_string()),
            title: Some(title.to_string()),
            artists: vec![ArtistRef { name: artist.to_string() }],
            duration: Some(duration.to_string()),
            result_type: Some("song".to_string()),
            ..Default::default()
        })
    }

    /// Answers from a fixed table and records every query it receives.
    #[derive(Default)]
    struct TableSearch {
        results: HashMap<String, Vec<RawTrack>>,
        fail_on: Option<String>,
        seen: Mutex<Vec<String>>,
    }

    impl TrackSearch for TableSearch {
        async fn search(&self, query: &str) -> Result<Vec<RawTrack>> {
            self.seen.lock().unwrap().push(query.to_string());
            if self.fail_on.as_deref() == Some(query) {
                return Err(AppError::YouTubeMusicApi("connection reset".into()));
            }
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }
    }

    fn selector() -> MatchSelector {
        MatchSelector::from_settings(QueryGenerator::new(), &MatchSettings::default())
    }

    #[tokio::test]
    async fn test_picks_best_across_queries() {
        let source = TrackInfo::mock("song a", "artist x", 180.0);
        let mut search = TableSearch::default();
        search.results.insert(
            "song a artist x".to_string(),
            vec![ytm_result("wrong", "song a (live)", "artist x", "4:10")],
        );
        search.results.insert(
            "song a by artist x".to_string(),
            vec![ytm_result("right", "song a", "artist x", "3:01")],
        );

        let result = selector().select_best(&source, &search).await.unwrap();

        assert_eq!(result.destination_id.as_deref(), Some("right"));
        assert_eq!(result.query_used, "song a by artist x");
        assert_eq!(
            *search.seen.lock().unwrap(),
            vec!["song a artist x", "song a by artist x"]
        );
    }

    #[tokio::test]
    async fn test_no_acceptable_candidate() {
        let source = TrackInfo::mock("song a", "artist x", 180.0);
        let mut search = TableSearch::default();
        // Third result gets no positional bonus and shares nothing with the source
        search.results.insert(
            "song a artist x".to_string(),
            vec![
                ytm_result("a", "other", "band", "3:00"),
                ytm_result("b", "other", "band", "30:00"),
                ytm_result("c", "nothing", "alike", "3:00"),
            ],
        );
        search.results.insert("song a by artist x".to_string(), Vec::new());

        let result = selector().select_best(&source, &search).await.unwrap();

        // "a" clears the cutoff on positional bonus alone
        assert_eq!(result.destination_id.as_deref(), Some("a"));

        search.results.insert(
            "song a artist x".to_string(),
            vec![ytm_result("b", "other", "band", "30:00")],
        );
        let result = selector().select_best(&source, &search).await.unwrap();
        assert!(!result.is_found());
        assert_eq!(result.query_used, "song a by artist x");
        assert_eq!(result.score, f64::NEG_INFINITY);
    }

    #[tokio::test]
    async fn test_positional_bonus_resets_per_query() {
        let source = TrackInfo::mock("song a", "artist x", 180.0);
        let mut search = TableSearch::default();
        search.results.insert(
            "song a artist x".to_string(),
            vec![
                ytm_result("first", "song a", "artist x", "3:00"),
                ytm_result("filler", "song a", "artist x", "3:00"),
            ],
        );
        // Same track heading the second query ties with "first" and loses the tie
        search.results.insert(
            "song a by artist x".to_string(),
            vec![ytm_result("second", "song a", "artist x", "3:00")],
        );

        let result = selector().select_best(&source, &search).await.unwrap();
        assert_eq!(result.destination_id.as_deref(), Some("first"));

        // Reorder so the second query's head beats the first query's runner-up
        search.results.insert(
            "song a artist x".to_string(),
            vec![
                ytm_result("filler", "something", "else", "3:00"),
                ytm_result("runner-up", "song a", "artist x", "3:00"),
            ],
        );
        let result = selector().select_best(&source, &search).await.unwrap();
        assert_eq!(result.destination_id.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_non_playable_and_malformed_results_are_skipped() {
        let source = TrackInfo::mock("song a", "artist x", 180.0);
        let mut album = YtmRawTrack {
            video_id: Some("album".to_string()),
            title: Some("song a".to_string()),
            artists: vec![ArtistRef { name: "artist x".to_string() }],
            duration: Some("3:00".to_string()),
            result_type: Some("album".to_string()),
            ..Default::default()
        };
        let mut search = TableSearch::default();
        search.results.insert(
            "song a artist x".to_string(),
            vec![
                RawTrack::YouTubeMusic(album.clone()),
                ytm_result("broken", "song a", "artist x", "n/a"),
            ],
        );

        let result = selector().select_best(&source, &search).await.unwrap();
        assert!(!result.is_found());

        album.result_type = Some("video".to_string());
        search.results.insert(
            "song a artist x".to_string(),
            vec![RawTrack::YouTubeMusic(album)],
        );
        let result = selector().select_best(&source, &search).await.unwrap();
        assert_eq!(result.destination_id.as_deref(), Some("album"));
    }

    #[tokio::test]
    async fn test_search_failure_is_reported_with_query() {
        let source = TrackInfo::mock("song a", "artist x", 180.0);
        let search = TableSearch {
            fail_on: Some("song a by artist x".to_string()),
            ..Default::default()
        };

        let err = selector().select_best(&source, &search).await.unwrap_err();
        match err {
            AppError::SearchTransport { query, .. } => assert_eq!(query, "song a by artist x"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
