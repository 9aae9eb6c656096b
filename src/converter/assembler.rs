use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::converter::tally::JobTally;
use crate::matcher::MatchResult;

const NO_CANDIDATE_REASON: &str = "no acceptable candidate";

/// What happened to one source track, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    Resolved(MatchResult),
    Unfound { query: String, reason: String },
    Deferred { query: String, source_id: String },
}

/// Destination ids in source order plus how often each id was matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistDraft {
    ids: Vec<String>,
    counts: HashMap<String, usize>,
}

impl PlaylistDraft {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Source tracks that resolved to an id already matched earlier in this
    /// playlist, kept or not.
    pub fn duplicate_count(&self) -> usize {
        self.counts.values().map(|count| count - 1).sum()
    }

    /// Draft ids with repeats removed.
    pub fn first_occurrences(&self) -> Vec<String> {
        let mut seen = HashSet::with_capacity(self.counts.len());
        self.ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    /// Repeated draft ids, in the order they were appended.
    pub fn duplicates(&self) -> Vec<String> {
        let mut seen = HashSet::with_capacity(self.counts.len());
        self.ids
            .iter()
            .filter(|id| !seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    fn record(&mut self, id: &str) -> bool {
        let count = self.counts.entry(id.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }
}

/// Turns per-track outcomes into a draft, routing everything that is not a
/// first occurrence into the job tally.
#[derive(Debug, Clone, Copy)]
pub struct PlaylistAssembler {
    keep_duplicates: bool,
}

impl PlaylistAssembler {
    pub fn new(keep_duplicates: bool) -> Self {
        Self { keep_duplicates }
    }

    pub fn assemble<I>(
        &self,
        playlist_name: &str,
        outcomes: I,
        tally: &mut JobTally,
    ) -> PlaylistDraft
    where
        I: IntoIterator<Item = TrackOutcome>,
    {
        let mut draft = PlaylistDraft::default();

        for outcome in outcomes {
            match outcome {
                TrackOutcome::Resolved(MatchResult {
                    destination_id: Some(id),
                    query_used,
                    ..
                }) => {
                    if draft.record(&id) {
                        draft.ids.push(id);
                    } else {
                        debug!("Duplicate match {} for '{}'", id, query_used);
                        if self.keep_duplicates {
                            draft.ids.push(id.clone());
                        }
                        tally.record_dupe(playlist_name, query_used, id);
                    }
                }
                TrackOutcome::Resolved(MatchResult {
                    destination_id: None,
                    query_used,
                    ..
                }) => {
                    tally.record_unfound(
                        playlist_name,
                        query_used,
                        NO_CANDIDATE_REASON.to_string(),
                    );
                }
                TrackOutcome::Unfound { query, reason } => {
                    tally.record_unfound(playlist_name, query, reason);
                }
                TrackOutcome::Deferred { query, source_id } => {
                    tally.record_deferred(playlist_name, query, source_id);
                }
            }
        }

        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(id: &str, query: &str) -> TrackOutcome {
        TrackOutcome::Resolved(MatchResult {
            destination_id: Some(id.to_string()),
            query_used: query.to_string(),
            score: 100.0,
        })
    }

    #[test]
    fn test_duplicates_dropped_by_default() {
        let mut tally = JobTally::new();
        let outcomes = vec![found("a", "q1"), found("b", "q2"), found("a", "q3")];

        let draft = PlaylistAssembler::new(false).assemble("Mix", outcomes, &mut tally);

        assert_eq!(draft.ids(), ["a", "b"]);
        assert_eq!(draft.duplicate_count(), 1);
        assert!(draft.duplicates().is_empty());

        let dupes = &tally.get("Mix").unwrap().dupes;
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].query, "q3");
        assert_eq!(dupes[0].destination_id, "a");
    }

    #[test]
    fn test_duplicates_kept_in_place() {
        let mut tally = JobTally::new();
        let outcomes = vec![found("a", "q1"), found("b", "q2"), found("a", "q3"), found("c", "q4")];

        let draft = PlaylistAssembler::new(true).assemble("Mix", outcomes, &mut tally);

        assert_eq!(draft.ids(), ["a", "b", "a", "c"]);
        assert_eq!(draft.first_occurrences(), vec!["a", "b", "c"]);
        assert_eq!(draft.duplicates(), vec!["a"]);
        assert_eq!(draft.duplicate_count(), 1);
        assert_eq!(tally.get("Mix").unwrap().dupes.len(), 1);
    }

    #[test]
    fn test_unfound_and_deferred_skip_the_draft() {
        let mut tally = JobTally::new();
        let outcomes = vec![
            TrackOutcome::Resolved(MatchResult::not_found("song a by artist x".into())),
            TrackOutcome::Unfound {
                query: "Song #2".into(),
                reason: "missing-track".into(),
            },
            TrackOutcome::Deferred {
                query: "cover by fan".into(),
                source_id: "vid".into(),
            },
            found("a", "q4"),
        ];

        let draft = PlaylistAssembler::new(false).assemble("Mix", outcomes, &mut tally);

        assert_eq!(draft.ids(), ["a"]);
        let mix = tally.get("Mix").unwrap();
        assert_eq!(mix.unfound.len(), 2);
        assert_eq!(mix.unfound[0].reason, "no acceptable candidate");
        assert_eq!(mix.unfound[1].query, "Song #2");
        assert_eq!(mix.deferred[0].source_id, "vid");
    }

    #[test]
    fn test_clean_playlist_leaves_tally_untouched() {
        let mut tally = JobTally::new();
        let draft =
            PlaylistAssembler::new(false).assemble("Mix", vec![found("a", "q")], &mut tally);

        assert_eq!(draft.len(), 1);
        assert!(tally.is_empty());
    }
}
