use tracing::debug;

use crate::track::AlbumInfo;

/// Scores album search results: one unit each for matching artist, matching
/// title, title containment and matching release year.
#[derive(Debug, Clone, Copy)]
pub struct AlbumScorer {
    score_unit: f64,
}

impl AlbumScorer {
    pub const DEFAULT_SCORE_UNIT: f64 = 100.0;

    pub fn new(score_unit: f64) -> Self {
        Self { score_unit }
    }

    pub fn score(&self, source: &AlbumInfo, candidate: &AlbumInfo) -> f64 {
        let mut points = 0u32;

        if source.artist == candidate.artist {
            points += 1;
        }
        if source.title == candidate.title {
            points += 1;
        }
        if source.title.contains(&candidate.title) || candidate.title.contains(&source.title) {
            points += 1;
        }
        if source.year.is_some() && source.year == candidate.year {
            points += 1;
        }

        self.score_unit * f64::from(points)
    }

    /// Highest scoring candidate with any evidence at all. Ties keep the
    /// earlier candidate.
    pub fn best<'a>(
        &self,
        source: &AlbumInfo,
        candidates: &'a [AlbumInfo],
    ) -> Option<(&'a AlbumInfo, f64)> {
        let mut best: Option<(&AlbumInfo, f64)> = None;

        for candidate in candidates {
            let score = self.score(source, candidate);
            debug!("  [{}] {} -> {:.0}", candidate.source_id, candidate.search_label(), score);

            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((candidate, score));
            }
        }

        best
    }
}

impl Default for AlbumScorer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCORE_UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(title: &str, artist: &str, year: &str, id: &str) -> AlbumInfo {
        AlbumInfo::new(title, artist, Some(year), id)
    }

    #[test]
    fn test_exact_album_scores_every_unit() {
        let source = album("Abbey Road", "The Beatles", "1969", "src");
        let exact = album("Abbey Road", "The Beatles", "1969-09-26", "a");
        assert_eq!(AlbumScorer::default().score(&source, &exact), 400.0);
    }

    #[test]
    fn test_deluxe_edition_counts_containment() {
        let source = album("Abbey Road", "The Beatles", "1969", "src");
        let deluxe = album("Abbey Road (Super Deluxe Edition)", "The Beatles", "2019", "b");
        assert_eq!(AlbumScorer::default().score(&source, &deluxe), 200.0);
    }

    #[test]
    fn test_best_prefers_stronger_and_earlier() {
        let source = album("Abbey Road", "The Beatles", "1969", "src");
        let candidates = vec![
            album("Abbey Road (Remastered)", "The Beatles", "2009", "remaster"),
            album("Abbey Road", "The Beatles", "1969", "original"),
            album("Abbey Road", "The Beatles", "1969", "reissue"),
        ];

        let (best, score) = AlbumScorer::default().best(&source, &candidates).unwrap();
        assert_eq!(best.source_id, "original");
        assert_eq!(score, 400.0);
    }

    #[test]
    fn test_unrelated_albums_are_rejected() {
        let source = album("Abbey Road", "The Beatles", "1969", "src");
        let candidates = vec![album("Thriller", "Michael Jackson", "1982", "t")];
        assert!(AlbumScorer::default().best(&source, &candidates).is_none());
    }
}
