use crate::track::TrackInfo;

/// Builds the ordered list of search queries submitted for one source track.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryGenerator {
    title_only: bool,
}

impl QueryGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also search for the bare title. Helps catalogs that rank on
    /// unconstrained title terms.
    pub fn with_title_only(mut self, enabled: bool) -> Self {
        self.title_only = enabled;
        self
    }

    pub fn generate(&self, track: &TrackInfo) -> Vec<String> {
        let (title, artist) = (track.title.as_str(), track.artist.as_str());
        let mut queries = vec![
            format!("{} {}", title, artist),
            format!("{} by {}", title, artist),
        ];

        if title.contains('(') || artist.contains('(') {
            let title = remove_parentheses(title);
            let artist = remove_parentheses(artist);
            queries.push(format!("{} {}", title, artist));
            queries.push(format!("{} by {}", title, artist));
        }

        if self.title_only {
            queries.push(title.to_string());
        }

        let mut unique: Vec<String> = Vec::with_capacity(queries.len());
        for query in queries {
            if !unique.contains(&query) {
                unique.push(query);
            }
        }
        unique
    }
}

/// Strip every parenthesised span, nested spans included.
///
/// An unclosed `(` removes everything up to the end of the string.
pub fn remove_parentheses(text: &str) -> String {
    let mut depth = 0usize;
    let mut cleaned = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => cleaned.push(c),
            _ => {}
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_parentheses() {
        assert_eq!(remove_parentheses("Song (feat. X) (Remix)"), "Song ");
        assert_eq!(remove_parentheses("A (B"), "A ");
        assert_eq!(remove_parentheses("A (B (C) D) E"), "A  E");
        assert_eq!(remove_parentheses("No parens"), "No parens");
    }

    #[test]
    fn test_plain_title_gets_two_queries() {
        let track = TrackInfo::mock("Bohemian Rhapsody", "Queen", 180.0);
        let queries = QueryGenerator::new().generate(&track);
        assert_eq!(
            queries,
            vec!["Bohemian Rhapsody Queen", "Bohemian Rhapsody by Queen"]
        );
    }

    #[test]
    fn test_parenthetical_title_adds_stripped_queries() {
        let track = TrackInfo::mock("Yesterday (Remastered 2009)", "The Beatles", 180.0);
        let queries = QueryGenerator::new().generate(&track);
        assert_eq!(
            queries,
            vec![
                "Yesterday (Remastered 2009) The Beatles",
                "Yesterday (Remastered 2009) by The Beatles",
                "Yesterday  The Beatles",
                "Yesterday  by The Beatles",
            ]
        );
    }

    #[test]
    fn test_title_only_query_is_last() {
        let queries = QueryGenerator::new()
            .with_title_only(true)
            .generate(&TrackInfo::mock("Yesterday (Remastered 2009)", "The Beatles", 180.0));

        assert_eq!(queries.len(), 5);
        assert_eq!(queries[4], "Yesterday (Remastered 2009)");
    }

    #[test]
    fn test_queries_are_unique() {
        let queries = QueryGenerator::new()
            .with_title_only(true)
            .generate(&TrackInfo::mock("Intro", "()", 180.0));

        let mut seen = std::collections::HashSet::new();
        assert!(queries.iter().all(|q| seen.insert(q.clone())));
        assert_eq!(queries.len(), 5);
        assert_eq!(queries[2], "Intro ");

        let queries = QueryGenerator::new().generate(&TrackInfo::mock("Intro (", "x", 180.0));
        assert_eq!(queries, vec!["Intro ( x", "Intro ( by x", "Intro  x", "Intro  by x"]);
    }
}
