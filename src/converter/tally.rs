use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnfoundTrack {
    pub query: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateTrack {
    pub query: String,
    pub destination_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnfoundAlbum {
    pub query: String,
    pub reason: String,
}

/// Handed over for manual handling instead of being matched automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeferredTrack {
    pub query: String,
    pub source_id: String,
}

/// Tracks of one playlist that did not make it into the destination as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistTally {
    pub playlist_name: String,
    pub unfound: Vec<UnfoundTrack>,
    pub dupes: Vec<DuplicateTrack>,
    pub deferred: Vec<DeferredTrack>,
}

impl PlaylistTally {
    fn new(playlist_name: &str) -> Self {
        Self {
            playlist_name: playlist_name.to_string(),
            unfound: Vec::new(),
            dupes: Vec::new(),
            deferred: Vec::new(),
        }
    }
}

/// Unfound, duplicate and deferred tracks of a single conversion job, keyed
/// by playlist name in the order playlists were first touched, plus the
/// saved albums that could not be carried over.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobTally {
    playlists: Vec<PlaylistTally>,
    unfound_albums: Vec<UnfoundAlbum>,
}

impl JobTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, playlist_name: &str) -> Option<&PlaylistTally> {
        self.playlists
            .iter()
            .find(|p| p.playlist_name == playlist_name)
    }

    pub fn playlists(&self) -> &[PlaylistTally] {
        &self.playlists
    }

    pub fn unfound_albums(&self) -> &[UnfoundAlbum] {
        &self.unfound_albums
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty() && self.unfound_albums.is_empty()
    }

    pub fn record_unfound(&mut self, playlist_name: &str, query: String, reason: String) {
        self.entry(playlist_name)
            .unfound
            .push(UnfoundTrack { query, reason });
    }

    pub fn record_dupe(&mut self, playlist_name: &str, query: String, destination_id: String) {
        self.entry(playlist_name).dupes.push(DuplicateTrack {
            query,
            destination_id,
        });
    }

    pub fn record_deferred(&mut self, playlist_name: &str, query: String, source_id: String) {
        self.entry(playlist_name)
            .deferred
            .push(DeferredTrack { query, source_id });
    }

    pub fn record_unfound_album(&mut self, query: String, reason: String) {
        self.unfound_albums.push(UnfoundAlbum { query, reason });
    }

    pub fn unfound_count(&self) -> usize {
        self.playlists.iter().map(|p| p.unfound.len()).sum()
    }

    pub fn dupe_count(&self) -> usize {
        self.playlists.iter().map(|p| p.dupes.len()).sum()
    }

    pub fn deferred_count(&self) -> usize {
        self.playlists.iter().map(|p| p.deferred.len()).sum()
    }

    fn entry(&mut self, playlist_name: &str) -> &mut PlaylistTally {
        let index = match self
            .playlists
            .iter()
            .position(|p| p.playlist_name == playlist_name)
        {
            Some(index) => index,
            None => {
                self.playlists.push(PlaylistTally::new(playlist_name));
                self.playlists.len() - 1
            }
        };
        &mut self.playlists[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_created_lazily() {
        let mut tally = JobTally::new();
        assert!(tally.is_empty());
        assert!(tally.get("Road Trip").is_none());

        tally.record_unfound("Road Trip", "Song #2".into(), "missing-track".into());
        tally.record_dupe("Road Trip", "song a by artist x".into(), "abc".into());
        tally.record_deferred("Gym", "vlog by someone".into(), "xyz".into());

        let names: Vec<_> = tally.playlists().iter().map(|p| p.playlist_name.as_str()).collect();
        assert_eq!(names, vec!["Road Trip", "Gym"]);

        let road_trip = tally.get("Road Trip").unwrap();
        assert_eq!(road_trip.unfound.len(), 1);
        assert_eq!(road_trip.dupes[0].destination_id, "abc");
        assert!(road_trip.deferred.is_empty());

        assert_eq!(tally.unfound_count(), 1);
        assert_eq!(tally.dupe_count(), 1);
        assert_eq!(tally.deferred_count(), 1);
    }

    #[test]
    fn test_unfound_albums_sit_outside_playlists() {
        let mut tally = JobTally::new();
        tally.record_unfound_album(
            "abbey road by the beatles".into(),
            "no acceptable candidate".into(),
        );

        assert!(!tally.is_empty());
        assert!(tally.playlists().is_empty());
        assert_eq!(tally.unfound_albums()[0].query, "abbey road by the beatles");
        assert_eq!(tally.unfound_count(), 0);
    }

    #[test]
    fn test_tallies_are_independent_per_job() {
        let mut first = JobTally::new();
        first.record_unfound("Mix", "Song #1".into(), "missing-track".into());

        let second = JobTally::new();
        assert!(second.get("Mix").is_none());
    }
}
