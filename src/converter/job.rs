use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::catalog::{
    DestinationCatalog, LIKED_SONGS_ID, MAX_BATCH_SIZE, PlaylistMetadata, SourceCatalog,
    SourcePlaylist,
};
use crate::converter::assembler::{PlaylistAssembler, PlaylistDraft, TrackOutcome};
use crate::converter::report::{AlbumResult, ConversionResult, JobReport};
use crate::converter::tally::JobTally;
use crate::error::{AppError, Result};
use crate::matcher::{AlbumScorer, ConservativeScorer, MatchSelector, RawTrack, Scorer, normalize};
use crate::track::{Catalog, TrackKind};

const NO_ALBUM_REASON: &str = "no acceptable candidate";

/// What to do with source items that are generic videos rather than songs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoPolicy {
    Match,
    Defer,
}

impl VideoPolicy {
    /// YouTube Music playlists mix in uploads that rarely exist elsewhere.
    pub fn for_source(source: Catalog) -> Self {
        match source {
            Catalog::YouTubeMusic => VideoPolicy::Defer,
            Catalog::Spotify => VideoPolicy::Match,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConversionOptions {
    pub keep_duplicates: bool,
    pub dry_run: bool,
    pub video_policy: VideoPolicy,
}

/// One conversion run: owns its tally and processes tracks strictly in
/// source order.
pub struct ConversionJob<S, D, M = ConservativeScorer> {
    source: S,
    destination: D,
    selector: MatchSelector<M>,
    album_scorer: AlbumScorer,
    options: ConversionOptions,
    tally: JobTally,
    results: Vec<ConversionResult>,
    albums: Option<AlbumResult>,
}

impl<S, D, M> ConversionJob<S, D, M>
where
    S: SourceCatalog,
    D: DestinationCatalog,
    M: Scorer,
{
    pub fn new(
        source: S,
        destination: D,
        selector: MatchSelector<M>,
        options: ConversionOptions,
    ) -> Self {
        Self {
            source,
            destination,
            selector,
            album_scorer: AlbumScorer::default(),
            options,
            tally: JobTally::new(),
            results: Vec::new(),
            albums: None,
        }
    }

    pub fn tally(&self) -> &JobTally {
        &self.tally
    }

    /// Convert liked songs, then every playlist in the source library, then
    /// the saved albums.
    pub async fn convert_library(&mut self) -> Result<()> {
        let playlists = self.source.playlists().await?;

        info!(
            "Starting conversion of liked songs and {} playlists (dry_run={})",
            playlists.len(),
            self.options.dry_run
        );

        let pb = ProgressBar::new(playlists.len() as u64 + 1);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let ids = std::iter::once(LIKED_SONGS_ID.to_string())
            .chain(playlists.into_iter().map(|p| p.id));
        for id in ids {
            pb.set_message(format!("Converting: {}", id));
            self.convert_playlist(&id).await?;
            pb.inc(1);
        }

        pb.finish_with_message("Playlists complete");

        self.convert_liked_albums().await?;
        Ok(())
    }

    /// Save every album from the source library into the destination
    /// library. Albums without a convincing match are tallied, never fatal.
    pub async fn convert_liked_albums(&mut self) -> Result<&AlbumResult> {
        let albums = self.source.liked_albums().await?;
        info!("Converting {} saved albums", albums.len());

        let mut result = AlbumResult {
            total_albums: albums.len(),
            saved: 0,
        };

        for album in &albums {
            let query = album.search_label();

            let candidates = match self.destination.search_albums(&query).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!("Album search failed for '{}': {}", query, e);
                    self.tally.record_unfound_album(query, e.to_string());
                    continue;
                }
            };

            let Some((best, score)) = self.album_scorer.best(album, &candidates) else {
                debug!("No acceptable album for '{}'", query);
                self.tally
                    .record_unfound_album(query, NO_ALBUM_REASON.to_string());
                continue;
            };

            if self.options.dry_run {
                debug!("Dry run, not saving album {} (score {:.0})", best.source_id, score);
                result.saved += 1;
                continue;
            }

            match self.destination.save_album(&best.source_id).await {
                Ok(()) => {
                    info!("Added album: {}", query);
                    result.saved += 1;
                }
                Err(e) => {
                    warn!("Failed to save album '{}': {}", query, e);
                    self.tally.record_unfound_album(query, e.to_string());
                }
            }
        }

        Ok(&*self.albums.insert(result))
    }

    pub async fn convert_playlist(&mut self, playlist_id: &str) -> Result<&ConversionResult> {
        let playlist = self.source.playlist(playlist_id).await?;
        self.convert_source_playlist(&playlist).await
    }

    /// Match every item of `playlist` and write the destination playlist.
    ///
    /// Only a failure to create the destination playlist is returned as an
    /// error; per-track problems end up in the tally.
    pub async fn convert_source_playlist(
        &mut self,
        playlist: &SourcePlaylist,
    ) -> Result<&ConversionResult> {
        info!("Converting playlist: {} ({} tracks)", playlist.name, playlist.items.len());

        let mut result = ConversionResult::new(playlist.name.clone(), playlist.items.len());

        let pb = ProgressBar::new(playlist.items.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.green} [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut outcomes = Vec::with_capacity(playlist.items.len());
        for (index, item) in playlist.items.iter().enumerate() {
            outcomes.push(self.resolve_track(index, item.as_ref()).await);
            pb.inc(1);
        }
        pb.finish_and_clear();

        for outcome in &outcomes {
            match outcome {
                TrackOutcome::Resolved(m) if m.is_found() => result.matched += 1,
                TrackOutcome::Resolved(_) | TrackOutcome::Unfound { .. } => result.unfound += 1,
                TrackOutcome::Deferred { .. } => result.deferred += 1,
            }
        }

        let assembler = PlaylistAssembler::new(self.options.keep_duplicates);
        let draft = assembler.assemble(&playlist.name, outcomes, &mut self.tally);

        result.duplicates = draft.duplicate_count();
        result.calculate_success_rate();

        if self.options.dry_run {
            debug!("Dry run, not writing {} tracks", draft.len());
        } else if draft.is_empty() {
            warn!("No tracks matched for {}, skipping playlist creation", playlist.name);
        } else {
            let playlist_id = self.write_playlist(&playlist.name, &draft).await?;
            result.destination_playlist_id = Some(playlist_id);
        }

        info!(
            "Playlist conversion completed: {} - {}/{} tracks matched ({:.1}% success rate)",
            playlist.name, result.matched, result.total_tracks, result.success_rate
        );

        self.results.push(result);
        Ok(&self.results[self.results.len() - 1])
    }

    async fn resolve_track(&self, index: usize, item: Option<&RawTrack>) -> TrackOutcome {
        let track = match normalize(item) {
            Ok(track) => track,
            Err(reason) => {
                debug!("Song #{} rejected: {}", index + 1, reason);
                return TrackOutcome::Unfound {
                    query: format!("Song #{}", index + 1),
                    reason: reason.to_string(),
                };
            }
        };

        if track.kind == TrackKind::Video && self.options.video_policy == VideoPolicy::Defer {
            debug!("Deferring video: {}", track.search_label());
            return TrackOutcome::Deferred {
                query: track.search_label(),
                source_id: track.source_id,
            };
        }

        match self.selector.select_best(&track, &self.destination).await {
            Ok(result) => TrackOutcome::Resolved(result),
            Err(e) => {
                warn!("{}", e);
                TrackOutcome::Unfound {
                    query: track.search_label(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn write_playlist(&self, source_name: &str, draft: &PlaylistDraft) -> Result<String> {
        let name = format!("{} (copied from {})", source_name, self.source.catalog());
        let metadata = PlaylistMetadata {
            includes_duplicates: self.options.keep_duplicates,
        };

        let playlist_id = self
            .destination
            .create_playlist(&name, &draft.first_occurrences(), metadata)
            .await
            .map_err(|e| AppError::PlaylistCreation {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        let dupes = draft.duplicates();
        if self.options.keep_duplicates && !dupes.is_empty() {
            for (i, chunk) in dupes.chunks(MAX_BATCH_SIZE).enumerate() {
                if let Err(e) = self.destination.add_items(&playlist_id, chunk).await {
                    warn!("Failed to add duplicate batch {} to playlist {}: {}", i + 1, name, e);
                }
            }
        }

        info!("Created {} playlist: {}", self.destination.catalog(), name);
        Ok(playlist_id)
    }

    pub fn finish(self) -> JobReport {
        JobReport {
            results: self.results,
            albums: self.albums,
            tally: self.tally,
            keep_duplicates: self.options.keep_duplicates,
        }
    }
}
