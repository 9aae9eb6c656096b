use chrono::Local;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::converter::tally::JobTally;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub playlist_name: String,
    pub total_tracks: usize,
    pub matched: usize,
    pub unfound: usize,
    pub duplicates: usize,
    pub deferred: usize,
    pub success_rate: f64,
    pub destination_playlist_id: Option<String>,
}

impl ConversionResult {
    pub fn new(playlist_name: String, total_tracks: usize) -> Self {
        Self {
            playlist_name,
            total_tracks,
            matched: 0,
            unfound: 0,
            duplicates: 0,
            deferred: 0,
            success_rate: 0.0,
            destination_playlist_id: None,
        }
    }

    pub fn calculate_success_rate(&mut self) {
        if self.total_tracks > 0 {
            self.success_rate = (self.matched as f64 / self.total_tracks as f64) * 100.0;
        }
    }
}

/// Outcome of carrying saved albums over to the destination library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumResult {
    pub total_albums: usize,
    pub saved: usize,
}

/// Everything a finished job hands back to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobReport {
    pub results: Vec<ConversionResult>,
    /// `None` unless the job converted a whole library.
    pub albums: Option<AlbumResult>,
    pub tally: JobTally,
    pub keep_duplicates: bool,
}

impl JobReport {
    /// Write the report as pretty JSON under `dir`, returning the file path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");

        fs::create_dir_all(dir)?;

        let filename = dir.join(format!("conversion_results_{}.json", timestamp));
        let json = serde_json::to_string_pretty(self)?;

        fs::write(&filename, json)?;

        info!("Conversion results saved to: {}", filename.display());

        Ok(filename)
    }

    pub fn print_summary(&self) {
        let total_playlists = self.results.len();
        let total_tracks: usize = self.results.iter().map(|r| r.total_tracks).sum();
        let total_matched: usize = self.results.iter().map(|r| r.matched).sum();

        let overall_success_rate = if total_tracks > 0 {
            (total_matched as f64 / total_tracks as f64) * 100.0
        } else {
            0.0
        };

        println!();
        println!("{}", "=".repeat(60));
        println!("{}", "CONVERSION SUMMARY".bold());
        println!("{}", "=".repeat(60));
        println!("Total playlists processed: {}", total_playlists);
        println!("Total tracks processed: {}", total_tracks);
        println!("Successfully matched: {}", total_matched.to_string().green());
        println!("Not found: {}", self.tally.unfound_count().to_string().red());
        println!("Duplicates: {}", self.tally.dupe_count().to_string().yellow());
        println!("Deferred: {}", self.tally.deferred_count().to_string().yellow());
        println!("Overall success rate: {:.1}%", overall_success_rate);
        if let Some(albums) = &self.albums {
            println!(
                "Albums saved: {}/{}",
                albums.saved.to_string().green(),
                albums.total_albums
            );
        }
        println!("{}", "=".repeat(60));

        println!("\nPlaylist breakdown:");
        for result in &self.results {
            let status = if result.success_rate >= 90.0 {
                format!("{:.1}%", result.success_rate).green()
            } else if result.success_rate >= 70.0 {
                format!("{:.1}%", result.success_rate).yellow()
            } else {
                format!("{:.1}%", result.success_rate).red()
            };

            println!(
                "  {}: {}/{} ({})",
                result.playlist_name, result.matched, result.total_tracks, status
            );
        }

        self.print_not_added();
    }

    fn print_not_added(&self) {
        if self.tally.unfound_count() > 0 {
            println!("\n{}", "The following songs could not be found and were not added:".green());
            let mut index = 1;
            for playlist in self.tally.playlists() {
                if playlist.unfound.is_empty() {
                    continue;
                }
                println!("\n-----PLAYLIST: {}-----", playlist.playlist_name);
                for track in &playlist.unfound {
                    println!("{}. {} ({})", index, track.query, track.reason);
                    index += 1;
                }
            }
        }

        if self.tally.dupe_count() > 0 {
            let heading = if self.keep_duplicates {
                "The following songs were duplicates and were added again:"
            } else {
                "The following songs were duplicates and were not added:"
            };
            println!("\n{}", heading.green());
            let mut index = 1;
            for playlist in self.tally.playlists() {
                if playlist.dupes.is_empty() {
                    continue;
                }
                println!("\n-----PLAYLIST: {}-----", playlist.playlist_name);
                for track in &playlist.dupes {
                    println!("{}. {}", index, track.query);
                    index += 1;
                }
            }
        }

        if !self.tally.unfound_albums().is_empty() {
            println!("\n{}", "The following albums could not be found and were not added:".green());
            for (i, album) in self.tally.unfound_albums().iter().enumerate() {
                println!("{}. {} ({})", i + 1, album.query, album.reason);
            }
        }

        if self.tally.deferred_count() > 0 {
            println!("\n{}", "The following videos were left for manual handling:".green());
            let mut index = 1;
            for playlist in self.tally.playlists() {
                if playlist.deferred.is_empty() {
                    continue;
                }
                println!("\n-----PLAYLIST: {}-----", playlist.playlist_name);
                for track in &playlist.deferred {
                    println!("{}. {} [{}]", index, track.query, track.source_id);
                    index += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut result = ConversionResult::new("Mix".to_string(), 4);
        result.matched = 3;
        result.calculate_success_rate();
        assert_eq!(result.success_rate, 75.0);

        let mut empty = ConversionResult::new("Empty".to_string(), 0);
        empty.calculate_success_rate();
        assert_eq!(empty.success_rate, 0.0);
    }

    #[test]
    fn test_report_serializes_tally_buckets() {
        let mut tally = JobTally::new();
        tally.record_unfound("Mix", "Song #2".into(), "missing-track".into());
        tally.record_dupe("Mix", "song a by artist x".into(), "abc".into());
        tally.record_unfound_album(
            "thriller by michael jackson".into(),
            "no acceptable candidate".into(),
        );

        let report = JobReport {
            results: vec![ConversionResult::new("Mix".to_string(), 3)],
            albums: Some(AlbumResult {
                total_albums: 2,
                saved: 1,
            }),
            tally,
            keep_duplicates: false,
        };

        let json = serde_json::to_value(&report).unwrap();
        let mix = &json["tally"]["playlists"][0];
        assert_eq!(mix["playlist_name"], "Mix");
        assert_eq!(mix["unfound"][0]["query"], "Song #2");
        assert_eq!(mix["dupes"][0]["destination_id"], "abc");
        assert_eq!(mix["deferred"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["albums"]["saved"], 1);
        assert_eq!(json["tally"]["unfound_albums"][0]["query"], "thriller by michael jackson");
    }
}
