pub mod assembler;
pub mod job;
pub mod report;
pub mod tally;

pub use assembler::{PlaylistAssembler, PlaylistDraft, TrackOutcome};
pub use job::{ConversionJob, ConversionOptions, VideoPolicy};
pub use report::{AlbumResult, ConversionResult, JobReport};
pub use tally::{
    DeferredTrack, DuplicateTrack, JobTally, PlaylistTally, UnfoundAlbum, UnfoundTrack,
};
