use crate::chain::error::ChainError;
use crate::sheet::arena::{FileId, IndexId, TrackId};
use crate::sheet::validation::Violation;
use crate::time::error::CueTimeError;
use thiserror::Error;

/// Rejected sheet operations. Whenever one of these is returned the sheet
/// has not been modified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error(transparent)]
    ChainError(#[from] ChainError),

    #[error(transparent)]
    CueTimeError(#[from] CueTimeError),

    #[error("Unknown file: {0}")]
    UnknownFile(FileId),

    #[error("Unknown track: {0}")]
    UnknownTrack(TrackId),

    #[error("Unknown index: {0}")]
    UnknownIndex(IndexId),

    #[error("Index rejected: {0}")]
    IndexRejected(Violation),

    #[error("Index numbers of track {0} would exceed 99")]
    IndexNumberOverflow(u8),

    #[error("Track numbers would exceed 99")]
    TrackNumberOverflow,

    #[error("Track number {number} must lie between {min} and {max}")]
    TrackNumberOutOfOrder { number: u8, min: u8, max: u8 },

    #[error("Track {0} continues from the previous file, remove its indices there first")]
    TrackIsSplit(u8),

    #[error("File {0} still holds the beginning of a track continued in the next file")]
    FileHostsSplitTrack(String),

    #[error("Track {0} already continues from the previous file and cannot move on again")]
    AlreadySplit(u8),

    #[error("Cannot insert between track {0} and the part of it in the previous file")]
    SplitBoundary(u8),

    #[error("Track {0} would be left with INDEX 00 as its only index")]
    LoneZeroIndex(u8),

    #[error("INDEX 00 cannot be toggled on track {track}: {reason}")]
    ZeroIndexToggle { track: u8, reason: &'static str },
}

pub type SheetResult<T> = Result<T, SheetError>;
