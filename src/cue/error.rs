use crate::sheet::error::SheetError;
use thiserror::Error;

/// Fatal parse and write errors. A parse that fails discards the sheet.
#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SheetError(#[from] SheetError),

    #[error("Line {line}: {source}")]
    Rejected { line: usize, source: SheetError },

    #[error("Line {0}: TRACK appears before any FILE")]
    TrackBeforeFile(usize),

    #[error("Line {0}: no track is open for this line")]
    NoActiveTrack(usize),

    #[error("Line {0}: FILE is followed by neither INDEX nor TRACK")]
    FileWithoutTrack(usize),

    #[error("Line {0}: the continued track already started two files back")]
    TrackSpansFiles(usize),
}

pub type CueResult<T> = Result<T, CueError>;
