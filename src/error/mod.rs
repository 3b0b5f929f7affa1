use crate::cue::error::CueError;
use crate::sheet::error::SheetError;
use std::path::PathBuf;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CueKitError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error(transparent)]
    SheetError(#[from] SheetError),

    #[error("Output file already exists, use --force to overwrite: {0}")]
    OutputAlreadyExists(PathBuf),
}

pub type CueKitResult<T> = result::Result<T, CueKitError>;
