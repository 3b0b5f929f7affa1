// Red Book (CD-DA) addressing constants shared by the time and sheet modules.

pub const FRAMES_PER_SECOND: i64 = 75;
pub const SECONDS_PER_MINUTE: i64 = 60;
pub const FRAMES_PER_MINUTE: i64 = FRAMES_PER_SECOND * SECONDS_PER_MINUTE;

/// Highest track number a CUE sheet may declare.
pub const MAX_TRACK_NUMBER: u8 = 99;

/// Highest index number inside a single track.
pub const MAX_INDEX_NUMBER: u8 = 99;

/// Length of an ISRC code without separators.
pub const ISRC_LENGTH: usize = 12;

/// Length of a CATALOG (UPC/EAN) number.
pub const CATALOG_LENGTH: usize = 13;
