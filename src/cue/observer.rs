use crate::sheet::consistency::ConsistencyIssue;
use crate::sheet::validation::Violation;
use crate::time::error::CueTimeError;
use log::warn;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Something the parser recovered from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WarningKind {
    #[error("Input is not valid UTF-8, undecodable bytes were replaced")]
    LossyDecoding,

    #[error("Unknown keyword {0}, line ignored")]
    UnknownKeyword(String),

    #[error("{0} is not allowed here, line ignored")]
    Misplaced(String),

    #[error("Missing value for {0}")]
    MissingValue(&'static str),

    #[error("Missing closing quote")]
    MissingClosingQuote,

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error(transparent)]
    InvalidTime(CueTimeError),

    #[error("Invalid ISRC: {0}")]
    InvalidIsrc(String),

    #[error("Invalid catalog number: {0}")]
    InvalidCatalog(String),

    #[error("Unknown file type {0}")]
    UnknownFileType(String),

    #[error("Unknown track type {0}")]
    UnknownTrackType(String),

    #[error("Unknown flag {0}")]
    UnknownFlag(String),

    #[error("Unknown REM field {0}, kept as a remark")]
    UnknownRemark(String),

    #[error("Track number {found} does not follow track {previous}, renumbered to {used}")]
    TrackNumberRepaired { found: u8, previous: u8, used: u8 },

    #[error("Accepted anyway: {0}")]
    Tolerated(Violation),

    #[error(transparent)]
    Inconsistent(ConsistencyIssue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// One-based line number, if the warning stems from a single line.
    pub line: Option<usize>,
    pub kind: WarningKind,
}

impl ParseWarning {
    pub fn at(line: usize, kind: WarningKind) -> Self {
        Self {
            line: Some(line),
            kind,
        }
    }

    pub fn sheet(kind: WarningKind) -> Self {
        Self { line: None, kind }
    }
}

impl Display for ParseWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Receives the warnings of a parse as they happen.
pub trait ParseObserver {
    fn warning(&mut self, warning: ParseWarning);
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ParseObserver for LogObserver {
    fn warning(&mut self, warning: ParseWarning) {
        warn!("{warning}");
    }
}

impl ParseObserver for Vec<ParseWarning> {
    fn warning(&mut self, warning: ParseWarning) {
        self.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_render_with_their_line() {
        let warning = ParseWarning::at(7, WarningKind::UnknownFlag("XYZ".into()));
        assert_eq!(warning.to_string(), "line 7: Unknown flag XYZ");
        let warning = ParseWarning::sheet(WarningKind::LossyDecoding);
        assert!(!warning.to_string().starts_with("line"));
    }

    #[test]
    fn vec_collects_warnings() {
        let mut collected: Vec<ParseWarning> = Vec::new();
        let observer: &mut dyn ParseObserver = &mut collected;
        observer.warning(ParseWarning::at(1, WarningKind::MissingClosingQuote));
        assert_eq!(collected.len(), 1);
    }
}
