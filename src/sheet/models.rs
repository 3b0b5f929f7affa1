use crate::sheet::arena::{FileId, TrackId};
use crate::time::CueTime;
use std::fmt::{Display, Formatter};

/// Declared type of a FILE entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileType {
    Wave,
    Aiff,
    Mp3,
    Binary,
    Motorola,
    /// Anything else, kept verbatim so it survives a rewrite.
    Unknown(String),
}

impl FileType {
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "WAVE" => FileType::Wave,
            "AIFF" => FileType::Aiff,
            "MP3" => FileType::Mp3,
            "BINARY" => FileType::Binary,
            "MOTOROLA" => FileType::Motorola,
            _ => FileType::Unknown(token.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileType::Wave => "WAVE",
            FileType::Aiff => "AIFF",
            FileType::Mp3 => "MP3",
            FileType::Binary => "BINARY",
            FileType::Motorola => "MOTOROLA",
            FileType::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FileType::Unknown(_))
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackType {
    Audio,
    CdG,
    Mode1_2048,
    Mode1_2352,
    Mode2_2336,
    Mode2_2352,
    CdI2336,
    CdI2352,
    Unknown(String),
}

impl TrackType {
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "AUDIO" => TrackType::Audio,
            "CDG" => TrackType::CdG,
            "MODE1/2048" => TrackType::Mode1_2048,
            "MODE1/2352" => TrackType::Mode1_2352,
            "MODE2/2336" => TrackType::Mode2_2336,
            "MODE2/2352" => TrackType::Mode2_2352,
            "CDI/2336" => TrackType::CdI2336,
            "CDI/2352" => TrackType::CdI2352,
            _ => TrackType::Unknown(token.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TrackType::Audio => "AUDIO",
            TrackType::CdG => "CDG",
            TrackType::Mode1_2048 => "MODE1/2048",
            TrackType::Mode1_2352 => "MODE1/2352",
            TrackType::Mode2_2336 => "MODE2/2336",
            TrackType::Mode2_2352 => "MODE2/2352",
            TrackType::CdI2336 => "CDI/2336",
            TrackType::CdI2352 => "CDI/2352",
            TrackType::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TrackType::Unknown(_))
    }
}

impl Display for TrackType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-code flags of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackFlag {
    /// Digital copy permitted
    Dcp,
    /// Four channel audio
    FourChannel,
    /// Pre-emphasis enabled
    PreEmphasis,
    /// Serial copy management system
    Scms,
    Data,
}

impl TrackFlag {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "DCP" => Some(TrackFlag::Dcp),
            "4CH" => Some(TrackFlag::FourChannel),
            "PRE" => Some(TrackFlag::PreEmphasis),
            "SCMS" => Some(TrackFlag::Scms),
            "DATA" => Some(TrackFlag::Data),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackFlag::Dcp => "DCP",
            TrackFlag::FourChannel => "4CH",
            TrackFlag::PreEmphasis => "PRE",
            TrackFlag::Scms => "SCMS",
            TrackFlag::Data => "DATA",
        }
    }
}

/// Set of flags in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackFlags(Vec<TrackFlag>);

impl TrackFlags {
    pub fn insert(&mut self, flag: TrackFlag) {
        if !self.contains(flag) {
            self.0.push(flag);
        }
    }

    pub fn remove(&mut self, flag: TrackFlag) {
        self.0.retain(|f| *f != flag);
    }

    pub fn contains(&self, flag: TrackFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TrackFlag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<TrackFlag> for TrackFlags {
    fn from_iter<T: IntoIterator<Item = TrackFlag>>(iter: T) -> Self {
        let mut flags = TrackFlags::default();
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}

/// A `REM FIELD value` line without a dedicated attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remark {
    pub field: String,
    pub value: String,
}

impl Remark {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Disc-level attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetInfo {
    pub title: Option<String>,
    pub performer: Option<String>,
    pub songwriter: Option<String>,
    /// REM COMPOSER
    pub composer: Option<String>,
    /// UPC/EAN of the disc
    pub catalog: Option<String>,
    pub cd_text_file: Option<String>,
    /// REM GENRE
    pub genre: Option<String>,
    /// REM DATE
    pub date: Option<String>,
    /// REM DISCID
    pub disc_id: Option<String>,
    /// REM COMMENT
    pub comment: Option<String>,
    pub remarks: Vec<Remark>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub path: String,
    pub file_type: FileType,
    pub remarks: Vec<Remark>,
    pub(crate) position: usize,
    pub(crate) duration: Option<CueTime>,
}

impl File {
    pub(crate) fn new(path: String, file_type: FileType) -> Self {
        Self {
            path,
            file_type,
            remarks: Vec::new(),
            position: 0,
            duration: None,
        }
    }

    /// Zero-based position within the sheet.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Length of the referenced media, when a media info provider knew it.
    pub fn duration(&self) -> Option<CueTime> {
        self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub track_type: TrackType,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub songwriter: Option<String>,
    pub composer: Option<String>,
    pub isrc: Option<String>,
    pub flags: TrackFlags,
    pub pregap: Option<CueTime>,
    pub postgap: Option<CueTime>,
    pub remarks: Vec<Remark>,
    pub(crate) number: u8,
    pub(crate) file: FileId,
    pub(crate) position: usize,
    pub(crate) has_zero_index: bool,
    pub(crate) eac_end_index: Option<CueTime>,
}

impl Track {
    pub(crate) fn new(number: u8, track_type: TrackType, file: FileId) -> Self {
        Self {
            track_type,
            title: None,
            performer: None,
            songwriter: None,
            composer: None,
            isrc: None,
            flags: TrackFlags::default(),
            pregap: None,
            postgap: None,
            remarks: Vec::new(),
            number,
            file,
            position: 0,
            has_zero_index: false,
            eac_end_index: None,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// File currently hosting the track. Changes when the track is promoted
    /// into the following file.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Zero-based position across the whole sheet.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the first index is the pre-gap marker INDEX 00.
    pub fn has_zero_index(&self) -> bool {
        self.has_zero_index
    }

    /// For a track continued from the previous file: the time in that file at
    /// which the continued part starts, i.e. where the previous file's
    /// playable content for the preceding track ends.
    pub fn eac_end_index(&self) -> Option<CueTime> {
        self.eac_end_index
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub(crate) number: u8,
    pub(crate) time: CueTime,
    pub(crate) track: TrackId,
    pub(crate) file: FileId,
    pub(crate) position: usize,
}

impl Index {
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Offset inside the physical file the index lives in.
    pub fn time(&self) -> CueTime {
        self.time
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    /// Physical file holding the audio this index points into. Differs from
    /// the track's file for indices left behind in the previous file.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Zero-based position across the whole sheet.
    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_types_parse_case_insensitively() {
        assert_eq!(FileType::parse("wave"), FileType::Wave);
        assert_eq!(FileType::parse("BINARY"), FileType::Binary);
        assert_eq!(
            FileType::parse("FLAC"),
            FileType::Unknown("FLAC".to_string())
        );
        assert_eq!(FileType::parse("FLAC").to_string(), "FLAC");
        assert!(!FileType::parse("FLAC").is_known());
    }

    #[test]
    fn track_types_round_trip_through_text() {
        for token in [
            "AUDIO",
            "CDG",
            "MODE1/2048",
            "MODE1/2352",
            "MODE2/2336",
            "MODE2/2352",
            "CDI/2336",
            "CDI/2352",
        ] {
            let parsed = TrackType::parse(token);
            assert!(parsed.is_known());
            assert_eq!(parsed.as_str(), token);
        }
    }

    #[test]
    fn flags_deduplicate_and_keep_order() {
        let flags: TrackFlags = ["PRE", "DCP", "pre", "4CH"]
            .into_iter()
            .filter_map(TrackFlag::parse)
            .collect();
        assert_eq!(
            flags.iter().collect::<Vec<_>>(),
            vec![
                TrackFlag::PreEmphasis,
                TrackFlag::Dcp,
                TrackFlag::FourChannel
            ]
        );
        assert_eq!(TrackFlag::parse("XYZ"), None);
    }
}
