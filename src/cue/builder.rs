use crate::cd::{CATALOG_LENGTH, ISRC_LENGTH, MAX_INDEX_NUMBER, MAX_TRACK_NUMBER};
use crate::cue::ParseOptions;
use crate::cue::error::{CueError, CueResult};
use crate::cue::line::{CueLine, Keyword, split_file_args, split_token, unquote};
use crate::cue::observer::{ParseObserver, ParseWarning, WarningKind};
use crate::cue::segment::{Document, FileSegment, TrackSegment};
use crate::sheet::error::SheetError;
use crate::sheet::models::{FileType, Remark, TrackFlag, TrackType};
use crate::sheet::validation::ValidationProfile;
use crate::sheet::{FileId, Sheet, TrackId};
use crate::time::CueTime;
use log::debug;

/// Drives the sheet API from a segmented document.
pub(crate) struct SheetBuilder<'a> {
    sheet: Sheet,
    profile: ValidationProfile,
    observer: &'a mut dyn ParseObserver,
}

fn rejected(line: &CueLine) -> impl FnOnce(SheetError) -> CueError + '_ {
    move |source| CueError::Rejected {
        line: line.number,
        source,
    }
}

impl<'a> SheetBuilder<'a> {
    pub(crate) fn new(options: ParseOptions, observer: &'a mut dyn ParseObserver) -> Self {
        Self {
            sheet: Sheet::new(),
            profile: options.profile,
            observer,
        }
    }

    pub(crate) fn build(mut self, document: Document) -> CueResult<Sheet> {
        for line in &document.header {
            self.apply_sheet_line(line);
        }
        for segment in &document.files {
            self.build_file(segment)?;
        }

        self.sheet.renumber();
        for issue in self.sheet.check_consistency() {
            self.observer
                .warning(ParseWarning::sheet(WarningKind::Inconsistent(issue)));
        }

        debug!(
            "Built sheet with {} files, {} tracks and {} indices",
            self.sheet.file_count(),
            self.sheet.track_count(),
            self.sheet.index_count()
        );
        Ok(self.sheet)
    }

    fn build_file(&mut self, segment: &FileSegment) -> CueResult<()> {
        let previous = self.sheet.last_file();
        let line = &segment.file_line;

        let (path, type_token) = split_file_args(&line.args);
        if path.unterminated {
            self.warn(line, WarningKind::MissingClosingQuote);
        }
        if path.value.is_empty() {
            self.warn(line, WarningKind::MissingValue("FILE"));
        }
        let file_type = match type_token {
            Some(token) => {
                let file_type = FileType::parse(token);
                if !file_type.is_known() {
                    self.warn(line, WarningKind::UnknownFileType(token.to_string()));
                }
                file_type
            }
            None => {
                self.warn(line, WarningKind::MissingValue("FILE type"));
                FileType::Unknown(String::new())
            }
        };
        let file = self
            .sheet
            .add_file(path.value, file_type)
            .map_err(rejected(line))?;

        let mut continued: Option<TrackId> = None;
        for line in &segment.pre_track {
            match (continued, &line.keyword) {
                (Some(track), _) => self.apply_track_line(track, line)?,
                (None, Keyword::Index) => {
                    let track = self.continue_track(previous, line)?;
                    continued = Some(track);
                    self.apply_track_line(track, line)?;
                }
                (None, Keyword::Rem) => {
                    if let Some(remark) = self.remark(line) {
                        self.sheet.file_mut(file)?.remarks.push(remark);
                    }
                }
                (None, keyword) => {
                    let keyword = keyword.to_string();
                    self.warn(line, WarningKind::Misplaced(keyword));
                }
            }
        }

        for track in &segment.tracks {
            self.build_track(file, track)?;
        }
        Ok(())
    }

    /// An INDEX before the first TRACK of a file: the last track of the
    /// previous file moves into this one and keeps what it already has.
    fn continue_track(&mut self, previous: Option<FileId>, line: &CueLine) -> CueResult<TrackId> {
        let has_track = previous.is_some_and(|file| self.sheet.tracks_of(file).next().is_some());
        let Some(previous) = previous.filter(|_| has_track) else {
            return Err(CueError::NoActiveTrack(line.number));
        };
        let already_split = self
            .sheet
            .tracks_of(previous)
            .last()
            .is_some_and(|track| self.sheet.is_split(track));
        if already_split {
            return Err(CueError::TrackSpansFiles(line.number));
        }
        let track = self
            .sheet
            .promote_last_track(previous)
            .map_err(rejected(line))?;
        debug!(
            "Track {} continues in the next file",
            self.sheet.track(track)?.number()
        );
        Ok(track)
    }

    fn build_track(&mut self, file: FileId, segment: &TrackSegment) -> CueResult<()> {
        let line = &segment.track_line;
        let (number_token, rest) = split_token(&line.args);
        let (type_token, _) = split_token(rest);

        let parsed = match number_token.parse::<u8>() {
            Ok(number) => Some(number),
            Err(_) => {
                self.warn(line, WarningKind::InvalidNumber(number_token.to_string()));
                None
            }
        };
        let number = self.track_number(line, parsed);

        let track_type = if type_token.is_empty() {
            self.warn(line, WarningKind::MissingValue("TRACK type"));
            TrackType::Unknown(String::new())
        } else {
            let track_type = TrackType::parse(type_token);
            if !track_type.is_known() {
                self.warn(line, WarningKind::UnknownTrackType(type_token.to_string()));
            }
            track_type
        };

        let track = self
            .sheet
            .add_track(file, number, track_type)
            .map_err(rejected(line))?;
        for line in &segment.lines {
            self.apply_track_line(track, line)?;
        }
        Ok(())
    }

    /// Keeps track numbers in 1..=99 and never below the previous track. A
    /// repair after track 99 reuses 99.
    fn track_number(&mut self, line: &CueLine, parsed: Option<u8>) -> u8 {
        let previous = self
            .sheet
            .last_track()
            .and_then(|track| self.sheet.track(track).ok())
            .map(|track| track.number());
        let following = previous.map_or(1, |number| {
            number.saturating_add(1).min(MAX_TRACK_NUMBER)
        });

        match parsed {
            None => following,
            Some(found)
                if found == 0
                    || found > MAX_TRACK_NUMBER
                    || previous.is_some_and(|previous| found < previous) =>
            {
                self.warn(
                    line,
                    WarningKind::TrackNumberRepaired {
                        found,
                        previous: previous.unwrap_or_default(),
                        used: following,
                    },
                );
                following
            }
            Some(found) => found,
        }
    }

    fn apply_sheet_line(&mut self, line: &CueLine) {
        match &line.keyword {
            Keyword::Title => self.sheet.info.title = self.value(line, "TITLE"),
            Keyword::Performer => self.sheet.info.performer = self.value(line, "PERFORMER"),
            Keyword::Songwriter => self.sheet.info.songwriter = self.value(line, "SONGWRITER"),
            Keyword::CdTextFile => self.sheet.info.cd_text_file = self.value(line, "CDTEXTFILE"),
            Keyword::Catalog => {
                if let Some(catalog) = self.value(line, "CATALOG") {
                    if catalog.len() == CATALOG_LENGTH && catalog.chars().all(|c| c.is_ascii_digit())
                    {
                        self.sheet.info.catalog = Some(catalog);
                    } else {
                        self.warn(line, WarningKind::InvalidCatalog(catalog));
                    }
                }
            }
            Keyword::Rem => {
                let Some(remark) = self.remark(line) else {
                    return;
                };
                let info = &mut self.sheet.info;
                let slot = match remark.field.to_ascii_uppercase().as_str() {
                    "GENRE" => Some(&mut info.genre),
                    "DATE" => Some(&mut info.date),
                    "DISCID" => Some(&mut info.disc_id),
                    "COMMENT" => Some(&mut info.comment),
                    "COMPOSER" => Some(&mut info.composer),
                    _ => None,
                };
                match slot {
                    Some(slot) => *slot = Some(remark.value),
                    None => {
                        let field = remark.field.clone();
                        self.sheet.info.remarks.push(remark);
                        self.warn(line, WarningKind::UnknownRemark(field));
                    }
                }
            }
            Keyword::Unknown(keyword) => {
                let keyword = keyword.clone();
                self.warn(line, WarningKind::UnknownKeyword(keyword));
            }
            keyword => {
                let keyword = keyword.to_string();
                self.warn(line, WarningKind::Misplaced(keyword));
            }
        }
    }

    fn apply_track_line(&mut self, track: TrackId, line: &CueLine) -> CueResult<()> {
        match &line.keyword {
            Keyword::Index => self.apply_index(track, line)?,
            Keyword::Title => {
                let title = self.value(line, "TITLE");
                self.sheet.track_mut(track)?.title = title;
            }
            Keyword::Performer => {
                let performer = self.value(line, "PERFORMER");
                self.sheet.track_mut(track)?.performer = performer;
            }
            Keyword::Songwriter => {
                let songwriter = self.value(line, "SONGWRITER");
                self.sheet.track_mut(track)?.songwriter = songwriter;
            }
            Keyword::Isrc => {
                if let Some(isrc) = self.value(line, "ISRC") {
                    if isrc.len() == ISRC_LENGTH && isrc.chars().all(|c| c.is_ascii_alphanumeric()) {
                        self.sheet.track_mut(track)?.isrc = Some(isrc);
                    } else {
                        self.warn(line, WarningKind::InvalidIsrc(isrc));
                    }
                }
            }
            Keyword::Flags => {
                for token in line.args.split_whitespace() {
                    match TrackFlag::parse(token) {
                        Some(flag) => self.sheet.track_mut(track)?.flags.insert(flag),
                        None => self.warn(line, WarningKind::UnknownFlag(token.to_string())),
                    }
                }
            }
            Keyword::Pregap => {
                if let Some(time) = self.time(line, &line.args) {
                    self.sheet.track_mut(track)?.pregap = Some(time);
                }
            }
            Keyword::Postgap => {
                if let Some(time) = self.time(line, &line.args) {
                    self.sheet.track_mut(track)?.postgap = Some(time);
                }
            }
            Keyword::Rem => {
                if let Some(remark) = self.remark(line) {
                    if remark.field.eq_ignore_ascii_case("COMPOSER") {
                        self.sheet.track_mut(track)?.composer = Some(remark.value);
                    } else {
                        self.warn(line, WarningKind::UnknownRemark(remark.field.clone()));
                        self.sheet.track_mut(track)?.remarks.push(remark);
                    }
                }
            }
            Keyword::Unknown(keyword) => {
                let keyword = keyword.clone();
                self.warn(line, WarningKind::UnknownKeyword(keyword));
            }
            keyword => {
                let keyword = keyword.to_string();
                self.warn(line, WarningKind::Misplaced(keyword));
            }
        }
        Ok(())
    }

    fn apply_index(&mut self, track: TrackId, line: &CueLine) -> CueResult<()> {
        let (number_token, rest) = split_token(&line.args);
        let (time_token, _) = split_token(rest);
        if number_token.is_empty() {
            self.warn(line, WarningKind::MissingValue("INDEX"));
            return Ok(());
        }

        let number = match number_token.parse::<u8>() {
            Ok(number) if number <= MAX_INDEX_NUMBER => Some(number),
            _ => {
                self.warn(line, WarningKind::InvalidNumber(number_token.to_string()));
                None
            }
        };
        // An index without a usable time cannot be placed.
        let Some(time) = self.time(line, time_token) else {
            return Ok(());
        };
        // Nor can an automatic number follow INDEX 99.
        let last_number = self
            .sheet
            .indices_of(track)
            .last()
            .and_then(|index| self.sheet.index(index).ok())
            .map(|index| index.number());
        if number.is_none() && last_number == Some(MAX_INDEX_NUMBER) {
            return Ok(());
        }

        let (_, tolerated) = self
            .sheet
            .add_index_with(track, time, number, self.profile)
            .map_err(rejected(line))?;
        for violation in tolerated {
            self.warn(line, WarningKind::Tolerated(violation));
        }
        Ok(())
    }

    fn value(&mut self, line: &CueLine, name: &'static str) -> Option<String> {
        let quoted = unquote(&line.args);
        if quoted.unterminated {
            self.warn(line, WarningKind::MissingClosingQuote);
        }
        if quoted.value.is_empty() {
            self.warn(line, WarningKind::MissingValue(name));
            return None;
        }
        Some(quoted.value.to_string())
    }

    fn remark(&mut self, line: &CueLine) -> Option<Remark> {
        let (field, rest) = split_token(&line.args);
        if field.is_empty() {
            self.warn(line, WarningKind::MissingValue("REM"));
            return None;
        }
        let quoted = unquote(rest);
        if quoted.unterminated {
            self.warn(line, WarningKind::MissingClosingQuote);
        }
        Some(Remark::new(field, quoted.value))
    }

    fn time(&mut self, line: &CueLine, text: &str) -> Option<CueTime> {
        match text.parse() {
            Ok(time) => Some(time),
            Err(err) => {
                self.warn(line, WarningKind::InvalidTime(err));
                None
            }
        }
    }

    fn warn(&mut self, line: &CueLine, kind: WarningKind) {
        self.observer.warning(ParseWarning::at(line.number, kind));
    }
}
