//! Groups classified lines by the FILE and TRACK lines that open them.

use crate::cue::error::{CueError, CueResult};
use crate::cue::line::{CueLine, Keyword};

#[derive(Debug, Default)]
pub(crate) struct Document {
    /// Disc-level lines before the first FILE.
    pub(crate) header: Vec<CueLine>,
    pub(crate) files: Vec<FileSegment>,
}

#[derive(Debug)]
pub(crate) struct FileSegment {
    pub(crate) file_line: CueLine,
    /// Lines between FILE and the first TRACK. Holding an INDEX means the
    /// previous file's last track continues here.
    pub(crate) pre_track: Vec<CueLine>,
    pub(crate) tracks: Vec<TrackSegment>,
}

impl FileSegment {
    fn new(file_line: CueLine) -> Self {
        Self {
            file_line,
            pre_track: Vec::new(),
            tracks: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TrackSegment {
    pub(crate) track_line: CueLine,
    pub(crate) lines: Vec<CueLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeAnyFile,
    /// Inside a FILE, no TRACK yet. `opened` is false until the FILE line
    /// was followed by INDEX or TRACK.
    InFile { opened: bool },
    InTrack,
}

pub(crate) fn segment(lines: impl IntoIterator<Item = CueLine>) -> CueResult<Document> {
    let mut document = Document::default();
    let mut state = State::BeforeAnyFile;

    for line in lines {
        let opens_file = matches!(line.keyword, Keyword::Index | Keyword::Track);
        let is_remark = line.keyword == Keyword::Rem;
        state = match state {
            State::InFile { opened: false } if opens_file => {
                feed(&mut document, line, State::InFile { opened: true })?
            }
            State::InFile { opened: false } if is_remark => {
                push_pre_track(&mut document, line);
                state
            }
            State::InFile { opened: false } => {
                return Err(CueError::FileWithoutTrack(last_file_line(&document)));
            }
            current => feed(&mut document, line, current)?,
        };
    }

    if state == (State::InFile { opened: false }) {
        return Err(CueError::FileWithoutTrack(last_file_line(&document)));
    }
    Ok(document)
}

fn feed(document: &mut Document, line: CueLine, state: State) -> CueResult<State> {
    match line.keyword {
        Keyword::File => {
            document.files.push(FileSegment::new(line));
            return Ok(State::InFile { opened: false });
        }
        Keyword::Track => {
            let Some(file) = document.files.last_mut() else {
                return Err(CueError::TrackBeforeFile(line.number));
            };
            file.tracks.push(TrackSegment {
                track_line: line,
                lines: Vec::new(),
            });
            return Ok(State::InTrack);
        }
        _ => {}
    }

    match state {
        State::BeforeAnyFile => {
            if matches!(
                line.keyword,
                Keyword::Index | Keyword::Pregap | Keyword::Postgap
            ) {
                return Err(CueError::NoActiveTrack(line.number));
            }
            document.header.push(line);
        }
        // Only reached once an INDEX opened the file, so gap lines here
        // belong to the continued track.
        State::InFile { .. } => push_pre_track(document, line),
        State::InTrack => {
            if let Some(track) = document
                .files
                .last_mut()
                .and_then(|file| file.tracks.last_mut())
            {
                track.lines.push(line);
            }
        }
    }
    Ok(state)
}

fn push_pre_track(document: &mut Document, line: CueLine) {
    if let Some(file) = document.files.last_mut() {
        file.pre_track.push(line);
    }
}

fn last_file_line(document: &Document) -> usize {
    document
        .files
        .last()
        .map(|file| file.file_line.number)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<CueLine> {
        text.lines()
            .enumerate()
            .filter_map(|(i, raw)| CueLine::parse(i + 1, raw))
            .collect()
    }

    #[test]
    fn splits_into_header_files_and_tracks() {
        let document = segment(lines(
            "TITLE \"Album\"\n\
             FILE \"a.wav\" WAVE\n\
             REM note\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n\
             TRACK 02 AUDIO\n\
             INDEX 01 03:00:00\n\
             FILE \"b.wav\" WAVE\n\
             INDEX 00 00:00:00\n\
             TRACK 03 AUDIO\n\
             INDEX 01 00:02:00\n",
        ))
        .unwrap();

        assert_eq!(document.header.len(), 1);
        assert_eq!(document.files.len(), 2);
        let first = &document.files[0];
        assert_eq!(first.pre_track.len(), 1);
        assert!(first.pre_track.iter().all(|line| line.keyword != Keyword::Index));
        assert_eq!(first.tracks.len(), 2);
        let second = &document.files[1];
        assert_eq!(second.pre_track[0].keyword, Keyword::Index);
        assert_eq!(second.tracks.len(), 1);
        assert_eq!(second.tracks[0].lines.len(), 1);
    }

    #[test]
    fn index_without_track_is_fatal() {
        assert!(matches!(
            segment(lines("TITLE x\nINDEX 01 00:00:00")),
            Err(CueError::NoActiveTrack(2))
        ));
    }

    #[test]
    fn track_before_file_is_fatal() {
        assert!(matches!(
            segment(lines("TRACK 01 AUDIO")),
            Err(CueError::TrackBeforeFile(1))
        ));
    }

    #[test]
    fn file_must_be_followed_by_index_or_track() {
        assert!(matches!(
            segment(lines("FILE a.wav WAVE\nREM x\nTITLE y\nTRACK 01 AUDIO")),
            Err(CueError::FileWithoutTrack(1))
        ));
        assert!(matches!(
            segment(lines("FILE a.wav WAVE\nTRACK 01 AUDIO\nFILE b.wav WAVE")),
            Err(CueError::FileWithoutTrack(3))
        ));
    }

    #[test]
    fn gaps_before_continuation_index_are_fatal() {
        assert!(matches!(
            segment(lines(
                "FILE a.wav WAVE\nTRACK 01 AUDIO\nFILE b.wav WAVE\nPOSTGAP 00:02:00\nINDEX 01 00:00:00"
            )),
            Err(CueError::FileWithoutTrack(3))
        ));
        let document = segment(lines(
            "FILE a.wav WAVE\nTRACK 01 AUDIO\nFILE b.wav WAVE\nINDEX 01 00:00:00\nPOSTGAP 00:02:00",
        ))
        .unwrap();
        assert_eq!(document.files[1].pre_track.len(), 2);
    }
}
