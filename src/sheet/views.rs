use crate::sheet::error::SheetResult;
use crate::sheet::models::{File, Remark, SheetInfo, TrackFlags, TrackType};
use crate::sheet::{FileId, IndexId, Sheet, SheetRoot, TrackId};
use crate::time::CueTime;

// Read-only views over the hierarchy. Iterators yield handles in sheet
// order; resolve them with `Sheet::file`, `Sheet::track` and `Sheet::index`.
impl Sheet {
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.file_order.iter(SheetRoot)
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &File)> + '_ {
        self.file_ids()
            .filter_map(move |id| self.files.get(id).map(|file| (id, file)))
    }

    pub fn first_file(&self) -> Option<FileId> {
        self.file_order.first(SheetRoot)
    }

    pub fn last_file(&self) -> Option<FileId> {
        self.file_order.last(SheetRoot)
    }

    /// Tracks hosted by `file`. A track split across two files is hosted by
    /// the later one.
    pub fn tracks_of(&self, file: FileId) -> impl Iterator<Item = TrackId> + '_ {
        self.track_order.iter(file)
    }

    pub fn indices_of(&self, track: TrackId) -> impl Iterator<Item = IndexId> + '_ {
        self.index_order.iter(track)
    }

    /// Every track of the sheet in traversal order.
    pub fn all_tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.file_ids()
            .flat_map(move |file| self.track_order.iter(file))
    }

    /// Every index of the sheet in traversal order.
    pub fn all_indices(&self) -> impl Iterator<Item = IndexId> + '_ {
        self.all_tracks()
            .flat_map(move |track| self.index_order.iter(track))
    }

    /// Indices whose times point into `file`, whichever track they belong to.
    pub fn indices_in_file(&self, file: FileId) -> impl Iterator<Item = IndexId> + '_ {
        self.all_indices().filter(move |id| {
            self.indices
                .get(*id)
                .is_some_and(|index| index.file == file)
        })
    }

    pub fn last_track(&self) -> Option<TrackId> {
        self.last_file().and_then(|file| {
            self.track_order
                .last(file)
                .or_else(|| self.track_order.last_before_chain(file))
        })
    }

    pub fn previous_file(&self, file: FileId) -> Option<FileId> {
        self.file_order.previous(file)
    }

    pub fn next_file(&self, file: FileId) -> Option<FileId> {
        self.file_order.next(file)
    }

    pub fn previous_track(&self, track: TrackId) -> Option<TrackId> {
        self.track_order.previous_across(track)
    }

    pub fn next_track(&self, track: TrackId) -> Option<TrackId> {
        self.track_order.next_across(track)
    }

    pub fn previous_index(&self, index: IndexId) -> Option<IndexId> {
        self.index_order.previous_across(index)
    }

    pub fn next_index(&self, index: IndexId) -> Option<IndexId> {
        self.index_order.next_across(index)
    }

    /// Ordinal of `track` within its hosting file.
    pub fn track_ordinal(&self, track: TrackId) -> Option<usize> {
        self.track_order.ordinal(track)
    }

    /// Ordinal of `index` within its track.
    pub fn index_ordinal(&self, index: IndexId) -> Option<usize> {
        self.index_order.ordinal(index)
    }

    pub fn track_title(&self, track: TrackId) -> SheetResult<Option<&str>> {
        let track = self.track(track)?;
        Ok(track.title.as_deref().or(self.info.title.as_deref()))
    }

    pub fn track_performer(&self, track: TrackId) -> SheetResult<Option<&str>> {
        let track = self.track(track)?;
        Ok(track.performer.as_deref().or(self.info.performer.as_deref()))
    }

    pub fn track_songwriter(&self, track: TrackId) -> SheetResult<Option<&str>> {
        let track = self.track(track)?;
        Ok(track.songwriter.as_deref().or(self.info.songwriter.as_deref()))
    }

    pub fn track_composer(&self, track: TrackId) -> SheetResult<Option<&str>> {
        let track = self.track(track)?;
        Ok(track.composer.as_deref().or(self.info.composer.as_deref()))
    }

    fn snapshot(&self) -> SheetSnapshot<'_> {
        let file_positions = |id: FileId| self.files.get(id).map(|file| file.position);
        let files = self
            .files()
            .map(|(id, file)| FileSnapshot {
                file,
                tracks: self
                    .tracks_of(id)
                    .filter_map(|track_id| self.tracks.get(track_id).map(|track| (track_id, track)))
                    .map(|(track_id, track)| TrackSnapshot {
                        track_type: &track.track_type,
                        title: track.title.as_deref(),
                        performer: track.performer.as_deref(),
                        songwriter: track.songwriter.as_deref(),
                        composer: track.composer.as_deref(),
                        isrc: track.isrc.as_deref(),
                        flags: &track.flags,
                        pregap: track.pregap,
                        postgap: track.postgap,
                        remarks: &track.remarks,
                        number: track.number,
                        position: track.position,
                        has_zero_index: track.has_zero_index,
                        eac_end_index: track.eac_end_index,
                        indices: self
                            .indices_of(track_id)
                            .filter_map(|index_id| self.indices.get(index_id))
                            .map(|index| IndexSnapshot {
                                number: index.number,
                                time: index.time,
                                position: index.position,
                                file_position: file_positions(index.file),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        SheetSnapshot {
            info: &self.info,
            files,
        }
    }
}

/// Structural equality: every attribute and the shape of the hierarchy,
/// ignoring handle values.
impl PartialEq for Sheet {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

#[derive(Debug, PartialEq)]
struct SheetSnapshot<'a> {
    info: &'a SheetInfo,
    files: Vec<FileSnapshot<'a>>,
}

#[derive(Debug, PartialEq)]
struct FileSnapshot<'a> {
    file: &'a File,
    tracks: Vec<TrackSnapshot<'a>>,
}

#[derive(Debug, PartialEq)]
struct TrackSnapshot<'a> {
    track_type: &'a TrackType,
    title: Option<&'a str>,
    performer: Option<&'a str>,
    songwriter: Option<&'a str>,
    composer: Option<&'a str>,
    isrc: Option<&'a str>,
    flags: &'a TrackFlags,
    pregap: Option<CueTime>,
    postgap: Option<CueTime>,
    remarks: &'a [Remark],
    number: u8,
    position: usize,
    has_zero_index: bool,
    eac_end_index: Option<CueTime>,
    indices: Vec<IndexSnapshot>,
}

#[derive(Debug, PartialEq)]
struct IndexSnapshot {
    number: u8,
    time: CueTime,
    position: usize,
    file_position: Option<usize>,
}
