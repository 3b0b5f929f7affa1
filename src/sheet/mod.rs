mod arena;
mod collections;
pub mod consistency;
pub mod error;
pub mod media;
pub mod models;
pub mod validation;
pub mod views;

use crate::cd::MAX_TRACK_NUMBER;
use crate::chain::Promotion;
use crate::sheet::arena::Arena;
use crate::sheet::collections::PositionalCollection;
use crate::sheet::error::{SheetError, SheetResult};
use crate::sheet::models::{File, FileType, Index, SheetInfo, Track, TrackType};
use crate::sheet::validation::{
    Candidate, Neighbor, Neighbors, ValidationProfile, Violation, check_index,
};
use crate::time::CueTime;

pub use crate::sheet::arena::{FileId, IndexId, TrackId};

/// Owner handle of the single chain holding the sheet's files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SheetRoot;

/// A CUE sheet: files, the tracks they host and the indices of those tracks.
///
/// Entities live in per-sheet arenas and refer to each other through
/// [`FileId`], [`TrackId`] and [`IndexId`] handles. Order is kept by three
/// chain families: one chain of files, one chain of tracks per file and one
/// chain of indices per track. Chains of the same family are joined in
/// sheet order, so "previous"/"next" lookups cross file and track
/// boundaries. Positions are assigned by those collections only.
///
/// Every mutation either succeeds completely or returns an error and leaves
/// the sheet untouched.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub info: SheetInfo,
    files: Arena<FileId, File>,
    tracks: Arena<TrackId, Track>,
    indices: Arena<IndexId, Index>,
    file_order: PositionalCollection<FileId, SheetRoot>,
    track_order: PositionalCollection<TrackId, FileId>,
    index_order: PositionalCollection<IndexId, TrackId>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Sheet {
    pub fn new() -> Self {
        Self {
            info: SheetInfo::default(),
            files: Arena::new(),
            tracks: Arena::new(),
            indices: Arena::new(),
            file_order: PositionalCollection::with_chain(SheetRoot),
            track_order: PositionalCollection::new(),
            index_order: PositionalCollection::new(),
        }
    }

    pub fn file(&self, id: FileId) -> SheetResult<&File> {
        self.files.get(id).ok_or(SheetError::UnknownFile(id))
    }

    pub fn file_mut(&mut self, id: FileId) -> SheetResult<&mut File> {
        self.files.get_mut(id).ok_or(SheetError::UnknownFile(id))
    }

    pub fn track(&self, id: TrackId) -> SheetResult<&Track> {
        self.tracks.get(id).ok_or(SheetError::UnknownTrack(id))
    }

    /// Mutable access to a track's free-form attributes. Number, file and
    /// index state only change through the dedicated operations.
    pub fn track_mut(&mut self, id: TrackId) -> SheetResult<&mut Track> {
        self.tracks.get_mut(id).ok_or(SheetError::UnknownTrack(id))
    }

    pub fn index(&self, id: IndexId) -> SheetResult<&Index> {
        self.indices.get(id).ok_or(SheetError::UnknownIndex(id))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    // Files

    pub fn add_file(&mut self, path: impl Into<String>, file_type: FileType) -> SheetResult<FileId> {
        let previous = self.file_order.last(SheetRoot);

        let id = self.files.insert(File::new(path.into(), file_type));
        self.track_order.create(id)?;
        self.track_order.join_between(id, previous, None)?;
        self.file_order.add(SheetRoot, id)?;

        self.cascade_files_from(Some(id));
        Ok(id)
    }

    pub fn insert_file_before(
        &mut self,
        anchor: FileId,
        path: impl Into<String>,
        file_type: FileType,
    ) -> SheetResult<FileId> {
        self.file(anchor)?;
        if let Some(first) = self.track_order.first(anchor) {
            if self.is_split(first) {
                return Err(SheetError::SplitBoundary(self.track(first)?.number));
            }
        }
        let previous = self.file_order.previous(anchor);

        let id = self.files.insert(File::new(path.into(), file_type));
        self.track_order.create(id)?;
        self.track_order.join_between(id, previous, Some(anchor))?;
        self.file_order.insert_before(anchor, id)?;

        self.cascade_files_from(Some(id));
        Ok(id)
    }

    /// Removes a file together with every track it hosts.
    pub fn remove_file(&mut self, id: FileId) -> SheetResult<()> {
        let path = self.file(id)?.path.clone();
        let hosts_foreign_index = self.indices.iter().any(|(_, index)| {
            index.file == id
                && self
                    .tracks
                    .get(index.track)
                    .is_some_and(|track| track.file != id)
        });
        if hosts_foreign_index {
            return Err(SheetError::FileHostsSplitTrack(path));
        }

        let next_file = self.file_order.next(id);
        let next_track = self.track_order.first_after_chain(id);

        let tracks: Vec<TrackId> = self.track_order.iter(id).collect();
        for track in tracks {
            self.detach_track(track)?;
        }
        self.track_order.drop_chain(id)?;
        self.file_order.remove(id)?;
        self.files.remove(id);

        self.cascade_files_from(next_file);
        self.cascade_tracks_from(next_track);
        if let Some(track) = next_track {
            self.cascade_indices_from_track(track);
        }
        Ok(())
    }

    /// Records the length of the media behind `file`. Index times at or past
    /// it are rejected from then on.
    pub fn set_file_duration(&mut self, file: FileId, duration: Option<CueTime>) -> SheetResult<()> {
        self.file_mut(file)?.duration = duration;
        Ok(())
    }

    // Tracks

    /// Appends a track to `file`. Tracks in later files are renumbered
    /// upwards when they would no longer follow `number`.
    pub fn add_track(
        &mut self,
        file: FileId,
        number: u8,
        track_type: TrackType,
    ) -> SheetResult<TrackId> {
        self.file(file)?;
        let previous = self
            .track_order
            .last(file)
            .or_else(|| self.track_order.last_before_chain(file));
        let next = self.track_order.first_after_chain(file);
        self.check_track_number(number, previous, None)?;
        let plan = self.plan_track_numbers(next, number)?;

        let id = self.tracks.insert(Track::new(number, track_type, file));
        self.index_order.create(id)?;
        self.index_order.join_between(id, previous, next)?;
        self.track_order.add(file, id)?;

        self.apply_track_numbers(&plan);
        self.cascade_tracks_from(Some(id));
        Ok(id)
    }

    pub fn insert_track_before(
        &mut self,
        anchor: TrackId,
        number: u8,
        track_type: TrackType,
    ) -> SheetResult<TrackId> {
        let anchor_track = self.track(anchor)?;
        let file = anchor_track.file;
        if self.is_split(anchor) {
            return Err(SheetError::SplitBoundary(anchor_track.number));
        }
        let previous = self.track_order.previous_across(anchor);
        self.check_track_number(number, previous, None)?;
        let plan = self.plan_track_numbers(Some(anchor), number)?;

        let id = self.tracks.insert(Track::new(number, track_type, file));
        self.index_order.create(id)?;
        self.index_order.join_between(id, previous, Some(anchor))?;
        self.track_order.insert_before(anchor, id)?;

        self.apply_track_numbers(&plan);
        self.cascade_tracks_from(Some(id));
        Ok(id)
    }

    /// Removes a track and its indices. A track continued from the previous
    /// file must first lose the indices it left there.
    pub fn remove_track(&mut self, id: TrackId) -> SheetResult<()> {
        let number = self.track(id)?.number;
        if self.is_split(id) {
            return Err(SheetError::TrackIsSplit(number));
        }
        let next = self.track_order.next_across(id);

        self.detach_track(id)?;

        self.cascade_tracks_from(next);
        if let Some(track) = next {
            self.cascade_indices_from_track(track);
        }
        Ok(())
    }

    pub fn set_track_number(&mut self, id: TrackId, number: u8) -> SheetResult<()> {
        self.track(id)?;
        let previous = self.track_order.previous_across(id);
        let next = self.track_order.next_across(id);
        self.check_track_number(number, previous, next)?;
        self.track_mut(id)?.number = number;
        Ok(())
    }

    /// Moves the last track of `file` to the front of the next file. Indices
    /// the track already has stay in `file`; the track is then split across
    /// both files and its EAC end index marks where its part in `file`
    /// starts. A track already split across two files cannot move on again.
    pub fn promote_last_track(&mut self, file: FileId) -> SheetResult<TrackId> {
        self.file(file)?;
        if let Some(last) = self.track_order.last(file) {
            if self.is_split(last) {
                return Err(SheetError::AlreadySplit(self.track(last)?.number));
            }
        }
        let promotion = self.track_order.promote_last_to_following(file)?;
        self.apply_promotion(promotion);
        Ok(promotion.item)
    }

    fn apply_promotion(&mut self, promotion: Promotion<TrackId, FileId>) {
        if let Some(track) = self.tracks.get_mut(promotion.item) {
            track.file = promotion.to;
        }
        self.refresh_track_state(promotion.item);
    }

    fn check_track_number(
        &self,
        number: u8,
        previous: Option<TrackId>,
        next: Option<TrackId>,
    ) -> SheetResult<()> {
        let min = match previous {
            Some(track) => self.track(track)?.number.max(1),
            None => 1,
        };
        let max = match next {
            Some(track) => self.track(track)?.number,
            None => MAX_TRACK_NUMBER,
        };
        if number < min || number > max {
            return Err(SheetError::TrackNumberOutOfOrder { number, min, max });
        }
        Ok(())
    }

    fn detach_track(&mut self, id: TrackId) -> SheetResult<()> {
        let indices: Vec<IndexId> = self.index_order.iter(id).collect();
        for index in indices {
            self.index_order.remove(index)?;
            self.indices.remove(index);
        }
        self.index_order.drop_chain(id)?;
        self.track_order.remove(id)?;
        self.tracks.remove(id);
        Ok(())
    }

    /// Whether some of the track's indices live in another file than the one
    /// hosting the track.
    pub fn is_split(&self, track: TrackId) -> bool {
        let Some(host) = self.tracks.get(track).map(|track| track.file) else {
            return false;
        };
        self.index_order
            .iter(track)
            .filter_map(|id| self.indices.get(id))
            .any(|index| index.file != host)
    }

    // Indices

    /// Appends an index to `track`. Without a number the index continues the
    /// track's numbering.
    pub fn add_index(
        &mut self,
        track: TrackId,
        time: CueTime,
        number: Option<u8>,
    ) -> SheetResult<IndexId> {
        self.add_index_with(track, time, number, ValidationProfile::Strict)
            .map(|(id, _)| id)
    }

    /// [`Sheet::add_index`] under an explicit validation profile. Returns the
    /// violations the profile tolerated along with the new index.
    pub fn add_index_with(
        &mut self,
        track: TrackId,
        time: CueTime,
        number: Option<u8>,
        profile: ValidationProfile,
    ) -> SheetResult<(IndexId, Vec<Violation>)> {
        let file = self.track(track)?.file;
        let before = self
            .index_order
            .last(track)
            .or_else(|| self.index_order.last_before_chain(track));
        let after = self.index_order.first_after_chain(track);
        let neighbors = self.neighbors(before, after, track, file)?;

        let number = match number {
            Some(number) => number,
            None => Self::continued_number(&neighbors, 1),
        };
        let candidate = Candidate {
            time,
            number,
            media_end: self.file(file)?.duration,
        };

        let id = self.indices.next_id();
        let mut tolerated = Vec::new();
        self.index_order.add_checked(track, id, |_| {
            tolerated = check_index(&candidate, &neighbors, profile)
                .map_err(SheetError::IndexRejected)?;
            Ok::<(), SheetError>(())
        })?;
        self.indices.insert(Index {
            number,
            time,
            track,
            file,
            position: 0,
        });

        self.cascade_indices_from(Some(id));
        self.refresh_track_state(track);
        Ok((id, tolerated))
    }

    /// Inserts an index right before `anchor`, in the same track and file.
    /// Without a number the new index takes the slot after its predecessor
    /// and the following indices of the track move up as needed.
    pub fn insert_index_before(
        &mut self,
        anchor: IndexId,
        time: CueTime,
        number: Option<u8>,
    ) -> SheetResult<IndexId> {
        let anchor_index = self.index(anchor)?;
        let (track, file, anchor_number) =
            (anchor_index.track, anchor_index.file, anchor_index.number);
        let before = self.index_order.previous_across(anchor);
        let mut neighbors = self.neighbors(before, Some(anchor), track, file)?;

        let (number, plan) = match number {
            Some(number) => (number, Vec::new()),
            None => {
                let fallback = if anchor_number > 1 { 1 } else { 0 };
                let number = Self::continued_number(&neighbors, fallback);
                (number, self.plan_index_numbers(Some(anchor), number)?)
            }
        };
        if let (Some(after), Some((_, bumped))) = (neighbors.after.as_mut(), plan.first()) {
            after.number = *bumped;
        }
        let candidate = Candidate {
            time,
            number,
            media_end: self.file(file)?.duration,
        };
        check_index(&candidate, &neighbors, ValidationProfile::Strict)
            .map_err(SheetError::IndexRejected)?;

        let id = self.indices.next_id();
        self.index_order.insert_before(anchor, id)?;
        self.indices.insert(Index {
            number,
            time,
            track,
            file,
            position: 0,
        });

        self.apply_index_numbers(&plan);
        self.cascade_indices_from(Some(id));
        self.refresh_track_state(track);
        Ok(id)
    }

    /// Changes time and, when given, number of an index.
    pub fn change_index(
        &mut self,
        id: IndexId,
        time: CueTime,
        number: Option<u8>,
    ) -> SheetResult<()> {
        let index = self.index(id)?;
        let (track, file) = (index.track, index.file);
        let number = number.unwrap_or(index.number);
        let neighbors = self.neighbors(
            self.index_order.previous_across(id),
            self.index_order.next_across(id),
            track,
            file,
        )?;
        let candidate = Candidate {
            time,
            number,
            media_end: self.file(file)?.duration,
        };
        check_index(&candidate, &neighbors, ValidationProfile::Strict)
            .map_err(SheetError::IndexRejected)?;

        let is_first = self.index_order.first(track) == Some(id);
        if is_first && number == 0 && self.index_order.len(track) < 2 && !self.is_split(track) {
            return Err(SheetError::LoneZeroIndex(self.track(track)?.number));
        }

        if let Some(index) = self.indices.get_mut(id) {
            index.time = time;
            index.number = number;
        }
        self.refresh_track_state(track);
        Ok(())
    }

    pub fn remove_index(&mut self, id: IndexId) -> SheetResult<()> {
        let track = self.index(id)?.track;
        let host = self.track(track)?.file;
        let remaining: Vec<&Index> = self
            .index_order
            .iter(track)
            .filter(|other| *other != id)
            .filter_map(|other| self.indices.get(other))
            .collect();
        let still_split = remaining.iter().any(|index| index.file != host);
        if let Some(first) = remaining.first() {
            if first.number == 0 && remaining.len() < 2 && !still_split {
                return Err(SheetError::LoneZeroIndex(self.track(track)?.number));
            }
        }

        let next = self.index_order.next_across(id);
        self.index_order.remove(id)?;
        self.indices.remove(id);

        self.cascade_indices_from(next);
        self.refresh_track_state(track);
        Ok(())
    }

    /// Turns the track's first index into INDEX 00 (or back into INDEX 01),
    /// renumbering the remaining indices of the track consecutively.
    pub fn set_zero_index(&mut self, track: TrackId, enabled: bool) -> SheetResult<()> {
        let current = self.track(track)?;
        let number = current.number;
        if current.has_zero_index == enabled {
            return Ok(());
        }
        let ids: Vec<IndexId> = self.index_order.iter(track).collect();
        let split = self.is_split(track);

        let reject = |reason| SheetError::ZeroIndexToggle {
            track: number,
            reason,
        };
        let start = if enabled {
            if ids.is_empty() {
                return Err(reject("the track has no indices"));
            }
            if ids.len() < 2 && !split {
                return Err(reject("INDEX 00 needs a following index"));
            }
            0usize
        } else {
            if split {
                return Err(reject("INDEX 00 is the part left in the previous file"));
            }
            if ids.len() > crate::cd::MAX_INDEX_NUMBER as usize {
                return Err(SheetError::IndexNumberOverflow(number));
            }
            1usize
        };

        for (offset, id) in ids.iter().enumerate() {
            if let Some(index) = self.indices.get_mut(*id) {
                index.number = (start + offset) as u8;
            }
        }
        self.refresh_track_state(track);
        Ok(())
    }

    fn continued_number(neighbors: &Neighbors, fallback: u8) -> u8 {
        match neighbors.before {
            Some(before) if before.same_track => before.number.saturating_add(1),
            _ => fallback,
        }
    }

    fn neighbor(&self, id: IndexId, track: TrackId, file: FileId) -> SheetResult<Neighbor> {
        let index = self.index(id)?;
        Ok(Neighbor {
            time: index.time,
            number: index.number,
            same_track: index.track == track,
            same_file: index.file == file,
        })
    }

    fn neighbors(
        &self,
        before: Option<IndexId>,
        after: Option<IndexId>,
        track: TrackId,
        file: FileId,
    ) -> SheetResult<Neighbors> {
        Ok(Neighbors {
            before: before
                .map(|id| self.neighbor(id, track, file))
                .transpose()?,
            after: after.map(|id| self.neighbor(id, track, file)).transpose()?,
        })
    }

    /// Re-derives the INDEX 00 flag and the EAC end index from the track's
    /// current indices.
    pub(crate) fn refresh_track_state(&mut self, track: TrackId) {
        let Some(host) = self.tracks.get(track).map(|track| track.file) else {
            return;
        };
        let first_number = self
            .index_order
            .first(track)
            .and_then(|id| self.indices.get(id))
            .map(|index| index.number);
        let eac_end_index = self
            .index_order
            .iter(track)
            .filter_map(|id| self.indices.get(id))
            .filter(|index| index.file != host)
            .last()
            .map(|index| index.time);

        if let Some(track) = self.tracks.get_mut(track) {
            track.has_zero_index = first_number == Some(0);
            track.eac_end_index = eac_end_index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CueTime {
        s.parse().unwrap()
    }

    /// a.wav: tracks 1 (00, 01) and 2 (01); b.wav: track 3 (01, 02)
    fn sample() -> (Sheet, [FileId; 2], [TrackId; 3]) {
        let mut sheet = Sheet::new();
        let a = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let b = sheet.add_file("b.wav", FileType::Wave).unwrap();
        let t1 = sheet.add_track(a, 1, TrackType::Audio).unwrap();
        sheet.add_index(t1, t("00:00:00"), Some(0)).unwrap();
        sheet.add_index(t1, t("00:02:00"), None).unwrap();
        let t2 = sheet.add_track(a, 2, TrackType::Audio).unwrap();
        sheet.add_index(t2, t("03:00:00"), None).unwrap();
        let t3 = sheet.add_track(b, 3, TrackType::Audio).unwrap();
        sheet.add_index(t3, t("00:00:00"), None).unwrap();
        sheet.add_index(t3, t("01:00:00"), None).unwrap();
        (sheet, [a, b], [t1, t2, t3])
    }

    fn positions_are_contiguous(sheet: &Sheet) {
        for (expected, file) in sheet.file_ids().enumerate() {
            assert_eq!(sheet.file(file).unwrap().position(), expected);
        }
        for (expected, track) in sheet.all_tracks().enumerate() {
            assert_eq!(sheet.track(track).unwrap().position(), expected);
        }
        for (expected, index) in sheet.all_indices().enumerate() {
            assert_eq!(sheet.index(index).unwrap().position(), expected);
        }
    }

    fn numbers(sheet: &Sheet) -> Vec<u8> {
        sheet
            .all_tracks()
            .map(|id| sheet.track(id).unwrap().number())
            .collect()
    }

    #[test]
    fn builds_positions_in_traversal_order() {
        let (sheet, _, [t1, _, t3]) = sample();
        positions_are_contiguous(&sheet);
        assert_eq!(sheet.track_count(), 3);
        assert_eq!(sheet.index_count(), 5);
        assert!(sheet.track(t1).unwrap().has_zero_index());
        assert!(!sheet.track(t3).unwrap().has_zero_index());
        let numbers: Vec<u8> = sheet
            .indices_of(t3)
            .map(|id| sheet.index(id).unwrap().number())
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn rejects_index_earlier_than_previous_and_leaves_sheet_unchanged() {
        let (mut sheet, _, [_, t2, _]) = sample();
        let before = sheet.clone();
        let result = sheet.add_index(t2, t("02:00:00"), None);
        assert!(matches!(
            result,
            Err(SheetError::IndexRejected(Violation::TimeBeforePrevious { .. }))
        ));
        assert_eq!(sheet, before);
        assert_eq!(sheet.index_count(), 5);
    }

    #[test]
    fn rejects_duplicate_times_outside_parsing() {
        let (mut sheet, _, [_, t2, _]) = sample();
        assert!(matches!(
            sheet.add_index(t2, t("03:00:00"), None),
            Err(SheetError::IndexRejected(Violation::SameTimeAsPrevious(_)))
        ));
        let (id, tolerated) = sheet
            .add_index_with(t2, t("03:00:00"), None, ValidationProfile::Parsing)
            .unwrap();
        assert_eq!(tolerated.len(), 1);
        assert_eq!(sheet.index(id).unwrap().number(), 2);
    }

    #[test]
    fn index_before_next_track_in_same_file_is_bounded() {
        let (mut sheet, _, [t1, _, _]) = sample();
        assert!(matches!(
            sheet.add_index(t1, t("04:00:00"), None),
            Err(SheetError::IndexRejected(Violation::TimeAfterNext { .. }))
        ));
        let added = sheet.add_index(t1, t("02:00:00"), None).unwrap();
        assert_eq!(sheet.index(added).unwrap().number(), 2);
        positions_are_contiguous(&sheet);
    }

    #[test]
    fn inserting_a_track_cascades_numbers_into_later_files() {
        let (mut sheet, _, [_, t2, t3]) = sample();
        let new = sheet.insert_track_before(t2, 2, TrackType::Audio).unwrap();
        assert_eq!(numbers(&sheet), vec![1, 2, 3, 4]);
        assert_eq!(sheet.track(t2).unwrap().number(), 3);
        assert_eq!(sheet.track(t3).unwrap().number(), 4);
        assert_eq!(sheet.track(new).unwrap().position(), 1);
        positions_are_contiguous(&sheet);

        sheet.add_index(new, t("02:30:00"), None).unwrap();
        positions_are_contiguous(&sheet);
    }

    #[test]
    fn adding_a_track_to_an_earlier_file_renumbers_later_files() {
        let (mut sheet, [a, _], [_, _, t3]) = sample();
        let added = sheet.add_track(a, 3, TrackType::Audio).unwrap();
        assert_eq!(numbers(&sheet), vec![1, 2, 3, 4]);
        assert_eq!(sheet.track(t3).unwrap().position(), 3);
        assert_eq!(sheet.track(added).unwrap().position(), 2);
        sheet.add_index(added, t("04:00:00"), None).unwrap();
        positions_are_contiguous(&sheet);
    }

    #[test]
    fn track_numbers_must_not_decrease() {
        let (mut sheet, [_, b], [_, t2, _]) = sample();
        assert_eq!(
            sheet.add_track(b, 2, TrackType::Audio),
            Err(SheetError::TrackNumberOutOfOrder {
                number: 2,
                min: 3,
                max: 99
            })
        );
        assert!(sheet.set_track_number(t2, 3).is_ok());
        assert!(sheet.set_track_number(t2, 4).is_err());
    }

    #[test]
    fn track_number_overflow_is_rejected() {
        let mut sheet = Sheet::new();
        let file = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let last = sheet.add_track(file, 99, TrackType::Audio).unwrap();
        let before = sheet.clone();
        assert_eq!(
            sheet.insert_track_before(last, 99, TrackType::Audio),
            Err(SheetError::TrackNumberOverflow)
        );
        assert_eq!(sheet, before);
    }

    #[test]
    fn removing_a_track_cascades_across_files() {
        let (mut sheet, [_, b], [t1, _, t3]) = sample();
        sheet.remove_track(t1).unwrap();
        positions_are_contiguous(&sheet);
        assert_eq!(sheet.track(t3).unwrap().position(), 1);
        assert_eq!(sheet.index_count(), 3);
        assert_eq!(sheet.tracks_of(b).count(), 1);
        assert!(matches!(
            sheet.track(t1),
            Err(SheetError::UnknownTrack(_))
        ));
    }

    #[test]
    fn removing_a_file_drops_its_tracks() {
        let (mut sheet, [a, b], [_, _, t3]) = sample();
        sheet.remove_file(a).unwrap();
        positions_are_contiguous(&sheet);
        assert_eq!(sheet.file(b).unwrap().position(), 0);
        assert_eq!(sheet.track(t3).unwrap().position(), 0);
        assert_eq!(sheet.track_count(), 1);
        assert_eq!(sheet.index_count(), 2);
    }

    #[test]
    fn inserting_a_file_keeps_chains_joined() {
        let (mut sheet, [_, b], [_, t2, t3]) = sample();
        let middle = sheet.insert_file_before(b, "m.wav", FileType::Wave).unwrap();
        let track = sheet.add_track(middle, 3, TrackType::Audio).unwrap();
        sheet.add_index(track, t("00:00:00"), None).unwrap();
        assert_eq!(sheet.previous_track(track), Some(t2));
        assert_eq!(sheet.next_track(track), Some(t3));
        assert_eq!(numbers(&sheet), vec![1, 2, 3, 4]);
        positions_are_contiguous(&sheet);

        let first = sheet.file_ids().next().unwrap();
        let front = sheet
            .insert_file_before(first, "0.wav", FileType::Wave)
            .unwrap();
        assert_eq!(sheet.file(front).unwrap().position(), 0);
        assert_eq!(sheet.file(b).unwrap().position(), 3);
    }

    #[test]
    fn inserting_index_without_number_moves_following_numbers() {
        let (mut sheet, _, [_, _, t3]) = sample();
        let second = sheet.indices_of(t3).nth(1).unwrap();
        let inserted = sheet.insert_index_before(second, t("00:30:00"), None).unwrap();
        let numbers: Vec<u8> = sheet
            .indices_of(t3)
            .map(|id| sheet.index(id).unwrap().number())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(sheet.index(inserted).unwrap().number(), 2);
        positions_are_contiguous(&sheet);
    }

    #[test]
    fn inserting_index_with_conflicting_number_is_rejected() {
        let (mut sheet, _, [_, _, t3]) = sample();
        let second = sheet.indices_of(t3).nth(1).unwrap();
        assert!(matches!(
            sheet.insert_index_before(second, t("00:30:00"), Some(2)),
            Err(SheetError::IndexRejected(Violation::NumberNotBeforeNext { .. }))
        ));
    }

    #[test]
    fn changing_an_index_is_validated_against_both_neighbors() {
        let (mut sheet, _, [t1, _, _]) = sample();
        let first = sheet.indices_of(t1).next().unwrap();
        assert!(sheet.change_index(first, t("00:01:00"), None).is_ok());
        assert_eq!(sheet.index(first).unwrap().time(), t("00:01:00"));
        assert!(sheet.change_index(first, t("00:02:00"), None).is_err());
        assert!(sheet.change_index(first, t("00:01:50"), Some(1)).is_err());
    }

    #[test]
    fn removing_an_index_may_not_leave_a_lone_zero_index() {
        let (mut sheet, _, [t1, _, _]) = sample();
        let second = sheet.indices_of(t1).nth(1).unwrap();
        assert_eq!(sheet.remove_index(second), Err(SheetError::LoneZeroIndex(1)));
        let first = sheet.indices_of(t1).next().unwrap();
        sheet.remove_index(first).unwrap();
        assert!(!sheet.track(t1).unwrap().has_zero_index());
        positions_are_contiguous(&sheet);
    }

    #[test]
    fn zero_index_toggle_renumbers_the_track() {
        let (mut sheet, _, [t1, t2, t3]) = sample();
        sheet.set_zero_index(t3, true).unwrap();
        let numbers: Vec<u8> = sheet
            .indices_of(t3)
            .map(|id| sheet.index(id).unwrap().number())
            .collect();
        assert_eq!(numbers, vec![0, 1]);
        assert!(sheet.track(t3).unwrap().has_zero_index());

        sheet.set_zero_index(t1, false).unwrap();
        assert!(!sheet.track(t1).unwrap().has_zero_index());

        assert!(matches!(
            sheet.set_zero_index(t2, true),
            Err(SheetError::ZeroIndexToggle { track: 2, .. })
        ));
    }

    #[test]
    fn media_duration_bounds_indices() {
        let (mut sheet, [_, b], [_, _, t3]) = sample();
        sheet.set_file_duration(b, Some(t("02:00:00"))).unwrap();
        assert!(matches!(
            sheet.add_index(t3, t("02:00:00"), None),
            Err(SheetError::IndexRejected(Violation::BeyondMediaEnd { .. }))
        ));
        assert!(sheet.add_index(t3, t("01:59:74"), None).is_ok());
    }

    #[test]
    fn promotion_splits_a_track_across_files() {
        let mut sheet = Sheet::new();
        let a = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let b = sheet.add_file("b.wav", FileType::Wave).unwrap();
        let t1 = sheet.add_track(a, 1, TrackType::Audio).unwrap();
        sheet.add_index(t1, t("00:00:00"), None).unwrap();
        let t2 = sheet.add_track(a, 2, TrackType::Audio).unwrap();
        sheet
            .add_index_with(t2, t("04:30:12"), Some(0), ValidationProfile::Parsing)
            .unwrap();

        assert_eq!(sheet.promote_last_track(a).unwrap(), t2);
        let promoted = sheet.track(t2).unwrap();
        assert_eq!(promoted.file(), b);
        assert_eq!(promoted.eac_end_index(), Some(t("04:30:12")));
        assert!(promoted.has_zero_index());
        assert!(sheet.is_split(t2));

        // Continues in b.wav, where times start over.
        sheet.add_index(t2, t("00:00:00"), None).unwrap();
        let files: Vec<FileId> = sheet
            .indices_of(t2)
            .map(|id| sheet.index(id).unwrap().file())
            .collect();
        assert_eq!(files, vec![a, b]);
        assert_eq!(sheet.tracks_of(a).collect::<Vec<_>>(), vec![t1]);
        assert_eq!(sheet.tracks_of(b).collect::<Vec<_>>(), vec![t2]);
        positions_are_contiguous(&sheet);

        assert_eq!(sheet.remove_track(t2), Err(SheetError::TrackIsSplit(2)));
        assert!(matches!(
            sheet.remove_file(a),
            Err(SheetError::FileHostsSplitTrack(_))
        ));
        assert_eq!(
            sheet.insert_track_before(t2, 2, TrackType::Audio),
            Err(SheetError::SplitBoundary(2))
        );
        assert!(sheet.set_zero_index(t2, false).is_err());

        let carried = sheet.indices_of(t2).next().unwrap();
        sheet.remove_index(carried).unwrap();
        assert!(!sheet.is_split(t2));
        assert_eq!(sheet.track(t2).unwrap().eac_end_index(), None);
        sheet.remove_track(t2).unwrap();
        positions_are_contiguous(&sheet);
    }

    #[test]
    fn split_track_cannot_be_promoted_again() {
        let mut sheet = Sheet::new();
        let a = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let b = sheet.add_file("b.wav", FileType::Wave).unwrap();
        sheet.add_file("c.wav", FileType::Wave).unwrap();
        let t1 = sheet.add_track(a, 1, TrackType::Audio).unwrap();
        sheet.add_index(t1, t("00:00:00"), None).unwrap();
        sheet.promote_last_track(a).unwrap();
        sheet.add_index(t1, t("00:00:00"), None).unwrap();

        let before = sheet.clone();
        assert_eq!(sheet.promote_last_track(b), Err(SheetError::AlreadySplit(1)));
        assert_eq!(sheet, before);
        assert_eq!(sheet.track(t1).unwrap().file(), b);
    }

    #[test]
    fn promoting_without_following_file_fails() {
        let mut sheet = Sheet::new();
        let a = sheet.add_file("a.wav", FileType::Wave).unwrap();
        sheet.add_track(a, 1, TrackType::Audio).unwrap();
        assert!(matches!(
            sheet.promote_last_track(a),
            Err(SheetError::ChainError(_))
        ));
    }
}
