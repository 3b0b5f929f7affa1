use crate::cd::{MAX_INDEX_NUMBER, MAX_TRACK_NUMBER};
use crate::chain::error::{ChainError, ChainResult};
use crate::chain::{ChainIter, ChainKey, ChainStore, Promotion};
use crate::sheet::Sheet;
use crate::sheet::arena::{FileId, IndexId, TrackId};
use crate::sheet::error::{SheetError, SheetResult};
use std::collections::HashMap;

/// A chain family that also knows each element's ordinal inside its own
/// chain. Ordinals are patched from the mutation point onwards instead of
/// being recomputed for the whole chain.
#[derive(Debug, Clone)]
pub(crate) struct PositionalCollection<K, C> {
    chain: ChainStore<K, C>,
    ordinals: HashMap<K, usize>,
}

impl<K: ChainKey, C: ChainKey> PositionalCollection<K, C> {
    pub(crate) fn new() -> Self {
        Self {
            chain: ChainStore::new(),
            ordinals: HashMap::new(),
        }
    }

    pub(crate) fn with_chain(owner: C) -> Self {
        Self {
            chain: ChainStore::with_chain(owner),
            ordinals: HashMap::new(),
        }
    }

    pub(crate) fn create(&mut self, owner: C) -> ChainResult<()> {
        self.chain.create_chain(owner)
    }

    pub(crate) fn drop_chain(&mut self, owner: C) -> ChainResult<()> {
        self.chain.drop_chain(owner)
    }

    pub(crate) fn join_after(&mut self, owner: C, leader: C) -> ChainResult<()> {
        self.chain.join_after(owner, leader)
    }

    pub(crate) fn join_before(&mut self, owner: C, follower: C) -> ChainResult<()> {
        self.chain.join_before(owner, follower)
    }

    /// Joins a freshly created chain so that it sits between `leader` and
    /// `follower`.
    pub(crate) fn join_between(
        &mut self,
        owner: C,
        leader: Option<C>,
        follower: Option<C>,
    ) -> ChainResult<()> {
        match (leader, follower) {
            (Some(leader), _) => self.join_after(owner, leader),
            (None, Some(follower)) => self.join_before(owner, follower),
            (None, None) => Ok(()),
        }
    }

    pub(crate) fn add_checked<E, F>(&mut self, owner: C, item: K, validate: F) -> Result<(), E>
    where
        E: From<ChainError>,
        F: FnOnce(Option<K>) -> Result<(), E>,
    {
        self.chain.add_checked(owner, item, validate)?;
        self.ordinals.insert(item, self.chain.len(owner) - 1);
        Ok(())
    }

    pub(crate) fn add(&mut self, owner: C, item: K) -> ChainResult<()> {
        self.add_checked(owner, item, |_| Ok::<(), ChainError>(()))
    }

    pub(crate) fn insert_before(&mut self, anchor: K, item: K) -> ChainResult<C> {
        let ordinal = self.ordinal(anchor).unwrap_or(0);
        let owner = self.chain.insert_before(anchor, item)?;
        self.reindex_from(Some(item), ordinal);
        Ok(owner)
    }

    pub(crate) fn remove(&mut self, item: K) -> ChainResult<C> {
        let ordinal = self.ordinal(item).unwrap_or(0);
        let next = self.chain.next(item);
        let owner = self.chain.remove(item)?;
        self.ordinals.remove(&item);
        self.reindex_from(next, ordinal);
        Ok(owner)
    }

    pub(crate) fn promote_last_to_following(&mut self, owner: C) -> ChainResult<Promotion<K, C>> {
        let promotion = self.chain.promote_last_to_following(owner)?;
        self.reindex_from(Some(promotion.item), 0);
        Ok(promotion)
    }

    fn reindex_from(&mut self, start: Option<K>, mut ordinal: usize) {
        let mut current = start;
        while let Some(item) = current {
            self.ordinals.insert(item, ordinal);
            ordinal += 1;
            current = self.chain.next(item);
        }
    }

    /// Position of `item` inside its own chain.
    pub(crate) fn ordinal(&self, item: K) -> Option<usize> {
        self.ordinals.get(&item).copied()
    }

    pub(crate) fn owner_of(&self, item: K) -> Option<C> {
        self.chain.owner_of(item)
    }

    pub(crate) fn first(&self, owner: C) -> Option<K> {
        self.chain.first(owner)
    }

    pub(crate) fn last(&self, owner: C) -> Option<K> {
        self.chain.last(owner)
    }

    pub(crate) fn len(&self, owner: C) -> usize {
        self.chain.len(owner)
    }

    pub(crate) fn previous(&self, item: K) -> Option<K> {
        self.chain.prev(item)
    }

    pub(crate) fn next(&self, item: K) -> Option<K> {
        self.chain.next(item)
    }

    pub(crate) fn previous_across(&self, item: K) -> Option<K> {
        self.chain.prev_across(item)
    }

    pub(crate) fn next_across(&self, item: K) -> Option<K> {
        self.chain.next_across(item)
    }

    pub(crate) fn last_before_chain(&self, owner: C) -> Option<K> {
        self.chain.last_before_chain(owner)
    }

    pub(crate) fn first_after_chain(&self, owner: C) -> Option<K> {
        self.chain.first_after_chain(owner)
    }

    pub(crate) fn iter(&self, owner: C) -> ChainIter<'_, K, C> {
        self.chain.iter(owner)
    }
}

// Sheet-wide numbering. Positions of tracks and indices are global, so a
// cascade that starts in one file keeps running through every later file.
impl Sheet {
    pub(crate) fn cascade_files_from(&mut self, start: Option<FileId>) {
        let mut position = start
            .and_then(|id| self.file_order.previous(id))
            .and_then(|id| self.files.get(id))
            .map(|file| file.position + 1)
            .unwrap_or(0);
        let mut current = start;
        while let Some(id) = current {
            if let Some(file) = self.files.get_mut(id) {
                file.position = position;
            }
            position += 1;
            current = self.file_order.next(id);
        }
    }

    pub(crate) fn cascade_tracks_from(&mut self, start: Option<TrackId>) {
        let mut position = start
            .and_then(|id| self.track_order.previous_across(id))
            .and_then(|id| self.tracks.get(id))
            .map(|track| track.position + 1)
            .unwrap_or(0);
        let mut current = start;
        while let Some(id) = current {
            if let Some(track) = self.tracks.get_mut(id) {
                track.position = position;
            }
            position += 1;
            current = self.track_order.next_across(id);
        }
    }

    pub(crate) fn cascade_indices_from(&mut self, start: Option<IndexId>) {
        let mut position = start
            .and_then(|id| self.index_order.previous_across(id))
            .and_then(|id| self.indices.get(id))
            .map(|index| index.position + 1)
            .unwrap_or(0);
        let mut current = start;
        while let Some(id) = current {
            if let Some(index) = self.indices.get_mut(id) {
                index.position = position;
            }
            position += 1;
            current = self.index_order.next_across(id);
        }
    }

    /// Renumbers indices starting with the first one of `track`, or of the
    /// next track that has any.
    pub(crate) fn cascade_indices_from_track(&mut self, track: TrackId) {
        let start = self
            .index_order
            .first(track)
            .or_else(|| self.index_order.first_after_chain(track));
        self.cascade_indices_from(start);
    }

    /// Track numbers following `start` (inclusive) that must move up so the
    /// sequence keeps increasing after a track numbered `floor`.
    pub(crate) fn plan_track_numbers(
        &self,
        start: Option<TrackId>,
        mut floor: u8,
    ) -> SheetResult<Vec<(TrackId, u8)>> {
        let mut plan = Vec::new();
        let mut current = start;
        while let Some(id) = current {
            let number = self.track(id)?.number;
            if number > floor {
                break;
            }
            if floor >= MAX_TRACK_NUMBER {
                return Err(SheetError::TrackNumberOverflow);
            }
            floor += 1;
            plan.push((id, floor));
            current = self.track_order.next_across(id);
        }
        Ok(plan)
    }

    /// Same as [`Sheet::plan_track_numbers`] for the indices of one track.
    pub(crate) fn plan_index_numbers(
        &self,
        start: Option<IndexId>,
        mut floor: u8,
    ) -> SheetResult<Vec<(IndexId, u8)>> {
        let mut plan = Vec::new();
        let mut current = start;
        while let Some(id) = current {
            let index = self.index(id)?;
            if index.number > floor {
                break;
            }
            if floor >= MAX_INDEX_NUMBER {
                let track_number = self.track(index.track)?.number;
                return Err(SheetError::IndexNumberOverflow(track_number));
            }
            floor += 1;
            plan.push((id, floor));
            current = self.index_order.next(id);
        }
        Ok(plan)
    }

    pub(crate) fn apply_track_numbers(&mut self, plan: &[(TrackId, u8)]) {
        for (id, number) in plan {
            if let Some(track) = self.tracks.get_mut(*id) {
                track.number = *number;
            }
        }
    }

    pub(crate) fn apply_index_numbers(&mut self, plan: &[(IndexId, u8)]) {
        for (id, number) in plan {
            if let Some(index) = self.indices.get_mut(*id) {
                index.number = *number;
            }
        }
    }

    /// Full renumbering pass over the whole sheet, also re-deriving each
    /// track's INDEX 00 flag and split marker.
    pub fn renumber(&mut self) {
        let first_file = self.file_order.first(crate::sheet::SheetRoot);
        self.cascade_files_from(first_file);

        let first_track = first_file.and_then(|file| {
            self.track_order
                .first(file)
                .or_else(|| self.track_order.first_after_chain(file))
        });
        self.cascade_tracks_from(first_track);

        if let Some(track) = first_track {
            self.cascade_indices_from_track(track);
        }

        let tracks: Vec<TrackId> = self.all_tracks().collect();
        for track in tracks {
            self.refresh_track_state(track);
        }
    }
}
