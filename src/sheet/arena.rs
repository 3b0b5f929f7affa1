use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;

pub trait EntityId: Copy + Eq + std::hash::Hash + Debug {
    fn from_slot(slot: usize) -> Self;
    fn slot(self) -> usize;
}

macro_rules! entity_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl EntityId for $name {
            fn from_slot(slot: usize) -> Self {
                Self(slot as u32)
            }

            fn slot(self) -> usize {
                self.0 as usize
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_id!(FileId, "file");
entity_id!(TrackId, "track");
entity_id!(IndexId, "index");

/// Slot storage handing out stable handles. Slots of removed entities are
/// never reused, so a stale handle can only miss, never alias.
#[derive(Debug, Clone)]
pub(crate) struct Arena<I, T> {
    slots: Vec<Option<T>>,
    live: usize,
    _id: PhantomData<I>,
}

impl<I: EntityId, T> Arena<I, T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _id: PhantomData,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> I {
        let id = I::from_slot(self.slots.len());
        self.slots.push(Some(value));
        self.live += 1;
        id
    }

    /// Handle the next `insert` will return.
    pub(crate) fn next_id(&self) -> I {
        I::from_slot(self.slots.len())
    }

    pub(crate) fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    pub(crate) fn remove(&mut self, id: I) -> Option<T> {
        let removed = self.slots.get_mut(id.slot()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| value.as_ref().map(|value| (I::from_slot(slot), value)))
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }
}
