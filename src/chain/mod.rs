use crate::chain::error::{ChainError, ChainResult};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

pub mod error;

/// Anything usable as an element or chain handle.
pub trait ChainKey: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> ChainKey for T {}

#[derive(Debug, Clone, Copy)]
struct Link<K, C> {
    prev: Option<K>,
    next: Option<K>,
    owner: C,
}

#[derive(Debug, Clone, Copy)]
struct Head<K, C> {
    first: Option<K>,
    last: Option<K>,
    len: usize,
    leader: Option<C>,
    follower: Option<C>,
}

impl<K, C> Head<K, C> {
    fn new() -> Self {
        Self {
            first: None,
            last: None,
            len: 0,
            leader: None,
            follower: None,
        }
    }
}

/// Emitted when an element moved from the end of one chain to the start of
/// the chain following it. The owner of the chains applies it to whatever
/// back-reference the element keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion<K, C> {
    pub item: K,
    pub from: C,
    pub to: C,
}

/// A family of doubly-linked chains of handles `K`, each chain identified by
/// its owner handle `C`.
///
/// Chains can be joined: a joined chain's first element is the logical
/// successor of its leader's last element. The `*_across` lookups follow those
/// joins and skip empty chains, which is what makes a sequence of per-file
/// (or per-track) chains behave as one sheet-wide sequence.
#[derive(Debug, Clone)]
pub struct ChainStore<K, C> {
    heads: HashMap<C, Head<K, C>>,
    links: HashMap<K, Link<K, C>>,
}

impl<K: ChainKey, C: ChainKey> Default for ChainStore<K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ChainKey, C: ChainKey> ChainStore<K, C> {
    pub fn new() -> Self {
        Self {
            heads: HashMap::new(),
            links: HashMap::new(),
        }
    }

    /// A store that starts out with one empty chain.
    pub fn with_chain(owner: C) -> Self {
        let mut store = Self::new();
        store.heads.insert(owner, Head::new());
        store
    }

    pub fn create_chain(&mut self, owner: C) -> ChainResult<()> {
        if self.heads.contains_key(&owner) {
            return Err(ChainError::DuplicateChain(format!("{owner:?}")));
        }
        self.heads.insert(owner, Head::new());
        Ok(())
    }

    /// Removes an empty chain, closing the gap it leaves between its leader
    /// and follower.
    pub fn drop_chain(&mut self, owner: C) -> ChainResult<()> {
        if self.head(owner)?.len > 0 {
            return Err(ChainError::ChainNotEmpty(format!("{owner:?}")));
        }
        self.unjoin(owner)?;
        self.heads.remove(&owner);
        Ok(())
    }

    pub fn has_chain(&self, owner: C) -> bool {
        self.heads.contains_key(&owner)
    }

    pub fn contains(&self, item: K) -> bool {
        self.links.contains_key(&item)
    }

    pub fn len(&self, owner: C) -> usize {
        self.heads.get(&owner).map(|head| head.len).unwrap_or(0)
    }

    pub fn is_empty(&self, owner: C) -> bool {
        self.len(owner) == 0
    }

    pub fn first(&self, owner: C) -> Option<K> {
        self.heads.get(&owner).and_then(|head| head.first)
    }

    pub fn last(&self, owner: C) -> Option<K> {
        self.heads.get(&owner).and_then(|head| head.last)
    }

    pub fn owner_of(&self, item: K) -> Option<C> {
        self.links.get(&item).map(|link| link.owner)
    }

    pub fn prev(&self, item: K) -> Option<K> {
        self.links.get(&item).and_then(|link| link.prev)
    }

    pub fn next(&self, item: K) -> Option<K> {
        self.links.get(&item).and_then(|link| link.next)
    }

    pub fn leader(&self, owner: C) -> Option<C> {
        self.heads.get(&owner).and_then(|head| head.leader)
    }

    pub fn follower(&self, owner: C) -> Option<C> {
        self.heads.get(&owner).and_then(|head| head.follower)
    }

    /// Last element of the nearest non-empty chain joined before `owner`.
    pub fn last_before_chain(&self, owner: C) -> Option<K> {
        let mut current = self.leader(owner);
        // A join cycle would be a bug elsewhere; never loop more than once
        // around all chains.
        for _ in 0..self.heads.len() {
            let chain = current?;
            if let Some(last) = self.last(chain) {
                return Some(last);
            }
            current = self.leader(chain);
        }
        None
    }

    /// First element of the nearest non-empty chain joined after `owner`.
    pub fn first_after_chain(&self, owner: C) -> Option<K> {
        let mut current = self.follower(owner);
        for _ in 0..self.heads.len() {
            let chain = current?;
            if let Some(first) = self.first(chain) {
                return Some(first);
            }
            current = self.follower(chain);
        }
        None
    }

    pub fn prev_across(&self, item: K) -> Option<K> {
        let link = self.links.get(&item)?;
        link.prev.or_else(|| self.last_before_chain(link.owner))
    }

    pub fn next_across(&self, item: K) -> Option<K> {
        let link = self.links.get(&item)?;
        link.next.or_else(|| self.first_after_chain(link.owner))
    }

    pub fn iter(&self, owner: C) -> ChainIter<'_, K, C> {
        ChainIter {
            store: self,
            next: self.first(owner),
        }
    }

    pub fn add(&mut self, owner: C, item: K) -> ChainResult<()> {
        self.add_checked(owner, item, |_| Ok::<(), ChainError>(()))
    }

    /// Appends `item`, but only after `validate` accepted it. The validator
    /// sees the element that would precede `item` and runs before anything
    /// is mutated.
    pub fn add_checked<E, F>(&mut self, owner: C, item: K, validate: F) -> Result<(), E>
    where
        E: From<ChainError>,
        F: FnOnce(Option<K>) -> Result<(), E>,
    {
        let last = self.head(owner)?.last;
        self.ensure_detached(item)?;
        validate(last)?;
        self.attach(owner, item, last, None);
        Ok(())
    }

    pub fn push_front(&mut self, owner: C, item: K) -> ChainResult<()> {
        let first = self.head(owner)?.first;
        self.ensure_detached(item)?;
        self.attach(owner, item, None, first);
        Ok(())
    }

    /// Inserts `item` directly before `anchor` and returns the chain it landed in.
    pub fn insert_before(&mut self, anchor: K, item: K) -> ChainResult<C> {
        let link = *self.link(anchor)?;
        self.ensure_detached(item)?;
        self.attach(link.owner, item, link.prev, Some(anchor));
        Ok(link.owner)
    }

    pub fn insert_after(&mut self, anchor: K, item: K) -> ChainResult<C> {
        let link = *self.link(anchor)?;
        self.ensure_detached(item)?;
        self.attach(link.owner, item, Some(anchor), link.next);
        Ok(link.owner)
    }

    /// Detaches `item` from its chain and returns the chain it belonged to.
    pub fn remove(&mut self, item: K) -> ChainResult<C> {
        let link = self
            .links
            .remove(&item)
            .ok_or_else(|| ChainError::UnknownItem(format!("{item:?}")))?;

        match link.prev {
            Some(prev) => self.link_mut(prev).next = link.next,
            None => self.head_mut(link.owner)?.first = link.next,
        }
        match link.next {
            Some(next) => self.link_mut(next).prev = link.prev,
            None => self.head_mut(link.owner)?.last = link.prev,
        }
        self.head_mut(link.owner)?.len -= 1;

        Ok(link.owner)
    }

    pub fn remove_first(&mut self, owner: C) -> ChainResult<Option<K>> {
        match self.head(owner)?.first {
            Some(first) => {
                self.remove(first)?;
                Ok(Some(first))
            }
            None => Ok(None),
        }
    }

    pub fn remove_last(&mut self, owner: C) -> ChainResult<Option<K>> {
        match self.head(owner)?.last {
            Some(last) => {
                self.remove(last)?;
                Ok(Some(last))
            }
            None => Ok(None),
        }
    }

    /// Declares `owner` to directly follow `leader`. If `leader` already had a
    /// follower, `owner` is spliced in between the two.
    pub fn join_after(&mut self, owner: C, leader: C) -> ChainResult<()> {
        if owner == leader {
            return Err(ChainError::SelfJoin(format!("{owner:?}")));
        }
        self.head(leader)?;
        self.unjoin(owner)?;

        let old_follower = self.head(leader)?.follower;
        {
            let head = self.head_mut(owner)?;
            head.leader = Some(leader);
            head.follower = old_follower;
        }
        self.head_mut(leader)?.follower = Some(owner);
        if let Some(follower) = old_follower {
            self.head_mut(follower)?.leader = Some(owner);
        }
        Ok(())
    }

    /// Declares `owner` to directly precede `follower`, splicing it in after
    /// whatever chain led `follower` so far.
    pub fn join_before(&mut self, owner: C, follower: C) -> ChainResult<()> {
        if owner == follower {
            return Err(ChainError::SelfJoin(format!("{owner:?}")));
        }
        self.head(follower)?;
        self.unjoin(owner)?;

        let old_leader = self.head(follower)?.leader;
        {
            let head = self.head_mut(owner)?;
            head.leader = old_leader;
            head.follower = Some(follower);
        }
        self.head_mut(follower)?.leader = Some(owner);
        if let Some(leader) = old_leader {
            self.head_mut(leader)?.follower = Some(owner);
        }
        Ok(())
    }

    /// Takes `owner` out of the join sequence, connecting its leader and
    /// follower directly.
    pub fn unjoin(&mut self, owner: C) -> ChainResult<()> {
        let (leader, follower) = {
            let head = self.head_mut(owner)?;
            (head.leader.take(), head.follower.take())
        };
        if let Some(leader) = leader {
            self.head_mut(leader)?.follower = follower;
        }
        if let Some(follower) = follower {
            self.head_mut(follower)?.leader = leader;
        }
        Ok(())
    }

    /// Moves the last element of `owner` to the front of its following chain.
    pub fn promote_last_to_following(&mut self, owner: C) -> ChainResult<Promotion<K, C>> {
        let head = *self.head(owner)?;
        let to = head
            .follower
            .ok_or_else(|| ChainError::NoFollower(format!("{owner:?}")))?;
        let item = head
            .last
            .ok_or_else(|| ChainError::EmptyChain(format!("{owner:?}")))?;

        self.remove(item)?;
        self.push_front(to, item)?;

        Ok(Promotion {
            item,
            from: owner,
            to,
        })
    }

    fn head(&self, owner: C) -> ChainResult<&Head<K, C>> {
        self.heads
            .get(&owner)
            .ok_or_else(|| ChainError::UnknownChain(format!("{owner:?}")))
    }

    fn head_mut(&mut self, owner: C) -> ChainResult<&mut Head<K, C>> {
        self.heads
            .get_mut(&owner)
            .ok_or_else(|| ChainError::UnknownChain(format!("{owner:?}")))
    }

    fn link(&self, item: K) -> ChainResult<&Link<K, C>> {
        self.links
            .get(&item)
            .ok_or_else(|| ChainError::UnknownItem(format!("{item:?}")))
    }

    // Only called with handles read from live links.
    fn link_mut(&mut self, item: K) -> &mut Link<K, C> {
        self.links
            .get_mut(&item)
            .expect("chain links reference only linked elements")
    }

    fn ensure_detached(&self, item: K) -> ChainResult<()> {
        if self.links.contains_key(&item) {
            return Err(ChainError::DuplicateItem(format!("{item:?}")));
        }
        Ok(())
    }

    fn attach(&mut self, owner: C, item: K, prev: Option<K>, next: Option<K>) {
        self.links.insert(item, Link { prev, next, owner });
        if let Some(prev) = prev {
            self.link_mut(prev).next = Some(item);
        }
        if let Some(next) = next {
            self.link_mut(next).prev = Some(item);
        }
        if let Some(head) = self.heads.get_mut(&owner) {
            if prev.is_none() {
                head.first = Some(item);
            }
            if next.is_none() {
                head.last = Some(item);
            }
            head.len += 1;
        }
    }
}

pub struct ChainIter<'a, K, C> {
    store: &'a ChainStore<K, C>,
    next: Option<K>,
}

impl<K: ChainKey, C: ChainKey> Iterator for ChainIter<'_, K, C> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.store.next(current);
        Some(current)
    }
}
