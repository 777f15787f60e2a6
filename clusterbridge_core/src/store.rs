// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live native instances keyed by child id.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::id::ChildId;

/// The engine-side objects backing one live child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance<M, K> {
    /// Native marker or overlay handle.
    pub marker: M,
    /// Container bound as the overlay's content slot; `None` for markers.
    pub container: Option<K>,
}

/// Map from child id to live [`Instance`].
///
/// An id is present if and only if its create has been flushed and no remove
/// has been flushed since. Mutated only by the reconciler.
#[derive(Debug)]
pub struct InstanceStore<M, K> {
    entries: HashMap<ChildId, Instance<M, K>>,
}

impl<M, K> Default for InstanceStore<M, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, K> InstanceStore<M, K> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether `id` is live.
    #[must_use]
    pub fn contains(&self, id: ChildId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the instance for `id`.
    #[must_use]
    pub fn get(&self, id: ChildId) -> Option<&Instance<M, K>> {
        self.entries.get(&id)
    }

    /// Returns the live ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<ChildId> {
        let mut ids: Vec<ChildId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Records a freshly created instance.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already live; a second handle would leak the first
    /// native object.
    pub(crate) fn insert(&mut self, id: ChildId, instance: Instance<M, K>) {
        let previous = self.entries.insert(id, instance);
        assert!(previous.is_none(), "child {id} already has a live instance");
    }

    /// Forgets the instance for `id`, returning it.
    pub(crate) fn remove(&mut self, id: ChildId) -> Option<Instance<M, K>> {
        self.entries.remove(&id)
    }

    /// Forgets every instance, returning them in id order.
    pub(crate) fn drain(&mut self) -> Vec<(ChildId, Instance<M, K>)> {
        let mut all: Vec<_> = self.entries.drain().collect();
        all.sort_unstable_by_key(|(id, _)| *id);
        all
    }
}
