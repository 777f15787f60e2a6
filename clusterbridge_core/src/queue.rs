// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending changes accumulated between flushes.
//!
//! The queue holds at most one entry per [`ChildId`]. A later write for the
//! same id overwrites the earlier one in place, so a child that registers and
//! unregisters within one commit collapses to a single [`Change::Remove`].
//! Entries keep the position of their first write; flushes walk them in that
//! order.

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::descriptor::Descriptor;
use crate::id::ChildId;

/// One queued intent.
#[derive(Clone, Debug, PartialEq)]
pub enum Change<C> {
    /// Create the child, or update it if it is already live.
    Upsert(Box<Descriptor<C>>),
    /// Remove the child (tombstone).
    Remove,
}

impl<C> Change<C> {
    /// Returns `true` for a tombstone.
    #[must_use]
    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove)
    }
}

/// Insertion-ordered map of pending changes keyed by child id.
#[derive(Debug)]
pub struct ChangeQueue<C> {
    entries: Vec<(ChildId, Change<C>)>,
    index: HashMap<ChildId, usize>,
}

impl<C> Default for ChangeQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ChangeQueue<C> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queues a create-or-update intent for `descriptor.id`.
    pub fn upsert(&mut self, descriptor: Descriptor<C>) {
        self.push(descriptor.id, Change::Upsert(Box::new(descriptor)));
    }

    /// Queues a tombstone for `id`.
    pub fn remove(&mut self, id: ChildId) {
        self.push(id, Change::Remove);
    }

    /// Queues `change` for `id`, superseding any pending entry.
    pub fn push(&mut self, id: ChildId, change: Change<C>) {
        if let Some(&slot) = self.index.get(&id) {
            self.entries[slot].1 = change;
        } else {
            self.index.insert(id, self.entries.len());
            self.entries.push((id, change));
        }
    }

    /// Queues `descriptor` only if nothing is pending for its id.
    ///
    /// Returns whether the descriptor was queued.
    pub fn upsert_if_absent(&mut self, descriptor: Descriptor<C>) -> bool {
        if self.index.contains_key(&descriptor.id) {
            return false;
        }
        self.upsert(descriptor);
        true
    }

    /// Returns the pending entry for `id`.
    #[must_use]
    pub fn get(&self, id: ChildId) -> Option<&Change<C>> {
        self.index.get(&id).map(|&slot| &self.entries[slot].1)
    }

    /// Iterates pending entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ChildId, &Change<C>)> {
        self.entries.iter().map(|(id, change)| (*id, change))
    }

    /// Takes every pending entry, leaving the queue empty.
    ///
    /// Writes made after this call land in the next snapshot.
    #[must_use]
    pub fn take(&mut self) -> Vec<(ChildId, Change<C>)> {
        self.index.clear();
        core::mem::take(&mut self.entries)
    }
}
