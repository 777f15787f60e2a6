// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Out-of-tree content for overlay children.
//!
//! An overlay's native object owns a raw container allocated by the engine.
//! That container is not a child of the declarative tree, so its content is
//! projected into it separately: the reconciler maintains a [`PortalList`]
//! and, after any flush that changed it, hands the whole list to a
//! [`PortalRenderer`].
//!
//! Records are keyed by [`ChildId`]. Renderers must use that key to decide
//! what to mount, so that a record moving within the list never remounts
//! unrelated content.

use alloc::vec::Vec;

use crate::id::ChildId;

/// Content of one overlay child bound to its engine container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Portal<K, C> {
    /// Owning child.
    pub id: ChildId,
    /// Engine-allocated container to mount into.
    pub container: K,
    /// Content to mount.
    pub content: C,
}

/// Ordered list of current portal records.
///
/// New records are appended; removed ones are spliced out. Every mutation
/// bumps [`revision`](Self::revision).
#[derive(Debug)]
pub struct PortalList<K, C> {
    records: Vec<Portal<K, C>>,
    revision: u64,
}

impl<K, C> Default for PortalList<K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> PortalList<K, C> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            revision: 0,
        }
    }

    /// Returns the records in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Portal<K, C>] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a counter that changes whenever the list does.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the record for `id`.
    #[must_use]
    pub fn get(&self, id: ChildId) -> Option<&Portal<K, C>> {
        self.records.iter().find(|p| p.id == id)
    }

    /// Replaces the content of `id`'s record, or appends a new record.
    pub fn upsert(&mut self, id: ChildId, container: K, content: C) {
        if let Some(existing) = self.records.iter_mut().find(|p| p.id == id) {
            existing.content = content;
        } else {
            self.records.push(Portal {
                id,
                container,
                content,
            });
        }
        self.revision += 1;
    }

    /// Splices out the record for `id`.
    pub fn remove(&mut self, id: ChildId) -> Option<Portal<K, C>> {
        let pos = self.records.iter().position(|p| p.id == id)?;
        self.revision += 1;
        Some(self.records.remove(pos))
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        if !self.records.is_empty() {
            self.records.clear();
            self.revision += 1;
        }
    }
}

/// Mounts portal content into engine containers.
pub trait PortalRenderer<K, C> {
    /// Brings the mounted content in line with `portals`.
    ///
    /// Content for ids no longer present must be unmounted; content for ids
    /// still present must be kept mounted unless it changed.
    fn render(&mut self, portals: &[Portal<K, C>]);
}

/// A [`PortalRenderer`] for clusterers without overlay children.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPortals;

impl<K, C> PortalRenderer<K, C> for NoPortals {
    fn render(&mut self, portals: &[Portal<K, C>]) {
        _ = portals;
    }
}
