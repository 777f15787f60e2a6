// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child identity and id allocation.

use core::cell::Cell;
use core::fmt;

/// Identity of one clustered child.
///
/// Assigned once when the child first mounts and stable for its lifetime.
/// Ids handed out by an [`IdAllocator`] are never reused by that allocator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildId(pub u64);

impl fmt::Debug for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChildId({})", self.0)
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id allocator scoped to one [`Registry`](crate::Registry).
///
/// Each registry owns its own allocator, so ids are only unique among the
/// children of one clusterer.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: Cell<u64>,
}

impl IdAllocator {
    /// Creates an allocator whose first id is `ChildId(0)`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: Cell::new(0) }
    }

    /// Hands out the next id.
    ///
    /// # Panics
    ///
    /// Panics if the id space is exhausted.
    pub fn allocate(&self) -> ChildId {
        let id = self.next.get();
        let next = id.checked_add(1).expect("child id space exhausted");
        self.next.set(next);
        ChildId(id)
    }

    /// Returns how many ids have been handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.next.get()
    }
}
