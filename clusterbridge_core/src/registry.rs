// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The handle children publish themselves into.
//!
//! A [`Registry`] is a cheap, clonable reference to state shared with the
//! owning [`Clusterer`](crate::Clusterer). Children receive it as an
//! explicit `Option<Registry<C>>`; `None` means they run standalone.
//!
//! Registry operations only write to the [`ChangeQueue`]. They never call
//! into the engine and never touch the instance store, so they are safe to
//! call at any time, including re-entrantly from an engine callback while a
//! flush is running. Such writes land in the next pass.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{RefCell, RefMut};
use core::fmt;

use hashbrown::HashMap;

use crate::descriptor::{ChildKind, Descriptor};
use crate::id::{ChildId, IdAllocator};
use crate::queue::{Change, ChangeQueue};

/// Which path [`Registry::update`] took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateOutcome {
    /// The id was known; its props were replaced.
    Updated,
    /// The id was unknown (never registered, or already retired by a flush)
    /// and was registered afresh.
    Registered,
}

/// Descriptors of live children, keyed by id.
///
/// Written only by the reconciler; read by [`Registry::update`].
pub(crate) type Bookkeeping<C> = HashMap<ChildId, Descriptor<C>>;

struct Shared<C> {
    queue: RefCell<ChangeQueue<C>>,
    book: RefCell<Bookkeeping<C>>,
    ids: IdAllocator,
}

/// Shared handle through which children register, update, and unregister.
pub struct Registry<C> {
    shared: Rc<Shared<C>>,
}

impl<C> Clone for Registry<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "pending",
                &self.shared.queue.try_borrow().map(|q| q.len()).ok(),
            )
            .field("live", &self.shared.book.try_borrow().map(|b| b.len()).ok())
            .field("allocated_ids", &self.shared.ids.allocated())
            .finish()
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Registry<C> {
    /// Creates a registry with an empty queue and a fresh id allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                queue: RefCell::new(ChangeQueue::new()),
                book: RefCell::new(HashMap::new()),
                ids: IdAllocator::new(),
            }),
        }
    }

    /// Hands out an id for a newly mounting child.
    pub fn allocate_id(&self) -> ChildId {
        self.shared.ids.allocate()
    }

    /// Queues a create-or-update intent for `descriptor`.
    ///
    /// Replaces any entry already pending for the same id.
    pub fn register(&self, descriptor: Descriptor<C>) {
        self.shared.queue.borrow_mut().upsert(descriptor);
    }

    /// Queues a tombstone for `id`.
    ///
    /// Valid for ids that never reached the engine; the flush treats those
    /// as a no-op.
    pub fn unregister(&self, id: ChildId) {
        self.shared.queue.borrow_mut().remove(id);
    }

    /// Replaces the kind and props of child `id`.
    ///
    /// If the id is neither live nor pending, this registers it using the
    /// supplied `kind`. Either way the resulting queue state is the same as
    /// `register(Descriptor::new(id, kind))`.
    pub fn update(&self, id: ChildId, kind: ChildKind<C>) -> UpdateOutcome {
        let outcome = if self.is_known(id) {
            UpdateOutcome::Updated
        } else {
            UpdateOutcome::Registered
        };
        self.register(Descriptor::new(id, kind));
        outcome
    }

    /// Returns whether `id` is live or has a pending upsert.
    ///
    /// While a flush holds the bookkeeping, live ids read as unknown.
    #[must_use]
    pub fn is_known(&self, id: ChildId) -> bool {
        let live = self
            .shared
            .book
            .try_borrow()
            .is_ok_and(|book| book.contains_key(&id));
        live || matches!(self.shared.queue.borrow().get(id), Some(Change::Upsert(_)))
    }

    /// Returns the number of pending queue entries.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.borrow().len()
    }

    /// Returns the number of children that are live in the engine.
    #[must_use]
    pub fn live(&self) -> usize {
        self.shared.book.try_borrow().map_or(0, |book| book.len())
    }

    /// Returns a clone of the current descriptor of live child `id`.
    #[must_use]
    pub fn descriptor(&self, id: ChildId) -> Option<Descriptor<C>>
    where
        C: Clone,
    {
        self.shared.book.try_borrow().ok()?.get(&id).cloned()
    }

    /// Returns whether two handles share the same state.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Snapshots and clears the queue.
    pub(crate) fn take_pending(&self) -> Vec<(ChildId, Change<C>)> {
        self.shared.queue.borrow_mut().take()
    }

    /// Borrows the descriptor bookkeeping for the duration of a flush.
    pub(crate) fn book_mut(&self) -> RefMut<'_, Bookkeeping<C>> {
        self.shared.book.borrow_mut()
    }

    /// Moves every live descriptor back into the queue, in id order.
    ///
    /// Ids with a newer pending entry keep that entry. Returns how many
    /// descriptors were queued.
    pub(crate) fn requeue_live(&self) -> usize {
        let mut live: Vec<Descriptor<C>> = self
            .shared
            .book
            .borrow_mut()
            .drain()
            .map(|(_, descriptor)| descriptor)
            .collect();
        live.sort_by_key(|descriptor| descriptor.id);

        let mut queue = self.shared.queue.borrow_mut();
        let mut requeued = 0;
        for descriptor in live {
            if queue.upsert_if_absent(descriptor) {
                requeued += 1;
            }
        }
        requeued
    }
}
