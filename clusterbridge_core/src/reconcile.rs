// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The flush pass.
//!
//! [`Reconciler::flush`] snapshots and clears the registry's queue, then
//! walks the snapshot in insertion order:
//!
//! | queued     | instance | action                                        |
//! |------------|----------|-----------------------------------------------|
//! | tombstone  | present  | queue for bulk removal, forget instance       |
//! | tombstone  | absent   | nothing                                       |
//! | descriptor | absent   | create native object, queue for bulk add      |
//! | descriptor | present  | push position / z-order / icon immediately    |
//!
//! A descriptor whose kind differs from the live instance's retires the old
//! object and creates a new one.
//!
//! After the walk the engine sees at most one `remove_markers`, at most one
//! `add_markers`, and exactly one `redraw`. Structural changes are batched
//! because the engine's add/remove are bulk operations; scalar mutators go
//! straight to the object because they are single-object calls.
//!
//! A failed creation is recorded in the [`FlushReport`] and does not stop the
//! pass. The failed child never becomes live.

use alloc::vec::Vec;
use core::fmt;

use crate::descriptor::{ChildKind, Descriptor};
use crate::engine::ClusterEngine;
use crate::error::SyncError;
use crate::id::ChildId;
use crate::portal::{Portal, PortalList};
use crate::queue::Change;
use crate::registry::{Bookkeeping, Registry};
use crate::store::{Instance, InstanceStore};
use crate::trace::{ChildOp, FlushBeginEvent, FlushEndEvent, Tracer};

/// Outcome of one flush.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlushReport<E> {
    /// Counts for this pass.
    pub summary: FlushEndEvent,
    /// Whether the portal list changed.
    pub portals_changed: bool,
    /// Creations that failed, in snapshot order.
    pub failures: Vec<SyncError<E>>,
}

impl<E> FlushReport<E> {
    /// Returns `true` if no creation failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Markers and containers collected for the bulk calls at the end of a pass.
struct Batch<M, K> {
    create: Vec<M>,
    remove: Vec<M>,
    released: Vec<K>,
}

impl<M, K> Default for Batch<M, K> {
    fn default() -> Self {
        Self {
            create: Vec::new(),
            remove: Vec::new(),
            released: Vec::new(),
        }
    }
}

/// Owns the live instances and portal records of one clusterer.
pub struct Reconciler<E: ClusterEngine, C> {
    instances: InstanceStore<E::Marker, E::Container>,
    portals: PortalList<E::Container, C>,
    passes: u64,
}

impl<E: ClusterEngine, C> fmt::Debug for Reconciler<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("instances", &self.instances.len())
            .field("portals", &self.portals.len())
            .field("passes", &self.passes)
            .finish()
    }
}

impl<E: ClusterEngine, C> Default for Reconciler<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ClusterEngine, C> Reconciler<E, C> {
    /// Creates a reconciler with nothing live.
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: InstanceStore::new(),
            portals: PortalList::new(),
            passes: 0,
        }
    }

    /// Returns the live instances.
    #[must_use]
    pub fn instances(&self) -> &InstanceStore<E::Marker, E::Container> {
        &self.instances
    }

    /// Returns the current portal records.
    #[must_use]
    pub fn portals(&self) -> &[Portal<E::Container, C>] {
        self.portals.as_slice()
    }

    /// Returns how many non-empty flushes have run.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl<E: ClusterEngine, C: Clone> Reconciler<E, C> {
    /// Applies every pending change in `registry` to `engine`.
    ///
    /// Returns `None`, without calling the engine at all, when nothing is
    /// pending.
    pub fn flush(
        &mut self,
        engine: &mut E,
        registry: &Registry<C>,
        tracer: &mut Tracer<'_>,
    ) -> Option<FlushReport<E::Error>> {
        let snapshot = registry.take_pending();
        if snapshot.is_empty() {
            return None;
        }

        self.passes += 1;
        let pass = self.passes;
        tracer.flush_begin(&FlushBeginEvent {
            pass,
            pending: snapshot.len(),
        });

        let portal_revision = self.portals.revision();
        let mut summary = FlushEndEvent {
            pass,
            ..FlushEndEvent::default()
        };
        let mut failures = Vec::new();
        let mut batch = Batch::default();

        {
            let mut book = registry.book_mut();
            for (id, change) in snapshot {
                let op = match change {
                    Change::Remove => self.retire(id, &mut book, &mut batch),
                    Change::Upsert(descriptor) => {
                        self.apply(engine, *descriptor, &mut book, &mut batch, &mut failures)
                    }
                };
                match op {
                    ChildOp::Create => summary.created += 1,
                    ChildOp::Update => summary.updated += 1,
                    ChildOp::Replace => {
                        summary.created += 1;
                        summary.removed += 1;
                    }
                    ChildOp::Remove => summary.removed += 1,
                    ChildOp::Fail => summary.failed += 1,
                    ChildOp::Skip => {}
                }
                tracer.child_change(pass, id, op);
            }
        }

        if !batch.remove.is_empty() {
            engine.remove_markers(&batch.remove, false);
        }
        for container in batch.released {
            engine.release_container(container);
        }
        if !batch.create.is_empty() {
            engine.add_markers(&batch.create, false);
        }
        engine.redraw();

        summary.portals = self.portals.len();
        tracer.flush_end(&summary);

        Some(FlushReport {
            summary,
            portals_changed: self.portals.revision() != portal_revision,
            failures,
        })
    }

    /// Forgets every live instance and requeues its descriptor.
    ///
    /// Clears the engine, releases all containers, and drops all portal
    /// records. Returns how many descriptors were requeued.
    pub fn reset(&mut self, engine: &mut E, registry: &Registry<C>) -> usize {
        engine.clear();
        for (_, instance) in self.instances.drain() {
            if let Some(container) = instance.container {
                engine.release_container(container);
            }
        }
        self.portals.clear();
        registry.requeue_live()
    }

    /// Handles a queued descriptor.
    fn apply(
        &mut self,
        engine: &mut E,
        descriptor: Descriptor<C>,
        book: &mut Bookkeeping<C>,
        batch: &mut Batch<E::Marker, E::Container>,
        failures: &mut Vec<SyncError<E::Error>>,
    ) -> ChildOp {
        let id = descriptor.id;
        let live_tag = book.get(&id).map(|live| live.kind.tag());
        match (self.instances.contains(id), live_tag) {
            (true, Some(tag)) if tag == descriptor.kind.tag() => {
                self.update(engine, descriptor, book);
                ChildOp::Update
            }
            (true, _) => {
                self.retire(id, book, batch);
                match self.create(engine, descriptor, book, batch) {
                    Ok(()) => ChildOp::Replace,
                    Err(err) => {
                        failures.push(err);
                        ChildOp::Fail
                    }
                }
            }
            (false, _) => match self.create(engine, descriptor, book, batch) {
                Ok(()) => ChildOp::Create,
                Err(err) => {
                    failures.push(err);
                    ChildOp::Fail
                }
            },
        }
    }

    /// Builds the native object for `descriptor` and queues it for bulk add.
    fn create(
        &mut self,
        engine: &mut E,
        descriptor: Descriptor<C>,
        book: &mut Bookkeeping<C>,
        batch: &mut Batch<E::Marker, E::Container>,
    ) -> Result<(), SyncError<E::Error>> {
        let id = descriptor.id;
        let instance = match &descriptor.kind {
            ChildKind::Marker(props) => {
                let marker = engine
                    .create_marker(props)
                    .map_err(|source| SyncError::Create { id, source })?;
                Instance {
                    marker,
                    container: None,
                }
            }
            ChildKind::Overlay { props, content } => {
                let container = engine
                    .allocate_container()
                    .map_err(|source| SyncError::Container { id, source })?;
                let marker = match engine.create_overlay(props, &container) {
                    Ok(marker) => marker,
                    Err(source) => {
                        engine.release_container(container);
                        return Err(SyncError::Create { id, source });
                    }
                };
                if let Some(content) = content {
                    self.portals.upsert(id, container.clone(), content.clone());
                }
                Instance {
                    marker,
                    container: Some(container),
                }
            }
        };

        batch.create.push(instance.marker.clone());
        self.instances.insert(id, instance);
        book.insert(id, descriptor);
        Ok(())
    }

    /// Pushes scalar changes onto a live object.
    fn update(&mut self, engine: &mut E, descriptor: Descriptor<C>, book: &mut Bookkeeping<C>) {
        let id = descriptor.id;
        let Some(instance) = self.instances.get(id) else {
            return;
        };

        engine.set_position(&instance.marker, descriptor.kind.position());
        engine.set_z_index(&instance.marker, descriptor.kind.z_index());

        match &descriptor.kind {
            ChildKind::Marker(props) => {
                if let Some(icon) = &props.icon {
                    engine.set_icon(&instance.marker, icon);
                }
            }
            ChildKind::Overlay { content, .. } => match (content, &instance.container) {
                (Some(content), Some(container)) => {
                    self.portals.upsert(id, container.clone(), content.clone());
                }
                (None, _) => {
                    self.portals.remove(id);
                }
                (Some(_), None) => {}
            },
        }

        book.insert(id, descriptor);
    }

    /// Forgets the instance for `id`, queueing it for bulk removal.
    fn retire(
        &mut self,
        id: ChildId,
        book: &mut Bookkeeping<C>,
        batch: &mut Batch<E::Marker, E::Container>,
    ) -> ChildOp {
        book.remove(&id);
        let Some(instance) = self.instances.remove(id) else {
            return ChildOp::Skip;
        };
        self.portals.remove(id);
        batch.remove.push(instance.marker);
        if let Some(container) = instance.container {
            batch.released.push(container);
        }
        ChildOp::Remove
    }
}
