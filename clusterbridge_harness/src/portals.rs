// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recording portal renderer.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use clusterbridge_core::ChildId;
use clusterbridge_core::portal::{Portal, PortalRenderer};

use crate::engine::ContainerHandle;

/// One mount-level change made by [`RecordingPortals`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortalOp {
    /// Content mounted for a new id.
    Mount(ChildId),
    /// Content for an existing id changed and was mounted again.
    Remount(ChildId),
    /// Content for a vanished id was unmounted.
    Unmount(ChildId),
}

/// A [`PortalRenderer`] that keeps mounted content in memory.
///
/// Diffing is keyed by [`ChildId`], so moving a record within the list is
/// not a change.
#[derive(Debug)]
pub struct RecordingPortals<C> {
    mounted: BTreeMap<ChildId, (ContainerHandle, C)>,
    log: Vec<PortalOp>,
    renders: usize,
}

impl<C> Default for RecordingPortals<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> RecordingPortals<C> {
    /// Creates a renderer with nothing mounted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mounted: BTreeMap::new(),
            log: Vec::new(),
            renders: 0,
        }
    }

    /// Returns the mounted ids in ascending order.
    #[must_use]
    pub fn mounted_ids(&self) -> Vec<ChildId> {
        self.mounted.keys().copied().collect()
    }

    /// Returns the container and content mounted for `id`.
    #[must_use]
    pub fn mounted(&self, id: ChildId) -> Option<&(ContainerHandle, C)> {
        self.mounted.get(&id)
    }

    /// Returns every mount-level change so far.
    #[must_use]
    pub fn log(&self) -> &[PortalOp] {
        &self.log
    }

    /// Returns how many times [`render`](PortalRenderer::render) ran.
    #[must_use]
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl<C: Clone + PartialEq> PortalRenderer<ContainerHandle, C> for RecordingPortals<C> {
    fn render(&mut self, portals: &[Portal<ContainerHandle, C>]) {
        self.renders += 1;

        let gone: Vec<ChildId> = self
            .mounted
            .keys()
            .filter(|id| !portals.iter().any(|p| p.id == **id))
            .copied()
            .collect();
        for id in gone {
            self.mounted.remove(&id);
            self.log.push(PortalOp::Unmount(id));
        }

        for portal in portals {
            let op = match self.mounted.get(&portal.id) {
                Some((container, content))
                    if *container == portal.container && *content == portal.content =>
                {
                    continue;
                }
                Some(_) => PortalOp::Remount(portal.id),
                None => PortalOp::Mount(portal.id),
            };
            self.mounted
                .insert(portal.id, (portal.container, portal.content.clone()));
            self.log.push(op);
        }
    }
}
