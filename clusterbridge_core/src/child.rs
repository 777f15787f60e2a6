// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding embedded by leaf elements.
//!
//! A leaf marker or overlay holds a [`ClusteredChild`] built from whatever
//! registry its surrounding clusterer exposes. With a registry, the leaf
//! delegates: it registers on mount, updates on change, unregisters on
//! unmount, and renders nothing itself. Without one it is standalone and the
//! host renders it directly.

use crate::descriptor::{ChildKind, Descriptor};
use crate::id::ChildId;
use crate::registry::Registry;

/// How a leaf should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Presence {
    /// A clusterer owns the native object; render nothing.
    Delegated,
    /// No clusterer; render as a plain element.
    Standalone,
}

/// Per-leaf registration state.
#[derive(Debug)]
pub struct ClusteredChild<C> {
    registry: Option<Registry<C>>,
    id: Option<ChildId>,
}

impl<C> ClusteredChild<C> {
    /// Creates an unmounted binding.
    #[must_use]
    pub fn new(registry: Option<Registry<C>>) -> Self {
        Self { registry, id: None }
    }

    /// Returns how the leaf should render.
    #[must_use]
    pub fn presence(&self) -> Presence {
        if self.registry.is_some() {
            Presence::Delegated
        } else {
            Presence::Standalone
        }
    }

    /// Returns the id assigned on mount.
    #[must_use]
    pub fn id(&self) -> Option<ChildId> {
        self.id
    }

    /// Registers the leaf.
    ///
    /// Mounting an already mounted binding updates it instead.
    pub fn mount(&mut self, kind: ChildKind<C>) -> Presence {
        let Some(registry) = &self.registry else {
            return Presence::Standalone;
        };
        match self.id {
            Some(id) => {
                registry.update(id, kind);
            }
            None => {
                let id = registry.allocate_id();
                registry.register(Descriptor::new(id, kind));
                self.id = Some(id);
            }
        }
        Presence::Delegated
    }

    /// Pushes changed props; mounts first if needed.
    pub fn set(&mut self, kind: ChildKind<C>) -> Presence {
        self.mount(kind)
    }

    /// Unregisters the leaf. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if let (Some(registry), Some(id)) = (&self.registry, self.id.take()) {
            registry.unregister(id);
        }
    }
}

impl<C> Drop for ClusteredChild<C> {
    fn drop(&mut self) {
        self.unmount();
    }
}
