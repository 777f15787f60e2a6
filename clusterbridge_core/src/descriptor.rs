// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child descriptors.
//!
//! A [`Descriptor`] is the snapshot one child publishes: its id, its kind,
//! and the props for that kind. Overlay children additionally carry nested
//! content of type `C`, which the reconciler hands to the
//! [`PortalRenderer`](crate::portal::PortalRenderer) rather than to the
//! engine.

use crate::geo::LatLng;
use crate::id::ChildId;
use crate::props::{MarkerProps, OverlayProps};

/// What a child is, together with the props meaningful for that kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ChildKind<C> {
    /// A bare point marker.
    Marker(MarkerProps),
    /// An overlay whose nested content is rendered into an engine-owned
    /// container.
    Overlay {
        /// Overlay props.
        props: OverlayProps,
        /// Nested content; `None` leaves the container empty.
        content: Option<C>,
    },
}

/// Discriminant of a [`ChildKind`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KindTag {
    /// [`ChildKind::Marker`].
    Marker,
    /// [`ChildKind::Overlay`].
    Overlay,
}

impl<C> ChildKind<C> {
    /// Creates an overlay kind.
    #[must_use]
    pub fn overlay(props: OverlayProps, content: Option<C>) -> Self {
        Self::Overlay { props, content }
    }

    /// Returns the discriminant.
    #[must_use]
    pub fn tag(&self) -> KindTag {
        match self {
            Self::Marker(_) => KindTag::Marker,
            Self::Overlay { .. } => KindTag::Overlay,
        }
    }

    /// Returns the declared position.
    #[must_use]
    pub fn position(&self) -> LatLng {
        match self {
            Self::Marker(props) => props.position,
            Self::Overlay { props, .. } => props.position,
        }
    }

    /// Returns the declared stacking order.
    #[must_use]
    pub fn z_index(&self) -> Option<i32> {
        match self {
            Self::Marker(props) => props.z_index,
            Self::Overlay { props, .. } => props.z_index,
        }
    }

    /// Returns the nested content, if this is an overlay that has any.
    #[must_use]
    pub fn content(&self) -> Option<&C> {
        match self {
            Self::Marker(_) => None,
            Self::Overlay { content, .. } => content.as_ref(),
        }
    }
}

/// Snapshot of one child's identity, kind, and props.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor<C> {
    /// Stable identity of the child.
    pub id: ChildId,
    /// Kind and props.
    pub kind: ChildKind<C>,
}

impl<C> Descriptor<C> {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(id: ChildId, kind: ChildKind<C>) -> Self {
        Self { id, kind }
    }

    /// Creates a point-marker descriptor.
    #[must_use]
    pub fn marker(id: ChildId, props: MarkerProps) -> Self {
        Self::new(id, ChildKind::Marker(props))
    }

    /// Creates a content-overlay descriptor.
    #[must_use]
    pub fn overlay(id: ChildId, props: OverlayProps, content: Option<C>) -> Self {
        Self::new(id, ChildKind::overlay(props, content))
    }
}
