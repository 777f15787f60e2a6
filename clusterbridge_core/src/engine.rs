// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract for the external clustering engine.
//!
//! The clustering engine is an opaque imperative service. Platform backends
//! wrap it by implementing two traits:
//!
//! - **[`EngineFactory`]**: Builds an engine instance from a
//!   [`ClustererConfig`] and a host viewport. The
//!   [`Clusterer`](crate::Clusterer) calls it once per activation; there is
//!   no way to reconfigure a live instance.
//!
//! - **[`ClusterEngine`]**: The instance itself: native object creation,
//!   bulk add/remove, redraw, per-object mutators, and event subscription.
//!
//! Native handles ([`ClusterEngine::Marker`], [`ClusterEngine::Container`])
//! are expected to be cheap reference-counted clones of engine-side objects,
//! the way DOM or `CALayer` handles are.
//!
//! Translating [`LatLng`] into the engine's own coordinate type is the
//! backend's job and happens inside the creation and mutator methods.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::config::ClustererConfig;
use crate::geo::LatLng;
use crate::props::{MarkerImage, MarkerProps, OverlayProps};

/// Semantic events an engine reports about clusters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClusterEventKind {
    /// A cluster icon was clicked.
    Click,
    /// A cluster icon was double-clicked.
    DoubleClick,
    /// A cluster icon was right-clicked.
    RightClick,
    /// The pointer entered a cluster icon.
    Over,
    /// The pointer left a cluster icon.
    Out,
    /// The engine finished recomputing clusters.
    Clustered,
}

impl ClusterEventKind {
    /// Every event kind, in a fixed order.
    pub const ALL: [Self; 6] = [
        Self::Click,
        Self::DoubleClick,
        Self::RightClick,
        Self::Over,
        Self::Out,
        Self::Clustered,
    ];

    /// Returns the engine-side event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "clusterclick",
            Self::DoubleClick => "clusterdblclick",
            Self::RightClick => "clusterrightclick",
            Self::Over => "clusterover",
            Self::Out => "clusterout",
            Self::Clustered => "clustered",
        }
    }

    /// Position of this kind in [`ALL`](Self::ALL).
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Click => 0,
            Self::DoubleClick => 1,
            Self::RightClick => 2,
            Self::Over => 3,
            Self::Out => 4,
            Self::Clustered => 5,
        }
    }
}

/// An event reported by the engine, carrying engine cluster handles.
#[derive(Clone, Debug, PartialEq)]
pub enum ClusterEvent<Cl> {
    /// See [`ClusterEventKind::Click`].
    Click(Cl),
    /// See [`ClusterEventKind::DoubleClick`].
    DoubleClick(Cl),
    /// See [`ClusterEventKind::RightClick`].
    RightClick(Cl),
    /// See [`ClusterEventKind::Over`].
    Over(Cl),
    /// See [`ClusterEventKind::Out`].
    Out(Cl),
    /// The freshly computed cluster set.
    Clustered(Vec<Cl>),
}

impl<Cl> ClusterEvent<Cl> {
    /// Returns the kind of this event.
    #[must_use]
    pub fn kind(&self) -> ClusterEventKind {
        match self {
            Self::Click(_) => ClusterEventKind::Click,
            Self::DoubleClick(_) => ClusterEventKind::DoubleClick,
            Self::RightClick(_) => ClusterEventKind::RightClick,
            Self::Over(_) => ClusterEventKind::Over,
            Self::Out(_) => ClusterEventKind::Out,
            Self::Clustered(_) => ClusterEventKind::Clustered,
        }
    }
}

/// Caller-supplied event handler, shared with the engine while subscribed.
pub type EventHandler<Cl> = Rc<dyn Fn(&ClusterEvent<Cl>)>;

/// A live clustering engine instance.
pub trait ClusterEngine {
    /// Handle to a native annotation (marker or overlay).
    type Marker: Clone;
    /// Handle to a foreign container an overlay renders into.
    type Container: Clone;
    /// Handle to a cluster, as carried by events.
    type Cluster;
    /// Token returned by [`subscribe`](Self::subscribe).
    type Subscription;
    /// Error raised by fallible engine calls.
    type Error;

    /// Builds a native point marker from `props`. Does not add it.
    fn create_marker(&mut self, props: &MarkerProps) -> Result<Self::Marker, Self::Error>;

    /// Allocates an empty container for overlay content.
    fn allocate_container(&mut self) -> Result<Self::Container, Self::Error>;

    /// Builds a native overlay from `props` whose content slot is
    /// `container`. Does not add it.
    fn create_overlay(
        &mut self,
        props: &OverlayProps,
        container: &Self::Container,
    ) -> Result<Self::Marker, Self::Error>;

    /// Releases a container once its overlay is gone.
    fn release_container(&mut self, container: Self::Container) {
        _ = container;
    }

    /// Adds `markers` in one bulk call.
    fn add_markers(&mut self, markers: &[Self::Marker], redraw: bool);

    /// Removes `markers` in one bulk call.
    fn remove_markers(&mut self, markers: &[Self::Marker], redraw: bool);

    /// Recomputes and redraws clusters.
    fn redraw(&mut self);

    /// Removes every marker from the engine.
    fn clear(&mut self);

    /// Moves a live marker.
    fn set_position(&mut self, marker: &Self::Marker, position: LatLng);

    /// Restacks a live marker.
    fn set_z_index(&mut self, marker: &Self::Marker, z_index: Option<i32>);

    /// Replaces a live marker's icon with a native image built from `icon`.
    fn set_icon(&mut self, marker: &Self::Marker, icon: &MarkerImage);

    /// Forwards events of `kind` to `handler` until unsubscribed.
    fn subscribe(
        &mut self,
        kind: ClusterEventKind,
        handler: EventHandler<Self::Cluster>,
    ) -> Self::Subscription;

    /// Cancels a subscription.
    fn unsubscribe(&mut self, subscription: Self::Subscription);
}

/// Builds engine instances.
pub trait EngineFactory {
    /// The engine type produced.
    type Engine: ClusterEngine;
    /// Handle to the host map viewport.
    type Viewport;

    /// Constructs an engine bound to `viewport`, passing every option in
    /// `config` at once.
    fn construct(
        &mut self,
        config: &ClustererConfig,
        viewport: &Self::Viewport,
    ) -> Result<Self::Engine, <Self::Engine as ClusterEngine>::Error>;
}
