// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recording engine.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use clusterbridge_core::config::ClustererConfig;
use clusterbridge_core::engine::{
    ClusterEngine, ClusterEvent, ClusterEventKind, EngineFactory, EventHandler,
};
use clusterbridge_core::geo::LatLng;
use clusterbridge_core::props::{MarkerImage, MarkerProps, OverlayProps};

/// Native marker handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u32);

/// Overlay content container handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerHandle(pub u32);

/// Event subscription token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u32);

/// Cluster handle carried by events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(pub u32);

/// Stand-in for the host map viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapView(pub u32);

/// One recorded engine call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    /// An engine was constructed with this configuration.
    Construct {
        /// Viewport it was bound to.
        view: MapView,
        /// Options passed at construction.
        config: ClustererConfig,
    },
    /// `create_marker` succeeded.
    CreateMarker {
        /// New handle.
        marker: MarkerHandle,
        /// Declared position.
        position: LatLng,
    },
    /// `allocate_container` succeeded.
    AllocateContainer(ContainerHandle),
    /// `create_overlay` succeeded.
    CreateOverlay {
        /// New handle.
        marker: MarkerHandle,
        /// Content slot.
        container: ContainerHandle,
        /// Declared position.
        position: LatLng,
    },
    /// `release_container`.
    ReleaseContainer(ContainerHandle),
    /// `add_markers`.
    AddMarkers {
        /// Markers in the batch.
        markers: Vec<MarkerHandle>,
        /// Whether the engine was asked to redraw.
        redraw: bool,
    },
    /// `remove_markers`.
    RemoveMarkers {
        /// Markers in the batch.
        markers: Vec<MarkerHandle>,
        /// Whether the engine was asked to redraw.
        redraw: bool,
    },
    /// `redraw`.
    Redraw,
    /// `clear`.
    Clear,
    /// `set_position`.
    SetPosition {
        /// Target marker.
        marker: MarkerHandle,
        /// New position.
        position: LatLng,
    },
    /// `set_z_index`.
    SetZIndex {
        /// Target marker.
        marker: MarkerHandle,
        /// New stacking order.
        z_index: Option<i32>,
    },
    /// `set_icon`.
    SetIcon {
        /// Target marker.
        marker: MarkerHandle,
        /// Icon URL.
        url: String,
    },
    /// `subscribe`.
    Subscribe {
        /// Event kind.
        kind: ClusterEventKind,
        /// Token handed out.
        subscription: SubscriptionId,
    },
    /// `unsubscribe`.
    Unsubscribe(SubscriptionId),
    /// The engine instance was dropped.
    Dropped,
}

/// Scripted failures.
#[derive(Clone, Debug, Default)]
pub struct Failures {
    /// Fail every construction.
    pub construct: bool,
    /// Fail `create_marker` for markers with one of these titles.
    pub marker_titles: Vec<String>,
    /// Fail this many upcoming `allocate_container` calls.
    pub containers: usize,
    /// Fail this many upcoming `create_overlay` calls.
    pub overlays: usize,
}

/// Error raised by scripted failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HarnessError {
    /// Construction was scripted to fail.
    ConstructRejected,
    /// Marker with this title was scripted to fail.
    MarkerRejected(String),
    /// Container allocation was scripted to fail.
    NoContainer,
    /// Overlay creation was scripted to fail.
    OverlayRejected,
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstructRejected => f.write_str("construction rejected"),
            Self::MarkerRejected(title) => write!(f, "marker {title:?} rejected"),
            Self::NoContainer => f.write_str("no container available"),
            Self::OverlayRejected => f.write_str("overlay rejected"),
        }
    }
}

impl core::error::Error for HarnessError {}

type CreateHook = Rc<dyn Fn(&MarkerProps)>;

#[derive(Default)]
struct EngineState {
    calls: Vec<Call>,
    next_handle: u32,
    attached: Vec<MarkerHandle>,
    subscriptions: Vec<(SubscriptionId, ClusterEventKind, EventHandler<ClusterId>)>,
    failures: Failures,
    create_hook: Option<CreateHook>,
    live_engines: usize,
}

impl EngineState {
    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Shared view into everything the recording engines did.
#[derive(Clone)]
pub struct EngineProbe {
    state: Rc<RefCell<EngineState>>,
}

impl fmt::Debug for EngineProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EngineProbe")
            .field("calls", &state.calls.len())
            .field("attached", &state.attached)
            .field("subscriptions", &state.subscriptions.len())
            .field("live_engines", &state.live_engines)
            .finish_non_exhaustive()
    }
}

impl EngineProbe {
    /// Returns a copy of the call log.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Returns and clears the call log.
    pub fn take_calls(&self) -> Vec<Call> {
        core::mem::take(&mut self.state.borrow_mut().calls)
    }

    /// Counts logged calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Returns the markers currently added to the engine, in add order.
    #[must_use]
    pub fn attached(&self) -> Vec<MarkerHandle> {
        self.state.borrow().attached.clone()
    }

    /// Returns the active subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<(SubscriptionId, ClusterEventKind)> {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .map(|(id, kind, _)| (*id, *kind))
            .collect()
    }

    /// Returns how many engine instances exist.
    #[must_use]
    pub fn live_engines(&self) -> usize {
        self.state.borrow().live_engines
    }

    /// Edits the scripted failures.
    pub fn script(&self, edit: impl FnOnce(&mut Failures)) {
        edit(&mut self.state.borrow_mut().failures);
    }

    /// Runs `hook` at the start of every `create_marker` call.
    pub fn on_create(&self, hook: impl Fn(&MarkerProps) + 'static) {
        self.state.borrow_mut().create_hook = Some(Rc::new(hook));
    }

    /// Delivers `event` to every handler subscribed to its kind.
    ///
    /// Returns how many handlers ran.
    pub fn emit(&self, event: &ClusterEvent<ClusterId>) -> usize {
        let kind = event.kind();
        let handlers: Vec<EventHandler<ClusterId>> = self
            .state
            .borrow()
            .subscriptions
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }
}

/// Builds [`RecordingEngine`]s that share one [`EngineProbe`].
#[derive(Debug)]
pub struct RecordingFactory {
    probe: EngineProbe,
}

impl Default for RecordingFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingFactory {
    /// Creates a factory with an empty log and no scripted failures.
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: EngineProbe {
                state: Rc::new(RefCell::new(EngineState::default())),
            },
        }
    }

    /// Returns the probe shared by every engine this factory builds.
    #[must_use]
    pub fn probe(&self) -> EngineProbe {
        self.probe.clone()
    }
}

impl EngineFactory for RecordingFactory {
    type Engine = RecordingEngine;
    type Viewport = MapView;

    fn construct(
        &mut self,
        config: &ClustererConfig,
        viewport: &MapView,
    ) -> Result<RecordingEngine, HarnessError> {
        let mut state = self.probe.state.borrow_mut();
        state.calls.push(Call::Construct {
            view: *viewport,
            config: config.clone(),
        });
        if state.failures.construct {
            return Err(HarnessError::ConstructRejected);
        }
        state.live_engines += 1;
        Ok(RecordingEngine {
            state: Rc::clone(&self.probe.state),
        })
    }
}

/// A [`ClusterEngine`] that records calls instead of drawing.
pub struct RecordingEngine {
    state: Rc<RefCell<EngineState>>,
}

impl fmt::Debug for RecordingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingEngine").finish_non_exhaustive()
    }
}

impl ClusterEngine for RecordingEngine {
    type Marker = MarkerHandle;
    type Container = ContainerHandle;
    type Cluster = ClusterId;
    type Subscription = SubscriptionId;
    type Error = HarnessError;

    fn create_marker(&mut self, props: &MarkerProps) -> Result<MarkerHandle, HarnessError> {
        // The hook may call back into a registry; run it with no borrow held.
        let hook = self.state.borrow().create_hook.clone();
        if let Some(hook) = hook {
            hook(props);
        }

        let mut state = self.state.borrow_mut();
        if let Some(title) = &props.title
            && state.failures.marker_titles.contains(title)
        {
            return Err(HarnessError::MarkerRejected(title.clone()));
        }
        let marker = MarkerHandle(state.next());
        state.calls.push(Call::CreateMarker {
            marker,
            position: props.position,
        });
        Ok(marker)
    }

    fn allocate_container(&mut self) -> Result<ContainerHandle, HarnessError> {
        let mut state = self.state.borrow_mut();
        if state.failures.containers > 0 {
            state.failures.containers -= 1;
            return Err(HarnessError::NoContainer);
        }
        let container = ContainerHandle(state.next());
        state.calls.push(Call::AllocateContainer(container));
        Ok(container)
    }

    fn create_overlay(
        &mut self,
        props: &OverlayProps,
        container: &ContainerHandle,
    ) -> Result<MarkerHandle, HarnessError> {
        let mut state = self.state.borrow_mut();
        if state.failures.overlays > 0 {
            state.failures.overlays -= 1;
            return Err(HarnessError::OverlayRejected);
        }
        let marker = MarkerHandle(state.next());
        state.calls.push(Call::CreateOverlay {
            marker,
            container: *container,
            position: props.position,
        });
        Ok(marker)
    }

    fn release_container(&mut self, container: ContainerHandle) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::ReleaseContainer(container));
    }

    fn add_markers(&mut self, markers: &[MarkerHandle], redraw: bool) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::AddMarkers {
            markers: markers.to_vec(),
            redraw,
        });
        state.attached.extend_from_slice(markers);
    }

    fn remove_markers(&mut self, markers: &[MarkerHandle], redraw: bool) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::RemoveMarkers {
            markers: markers.to_vec(),
            redraw,
        });
        state.attached.retain(|m| !markers.contains(m));
    }

    fn redraw(&mut self) {
        self.state.borrow_mut().calls.push(Call::Redraw);
    }

    fn clear(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Clear);
        state.attached.clear();
    }

    fn set_position(&mut self, marker: &MarkerHandle, position: LatLng) {
        self.state.borrow_mut().calls.push(Call::SetPosition {
            marker: *marker,
            position,
        });
    }

    fn set_z_index(&mut self, marker: &MarkerHandle, z_index: Option<i32>) {
        self.state.borrow_mut().calls.push(Call::SetZIndex {
            marker: *marker,
            z_index,
        });
    }

    fn set_icon(&mut self, marker: &MarkerHandle, icon: &MarkerImage) {
        self.state.borrow_mut().calls.push(Call::SetIcon {
            marker: *marker,
            url: icon.url.clone(),
        });
    }

    fn subscribe(
        &mut self,
        kind: ClusterEventKind,
        handler: EventHandler<ClusterId>,
    ) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let subscription = SubscriptionId(state.next());
        state.calls.push(Call::Subscribe { kind, subscription });
        state.subscriptions.push((subscription, kind, handler));
        subscription
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Unsubscribe(subscription));
        state.subscriptions.retain(|(id, _, _)| *id != subscription);
    }
}

impl Drop for RecordingEngine {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Dropped);
        state.live_engines -= 1;
    }
}
