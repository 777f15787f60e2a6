// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clustering engine ownership.
//!
//! A [`Clusterer`] is either **absent** (no viewport, or construction
//! pending) or **active** (an engine instance exists, events are bound, and
//! commits flush against it).
//!
//! ```text
//!            attach(viewport)
//!   Absent ─────────────────────► Active
//!     ▲                             │
//!     │  detach() / drop            │ set_config(changed)
//!     └─────────────────────────────┤   = teardown + construct
//!                                   ▼
//!                                 Active'
//! ```
//!
//! Teardown clears the engine, releases every container, and forgets every
//! instance. Descriptors that were live go back into the queue, so the next
//! instance re-creates them from scratch.
//!
//! # Commit loop pseudocode
//!
//! The host framework calls [`commit`](Clusterer::commit) once its tree has
//! settled for a frame:
//!
//! ```rust,ignore
//! fn after_render(clusterer: &mut Clusterer<Factory, Content, Bridge>) {
//!     // Children already called register / update / unregister while
//!     // rendering. Flush them in one pass.
//!     if let Some(report) = clusterer.commit() {
//!         for failure in &report.failures {
//!             eprintln!("{failure}");
//!         }
//!     }
//! }
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::config::ClustererConfig;
use crate::engine::{ClusterEngine, ClusterEventKind, EngineFactory, EventHandler};
use crate::error::SyncError;
use crate::portal::{Portal, PortalRenderer};
use crate::reconcile::{FlushReport, Reconciler};
use crate::registry::Registry;
use crate::store::InstanceStore;
use crate::trace::{LifecycleEvent, Tracer, Transition};

/// Engine type built by factory `F`.
pub type EngineOf<F> = <F as EngineFactory>::Engine;
/// Error type of the engine built by factory `F`.
pub type EngineErrorOf<F> = <EngineOf<F> as ClusterEngine>::Error;
/// Cluster handle type of the engine built by factory `F`.
pub type ClusterOf<F> = <EngineOf<F> as ClusterEngine>::Cluster;
/// Container type of the engine built by factory `F`.
pub type ContainerOf<F> = <EngineOf<F> as ClusterEngine>::Container;

/// Caller handlers for cluster events, one optional slot per kind.
pub struct EventHandlers<Cl> {
    slots: [Option<EventHandler<Cl>>; 6],
}

impl<Cl> Clone for EventHandlers<Cl> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<Cl> Default for EventHandlers<Cl> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cl> fmt::Debug for EventHandlers<Cl> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                ClusterEventKind::ALL
                    .iter()
                    .filter(|kind| self.get(**kind).is_some()),
            )
            .finish()
    }
}

impl<Cl> EventHandlers<Cl> {
    /// Creates a set with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None, None, None],
        }
    }

    /// Binds `handler` to `kind`.
    #[must_use]
    pub fn on(mut self, kind: ClusterEventKind, handler: EventHandler<Cl>) -> Self {
        self.set(kind, Some(handler));
        self
    }

    /// Replaces the handler for `kind`.
    pub fn set(&mut self, kind: ClusterEventKind, handler: Option<EventHandler<Cl>>) {
        self.slots[kind.index()] = handler;
    }

    /// Returns the handler for `kind`.
    #[must_use]
    pub fn get(&self, kind: ClusterEventKind) -> Option<&EventHandler<Cl>> {
        self.slots[kind.index()].as_ref()
    }
}

/// A live subscription and the handler it was made with.
type Binding<E> = (
    EventHandler<<E as ClusterEngine>::Cluster>,
    <E as ClusterEngine>::Subscription,
);

/// Engine-side subscriptions, one optional slot per event kind.
struct Bindings<E: ClusterEngine> {
    slots: Vec<Option<Binding<E>>>,
}

impl<E: ClusterEngine> Bindings<E> {
    fn bind(
        engine: &mut E,
        handlers: &EventHandlers<E::Cluster>,
        config: &ClustererConfig,
    ) -> Self {
        let mut bindings = Self {
            slots: ClusterEventKind::ALL.iter().map(|_| None).collect(),
        };
        bindings.rebind(engine, handlers, config);
        bindings
    }

    /// Brings subscriptions in line with `handlers`.
    ///
    /// Slots whose handler is the same `Rc` stay subscribed. Kinds the
    /// engine was configured not to report are left unsubscribed.
    fn rebind(
        &mut self,
        engine: &mut E,
        handlers: &EventHandlers<E::Cluster>,
        config: &ClustererConfig,
    ) {
        for kind in ClusterEventKind::ALL {
            let slot = &mut self.slots[kind.index()];
            let wanted = handlers.get(kind).filter(|_| config.emits(kind));
            let unchanged = match (slot.as_ref(), wanted) {
                (Some((bound, _)), Some(wanted)) => Rc::ptr_eq(bound, wanted),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                continue;
            }
            if let Some((_, subscription)) = slot.take() {
                engine.unsubscribe(subscription);
            }
            if let Some(wanted) = wanted {
                let subscription = engine.subscribe(kind, wanted.clone());
                *slot = Some((wanted.clone(), subscription));
            }
        }
    }

    fn unbind(self, engine: &mut E) {
        for (_, subscription) in self.slots.into_iter().flatten() {
            engine.unsubscribe(subscription);
        }
    }
}

struct Active<E: ClusterEngine> {
    engine: E,
    bindings: Bindings<E>,
}

/// Owns the clustering engine instance and drives reconciliation.
///
/// `F` builds engines, `C` is overlay content, and `R` mounts that content
/// into engine containers.
pub struct Clusterer<F, C, R>
where
    F: EngineFactory,
    C: Clone,
    R: PortalRenderer<ContainerOf<F>, C>,
{
    factory: F,
    config: ClustererConfig,
    viewport: Option<F::Viewport>,
    active: Option<Active<EngineOf<F>>>,
    reconciler: Reconciler<EngineOf<F>, C>,
    registry: Registry<C>,
    handlers: EventHandlers<ClusterOf<F>>,
    renderer: R,
}

impl<F, C, R> fmt::Debug for Clusterer<F, C, R>
where
    F: EngineFactory,
    C: Clone,
    R: PortalRenderer<ContainerOf<F>, C>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clusterer")
            .field("active", &self.is_active())
            .field("has_viewport", &self.viewport.is_some())
            .field("config", &self.config)
            .field("reconciler", &self.reconciler)
            .field("registry", &self.registry)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl<F, C, R> Clusterer<F, C, R>
where
    F: EngineFactory,
    C: Clone,
    R: PortalRenderer<ContainerOf<F>, C>,
{
    /// Creates an absent clusterer.
    #[must_use]
    pub fn new(factory: F, config: ClustererConfig, renderer: R) -> Self {
        Self {
            factory,
            config,
            viewport: None,
            active: None,
            reconciler: Reconciler::new(),
            registry: Registry::new(),
            handlers: EventHandlers::new(),
            renderer,
        }
    }

    /// Returns a handle children register through.
    #[must_use]
    pub fn registry(&self) -> Registry<C> {
        self.registry.clone()
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &ClustererConfig {
        &self.config
    }

    /// Returns `true` while an engine instance exists.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the engine instance, if active.
    #[must_use]
    pub fn engine(&self) -> Option<&EngineOf<F>> {
        self.active.as_ref().map(|active| &active.engine)
    }

    /// Returns the engine instance mutably, if active.
    pub fn engine_mut(&mut self) -> Option<&mut EngineOf<F>> {
        self.active.as_mut().map(|active| &mut active.engine)
    }

    /// Returns the live instances.
    #[must_use]
    pub fn instances(
        &self,
    ) -> &InstanceStore<<EngineOf<F> as ClusterEngine>::Marker, ContainerOf<F>> {
        self.reconciler.instances()
    }

    /// Returns the current portal records.
    #[must_use]
    pub fn portals(&self) -> &[Portal<ContainerOf<F>, C>] {
        self.reconciler.portals()
    }

    /// Returns the portal renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Binds the clusterer to `viewport` and constructs the engine.
    ///
    /// An already-active engine is torn down first.
    pub fn attach(&mut self, viewport: F::Viewport) -> Result<(), SyncError<EngineErrorOf<F>>> {
        self.attach_traced(viewport, &mut Tracer::none())
    }

    /// Like [`attach`](Self::attach), reporting lifecycle events to `tracer`.
    pub fn attach_traced(
        &mut self,
        viewport: F::Viewport,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), SyncError<EngineErrorOf<F>>> {
        self.teardown(tracer);
        self.viewport = Some(viewport);
        self.activate(tracer)
    }

    /// Tears the engine down and forgets the viewport.
    ///
    /// Pending and previously live children stay queued.
    pub fn detach(&mut self) -> Option<F::Viewport> {
        self.detach_traced(&mut Tracer::none())
    }

    /// Like [`detach`](Self::detach), reporting lifecycle events to `tracer`.
    pub fn detach_traced(&mut self, tracer: &mut Tracer<'_>) -> Option<F::Viewport> {
        self.teardown(tracer);
        self.viewport.take()
    }

    /// Replaces the configuration.
    ///
    /// Any change to an active clusterer tears the engine down and constructs
    /// a new one; an identical configuration is a no-op.
    pub fn set_config(
        &mut self,
        config: ClustererConfig,
    ) -> Result<(), SyncError<EngineErrorOf<F>>> {
        self.set_config_traced(config, &mut Tracer::none())
    }

    /// Like [`set_config`](Self::set_config), reporting lifecycle events to
    /// `tracer`.
    pub fn set_config_traced(
        &mut self,
        config: ClustererConfig,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), SyncError<EngineErrorOf<F>>> {
        if config == self.config {
            return Ok(());
        }
        self.config = config;
        if self.active.is_none() {
            return Ok(());
        }
        self.teardown(tracer);
        self.activate(tracer)
    }

    /// Replaces the event handlers.
    ///
    /// On an active engine, only kinds whose handler changed are
    /// re-subscribed. Handlers for kinds the configuration disables (see
    /// [`ClustererConfig::emits`]) are kept but not subscribed.
    pub fn set_handlers(&mut self, handlers: EventHandlers<ClusterOf<F>>) {
        self.handlers = handlers;
        if let Some(active) = &mut self.active {
            active
                .bindings
                .rebind(&mut active.engine, &self.handlers, &self.config);
        }
    }

    /// Flushes pending changes if the engine is active.
    ///
    /// Returns `None` when the engine is absent (changes stay queued) or
    /// nothing is pending (the engine is not called).
    pub fn commit(&mut self) -> Option<FlushReport<EngineErrorOf<F>>> {
        self.commit_traced(&mut Tracer::none())
    }

    /// Like [`commit`](Self::commit), reporting flush events to `tracer`.
    pub fn commit_traced(
        &mut self,
        tracer: &mut Tracer<'_>,
    ) -> Option<FlushReport<EngineErrorOf<F>>> {
        let active = self.active.as_mut()?;
        let report = self
            .reconciler
            .flush(&mut active.engine, &self.registry, tracer)?;
        if report.portals_changed {
            self.renderer.render(self.reconciler.portals());
        }
        Some(report)
    }

    fn activate(&mut self, tracer: &mut Tracer<'_>) -> Result<(), SyncError<EngineErrorOf<F>>> {
        let Some(viewport) = &self.viewport else {
            return Ok(());
        };
        let mut engine = self
            .factory
            .construct(&self.config, viewport)
            .map_err(SyncError::Construct)?;
        let bindings = Bindings::bind(&mut engine, &self.handlers, &self.config);
        self.active = Some(Active { engine, bindings });
        tracer.lifecycle(&LifecycleEvent {
            transition: Transition::Constructed,
            requeued: 0,
        });
        Ok(())
    }

    fn teardown(&mut self, tracer: &mut Tracer<'_>) {
        let Some(Active {
            mut engine,
            bindings,
        }) = self.active.take()
        else {
            return;
        };
        bindings.unbind(&mut engine);
        let had_portals = !self.reconciler.portals().is_empty();
        let requeued = self.reconciler.reset(&mut engine, &self.registry);
        if had_portals {
            self.renderer.render(&[]);
        }
        drop(engine);
        tracer.lifecycle(&LifecycleEvent {
            transition: Transition::TornDown,
            requeued,
        });
    }
}

impl<F, C, R> Drop for Clusterer<F, C, R>
where
    F: EngineFactory,
    C: Clone,
    R: PortalRenderer<ContainerOf<F>, C>,
{
    fn drop(&mut self) {
        self.teardown(&mut Tracer::none());
    }
}
