// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for flushes and engine lifecycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! reconciler and the clusterer call as they work. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates per-child [`ChildChange`] events
//!   and the corresponding `TraceSink` method.

use crate::id::ChildId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What a flush did with one queued entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildOp {
    /// A native object was created and queued for bulk add.
    Create,
    /// A live object was updated in place.
    Update,
    /// The child changed kind; the old object was retired and a new one
    /// created.
    Replace,
    /// A live object was queued for bulk removal.
    Remove,
    /// A tombstone for an id that never went live.
    Skip,
    /// Creation failed; the child is not live.
    Fail,
}

/// Engine lifecycle transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// An engine instance was constructed and its events bound.
    Constructed,
    /// The engine instance was cleared and discarded.
    TornDown,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a flush starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushBeginEvent {
    /// Monotonic flush counter.
    pub pass: u64,
    /// Number of entries in the snapshot.
    pub pending: usize,
}

/// Emitted when a flush has issued all engine calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushEndEvent {
    /// Monotonic flush counter.
    pub pass: u64,
    /// Objects created (including replacements).
    pub created: usize,
    /// Objects updated in place.
    pub updated: usize,
    /// Objects removed (including replacements).
    pub removed: usize,
    /// Creations that failed.
    pub failed: usize,
    /// Portal records after the flush.
    pub portals: usize,
}

/// Emitted on engine construction and teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// Which transition happened.
    pub transition: Transition,
    /// Live children queued again for the next instance (teardown only).
    pub requeued: usize,
}

/// A per-child flush record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildChange {
    /// Flush counter.
    pub pass: u64,
    /// The child.
    pub id: ChildId,
    /// What happened to it.
    pub op: ChildOp,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the reconciler and the clusterer.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called before a flush touches the engine.
    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        _ = e;
    }

    /// Called after a flush issued its last engine call.
    fn on_flush_end(&mut self, e: &FlushEndEvent) {
        _ = e;
    }

    /// Called on engine construction and teardown.
    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        _ = e;
    }

    /// Called once per snapshot entry (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_child_change(&mut self, e: &ChildChange) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FlushBeginEvent`].
    #[inline]
    pub fn flush_begin(&mut self, e: &FlushBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flush_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlushEndEvent`].
    #[inline]
    pub fn flush_end(&mut self, e: &FlushEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flush_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LifecycleEvent`].
    #[inline]
    pub fn lifecycle(&mut self, e: &LifecycleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_lifecycle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a per-child record.
    ///
    /// Compiles to nothing unless the `trace-rich` feature is on.
    #[inline]
    pub fn child_change(&mut self, pass: u64, id: ChildId, op: ChildOp) {
        #[cfg(feature = "trace-rich")]
        if let Some(s) = &mut self.sink {
            s.on_child_change(&ChildChange { pass, id, op });
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = (pass, id, op);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
