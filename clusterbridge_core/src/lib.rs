// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciles declarative map annotations against an imperative clustering
//! engine.
//!
//! Application code describes the markers and overlays that currently exist
//! as plain values. A clustering engine, on the other hand, wants discrete
//! add/remove/redraw calls against long-lived native objects. This crate
//! sits between the two: children publish [`Descriptor`]s into a
//! [`Registry`], and the [`Clusterer`] diffs the queued changes against the
//! live instances once per commit.
//!
//! It is `no_std` compatible (with `alloc`) and single-threaded: shared state
//! lives behind `Rc` and `RefCell`, never behind locks.
//!
//! # Architecture
//!
//! ```text
//!   ClusteredChild (mount / set / unmount)
//!       │
//!       ▼
//!   Registry::register / update / unregister ──► ChangeQueue
//!                                                    │
//!                 ┌──────────────────────────────────┘
//!                 ▼
//!   Clusterer::commit() ──► Reconciler::flush() ──► ClusterEngine
//!                                  │                (batched add/remove,
//!                                  │                 one redraw)
//!                                  ▼
//!                            PortalList ──► PortalRenderer::render()
//! ```
//!
//! **[`registry`]**: The handle descendants hold. Writes only ever touch the
//! [`ChangeQueue`](queue::ChangeQueue); a later write for the same id
//! supersedes an earlier one.
//!
//! **[`reconcile`]**: The flush pass. Snapshots and clears the queue, then
//! creates, updates, or retires native objects and issues batched engine
//! calls.
//!
//! **[`portal`]**: Out-of-tree content for overlay children, projected into
//! containers the engine allocates.
//!
//! **[`owner`]**: The [`Clusterer`] state machine: engine construction,
//! teardown, configuration changes, and event forwarding.
//!
//! **[`engine`]**: The [`ClusterEngine`](engine::ClusterEngine) and
//! [`EngineFactory`](engine::EngineFactory) traits that platform backends
//! implement.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! flush instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-child
//!   change events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod child;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod geo;
pub mod id;
pub mod owner;
pub mod portal;
pub mod props;
pub mod queue;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod trace;

pub use descriptor::{ChildKind, Descriptor, KindTag};
pub use id::ChildId;
pub use owner::Clusterer;
pub use registry::Registry;
