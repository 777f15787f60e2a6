// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording test doubles for clusterbridge.
//!
//! [`RecordingFactory`] builds [`RecordingEngine`]s that log every call into
//! a shared [`EngineProbe`] instead of drawing anything. Tests drive a
//! [`Clusterer`](clusterbridge_core::Clusterer) as usual, then assert on the
//! call log, the markers currently attached, and the event subscriptions.
//! Failures are scripted through [`Failures`].
//!
//! [`RecordingPortals`] is the matching portal renderer. It keeps the mounted
//! content per child and logs every mount, remount, and unmount.

#![no_std]

extern crate alloc;

mod engine;
mod portals;

pub use engine::{
    Call, ClusterId, ContainerHandle, EngineProbe, Failures, HarnessError, MapView, MarkerHandle,
    RecordingEngine, RecordingFactory, SubscriptionId,
};
pub use portals::{PortalOp, RecordingPortals};
