// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for clusterbridge.
//!
//! This crate provides the DOM side of overlay children:
//!
//! - [`DomContainers`]: allocates and releases the `<div>` containers a
//!   clustering engine binds overlays to
//! - [`DomPortalRenderer`]: mounts [`OverlayContent`] into those containers,
//!   keyed by child id

#![no_std]

extern crate alloc;

mod container;
mod renderer;

pub use clusterbridge_core::portal::PortalRenderer;
pub use container::DomContainers;
pub use renderer::{DomPortalRenderer, OverlayContent};
