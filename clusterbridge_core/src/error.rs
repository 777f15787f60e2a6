// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced by the clusterer.
//!
//! Only engine failures are reported. Stale ids and "engine not ready" are
//! expected transient states and are absorbed where they occur.

use core::fmt;

use crate::id::ChildId;

/// An engine failure, tagged with where it happened.
///
/// `E` is the engine's [`Error`](crate::engine::ClusterEngine::Error) type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncError<E> {
    /// The engine could not be constructed.
    Construct(E),
    /// A container for overlay child `id` could not be allocated.
    Container {
        /// The child whose creation was abandoned.
        id: ChildId,
        /// The engine's error.
        source: E,
    },
    /// The native object for child `id` could not be created.
    Create {
        /// The child whose creation was abandoned.
        id: ChildId,
        /// The engine's error.
        source: E,
    },
}

impl<E> SyncError<E> {
    /// Returns the child the error belongs to, if any.
    #[must_use]
    pub fn child(&self) -> Option<ChildId> {
        match self {
            Self::Construct(_) => None,
            Self::Container { id, .. } | Self::Create { id, .. } => Some(*id),
        }
    }

    /// Returns the engine's error.
    #[must_use]
    pub fn engine_error(&self) -> &E {
        match self {
            Self::Construct(source)
            | Self::Container { source, .. }
            | Self::Create { source, .. } => source,
        }
    }
}

impl<E: fmt::Display> fmt::Display for SyncError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Construct(source) => write!(f, "clustering engine construction failed: {source}"),
            Self::Container { id, source } => {
                write!(f, "container allocation for child {id} failed: {source}")
            }
            Self::Create { id, source } => write!(f, "creating child {id} failed: {source}"),
        }
    }
}

impl<E: core::error::Error + 'static> core::error::Error for SyncError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(self.engine_error())
    }
}
