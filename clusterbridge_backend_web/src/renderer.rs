// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM portal rendering.
//!
//! Applies the portal list handed over after a flush to engine-owned
//! containers. Diffing is keyed by [`ChildId`], so records that merely moved
//! within the list are left alone.

use alloc::string::String;
use alloc::vec::Vec;

use clusterbridge_core::ChildId;
use clusterbridge_core::portal::{Portal, PortalRenderer};
use hashbrown::HashMap;
use web_sys::{HtmlElement, Node};

/// What to put inside an overlay container.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayContent {
    /// Markup assigned through `innerHTML`.
    Html(String),
    /// Plain text.
    Text(String),
    /// An existing DOM node, moved into the container.
    Node(Node),
}

impl OverlayContent {
    fn mount(&self, container: &HtmlElement) {
        match self {
            Self::Html(html) => container.set_inner_html(html),
            Self::Text(text) => container.set_text_content(Some(text.as_str())),
            Self::Node(node) => {
                container.set_text_content(None);
                let _ = container.append_child(node);
            }
        }
    }
}

/// Ids to unmount and portal indices to (re)mount.
#[derive(Debug, Default, PartialEq, Eq)]
struct MountPlan {
    unmount: Vec<ChildId>,
    mount: Vec<usize>,
}

/// Compares what is mounted against `portals`.
fn plan<K: PartialEq, C: PartialEq>(
    mounted: &HashMap<ChildId, (K, C)>,
    portals: &[Portal<K, C>],
) -> MountPlan {
    let mut unmount: Vec<ChildId> = mounted
        .keys()
        .filter(|id| !portals.iter().any(|p| p.id == **id))
        .copied()
        .collect();
    unmount.sort_unstable();

    let mount = portals
        .iter()
        .enumerate()
        .filter(|(_, p)| !is_current(mounted, p))
        .map(|(i, _)| i)
        .collect();

    MountPlan { unmount, mount }
}

/// Returns whether `portal` is mounted with its current container and content.
fn is_current<K: PartialEq, C: PartialEq>(
    mounted: &HashMap<ChildId, (K, C)>,
    portal: &Portal<K, C>,
) -> bool {
    let Some((container, content)) = mounted.get(&portal.id) else {
        return false;
    };
    *container == portal.container && *content == portal.content
}

/// Mounts [`OverlayContent`] into overlay containers.
#[derive(Debug, Default)]
pub struct DomPortalRenderer {
    mounted: HashMap<ChildId, (HtmlElement, OverlayContent)>,
}

impl DomPortalRenderer {
    /// Creates a renderer with nothing mounted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the container mounted for `id`.
    #[must_use]
    pub fn container(&self, id: ChildId) -> Option<&HtmlElement> {
        self.mounted.get(&id).map(|(el, _)| el)
    }

    /// Returns the number of mounted portals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    /// Returns `true` if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }
}

impl PortalRenderer<HtmlElement, OverlayContent> for DomPortalRenderer {
    fn render(&mut self, portals: &[Portal<HtmlElement, OverlayContent>]) {
        let MountPlan { unmount, mount } = plan(&self.mounted, portals);

        for id in unmount {
            if let Some((el, _)) = self.mounted.remove(&id) {
                el.set_text_content(None);
            }
        }

        for idx in mount {
            let portal = &portals[idx];
            if let Some((old, _)) = self.mounted.get(&portal.id)
                && *old != portal.container
            {
                old.set_text_content(None);
            }
            portal.content.mount(&portal.container);
            self.mounted.insert(
                portal.id,
                (portal.container.clone(), portal.content.clone()),
            );
        }
    }
}
