// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay containers.

use alloc::string::String;

use clusterbridge_core::props::MapPane;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, HtmlElement};

/// Creates detached `<div>` containers for overlay content.
///
/// A [`ClusterEngine`](clusterbridge_core::engine::ClusterEngine) backed by a
/// JavaScript map calls [`allocate`](Self::allocate) from its
/// `allocate_container` and attaches the element to the pane the overlay
/// lives in.
pub struct DomContainers {
    document: Document,
    class_name: String,
}

impl core::fmt::Debug for DomContainers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomContainers")
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}

impl DomContainers {
    /// Creates an allocator for `document`. Containers get `class_name`.
    #[must_use]
    pub fn new(document: Document, class_name: impl Into<String>) -> Self {
        Self {
            document,
            class_name: class_name.into(),
        }
    }

    /// Creates an absolutely positioned, detached container.
    pub fn allocate(&self) -> Result<HtmlElement, JsValue> {
        let el: HtmlElement = self.document.create_element("div")?.unchecked_into();
        el.set_class_name(&self.class_name);
        let s = el.style();
        s.set_property("position", "absolute")?;
        s.set_property("left", "0")?;
        s.set_property("top", "0")?;
        Ok(el)
    }

    /// Tags `el` with the pane it belongs to, for styling and hit testing.
    pub fn assign_pane(el: &HtmlElement, pane: MapPane) -> Result<(), JsValue> {
        el.set_attribute("data-pane", pane.as_str())
    }

    /// Detaches `el` from the DOM and drops its content.
    pub fn release(el: &HtmlElement) {
        el.set_text_content(None);
        el.remove();
    }
}
