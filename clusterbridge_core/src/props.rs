// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declared properties for point markers and content overlays.
//!
//! Props are value snapshots. A child never mutates its props in place; it
//! hands a fresh value to [`Registry::update`](crate::Registry::update) and
//! the reconciler pushes the difference onto the live native object.

use alloc::string::String;

use kurbo::{Point, Size, Vec2};

use crate::geo::LatLng;

/// Icon image for a point marker.
///
/// Geometry is in CSS pixels. `origin` selects a sprite cell and `anchor` is
/// the point of the image that sits on the marker's position.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerImage {
    /// Image URL.
    pub url: String,
    /// Display size of the image (or sprite cell).
    pub size: Option<Size>,
    /// Position of the image within a sprite.
    pub origin: Option<Point>,
    /// Anchor point relative to the image's top-left corner.
    pub anchor: Option<Point>,
    /// Size of the whole image after scaling.
    pub scaled_size: Option<Size>,
}

impl MarkerImage {
    /// Creates an image with only a URL set.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            size: None,
            origin: None,
            anchor: None,
            scaled_size: None,
        }
    }

    /// Sets the display size.
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the anchor point.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Sets the sprite origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the scaled size.
    #[must_use]
    pub fn with_scaled_size(mut self, scaled_size: Size) -> Self {
        self.scaled_size = Some(scaled_size);
        self
    }
}

/// Properties of a point marker.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerProps {
    /// Marker position.
    pub position: LatLng,
    /// Rollover text.
    pub title: Option<String>,
    /// Label drawn on top of the icon.
    pub label: Option<String>,
    /// Custom icon; `None` uses the engine's default pin.
    pub icon: Option<MarkerImage>,
    /// Stacking order among markers.
    pub z_index: Option<i32>,
    /// Opacity in `0.0..=1.0`.
    pub opacity: Option<f64>,
    /// Whether the marker receives pointer events.
    pub clickable: bool,
    /// Whether the marker can be dragged.
    pub draggable: bool,
    /// Whether the marker is shown.
    pub visible: bool,
    /// Mouse cursor shown on hover.
    pub cursor: Option<String>,
}

impl MarkerProps {
    /// Creates clickable, visible, non-draggable props at `position`.
    #[must_use]
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            title: None,
            label: None,
            icon: None,
            z_index: None,
            opacity: None,
            clickable: true,
            draggable: false,
            visible: true,
            cursor: None,
        }
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: MarkerImage) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Sets the stacking order.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// Sets the rollover text.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Map panel an overlay's container is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MapPane {
    /// Markers and custom overlays.
    #[default]
    OverlayLayer,
    /// Info windows; above every other overlay.
    FloatPane,
}

impl MapPane {
    /// Returns the engine-side panel name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OverlayLayer => "overlayLayer",
            Self::FloatPane => "floatPane",
        }
    }
}

/// Properties of a content overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayProps {
    /// Anchor position of the overlay.
    pub position: LatLng,
    /// Stacking order among overlays.
    pub z_index: Option<i32>,
    /// Pane the container is attached to.
    pub pane: MapPane,
    /// Offset of the container from the projected position, in pixels.
    pub pixel_offset: Vec2,
}

impl OverlayProps {
    /// Creates props at `position` in the default pane with no offset.
    #[must_use]
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            z_index: None,
            pane: MapPane::default(),
            pixel_offset: Vec2::ZERO,
        }
    }

    /// Sets the pane.
    #[must_use]
    pub fn with_pane(mut self, pane: MapPane) -> Self {
        self.pane = pane;
        self
    }

    /// Sets the pixel offset.
    #[must_use]
    pub fn with_pixel_offset(mut self, pixel_offset: Vec2) -> Self {
        self.pixel_offset = pixel_offset;
        self
    }

    /// Sets the stacking order.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }
}
