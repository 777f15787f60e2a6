// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clusterer construction options.
//!
//! The wrapped engine takes its options once, at construction, and has no
//! call to change them afterwards. [`Clusterer::set_config`] therefore
//! treats any change as a teardown followed by a fresh construction.
//!
//! [`Clusterer::set_config`]: crate::Clusterer::set_config

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::Size;

use crate::engine::ClusterEventKind;

/// Appearance of one cluster icon tier, as CSS applied to the icon element.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterStyle {
    /// Icon size in pixels.
    pub size: Size,
    /// CSS `background` of the icon.
    pub background: String,
    /// CSS color of the count label.
    pub color: String,
    /// CSS `text-align` of the count label.
    pub text_align: String,
    /// CSS `line-height` of the count label.
    pub line_height: String,
    /// CSS `border-radius` of the icon.
    pub border_radius: Option<String>,
}

impl ClusterStyle {
    /// Creates a style with a centered black label vertically centered in
    /// the icon.
    #[must_use]
    pub fn new(size: Size, background: impl Into<String>) -> Self {
        Self {
            size,
            background: background.into(),
            color: String::from("black"),
            text_align: String::from("center"),
            line_height: alloc::format!("{}px", size.height),
            border_radius: None,
        }
    }

    /// Sets the label color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Rounds the icon corners.
    #[must_use]
    pub fn with_border_radius(mut self, radius: impl Into<String>) -> Self {
        self.border_radius = Some(radius.into());
        self
    }
}

/// Every option the engine accepts at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ClustererConfig {
    /// Grid cell size in pixels.
    pub grid_size: u32,
    /// Whether a cluster is positioned at the mean of its markers.
    pub average_center: bool,
    /// Map level from which clustering applies; closer levels show every
    /// marker individually.
    pub min_level: u32,
    /// Fewest markers that form a cluster.
    pub min_cluster_size: u32,
    /// Icon tiers, chosen by the engine through `calculator`; empty uses the
    /// engine's built-in icons.
    pub styles: Vec<ClusterStyle>,
    /// Label per tier; empty shows the marker count.
    pub texts: Vec<String>,
    /// Marker count thresholds separating the tiers.
    pub calculator: Vec<u32>,
    /// Whether clicking a cluster leaves the map level unchanged.
    pub disable_click_zoom: bool,
    /// Whether clusters report click, double-click, and right-click events.
    pub clickable: bool,
    /// Whether clusters report pointer over and out events.
    pub hoverable: bool,
}

impl Default for ClustererConfig {
    fn default() -> Self {
        Self {
            grid_size: 60,
            average_center: false,
            min_level: 0,
            min_cluster_size: 2,
            styles: Vec::new(),
            texts: Vec::new(),
            calculator: vec![10, 100, 1000, 10000],
            disable_click_zoom: false,
            clickable: false,
            hoverable: true,
        }
    }
}

impl ClustererConfig {
    /// Sets the grid cell size.
    #[must_use]
    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Sets whether clusters use the mean position of their markers.
    #[must_use]
    pub fn with_average_center(mut self, average_center: bool) -> Self {
        self.average_center = average_center;
        self
    }

    /// Sets the level from which clustering applies.
    #[must_use]
    pub fn with_min_level(mut self, min_level: u32) -> Self {
        self.min_level = min_level;
        self
    }

    /// Sets the minimum cluster size.
    #[must_use]
    pub fn with_min_cluster_size(mut self, min_cluster_size: u32) -> Self {
        self.min_cluster_size = min_cluster_size;
        self
    }

    /// Sets the icon tiers.
    #[must_use]
    pub fn with_styles(mut self, styles: Vec<ClusterStyle>) -> Self {
        self.styles = styles;
        self
    }

    /// Sets the per-tier labels.
    #[must_use]
    pub fn with_texts(mut self, texts: Vec<String>) -> Self {
        self.texts = texts;
        self
    }

    /// Sets the tier thresholds.
    #[must_use]
    pub fn with_calculator(mut self, calculator: Vec<u32>) -> Self {
        self.calculator = calculator;
        self
    }

    /// Sets whether clicking a cluster zooms in.
    #[must_use]
    pub fn with_disable_click_zoom(mut self, disable_click_zoom: bool) -> Self {
        self.disable_click_zoom = disable_click_zoom;
        self
    }

    /// Sets whether clusters report click events.
    #[must_use]
    pub fn with_clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    /// Sets whether clusters report hover events.
    #[must_use]
    pub fn with_hoverable(mut self, hoverable: bool) -> Self {
        self.hoverable = hoverable;
        self
    }

    /// Returns whether an engine built from this configuration reports
    /// events of `kind`.
    #[must_use]
    pub fn emits(&self, kind: ClusterEventKind) -> bool {
        match kind {
            ClusterEventKind::Click
            | ClusterEventKind::DoubleClick
            | ClusterEventKind::RightClick => self.clickable,
            ClusterEventKind::Over | ClusterEventKind::Out => self.hoverable,
            ClusterEventKind::Clustered => true,
        }
    }
}
