// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panel configuration.

use alloc::vec::Vec;

bitflags::bitflags! {
    /// Optional behaviors of a [`Panel`](crate::Panel).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PanelFeatures: u8 {
        /// Move the node to the document root while open.
        const DETACH                 = 0b0000_0001;
        /// Measure viewport overflow on open and mark it with attributes.
        const ATTRIBUTE_OVERFLOW     = 0b0000_0010;
        /// Shift the node so overflowing edges land on the viewport boundary.
        const FIT                    = 0b0000_0100;
        /// Close the most recently opened panel on Escape.
        const CLOSE_ON_ESCAPE        = 0b0000_1000;
        /// Close when the user clicks outside the panel.
        const CLOSE_ON_OUTSIDE_CLICK = 0b0001_0000;
        /// Wait one tick for layout to settle before measuring.
        const WAIT_FOR_LAYOUT        = 0b0010_0000;
        /// Swallow the context menu raised by the event that opened the panel.
        const SUPPRESS_CONTEXT_MENU  = 0b0100_0000;
    }
}

impl Default for PanelFeatures {
    fn default() -> Self {
        Self::CLOSE_ON_ESCAPE | Self::CLOSE_ON_OUTSIDE_CLICK | Self::SUPPRESS_CONTEXT_MENU
    }
}

/// Configuration for one [`Panel`](crate::Panel).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelOptions {
    /// Enabled behaviors.
    pub features: PanelFeatures,
    /// Stacking index applied while detached.
    pub z_index: i32,
    /// Event kind that counts as a click for outside-click dismissal.
    pub outside_event: &'static str,
    /// Symbolic key name that dismisses the panel, resolved by the environment.
    pub escape_key: &'static str,
    /// Computed style properties pinned inline while detached, so the node keeps
    /// values it inherited from its original ancestors.
    pub preserved_properties: Vec<&'static str>,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            features: PanelFeatures::default(),
            z_index: 1000,
            outside_event: "pointerup",
            escape_key: "escape",
            preserved_properties: Vec::new(),
        }
    }
}

impl PanelOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feature set.
    #[must_use]
    pub fn with_features(mut self, features: PanelFeatures) -> Self {
        self.features = features;
        self
    }

    /// Turn on `features` in addition to the current ones.
    #[must_use]
    pub fn enable(mut self, features: PanelFeatures) -> Self {
        self.features |= features;
        self
    }

    /// Turn off `features`.
    #[must_use]
    pub fn disable(mut self, features: PanelFeatures) -> Self {
        self.features -= features;
        self
    }

    /// Stacking index while detached.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Event kind used for outside-click dismissal.
    #[must_use]
    pub fn with_outside_event(mut self, kind: &'static str) -> Self {
        self.outside_event = kind;
        self
    }

    /// Pin `property` inline while detached.
    #[must_use]
    pub fn preserve(mut self, property: &'static str) -> Self {
        self.preserved_properties.push(property);
        self
    }

    /// Whether `feature` is enabled.
    #[must_use]
    #[inline]
    pub fn has(&self, feature: PanelFeatures) -> bool {
        self.features.contains(feature)
    }
}
