// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute and style names the panel writes on its node.
//!
//! Stylesheets key off these to animate open panels and to flip menus that
//! overflow the viewport.

use crate::overflow::{Axis, Edge};

/// Present (empty) while the panel is open.
pub const OPEN: &str = "open";

/// Present (empty) while a fit shift is applied.
pub const FITTED: &str = "data-fitted";

/// Preferred horizontal direction after overflow attribution.
pub const X_DIRECTION: &str = "data-x-direction";

/// Preferred vertical direction after overflow attribution.
pub const Y_DIRECTION: &str = "data-y-direction";

/// Inline style attribute, snapshotted on open and restored on close.
pub const STYLE: &str = "style";

/// Overflow amount past the left edge.
pub const OVERFLOW_LEFT: &str = "data-overflow-left";

/// Overflow amount past the right edge.
pub const OVERFLOW_RIGHT: &str = "data-overflow-right";

/// Overflow amount past the top edge.
pub const OVERFLOW_TOP: &str = "data-overflow-top";

/// Overflow amount past the bottom edge.
pub const OVERFLOW_BOTTOM: &str = "data-overflow-bottom";

/// Overflow attribute for `edge`.
#[must_use]
pub const fn overflow(edge: Edge) -> &'static str {
    match edge {
        Edge::Left => OVERFLOW_LEFT,
        Edge::Right => OVERFLOW_RIGHT,
        Edge::Top => OVERFLOW_TOP,
        Edge::Bottom => OVERFLOW_BOTTOM,
    }
}

/// Direction attribute for `axis`.
#[must_use]
pub const fn direction(axis: Axis) -> &'static str {
    match axis {
        Axis::X => X_DIRECTION,
        Axis::Y => Y_DIRECTION,
    }
}

/// Every marker overflow attribution may write, snapshotted as a group.
pub(crate) const MARKERS: [&str; 6] = [
    OVERFLOW_LEFT,
    OVERFLOW_RIGHT,
    OVERFLOW_TOP,
    OVERFLOW_BOTTOM,
    X_DIRECTION,
    Y_DIRECTION,
];
