// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport overflow arithmetic.
//!
//! Edge offsets are signed distances from a node's edge to the matching edge of
//! the visible viewport, packed in a [`kurbo::Insets`] (`x0` left, `y0` top,
//! `x1` right, `y1` bottom). Negative means the node extends past that edge.
//!
//! [`Overflow::measure`] records every overflowing edge and, per axis, which way
//! the panel should open instead: when an edge overflows by more than the
//! opposite edge's offset, the axis direction flips to the opposite edge, the
//! side with more room. Axes are independent.
//!
//! [`Overflow::fit_shift`] is the translation that puts each worse-overflowing
//! edge flush with the viewport.
//!
//! ```
//! use kurbo::Insets;
//! use understory_panel::{Edge, Overflow};
//!
//! let overflow = Overflow::measure(Insets::new(-10.0, 5.0, 50.0, 5.0));
//! assert_eq!(overflow.left, Some(-10.0));
//! assert_eq!(overflow.x_direction, Some(Edge::Right));
//! assert_eq!(overflow.y_direction, None);
//! assert_eq!(overflow.fit_shift().x, 10.0);
//! ```

use kurbo::{Insets, Rect, Size, Vec2};

/// Axis of the viewport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal (left/right).
    X,
    /// Vertical (top/bottom).
    Y,
}

/// One side of a box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
}

impl Edge {
    /// All edges, in left, right, top, bottom order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];

    /// The edge across the box on the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// The axis this edge lies across.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::X,
            Self::Top | Self::Bottom => Axis::Y,
        }
    }

    /// Lowercase name, as used in attribute names and values.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// This edge's component of `insets`.
    #[must_use]
    pub fn of(self, insets: Insets) -> f64 {
        match self {
            Self::Left => insets.x0,
            Self::Top => insets.y0,
            Self::Right => insets.x1,
            Self::Bottom => insets.y1,
        }
    }
}

/// Signed offsets of `rect` from the edges of a viewport of size `viewport`
/// anchored at the origin.
#[must_use]
pub fn offsets_in_viewport(rect: Rect, viewport: Size) -> Insets {
    Insets::new(
        rect.x0,
        rect.y0,
        viewport.width - rect.x1,
        viewport.height - rect.y1,
    )
}

/// Per-edge overflow of one measurement.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Overflow {
    /// Overflow past the left edge (negative), if any.
    pub left: Option<f64>,
    /// Overflow past the right edge (negative), if any.
    pub right: Option<f64>,
    /// Overflow past the top edge (negative), if any.
    pub top: Option<f64>,
    /// Overflow past the bottom edge (negative), if any.
    pub bottom: Option<f64>,
    /// Preferred horizontal direction, set when the x axis flipped.
    pub x_direction: Option<Edge>,
    /// Preferred vertical direction, set when the y axis flipped.
    pub y_direction: Option<Edge>,
}

impl Overflow {
    /// Record the overflowing edges of `offsets` and the preferred directions.
    #[must_use]
    pub fn measure(offsets: Insets) -> Self {
        let mut overflow = Self::default();
        for edge in Edge::ALL {
            let offset = edge.of(offsets);
            if offset >= 0.0 {
                continue;
            }
            *overflow.slot(edge) = Some(offset);
            if offset < edge.opposite().of(offsets) {
                match edge.axis() {
                    Axis::X => overflow.x_direction = Some(edge.opposite()),
                    Axis::Y => overflow.y_direction = Some(edge.opposite()),
                }
            }
        }
        overflow
    }

    fn slot(&mut self, edge: Edge) -> &mut Option<f64> {
        match edge {
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
            Edge::Top => &mut self.top,
            Edge::Bottom => &mut self.bottom,
        }
    }

    /// Overflow amount past `edge`, if it overflows.
    #[must_use]
    pub fn get(self, edge: Edge) -> Option<f64> {
        match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }

    /// Preferred direction on `axis`, if it flipped.
    #[must_use]
    pub fn direction(self, axis: Axis) -> Option<Edge> {
        match axis {
            Axis::X => self.x_direction,
            Axis::Y => self.y_direction,
        }
    }

    /// Whether any edge overflows.
    #[must_use]
    pub fn is_overflowing(self) -> bool {
        Edge::ALL.into_iter().any(|edge| self.get(edge).is_some())
    }

    /// Translation that makes each overflowing edge flush with the viewport.
    ///
    /// An edge is only compensated when its opposite edge does not overflow by
    /// more; when both edges of an axis overflow, the worse one wins.
    #[must_use]
    pub fn fit_shift(self) -> Vec2 {
        let mut shift = Vec2::ZERO;
        for edge in Edge::ALL {
            let Some(amount) = self.get(edge) else {
                continue;
            };
            if self.get(edge.opposite()).is_some_and(|other| other < amount) {
                continue;
            }
            match edge {
                Edge::Left => shift.x -= amount,
                Edge::Right => shift.x += amount,
                Edge::Top => shift.y -= amount,
                Edge::Bottom => shift.y += amount,
            }
        }
        shift
    }
}
