// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits: the visual tree and the environment.
//!
//! A [`Panel`](crate::Panel) never touches a toolkit directly. It asks a
//! [`VisualTree`] to read and move nodes and an [`Environment`] for scroll,
//! viewport, and input facts. Both take `&self`; hosts that need mutation use
//! interior mutability, as DOM bindings do.

use alloc::string::String;

use kurbo::{Insets, Rect, Size, Vec2};
use understory_listener::ListenerHost;

/// Node-level operations on the host's visual tree.
///
/// Attribute access comes from the [`ListenerHost`] supertrait, which is also
/// how the panel's event hub reports native registrations.
pub trait VisualTree<K: Copy + Eq>: ListenerHost<K> {
    /// The node detached panels are appended to (typically `body`).
    fn root(&self) -> K;

    /// The top element of the document; document-wide listeners go here.
    fn document_element(&self) -> K;

    /// The window-like node that receives resize and scroll events.
    fn window(&self) -> K;

    /// Parent of `node`, or `None` for roots and nodes outside the tree.
    fn parent(&self, node: K) -> Option<K>;

    /// Whether `node` is `ancestor` or lies below it.
    fn contains(&self, ancestor: K, node: K) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Whether `node` is part of the live document.
    fn is_attached(&self, node: K) -> bool {
        self.contains(self.document_element(), node)
    }

    /// A copy of `node` that is not inserted anywhere.
    fn clone_node(&self, node: K) -> K;

    /// Move `node` so it directly follows `reference` under `reference`'s parent.
    fn insert_after(&self, node: K, reference: K);

    /// Move `node` to the end of [`root`](Self::root).
    fn append_to_root(&self, node: K);

    /// Take `node` out of the tree.
    fn remove(&self, node: K);

    /// Border box of `node` in viewport coordinates.
    fn bounding_rect(&self, node: K) -> Rect;

    /// Resolved margins of `node` (`x0` left, `y0` top, `x1` right, `y1` bottom).
    fn margins(&self, node: K) -> Insets;

    /// Inline style property of `node`.
    fn style_property(&self, node: K, name: &str) -> Option<String>;

    /// Set an inline style property of `node`.
    fn set_style_property(&self, node: K, name: &str, value: &str);

    /// Computed (cascaded) value of a style property.
    ///
    /// Defaults to the inline value.
    fn computed_style(&self, node: K, name: &str) -> Option<String> {
        self.style_property(node, name)
    }
}

/// Facts about the viewport and input devices.
pub trait Environment<K> {
    /// Current document scroll offset.
    fn current_scroll(&self) -> Vec2;

    /// Size of the visible viewport.
    fn viewport_size(&self) -> Size;

    /// Signed distance from each edge of `node` to the matching viewport edge.
    ///
    /// Negative values mean the node extends past that edge. When `size` is
    /// given the node is measured as if it had that size (used while detached).
    /// The result uses `x0` left, `y0` top, `x1` right, `y1` bottom.
    fn offset_from_visible(&self, node: K, size: Option<Size>) -> Insets;

    /// Numeric key code for a symbolic key name such as `"escape"`.
    fn key_code(&self, name: &str) -> Option<u32>;

    /// Whether a pointer button is held down right now.
    fn is_pointer_pressed(&self) -> bool;
}
