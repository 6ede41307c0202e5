// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host seam: native registration notices and node attributes.

use alloc::string::String;

/// What the listener layer needs from the host toolkit.
///
/// The [`EventHub`](crate::EventHub) owns the registration table itself; the
/// host is only told when a native registration appears or disappears so it
/// can attach or detach a physical listener lazily. Attribute access is used
/// by [`PointerListener`](crate::PointerListener) to toggle gesture suppression.
pub trait ListenerHost<K> {
    /// A native registration for `kind` on `node` was created.
    fn native_added(&self, node: K, kind: &str, capture: bool) {
        let _ = (node, kind, capture);
    }

    /// A native registration for `kind` on `node` was removed.
    fn native_removed(&self, node: K, kind: &str, capture: bool) {
        let _ = (node, kind, capture);
    }

    /// Read an attribute of `node`.
    fn attribute(&self, node: K, name: &str) -> Option<String>;

    /// Set an attribute of `node`.
    fn set_attribute(&self, node: K, name: &str, value: &str);

    /// Remove an attribute of `node`.
    fn remove_attribute(&self, node: K, name: &str);
}

/// A host with no physical listeners and no attributes.
///
/// Useful when the hub is the whole event system, e.g. in tests or when
/// events are synthesized entirely in Rust.
impl<K> ListenerHost<K> for () {
    fn attribute(&self, _node: K, _name: &str) -> Option<String> {
        None
    }

    fn set_attribute(&self, _node: K, _name: &str, _value: &str) {}

    fn remove_attribute(&self, _node: K, _name: &str) {}
}
