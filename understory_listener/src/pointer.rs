// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer listeners with reference-counted gesture suppression.
//!
//! Pointer-drag interactions need native touch gestures (scroll, zoom) off for
//! as long as any pointer binding on the node is live. The hub counts bound
//! pointer listeners per node:
//!
//! - 0 → 1: the node's current `touch-action` attribute is recorded and replaced with `none`.
//! - 1 → 0: the recorded value is put back, or the attribute removed if there was none.
//!
//! Intermediate binds and unbinds leave the attribute alone, so one listener's
//! teardown never re-enables gestures that a sibling still needs suppressed.

use core::fmt;
use core::ops::Deref;

use crate::listener::Listener;

/// Attribute toggled while pointer listeners are bound.
pub const TOUCH_ACTION: &str = "touch-action";

/// A listener that keeps touch gestures suppressed on its node while bound.
///
/// Dereferences to [`Listener`].
pub struct PointerListener<K, E> {
    listener: Listener<K, E>,
}

impl<K, E> Clone for PointerListener<K, E> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
        }
    }
}

impl<K: fmt::Debug, E> fmt::Debug for PointerListener<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerListener")
            .field("listener", &self.listener)
            .finish()
    }
}

impl<K, E> PointerListener<K, E> {
    pub(crate) fn new(listener: Listener<K, E>) -> Self {
        Self { listener }
    }

    /// Convert into the underlying listener handle.
    #[must_use]
    pub fn into_listener(self) -> Listener<K, E> {
        self.listener
    }
}

impl<K, E> Deref for PointerListener<K, E> {
    type Target = Listener<K, E>;

    fn deref(&self) -> &Self::Target {
        &self.listener
    }
}
