// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event payload trait and propagation phases.

/// Propagation phase of a single dispatch step.
///
/// Steps are expected in capture → target → bubble order, the same grouping a
/// responder chain emits for a root→target path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Travelling from the root towards the target.
    Capture,
    /// At the target node itself.
    Target,
    /// Travelling from the target back towards the root.
    Bubble,
}

impl Phase {
    /// Returns `true` if a registration with the given `capture` flag runs in this phase.
    ///
    /// Capture registrations run during capture and at the target; bubble
    /// registrations run at the target and during bubble.
    #[inline]
    #[must_use]
    pub const fn admits(self, capture: bool) -> bool {
        match self {
            Self::Capture => capture,
            Self::Target => true,
            Self::Bubble => !capture,
        }
    }
}

/// The view of a host event that listeners need.
///
/// Hosts wrap their native event type (a DOM event, a winit event, a test
/// double) and expose the few facts the listener layer and the panel
/// controller read. Everything except [`target`](Self::target) has a default.
pub trait UiEvent<K> {
    /// The node the event was originally dispatched to, if any.
    fn target(&self) -> Option<K>;

    /// Numeric key code for keyboard events.
    fn key_code(&self) -> Option<u32> {
        None
    }

    /// Ask the host to skip its default action for this event.
    fn prevent_default(&self) {}

    /// Whether a handler asked to stop propagation to further nodes.
    fn is_propagation_stopped(&self) -> bool {
        false
    }
}
