// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_listener --heading-base-level=0

//! Understory Listener: event subscription primitives for UI.
//!
//! This crate multiplexes many logical subscriptions onto few native
//! registrations. It does not know what a DOM, a window, or a widget is; the
//! host plugs in through [`ListenerHost`] and feeds events in through
//! [`EventHub::dispatch`].
//!
//! - [`Listener`]: one logical subscription to one event type on one node, with
//!   an optional key-code filter, capture flag, and unbind callbacks.
//! - Queued listeners: bindings sharing (node, event type, key code) share a
//!   single native registration, and only the most recently bound one receives
//!   events. This gives "newest wins" behavior, e.g. Escape closes only the
//!   topmost of several nested panels, without tracking nesting.
//! - [`OneShotListener`]: fires once, unbinds itself, and completes a
//!   [`Completion`]. [`race`] waits for the first of several.
//! - [`PointerListener`]: keeps `touch-action: none` on its node while any
//!   pointer listener there is bound.
//!
//! ## Bindings are owned by their creator
//!
//! A binding stays live until its owner calls [`Listener::unbind`] (or, for
//! one-shots, until it fires). Dropping a handle does not unbind; the hub keeps
//! the binding alive while it is bound.
//!
//! ## Re-entrancy
//!
//! Handlers may bind and unbind freely, including themselves. The hub never
//! holds its internal borrow while running handlers or callbacks.
//!
//! ## Features
//!
//! - `tracing`: emit trace events for native registrations, queues, and pointer capture.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod event;
mod host;
mod hub;
mod listener;
mod once;
mod pointer;

pub use event::{Phase, UiEvent};
pub use host::ListenerHost;
pub use hub::EventHub;
pub use listener::{Listener, ListenerBuilder, ListenerId};
pub use once::{Completion, OneShotListener, race};
pub use pointer::{PointerListener, TOUCH_ACTION};
