// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_panel --heading-base-level=0

//! Understory Panel: the lifecycle of floating panels such as menus, popovers,
//! and tooltips.
//!
//! A [`Panel`] owns one node of the host's visual tree and moves it between
//! [`PanelState::Closed`] and [`PanelState::Open`]. Around that transition it can:
//!
//! - **detach** the node to the document root, pinned absolutely where it was,
//!   leaving an invisible avatar in its place so layout does not shift;
//! - **measure overflow** past the viewport and mark it with attributes
//!   (`data-overflow-*`, `data-x-direction`, `data-y-direction`) so styles can
//!   flip the panel to the side with more room;
//! - **fit** the node back on screen by exactly the overflow amount;
//! - **dismiss** itself on Escape or on a click outside.
//!
//! Dismissal is built on [`understory_listener`]. Escape bindings are queued
//! on one key, so only the most recently opened panel closes. Outside clicks
//! understand nesting: a click inside a submenu (even one detached to the
//! root) is not outside its parent menu.
//!
//! ## Collaborators
//!
//! The crate does not talk to any toolkit. A host implements [`VisualTree`]
//! (node structure, attributes, styles, geometry) and [`Environment`] (scroll,
//! viewport, key codes, pointer state), creates a [`PanelContext`], feeds
//! events into the context's [`EventHub`](understory_listener::EventHub), and
//! drains its [`TickQueue`] once per turn of its event loop.
//!
//! ## Workflow
//!
//! 1) Build a [`PanelContext`] over the host.
//! 2) Build panels with [`PanelBuilder`], choosing [`PanelFeatures`] in
//!    [`PanelOptions`] and optional `on_open`/`on_close` hooks.
//! 3) Call [`Panel::open`] from the triggering event handler, passing
//!    [`OpenParams`] (an avatar to reuse, a callback for when this session ends).
//! 4) Dispatch input into the hub and run [`TickQueue::run_pending`]; the panel
//!    closes itself on dismissal, or call [`Panel::close`] directly.
//!
//! ## Features
//!
//! - `std` (enabled by default): This is currently only used to enable `std` in Kurbo.
//! - `libm`: Use floating point implementations from `libm` in Kurbo.
//! - `tracing`: emit `tracing` events for lifecycle transitions, detachment, and fitting.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod attributes;
mod context;
mod detach;
mod host;
mod options;
mod overflow;
mod panel;
mod tick;

pub use context::PanelContext;
pub use detach::DetachError;
pub use host::{Environment, VisualTree};
pub use options::{PanelFeatures, PanelOptions};
pub use overflow::{Axis, Edge, Overflow, offsets_in_viewport};
pub use panel::{Namespace, OpenParams, Panel, PanelBuilder, PanelState};
pub use tick::TickQueue;
