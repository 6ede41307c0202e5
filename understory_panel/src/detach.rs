// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detachment bookkeeping.
//!
//! A detached panel lives at the end of the document root, absolutely
//! positioned where it used to be. An invisible copy of it, the avatar, holds
//! its old place so surrounding layout does not move and so containment checks
//! can still find where the panel logically belongs.

use alloc::string::String;
use core::fmt;

use kurbo::{Point, Size};

/// Why [`Panel::dismount`](crate::Panel::dismount) refused to detach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetachError {
    /// The node is not in the live document, or has no parent to leave an
    /// avatar under.
    NotAttached,
    /// The panel is already detached.
    AlreadyDetached,
}

impl fmt::Display for DetachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttached => f.write_str("panel node is not attached to the document"),
            Self::AlreadyDetached => f.write_str("panel is already detached"),
        }
    }
}

impl core::error::Error for DetachError {}

/// Where a detached panel came from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Detachment<K> {
    /// Placeholder left at the original position.
    pub(crate) avatar: K,
    /// Parent the node had before detaching.
    pub(crate) parent: K,
    /// Document position the node was pinned to; the baseline for fitting.
    pub(crate) position: Point,
    /// Size the node had before the move.
    pub(crate) size: Size,
    /// Inline style before detaching.
    pub(crate) style: Option<String>,
}

/// Format a length for an inline style.
pub(crate) fn px(value: f64) -> String {
    alloc::format!("{value}px")
}
