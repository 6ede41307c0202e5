// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test doubles for the listener integration tests.

#![allow(dead_code, reason = "not every test file uses every helper")]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use understory_listener::{EventHub, ListenerHost, UiEvent};

/// Host that records native registration notices and stores attributes.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub added: RefCell<Vec<(u32, String, bool)>>,
    pub removed: RefCell<Vec<(u32, String, bool)>>,
    pub attributes: RefCell<BTreeMap<(u32, String), String>>,
}

impl RecordingHost {
    pub fn live_natives(&self) -> usize {
        self.added.borrow().len() - self.removed.borrow().len()
    }

    pub fn attr(&self, node: u32, name: &str) -> Option<String> {
        self.attributes
            .borrow()
            .get(&(node, name.to_string()))
            .cloned()
    }
}

impl ListenerHost<u32> for RecordingHost {
    fn native_added(&self, node: u32, kind: &str, capture: bool) {
        self.added.borrow_mut().push((node, kind.to_string(), capture));
    }

    fn native_removed(&self, node: u32, kind: &str, capture: bool) {
        self.removed
            .borrow_mut()
            .push((node, kind.to_string(), capture));
    }

    fn attribute(&self, node: u32, name: &str) -> Option<String> {
        self.attr(node, name)
    }

    fn set_attribute(&self, node: u32, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert((node, name.to_string()), value.to_string());
    }

    fn remove_attribute(&self, node: u32, name: &str) {
        self.attributes
            .borrow_mut()
            .remove(&(node, name.to_string()));
    }
}

/// Minimal event payload.
#[derive(Debug, Default)]
pub struct Ev {
    pub target: Option<u32>,
    pub key_code: Option<u32>,
    pub stop: Cell<bool>,
}

impl Ev {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn key(code: u32) -> Self {
        Self {
            key_code: Some(code),
            ..Self::default()
        }
    }
}

impl UiEvent<u32> for Ev {
    fn target(&self) -> Option<u32> {
        self.target
    }

    fn key_code(&self) -> Option<u32> {
        self.key_code
    }

    fn is_propagation_stopped(&self) -> bool {
        self.stop.get()
    }
}

pub fn hub() -> (Rc<RecordingHost>, EventHub<u32, Ev>) {
    let host = Rc::new(RecordingHost::default());
    let hub = EventHub::new(host.clone());
    (host, hub)
}

/// Shared log that handlers push labels into.
pub type Log = Rc<RefCell<Vec<&'static str>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn push(log: &Log, label: &'static str) -> impl Fn(&Ev) + 'static {
    let log = log.clone();
    move |_| log.borrow_mut().push(label)
}
