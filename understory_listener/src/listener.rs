// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical bindings: one subscription to one event type on one node.
//!
//! ## Usage
//!
//! 1) Describe the binding with a [`ListenerBuilder`]: node, event type, and any of
//!    handler, key-code filter, capture flag, queuing, and unbind callbacks.
//! 2) Finish with [`bind`](ListenerBuilder::bind) (plain),
//!    [`bind_once`](ListenerBuilder::bind_once) (fires once), or
//!    [`bind_pointer`](ListenerBuilder::bind_pointer) (pointer capture). The
//!    binding is live as soon as it is returned.
//! 3) Call [`Listener::unbind`] when the owner no longer needs it. Dropping a
//!    [`Listener`] handle does not unbind it.
//!
//! ## Queued bindings
//!
//! Queued bindings that share a node, event type, and key code share one native
//! registration. Each dispatch reaches only the most recently bound member of
//! that queue; older members stay dormant until the newer ones unbind.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_listener::{EventHub, ListenerBuilder, Phase, UiEvent};
//!
//! struct Key(u32);
//! impl UiEvent<u32> for Key {
//!     fn target(&self) -> Option<u32> { None }
//!     fn key_code(&self) -> Option<u32> { Some(self.0) }
//! }
//!
//! let hub: EventHub<u32, Key> = EventHub::new(Rc::new(()));
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let outer = {
//!     let log = log.clone();
//!     ListenerBuilder::new(0, "keydown")
//!         .queued()
//!         .key_code(27)
//!         .handler(move |_| log.borrow_mut().push("outer"))
//!         .bind(&hub)
//! };
//! let inner = {
//!     let log = log.clone();
//!     ListenerBuilder::new(0, "keydown")
//!         .queued()
//!         .key_code(27)
//!         .handler(move |_| log.borrow_mut().push("inner"))
//!         .bind(&hub)
//! };
//! assert_eq!(hub.native_count(0, "keydown"), 1);
//!
//! hub.dispatch(0, "keydown", Phase::Target, &Key(27));
//! inner.unbind();
//! hub.dispatch(0, "keydown", Phase::Target, &Key(27));
//! assert_eq!(*log.borrow(), ["inner", "outer"]);
//!
//! outer.unbind();
//! assert_eq!(hub.native_count(0, "keydown"), 0);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use crate::hub::EventHub;
use crate::once::{Completion, OneShotListener};
use crate::pointer::PointerListener;

/// Identifier of a logical binding within one [`EventHub`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    /// Returns the raw numeric id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

pub(crate) type Handler<E> = Box<dyn Fn(&E)>;
pub(crate) type Callback = Box<dyn Fn()>;

/// Binding flavour; decides the extra work done on bind, unbind, and fire.
pub(crate) enum Kind {
    Plain,
    Once(Completion),
    Pointer,
}

/// State shared between a [`Listener`] handle and the hub while bound.
pub(crate) struct Shared<K, E> {
    pub(crate) id: ListenerId,
    pub(crate) node: K,
    pub(crate) event_type: &'static str,
    pub(crate) key_code: Option<u32>,
    pub(crate) capture: bool,
    pub(crate) queued: bool,
    pub(crate) handler: Option<Handler<E>>,
    pub(crate) on_unbind: Option<Callback>,
    pub(crate) finally: Option<Callback>,
    pub(crate) kind: Kind,
    pub(crate) bound: Cell<bool>,
    /// Set once a one-shot starts firing.
    pub(crate) spent: Cell<bool>,
}

impl<K: fmt::Debug, E> fmt::Debug for Shared<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("event_type", &self.event_type)
            .field("key_code", &self.key_code)
            .field("capture", &self.capture)
            .field("queued", &self.queued)
            .field("bound", &self.bound.get())
            .finish_non_exhaustive()
    }
}

/// A logical subscription to one event type (or a space-separated group of
/// types bound as one unit) on one node.
///
/// Handles are cheap to clone; clones refer to the same binding. `bind` and
/// `unbind` are idempotent.
pub struct Listener<K, E> {
    pub(crate) shared: Rc<Shared<K, E>>,
    pub(crate) hub: EventHub<K, E>,
}

impl<K, E> Clone for Listener<K, E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            hub: self.hub.clone(),
        }
    }
}

impl<K: fmt::Debug, E> fmt::Debug for Listener<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

impl<K, E> Listener<K, E>
where
    K: Copy + Eq + core::hash::Hash + 'static,
    E: 'static,
{
    /// The binding's identifier.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.shared.id
    }

    /// The node this binding listens on.
    #[must_use]
    pub fn node(&self) -> K {
        self.shared.node
    }

    /// The event type string, possibly several space-separated kinds.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.shared.event_type
    }

    /// The key-code filter, if any.
    #[must_use]
    pub fn key_code(&self) -> Option<u32> {
        self.shared.key_code
    }

    /// Whether this binding is queued.
    #[must_use]
    pub fn is_queued(&self) -> bool {
        self.shared.queued
    }

    /// Whether this binding currently holds its registration.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.shared.bound.get()
    }

    /// Register interest again after an [`unbind`](Self::unbind).
    ///
    /// A queued binding re-enters its queue at the tail. No-op if already bound.
    pub fn bind(&self) {
        self.hub.bind_shared(&self.shared);
    }

    /// Drop the registration and run `on_unbind` then `finally`.
    ///
    /// No-op if already unbound.
    pub fn unbind(&self) {
        self.hub.unbind_shared(&self.shared);
    }

    /// Returns `true` if both handles refer to the same binding.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

/// Builder describing one binding.
pub struct ListenerBuilder<K, E> {
    node: K,
    event_type: &'static str,
    key_code: Option<u32>,
    capture: bool,
    queued: bool,
    handler: Option<Handler<E>>,
    on_unbind: Option<Callback>,
    finally: Option<Callback>,
}

impl<K: fmt::Debug, E> fmt::Debug for ListenerBuilder<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerBuilder")
            .field("node", &self.node)
            .field("event_type", &self.event_type)
            .field("key_code", &self.key_code)
            .field("capture", &self.capture)
            .field("queued", &self.queued)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<K, E> ListenerBuilder<K, E>
where
    K: Copy + Eq + core::hash::Hash + 'static,
    E: 'static,
{
    /// Start describing a binding for `event_type` on `node`.
    ///
    /// `event_type` may hold several space-separated kinds, e.g. `"click touchstart"`.
    #[must_use]
    pub fn new(node: K, event_type: &'static str) -> Self {
        Self {
            node,
            event_type,
            key_code: None,
            capture: false,
            queued: false,
            handler: None,
            on_unbind: None,
            finally: None,
        }
    }

    /// Only react to events whose key code equals `code`.
    #[must_use]
    pub fn key_code(mut self, code: u32) -> Self {
        self.key_code = Some(code);
        self
    }

    /// Register for the capture phase.
    #[must_use]
    pub fn capture(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Share one native registration with other queued bindings of the same
    /// node, event type, and key code; only the newest one receives events.
    #[must_use]
    pub fn queued(mut self) -> Self {
        self.queued = true;
        self
    }

    /// The function run for each qualifying event.
    #[must_use]
    pub fn handler(mut self, handler: impl Fn(&E) + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Callback run each time the binding is unbound, before `finally`.
    #[must_use]
    pub fn on_unbind(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_unbind = Some(Box::new(callback));
        self
    }

    /// Callback run each time the binding is unbound, after `on_unbind`.
    #[must_use]
    pub fn finally(mut self, callback: impl Fn() + 'static) -> Self {
        self.finally = Some(Box::new(callback));
        self
    }

    fn into_shared(self, hub: &EventHub<K, E>, kind: Kind) -> Rc<Shared<K, E>> {
        Rc::new(Shared {
            id: hub.next_listener_id(),
            node: self.node,
            event_type: self.event_type,
            key_code: self.key_code,
            capture: self.capture,
            queued: self.queued,
            handler: self.handler,
            on_unbind: self.on_unbind,
            finally: self.finally,
            kind,
            bound: Cell::new(false),
            spent: Cell::new(false),
        })
    }

    /// Create the binding on `hub` and bind it.
    pub fn bind(self, hub: &EventHub<K, E>) -> Listener<K, E> {
        let listener = Listener {
            shared: self.into_shared(hub, Kind::Plain),
            hub: hub.clone(),
        };
        listener.bind();
        listener
    }

    /// Create a binding that unbinds itself after its first qualifying event.
    pub fn bind_once(self, hub: &EventHub<K, E>) -> OneShotListener<K, E> {
        let done = Completion::new();
        let listener = Listener {
            shared: self.into_shared(hub, Kind::Once(done.clone())),
            hub: hub.clone(),
        };
        listener.bind();
        OneShotListener::new(listener, done)
    }

    /// Create a binding that suppresses touch gestures on its node while bound.
    pub fn bind_pointer(self, hub: &EventHub<K, E>) -> PointerListener<K, E> {
        let listener = Listener {
            shared: self.into_shared(hub, Kind::Pointer),
            hub: hub.clone(),
        };
        listener.bind();
        PointerListener::new(listener)
    }
}
