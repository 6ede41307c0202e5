// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The registration table shared by every binding of one event system.
//!
//! The hub keeps, per node:
//!
//! - the native registrations, in registration order, each relaying either to
//!   one direct binding or to a queue;
//! - the queues of queued bindings, keyed by (node, event type, key code);
//! - the pointer-capture counters used for gesture suppression.
//!
//! Host glue feeds events in through [`EventHub::dispatch`] (one node, one
//! phase) or [`EventHub::dispatch_path`] (a whole root→target path).
//!
//! ## Dispatch rules
//!
//! - Registrations run in the order they were created.
//! - A queue registration runs the queue's current tail, resolved at the moment
//!   that registration runs.
//! - A binding unbound by an earlier handler of the same dispatch does not run.
//! - A registration created during a dispatch first runs on the next dispatch.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::event::{Phase, UiEvent};
use crate::host::ListenerHost;
use crate::listener::{Kind, Listener, ListenerBuilder, ListenerId, Shared};
use crate::pointer::TOUCH_ACTION;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NativeId(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct QueueKey<K> {
    node: K,
    event_type: &'static str,
    key_code: Option<u32>,
}

#[derive(Copy, Clone, Debug)]
enum Relay<K> {
    Direct(ListenerId),
    Queue(QueueKey<K>),
}

#[derive(Debug)]
struct Native<K> {
    id: NativeId,
    node: K,
    kind: &'static str,
    capture: bool,
    relay: Relay<K>,
}

#[derive(Debug, Default)]
struct Queue {
    /// Bound members, oldest first; the tail receives dispatches.
    members: SmallVec<[ListenerId; 4]>,
    natives: SmallVec<[NativeId; 2]>,
}

#[derive(Debug)]
struct PointerCapture {
    count: usize,
    original: Option<String>,
}

struct HubState<K, E> {
    next_listener: u64,
    next_native: u64,
    natives: Vec<Native<K>>,
    queues: HashMap<QueueKey<K>, Queue>,
    bound: HashMap<ListenerId, Rc<Shared<K, E>>>,
    pointers: HashMap<K, PointerCapture>,
}

impl<K, E> HubState<K, E>
where
    K: Copy + Eq + Hash,
{
    fn new() -> Self {
        Self {
            next_listener: 0,
            next_native: 0,
            natives: Vec::new(),
            queues: HashMap::new(),
            bound: HashMap::new(),
            pointers: HashMap::new(),
        }
    }

    fn push_native(&mut self, node: K, kind: &'static str, capture: bool, relay: Relay<K>) -> NativeId {
        self.next_native += 1;
        let id = NativeId(self.next_native);
        self.natives.push(Native {
            id,
            node,
            kind,
            capture,
            relay,
        });
        id
    }

    /// The binding a native registration currently relays to.
    fn resolve(&self, native: NativeId) -> Option<Rc<Shared<K, E>>> {
        let native = self.natives.iter().find(|n| n.id == native)?;
        let id = match native.relay {
            Relay::Direct(id) => id,
            Relay::Queue(key) => *self.queues.get(&key)?.members.last()?,
        };
        self.bound.get(&id).cloned()
    }
}

/// Handle to one event system's registration table.
///
/// Clones share the same table. All bindings created through one hub see each
/// other's queues; bindings on different hubs are independent.
pub struct EventHub<K, E> {
    state: Rc<RefCell<HubState<K, E>>>,
    host: Rc<dyn ListenerHost<K>>,
}

impl<K, E> Clone for EventHub<K, E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            host: self.host.clone(),
        }
    }
}

impl<K, E> fmt::Debug for EventHub<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(state) = self.state.try_borrow() else {
            return f.write_str("EventHub { <dispatching> }");
        };
        f.debug_struct("EventHub")
            .field("natives", &state.natives.len())
            .field("queues", &state.queues.len())
            .field("bound", &state.bound.len())
            .field("pointers", &state.pointers.len())
            .finish_non_exhaustive()
    }
}

impl<K, E> EventHub<K, E>
where
    K: Copy + Eq + Hash + 'static,
    E: 'static,
{
    /// Create an empty hub reporting native registrations to `host`.
    pub fn new<H: ListenerHost<K> + 'static>(host: Rc<H>) -> Self {
        Self {
            state: Rc::new(RefCell::new(HubState::new())),
            host,
        }
    }

    /// Bind a plain listener with just a handler.
    ///
    /// Shorthand for `ListenerBuilder::new(node, event_type).handler(handler).bind(self)`.
    pub fn listen(
        &self,
        node: K,
        event_type: &'static str,
        handler: impl Fn(&E) + 'static,
    ) -> Listener<K, E> {
        ListenerBuilder::new(node, event_type)
            .handler(handler)
            .bind(self)
    }

    /// Number of native registrations for `kind` on `node`.
    #[must_use]
    pub fn native_count(&self, node: K, kind: &str) -> usize {
        self.state
            .borrow()
            .natives
            .iter()
            .filter(|n| n.node == node && n.kind == kind)
            .count()
    }

    /// Number of bound members in the queue for (`node`, `event_type`, `key_code`).
    #[must_use]
    pub fn queue_len(&self, node: K, event_type: &'static str, key_code: Option<u32>) -> usize {
        let key = QueueKey {
            node,
            event_type,
            key_code,
        };
        self.state
            .borrow()
            .queues
            .get(&key)
            .map_or(0, |q| q.members.len())
    }

    /// Number of bound pointer listeners on `node`.
    #[must_use]
    pub fn pointer_count(&self, node: K) -> usize {
        self.state
            .borrow()
            .pointers
            .get(&node)
            .map_or(0, |p| p.count)
    }

    /// Number of bindings currently bound through this hub.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.state.borrow().bound.len()
    }

    pub(crate) fn next_listener_id(&self) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        ListenerId(state.next_listener)
    }

    pub(crate) fn bind_shared(&self, shared: &Rc<Shared<K, E>>) {
        if shared.bound.get() {
            return;
        }
        if let Kind::Once(done) = &shared.kind {
            // Fires at most once; a spent one-shot stays unbound.
            if done.is_complete() {
                return;
            }
        }
        if matches!(shared.kind, Kind::Pointer) {
            self.engage_pointer(shared.node);
        }

        let mut created: SmallVec<[&'static str; 2]> = SmallVec::new();
        {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            if shared.queued {
                let key = QueueKey {
                    node: shared.node,
                    event_type: shared.event_type,
                    key_code: shared.key_code,
                };
                let mut queue = state.queues.remove(&key).unwrap_or_default();
                queue.members.push(shared.id);
                if queue.members.len() == 1 {
                    for kind in shared.event_type.split_whitespace() {
                        let id = state.push_native(shared.node, kind, shared.capture, Relay::Queue(key));
                        queue.natives.push(id);
                        created.push(kind);
                    }
                    #[cfg(feature = "tracing")]
                    tracing::trace!(event_type = key.event_type, key_code = ?key.key_code, "queue created");
                }
                state.queues.insert(key, queue);
            } else {
                for kind in shared.event_type.split_whitespace() {
                    state.push_native(shared.node, kind, shared.capture, Relay::Direct(shared.id));
                    created.push(kind);
                }
            }
            state.bound.insert(shared.id, shared.clone());
        }
        shared.bound.set(true);

        for kind in created {
            #[cfg(feature = "tracing")]
            tracing::trace!(kind, capture = shared.capture, "native registration added");
            self.host.native_added(shared.node, kind, shared.capture);
        }
    }

    pub(crate) fn unbind_shared(&self, shared: &Rc<Shared<K, E>>) {
        if !shared.bound.get() {
            return;
        }

        let mut removed: SmallVec<[(&'static str, bool); 2]> = SmallVec::new();
        {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            state.bound.remove(&shared.id);
            if shared.queued {
                let key = QueueKey {
                    node: shared.node,
                    event_type: shared.event_type,
                    key_code: shared.key_code,
                };
                let emptied = match state.queues.get_mut(&key) {
                    Some(queue) => {
                        queue.members.retain(|id| *id != shared.id);
                        queue.members.is_empty()
                    }
                    None => false,
                };
                if emptied {
                    if let Some(queue) = state.queues.remove(&key) {
                        state.natives.retain(|n| {
                            if queue.natives.contains(&n.id) {
                                removed.push((n.kind, n.capture));
                                false
                            } else {
                                true
                            }
                        });
                    }
                    #[cfg(feature = "tracing")]
                    tracing::trace!(event_type = key.event_type, key_code = ?key.key_code, "queue emptied");
                }
            } else {
                state.natives.retain(|n| match n.relay {
                    Relay::Direct(id) if id == shared.id => {
                        removed.push((n.kind, n.capture));
                        false
                    }
                    _ => true,
                });
            }
        }
        shared.bound.set(false);

        for (kind, capture) in removed {
            #[cfg(feature = "tracing")]
            tracing::trace!(kind, capture, "native registration removed");
            self.host.native_removed(shared.node, kind, capture);
        }
        if matches!(shared.kind, Kind::Pointer) {
            self.release_pointer(shared.node);
        }
        if let Some(on_unbind) = &shared.on_unbind {
            on_unbind();
        }
        if let Some(finally) = &shared.finally {
            finally();
        }
    }

    fn engage_pointer(&self, node: K) {
        let first = {
            let mut state = self.state.borrow_mut();
            let capture = state.pointers.entry(node).or_insert(PointerCapture {
                count: 0,
                original: None,
            });
            capture.count += 1;
            capture.count == 1
        };
        if first {
            let original = self.host.attribute(node, TOUCH_ACTION);
            if let Some(capture) = self.state.borrow_mut().pointers.get_mut(&node) {
                capture.original = original;
            }
            self.host.set_attribute(node, TOUCH_ACTION, "none");
            #[cfg(feature = "tracing")]
            tracing::trace!("gesture suppression engaged");
        }
    }

    fn release_pointer(&self, node: K) {
        let restore = {
            let mut state = self.state.borrow_mut();
            let last = match state.pointers.get_mut(&node) {
                Some(capture) => {
                    capture.count = capture.count.saturating_sub(1);
                    capture.count == 0
                }
                None => false,
            };
            if last {
                state.pointers.remove(&node).map(|capture| capture.original)
            } else {
                None
            }
        };
        if let Some(original) = restore {
            match original {
                Some(value) => self.host.set_attribute(node, TOUCH_ACTION, &value),
                None => self.host.remove_attribute(node, TOUCH_ACTION),
            }
            #[cfg(feature = "tracing")]
            tracing::trace!("gesture suppression released");
        }
    }
}

impl<K, E> EventHub<K, E>
where
    K: Copy + Eq + Hash + 'static,
    E: UiEvent<K> + 'static,
{
    /// Deliver `event` to the registrations for `kind` on `node` in `phase`.
    ///
    /// Returns how many bindings ran their handler (filtered-out bindings do
    /// not count).
    pub fn dispatch(&self, node: K, kind: &str, phase: Phase, event: &E) -> usize {
        let pending: SmallVec<[NativeId; 8]> = self
            .state
            .borrow()
            .natives
            .iter()
            .filter(|n| n.node == node && n.kind == kind && phase.admits(n.capture))
            .map(|n| n.id)
            .collect();

        let mut fired = 0;
        for native in pending {
            let target = self.state.borrow().resolve(native);
            if let Some(shared) = target {
                if self.fire(&shared, event) {
                    fired += 1;
                }
            }
        }
        fired
    }

    /// Deliver `event` along a root→target `path`: capture from the root down,
    /// then the target, then (if `bubbles`) back up to the root.
    ///
    /// Stops early once the event reports
    /// [`is_propagation_stopped`](UiEvent::is_propagation_stopped). Returns the
    /// total number of bindings that ran.
    pub fn dispatch_path(&self, path: &[K], kind: &str, event: &E, bubbles: bool) -> usize {
        let Some((&target, ancestors)) = path.split_last() else {
            return 0;
        };
        let mut fired = 0;
        for &node in ancestors {
            fired += self.dispatch(node, kind, Phase::Capture, event);
            if event.is_propagation_stopped() {
                return fired;
            }
        }
        fired += self.dispatch(target, kind, Phase::Target, event);
        if !bubbles || event.is_propagation_stopped() {
            return fired;
        }
        for &node in ancestors.iter().rev() {
            fired += self.dispatch(node, kind, Phase::Bubble, event);
            if event.is_propagation_stopped() {
                break;
            }
        }
        fired
    }

    fn fire(&self, shared: &Rc<Shared<K, E>>, event: &E) -> bool {
        if let Some(code) = shared.key_code {
            if event.key_code() != Some(code) {
                return false;
            }
        }
        if matches!(shared.kind, Kind::Once(_)) && shared.spent.replace(true) {
            // Re-entrant dispatch while the one-shot's handler is still running.
            return false;
        }
        if let Some(handler) = &shared.handler {
            handler(event);
        }
        if let Kind::Once(done) = &shared.kind {
            self.unbind_shared(shared);
            done.complete();
        }
        true
    }
}
