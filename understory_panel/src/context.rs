// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared services for a family of panels.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use understory_listener::{EventHub, UiEvent};

use crate::host::{Environment, VisualTree};
use crate::panel::{Panel, PanelInner};
use crate::tick::TickQueue;

/// What every panel of one document shares: the host, the event hub, the tick
/// queue, and the node → panel side table.
///
/// Panels that should see each other as nested (for Escape precedence and
/// outside-click containment) must be built against the same context. Clones
/// share all state.
pub struct PanelContext<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    pub(crate) host: Rc<H>,
    pub(crate) hub: EventHub<K, E>,
    pub(crate) ticks: TickQueue,
    registry: Rc<RefCell<HashMap<K, Weak<PanelInner<K, E, H>>>>>,
}

impl<K, E, H> Clone for PanelContext<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            hub: self.hub.clone(),
            ticks: self.ticks.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<K, E, H> fmt::Debug for PanelContext<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let panels = self.registry.try_borrow().map(|r| r.len()).ok();
        f.debug_struct("PanelContext")
            .field("ticks", &self.ticks)
            .field("panels", &panels)
            .finish_non_exhaustive()
    }
}

impl<K, E, H> PanelContext<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    /// A context over `host`, with a fresh hub and tick queue.
    pub fn new(host: Rc<H>) -> Self {
        let hub = EventHub::new(host.clone());
        Self::with_parts(host, hub, TickQueue::new())
    }

    /// A context reusing an existing hub and tick queue, e.g. ones the rest of
    /// the application already dispatches through.
    pub fn with_parts(host: Rc<H>, hub: EventHub<K, E>, ticks: TickQueue) -> Self {
        Self {
            host,
            hub,
            ticks,
            registry: Rc::default(),
        }
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// The event hub panels bind through. Host glue dispatches into it.
    #[must_use]
    pub fn hub(&self) -> &EventHub<K, E> {
        &self.hub
    }

    /// The tick queue panels defer onto. Host glue drains it.
    #[must_use]
    pub fn ticks(&self) -> &TickQueue {
        &self.ticks
    }

    /// The live panel whose node is exactly `node`.
    #[must_use]
    pub fn panel_for(&self, node: K) -> Option<Panel<K, E, H>> {
        self.lookup(node).map(Panel::from_inner)
    }

    /// The live panel whose node is `node` or its nearest ancestor.
    #[must_use]
    pub fn nearest_panel(&self, node: K) -> Option<Panel<K, E, H>> {
        self.nearest(Some(node)).map(Panel::from_inner)
    }

    /// Number of live panels.
    ///
    /// A panel leaves the count when it is destroyed or its last handle drops.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.registry.borrow().len()
    }

    pub(crate) fn lookup(&self, node: K) -> Option<Rc<PanelInner<K, E, H>>> {
        self.registry.borrow().get(&node).and_then(Weak::upgrade)
    }

    pub(crate) fn nearest(&self, start: Option<K>) -> Option<Rc<PanelInner<K, E, H>>> {
        let mut cursor = start;
        while let Some(node) = cursor {
            if let Some(panel) = self.lookup(node) {
                return Some(panel);
            }
            cursor = self.host.parent(node);
        }
        None
    }

    pub(crate) fn register(&self, node: K, panel: &Rc<PanelInner<K, E, H>>) {
        let mut registry = self.registry.borrow_mut();
        registry.retain(|_, weak| weak.strong_count() > 0);
        registry.insert(node, Rc::downgrade(panel));
    }

    /// Drop the association for `node` if it still points at `panel`.
    pub(crate) fn unregister(&self, node: K, panel: &PanelInner<K, E, H>) {
        let mut registry = self.registry.borrow_mut();
        if registry
            .get(&node)
            .is_some_and(|weak| core::ptr::eq(weak.as_ptr(), panel))
        {
            registry.remove(&node);
        }
    }
}
