// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The floating panel state machine.
//!
//! ## Opening
//!
//! [`Panel::open`] runs, in order:
//!
//! 1. context-menu suppression until the next tick,
//! 2. a snapshot of the inline style,
//! 3. detachment, when configured,
//! 4. the state change, the `open` attribute and the `on_open` hook,
//! 5. (optionally one tick later) overflow attribution, fitting, and the
//!    Escape and outside-click bindings.
//!
//! The outside-click binding is never armed by the event that opened the panel:
//! if a pointer button is down it waits for that button's release, otherwise it
//! waits one tick. Deferred steps carry the open session they belong to and do
//! nothing once that session is over.
//!
//! ## Closing
//!
//! [`Panel::close`] undoes the above: style, detachment, overflow markers and
//! the fitted marker are restored, the `on_close` hook runs, every binding the
//! session made is released, and the per-open closing callback runs last.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use understory_listener::{Listener, ListenerBuilder, ListenerHost, UiEvent};

use crate::attributes::{self, FITTED, MARKERS, OPEN, STYLE};
use crate::context::PanelContext;
use crate::detach::{DetachError, Detachment, px};
use crate::host::{Environment, VisualTree};
use crate::options::{PanelFeatures, PanelOptions};
use crate::overflow::{Axis, Edge, Overflow};

/// Lifecycle state of a [`Panel`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PanelState {
    /// Not shown. The initial state.
    #[default]
    Closed,
    /// Shown and listening for dismissal.
    Open,
}

/// Groups of bindings a panel owns; each group is released as a unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Dismissal bindings of the current open session.
    Opening,
    /// Window resize and scroll bindings while detached.
    Detachment,
    /// The transient context-menu suppression.
    ContextMenu,
}

impl Namespace {
    /// All namespaces.
    pub const ALL: [Self; 3] = [Self::Opening, Self::Detachment, Self::ContextMenu];
}

/// Arguments of one [`Panel::open`] call.
pub struct OpenParams<K> {
    /// Placeholder to leave behind when detaching, instead of a fresh clone.
    pub avatar: Option<K>,
    /// Runs once, at the end of the close that ends this session.
    pub on_closed: Option<Box<dyn FnOnce()>>,
}

impl<K> Default for OpenParams<K> {
    fn default() -> Self {
        Self {
            avatar: None,
            on_closed: None,
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for OpenParams<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenParams")
            .field("avatar", &self.avatar)
            .field("on_closed", &self.on_closed.is_some())
            .finish()
    }
}

impl<K> OpenParams<K> {
    /// No avatar, no closing callback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave `avatar` behind when detaching.
    #[must_use]
    pub fn with_avatar(mut self, avatar: K) -> Self {
        self.avatar = Some(avatar);
        self
    }

    /// Run `callback` when this session closes.
    #[must_use]
    pub fn on_closed(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_closed = Some(Box::new(callback));
        self
    }
}

type OpenHook<K> = Box<dyn Fn(&OpenParams<K>)>;
type CloseHook = Box<dyn Fn()>;

struct Session<K, E> {
    state: PanelState,
    /// Bumped on every open; deferred steps compare against it.
    generation: u64,
    destroyed: bool,
    listeners: HashMap<Namespace, SmallVec<[Listener<K, E>; 2]>>,
    style: Option<Option<String>>,
    detachment: Option<Detachment<K>>,
    overflow: Option<Overflow>,
    markers: Option<[Option<String>; 6]>,
    fitted: bool,
    params: Option<OpenParams<K>>,
}

impl<K, E> Default for Session<K, E> {
    fn default() -> Self {
        Self {
            state: PanelState::Closed,
            generation: 0,
            destroyed: false,
            listeners: HashMap::new(),
            style: None,
            detachment: None,
            overflow: None,
            markers: None,
            fitted: false,
            params: None,
        }
    }
}

pub(crate) struct PanelInner<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    ctx: PanelContext<K, E, H>,
    node: K,
    options: PanelOptions,
    on_open: Option<OpenHook<K>>,
    on_close: Option<CloseHook>,
    session: RefCell<Session<K, E>>,
}

/// Builder for a [`Panel`].
pub struct PanelBuilder<K> {
    node: K,
    options: PanelOptions,
    on_open: Option<OpenHook<K>>,
    on_close: Option<CloseHook>,
}

impl<K: fmt::Debug> fmt::Debug for PanelBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelBuilder")
            .field("node", &self.node)
            .field("options", &self.options)
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

impl<K> PanelBuilder<K> {
    /// Start a panel for `node` with default options.
    pub fn new(node: K) -> Self {
        Self {
            node,
            options: PanelOptions::default(),
            on_open: None,
            on_close: None,
        }
    }

    /// Use `options`.
    #[must_use]
    pub fn options(mut self, options: PanelOptions) -> Self {
        self.options = options;
        self
    }

    /// Run `hook` every time the panel opens, after it is marked open.
    #[must_use]
    pub fn on_open(mut self, hook: impl Fn(&OpenParams<K>) + 'static) -> Self {
        self.on_open = Some(Box::new(hook));
        self
    }

    /// Run `hook` every time the panel closes, before its bindings are released.
    #[must_use]
    pub fn on_close(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Create the panel and associate it with its node in `ctx`.
    pub fn build<E, H>(self, ctx: &PanelContext<K, E, H>) -> Panel<K, E, H>
    where
        K: Copy + Eq + Hash + fmt::Debug + 'static,
        E: UiEvent<K> + 'static,
        H: VisualTree<K> + Environment<K> + 'static,
    {
        let inner = Rc::new(PanelInner {
            ctx: ctx.clone(),
            node: self.node,
            options: self.options,
            on_open: self.on_open,
            on_close: self.on_close,
            session: RefCell::default(),
        });
        ctx.register(self.node, &inner);
        Panel { inner }
    }
}

impl<K, E, H> PanelInner<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    fn release(&self, namespace: Namespace) {
        let held = self.session.borrow_mut().listeners.remove(&namespace);
        for listener in held.into_iter().flatten() {
            listener.unbind();
        }
    }

    fn mount(&self) {
        let Some(detachment) = self.session.borrow_mut().detachment.take() else {
            return;
        };
        let host = &*self.ctx.host;
        let node = self.node;
        if host.is_attached(detachment.avatar) {
            host.insert_after(node, detachment.avatar);
        } else {
            host.remove(node);
        }
        host.remove(detachment.avatar);
        restore_attribute(host, node, STYLE, detachment.style);
        self.release(Namespace::Detachment);
        #[cfg(feature = "tracing")]
        tracing::debug!(?node, "panel remounted");
    }
}

impl<K, E, H> Drop for PanelInner<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    fn drop(&mut self) {
        // Handlers only hold weak references, so whatever is still bound here
        // would sit in the hub doing nothing.
        self.mount();
        for namespace in Namespace::ALL {
            self.release(namespace);
        }
        self.ctx.unregister(self.node, self);
        #[cfg(feature = "tracing")]
        tracing::debug!(node = ?self.node, "panel dropped");
    }
}

/// A floating panel bound to one node.
///
/// Handles are cheap to clone and share one panel. Dropping the last handle
/// remounts a detached node, releases every binding the panel holds, and
/// forgets the node association, without running any hooks. Call
/// [`destroy`](Self::destroy) to do this eagerly while handles remain.
pub struct Panel<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    inner: Rc<PanelInner<K, E, H>>,
}

impl<K, E, H> Clone for Panel<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, E, H> fmt::Debug for Panel<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Panel");
        s.field("node", &self.inner.node);
        if let Ok(session) = self.inner.session.try_borrow() {
            s.field("state", &session.state)
                .field("detached", &session.detachment.is_some())
                .field("fitted", &session.fitted);
        }
        s.finish_non_exhaustive()
    }
}

fn restore_attribute<K, H: ListenerHost<K> + ?Sized>(
    host: &H,
    node: K,
    name: &str,
    value: Option<String>,
) {
    match value {
        Some(value) => host.set_attribute(node, name, &value),
        None => host.remove_attribute(node, name),
    }
}

impl<K, E, H> Panel<K, E, H>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    E: UiEvent<K> + 'static,
    H: VisualTree<K> + Environment<K> + 'static,
{
    /// A panel for `node` with `options` and no hooks.
    pub fn new(ctx: &PanelContext<K, E, H>, node: K, options: PanelOptions) -> Self {
        PanelBuilder::new(node).options(options).build(ctx)
    }

    pub(crate) fn from_inner(inner: Rc<PanelInner<K, E, H>>) -> Self {
        Self { inner }
    }

    fn weak(&self) -> Weak<PanelInner<K, E, H>> {
        Rc::downgrade(&self.inner)
    }

    /// Run `f` on the panel behind `weak`, if it is still alive.
    fn with_weak(weak: &Weak<PanelInner<K, E, H>>, f: impl FnOnce(&Self)) {
        if let Some(inner) = weak.upgrade() {
            f(&Self::from_inner(inner));
        }
    }

    /// The node this panel manages.
    #[must_use]
    pub fn node(&self) -> K {
        self.inner.node
    }

    /// The options the panel was built with.
    #[must_use]
    pub fn options(&self) -> &PanelOptions {
        &self.inner.options
    }

    /// The context the panel was built against.
    #[must_use]
    pub fn context(&self) -> &PanelContext<K, E, H> {
        &self.inner.ctx
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PanelState {
        self.inner.session.borrow().state
    }

    /// Whether the panel is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == PanelState::Open
    }

    /// Whether the node currently lives at the document root.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.inner.session.borrow().detachment.is_some()
    }

    /// The placeholder holding the node's original position while detached.
    #[must_use]
    pub fn avatar(&self) -> Option<K> {
        self.inner
            .session
            .borrow()
            .detachment
            .as_ref()
            .map(|d| d.avatar)
    }

    /// The parent the node had before it was detached.
    #[must_use]
    pub fn detached_from(&self) -> Option<K> {
        self.inner
            .session
            .borrow()
            .detachment
            .as_ref()
            .map(|d| d.parent)
    }

    /// Overflow recorded for the current open session.
    #[must_use]
    pub fn overflow(&self) -> Option<Overflow> {
        self.inner.session.borrow().overflow
    }

    /// Whether a fit shift is applied.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.inner.session.borrow().fitted
    }

    /// Number of bound bindings the panel holds under `namespace`.
    #[must_use]
    pub fn listener_count(&self, namespace: Namespace) -> usize {
        self.inner
            .session
            .borrow()
            .listeners
            .get(&namespace)
            .map_or(0, |held| held.iter().filter(|l| l.is_bound()).count())
    }

    /// Whether two handles refer to the same panel.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        let session = self.inner.session.borrow();
        !session.destroyed && session.state == PanelState::Open && session.generation == generation
    }

    fn hold(&self, namespace: Namespace, listener: Listener<K, E>) {
        self.inner
            .session
            .borrow_mut()
            .listeners
            .entry(namespace)
            .or_default()
            .push(listener);
    }

    /// Open the panel. No-op if it is already open or was destroyed.
    pub fn open(&self, params: OpenParams<K>) {
        {
            let session = self.inner.session.borrow();
            if session.destroyed || session.state == PanelState::Open {
                return;
            }
        }
        let host = &self.inner.ctx.host;
        let node = self.inner.node;
        let options = &self.inner.options;

        if options.has(PanelFeatures::SUPPRESS_CONTEXT_MENU) {
            self.suppress_context_menu();
        }

        let style = host.attribute(node, STYLE);
        self.inner.session.borrow_mut().style = Some(style);

        if options.has(PanelFeatures::DETACH) {
            if let Err(err) = self.dismount(params.avatar) {
                #[cfg(feature = "tracing")]
                tracing::warn!(?node, %err, "detaching failed; opening in place");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
            }
        }

        let generation = {
            let mut session = self.inner.session.borrow_mut();
            session.state = PanelState::Open;
            session.generation += 1;
            session.generation
        };
        host.set_attribute(node, OPEN, "");
        #[cfg(feature = "tracing")]
        tracing::debug!(?node, generation, "panel opened");

        if let Some(hook) = &self.inner.on_open {
            hook(&params);
        }
        let ended = {
            let mut session = self.inner.session.borrow_mut();
            if session.state == PanelState::Open && session.generation == generation {
                session.params = Some(params);
                None
            } else {
                Some(params)
            }
        };
        if let Some(params) = ended {
            // The hook closed this session already.
            if let Some(on_closed) = params.on_closed {
                on_closed();
            }
            return;
        }

        if options.has(PanelFeatures::WAIT_FOR_LAYOUT) {
            let weak = self.weak();
            self.inner.ctx.ticks.defer(move || {
                Self::with_weak(&weak, |panel| panel.finish_open(generation));
            });
        } else {
            self.finish_open(generation);
        }
    }

    fn finish_open(&self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        let options = &self.inner.options;
        if options.has(PanelFeatures::ATTRIBUTE_OVERFLOW) {
            self.attribute_overflow();
        }
        if options.has(PanelFeatures::FIT) {
            self.fit();
        }
        if options.has(PanelFeatures::CLOSE_ON_ESCAPE) {
            self.bind_escape();
        }
        if options.has(PanelFeatures::CLOSE_ON_OUTSIDE_CLICK) {
            self.arm_outside_click(generation);
        }
    }

    /// Close the panel. No-op if it is not open.
    pub fn close(&self) {
        let (params, opening, context_menu, style, markers) = {
            let mut session = self.inner.session.borrow_mut();
            if session.state != PanelState::Open {
                return;
            }
            session.state = PanelState::Closed;
            (
                session.params.take(),
                session.listeners.remove(&Namespace::Opening),
                session.listeners.remove(&Namespace::ContextMenu),
                session.style.take(),
                session.markers.take(),
            )
        };
        let host = &self.inner.ctx.host;
        let node = self.inner.node;
        host.remove_attribute(node, OPEN);

        if let Some(style) = style {
            restore_attribute(&**host, node, STYLE, style);
        }
        self.mount();
        if let Some(markers) = markers {
            for (name, value) in MARKERS.into_iter().zip(markers) {
                restore_attribute(&**host, node, name, value);
            }
        }
        let fitted = {
            let mut session = self.inner.session.borrow_mut();
            session.overflow = None;
            core::mem::take(&mut session.fitted)
        };
        if fitted {
            host.remove_attribute(node, FITTED);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(?node, "panel closed");

        if let Some(hook) = &self.inner.on_close {
            hook();
        }
        for listener in opening.into_iter().chain(context_menu).flatten() {
            listener.unbind();
        }
        if let Some(on_closed) = params.and_then(|p| p.on_closed) {
            on_closed();
        }
    }

    /// Close if open, otherwise open with default parameters.
    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open(OpenParams::default());
        }
    }

    /// Close, remount, release every binding and drop the node association.
    ///
    /// The panel stays closed afterwards; [`open`](Self::open) becomes a no-op.
    pub fn destroy(&self) {
        self.close();
        self.mount();
        for namespace in Namespace::ALL {
            self.inner.release(namespace);
        }
        self.inner.session.borrow_mut().destroyed = true;
        self.inner.ctx.unregister(self.inner.node, &self.inner);
        #[cfg(feature = "tracing")]
        tracing::debug!(node = ?self.inner.node, "panel destroyed");
    }

    fn suppress_context_menu(&self) {
        let ctx = &self.inner.ctx;
        let listener = ctx
            .hub
            .listen(ctx.host.document_element(), "contextmenu", |event: &E| {
                event.prevent_default();
            });
        self.hold(Namespace::ContextMenu, listener.clone());
        let weak = self.weak();
        ctx.ticks.defer(move || {
            listener.unbind();
            Self::with_weak(&weak, |panel| {
                if let Some(held) = panel
                    .inner
                    .session
                    .borrow_mut()
                    .listeners
                    .get_mut(&Namespace::ContextMenu)
                {
                    held.retain(|l| !l.ptr_eq(&listener));
                }
            });
        });
    }

    fn bind_escape(&self) {
        let ctx = &self.inner.ctx;
        let Some(code) = ctx.host.key_code(self.inner.options.escape_key) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(key = self.inner.options.escape_key, "no key code for escape key");
            return;
        };
        let weak = self.weak();
        let listener = ListenerBuilder::new(ctx.host.document_element(), "keydown")
            .queued()
            .key_code(code)
            .handler(move |_: &E| Self::with_weak(&weak, Self::close))
            .bind(&ctx.hub);
        self.hold(Namespace::Opening, listener);
    }

    fn arm_outside_click(&self, generation: u64) {
        let ctx = &self.inner.ctx;
        let weak = self.weak();
        let arm = move || {
            Self::with_weak(&weak, |panel| panel.bind_outside_click(generation));
        };
        if ctx.host.is_pointer_pressed() {
            // Wait for the release of the press that opened us.
            let release = ListenerBuilder::new(ctx.host.document_element(), "pointerup")
                .bind_once(&ctx.hub);
            release.completion().on_complete(arm);
            self.hold(Namespace::Opening, release.into_listener());
        } else {
            ctx.ticks.defer(arm);
        }
    }

    fn bind_outside_click(&self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        let ctx = &self.inner.ctx;
        let weak = self.weak();
        let listener = ctx.hub.listen(
            ctx.host.document_element(),
            self.inner.options.outside_event,
            move |event: &E| {
                Self::with_weak(&weak, |panel| {
                    if panel.should_click_cause_closing(event) {
                        panel.close();
                    }
                });
            },
        );
        self.hold(Namespace::Opening, listener);
    }

    /// Whether a click `event` lands outside this panel and should close it.
    ///
    /// Clicks with no target count as outside.
    #[must_use]
    pub fn should_click_cause_closing(&self, event: &E) -> bool {
        event
            .target()
            .is_none_or(|target| !self.logically_contains(target))
    }

    /// Whether `node` belongs to this panel, directly or through nested panels.
    ///
    /// A node inside another panel counts when that panel's node, or its avatar
    /// if it is detached, lies inside this panel; the check repeats up the chain
    /// so a detached submenu of a detached submenu still belongs to the root
    /// menu.
    #[must_use]
    pub fn logically_contains(&self, node: K) -> bool {
        let ctx = &self.inner.ctx;
        let own = self.inner.node;
        if ctx.host.contains(own, node) {
            return true;
        }
        let mut cursor = Some(node);
        // Avatars can form loops; every panel is visited at most once on an acyclic chain.
        for _ in 0..=ctx.panel_count() {
            let Some(panel) = ctx.nearest(cursor) else {
                return false;
            };
            if Rc::ptr_eq(&panel, &self.inner) {
                return true;
            }
            let anchor = panel
                .session
                .borrow()
                .detachment
                .as_ref()
                .map_or(panel.node, |d| d.avatar);
            if ctx.host.contains(own, anchor) {
                return true;
            }
            cursor = ctx.host.parent(anchor);
        }
        false
    }

    /// Move the node to the document root, leaving `avatar` (or a fresh clone)
    /// invisible in its place.
    ///
    /// The node is pinned with absolute positioning at the spot it occupied,
    /// keeps its size, and is raised to the configured stacking index. While
    /// detached, a window resize closes the panel, as does a scroll of anything
    /// outside the node.
    pub fn dismount(&self, avatar: Option<K>) -> Result<(), DetachError> {
        if self.is_detached() {
            return Err(DetachError::AlreadyDetached);
        }
        let ctx = &self.inner.ctx;
        let host = &*ctx.host;
        let node = self.inner.node;
        if !host.is_attached(node) {
            return Err(DetachError::NotAttached);
        }
        let Some(parent) = host.parent(node) else {
            return Err(DetachError::NotAttached);
        };

        let rect = host.bounding_rect(node);
        let scroll = host.current_scroll();
        let margins = host.margins(node);
        let position = Point::new(
            rect.x0 + scroll.x - margins.x0,
            rect.y0 + scroll.y - margins.y0,
        );
        let size = rect.size();
        let preserved: SmallVec<[(&str, String); 4]> = self
            .inner
            .options
            .preserved_properties
            .iter()
            .filter_map(|&name| host.computed_style(node, name).map(|value| (name, value)))
            .collect();
        let style = host.attribute(node, STYLE);

        // The avatar goes in before the node leaves: moving the node first can
        // scroll an ancestor and invalidate the position above.
        let avatar = avatar.unwrap_or_else(|| host.clone_node(node));
        host.set_style_property(avatar, "visibility", "hidden");
        host.insert_after(avatar, node);
        host.append_to_root(node);

        for (name, value) in &preserved {
            host.set_style_property(node, name, value);
        }
        host.set_style_property(node, "position", "absolute");
        host.set_style_property(node, "width", &px(size.width));
        host.set_style_property(node, "height", &px(size.height));
        host.set_style_property(node, "left", &px(position.x));
        host.set_style_property(node, "top", &px(position.y));
        host.set_style_property(node, "z-index", &format!("{}", self.inner.options.z_index));

        self.inner.session.borrow_mut().detachment = Some(Detachment {
            avatar,
            parent,
            position,
            size,
            style,
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(?node, ?avatar, x = position.x, y = position.y, "panel detached");

        let window = host.window();
        let weak = self.weak();
        let resize = ctx
            .hub
            .listen(window, "resize", move |_: &E| Self::with_weak(&weak, Self::close));
        let weak = self.weak();
        let scroll = ListenerBuilder::new(window, "scroll")
            .capture()
            .handler(move |event: &E| {
                Self::with_weak(&weak, |panel| {
                    let inside = event
                        .target()
                        .is_some_and(|target| panel.context().host.contains(panel.node(), target));
                    if !inside {
                        panel.close();
                    }
                });
            })
            .bind(&ctx.hub);
        self.hold(Namespace::Detachment, resize);
        self.hold(Namespace::Detachment, scroll);
        Ok(())
    }

    /// Put a detached node back right after its avatar, or take it out of the
    /// tree if the avatar's container is gone. No-op if not detached.
    pub fn mount(&self) {
        self.inner.mount();
    }

    /// Overflow of the node past the viewport.
    ///
    /// While open, the first measurement of a session is recorded and returned
    /// from then on, so repeated fitting never compounds. A detached node is
    /// measured at the size it had before detaching.
    pub fn measure_overflow(&self) -> Overflow {
        let (recorded, size, open) = {
            let session = self.inner.session.borrow();
            (
                session.overflow,
                session.detachment.as_ref().map(|d| d.size),
                session.state == PanelState::Open,
            )
        };
        if let Some(overflow) = recorded {
            return overflow;
        }
        let node = self.inner.node;
        let overflow = Overflow::measure(self.inner.ctx.host.offset_from_visible(node, size));
        if open {
            self.inner.session.borrow_mut().overflow = Some(overflow);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(?node, ?overflow, "overflow measured");
        overflow
    }

    fn attribute_overflow(&self) {
        let overflow = self.measure_overflow();
        let host = &*self.inner.ctx.host;
        let node = self.inner.node;
        {
            let mut session = self.inner.session.borrow_mut();
            if session.markers.is_none() {
                session.markers = Some(MARKERS.map(|name| host.attribute(node, name)));
            }
        }
        for edge in Edge::ALL {
            if let Some(amount) = overflow.get(edge) {
                host.set_attribute(node, attributes::overflow(edge), &format!("{amount}"));
            }
        }
        for axis in [Axis::X, Axis::Y] {
            if let Some(direction) = overflow.direction(axis) {
                host.set_attribute(node, attributes::direction(axis), direction.name());
            }
        }
    }

    /// Shift the open panel so its overflowing edges sit on the viewport edge.
    ///
    /// A detached panel is moved through `left`/`top` relative to where it was
    /// pinned; otherwise the shift is an inline `transform`. Either way the
    /// result depends only on the session's recorded overflow.
    pub fn fit(&self) {
        let baseline = {
            let session = self.inner.session.borrow();
            if session.state != PanelState::Open {
                return;
            }
            session.detachment.as_ref().map(|d| d.position)
        };
        let shift = self.measure_overflow().fit_shift();
        let host = &*self.inner.ctx.host;
        let node = self.inner.node;
        match baseline {
            Some(position) => {
                host.set_style_property(node, "left", &px(position.x + shift.x));
                host.set_style_property(node, "top", &px(position.y + shift.y));
            }
            None if shift != Vec2::ZERO => {
                let translate = format!("translate({}, {})", px(shift.x), px(shift.y));
                host.set_style_property(node, "transform", &translate);
            }
            None => {}
        }
        let fitted = shift != Vec2::ZERO;
        self.inner.session.borrow_mut().fitted = fitted;
        if fitted {
            host.set_attribute(node, FITTED, "");
            #[cfg(feature = "tracing")]
            tracing::debug!(?node, dx = shift.x, dy = shift.y, "panel fitted");
        }
    }
}
