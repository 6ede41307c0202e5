// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot listeners and their completion signals.
//!
//! A [`OneShotListener`] runs its handler for the first qualifying event, unbinds
//! itself, and then completes its [`Completion`]. Completions can be awaited as
//! futures or observed with [`Completion::on_complete`] when no executor is
//! around. [`race`] completes as soon as the first of several one-shots fires;
//! the others stay bound until they fire or their owners unbind them.
//!
//! ## Minimal example
//!
//! ```
//! use std::rc::Rc;
//! use understory_listener::{race, EventHub, ListenerBuilder, Phase, UiEvent};
//!
//! struct Ev;
//! impl UiEvent<u32> for Ev {
//!     fn target(&self) -> Option<u32> { None }
//! }
//!
//! let hub: EventHub<u32, Ev> = EventHub::new(Rc::new(()));
//! let up = ListenerBuilder::new(1, "pointerup").bind_once(&hub);
//! let cancel = ListenerBuilder::new(1, "pointercancel").bind_once(&hub);
//! let either = race([&up, &cancel]);
//!
//! hub.dispatch(1, "pointerup", Phase::Target, &Ev);
//! assert!(either.is_complete());
//! assert!(!up.is_bound());
//! assert!(cancel.is_bound());
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::future::Future;
use core::ops::Deref;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use crate::listener::Listener;

type Continuation = Box<dyn FnOnce()>;

#[derive(Default)]
struct CompletionState {
    done: Cell<bool>,
    continuations: RefCell<Vec<Continuation>>,
    /// One slot per handle that has been polled; freed when that handle drops.
    wakers: RefCell<Vec<Option<Waker>>>,
}

/// A single-fire completion signal.
///
/// Clones observe the same signal. Once complete it stays complete. Each handle
/// awaiting the signal keeps a single waker, replaced on every poll.
pub struct Completion {
    state: Rc<CompletionState>,
    slot: Option<usize>,
}

impl Clone for Completion {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            slot: None,
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(slot) = self.slot {
            if let Some(waker) = self.state.wakers.borrow_mut().get_mut(slot) {
                *waker = None;
            }
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("done", &self.state.done.get())
            .finish_non_exhaustive()
    }
}

impl Completion {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::default(),
            slot: None,
        }
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.done.get()
    }

    /// Run `continuation` once the signal fires, or right away if it already has.
    pub fn on_complete(&self, continuation: impl FnOnce() + 'static) {
        if self.is_complete() {
            continuation();
        } else {
            self.state
                .continuations
                .borrow_mut()
                .push(Box::new(continuation));
        }
    }

    pub(crate) fn complete(&self) {
        if self.state.done.replace(true) {
            return;
        }
        let continuations = core::mem::take(&mut *self.state.continuations.borrow_mut());
        for continuation in continuations {
            continuation();
        }
        let wakers = core::mem::take(&mut *self.state.wakers.borrow_mut());
        for waker in wakers.into_iter().flatten() {
            waker.wake();
        }
    }

    /// A new, independent signal that fires together with this one.
    fn follower(&self) -> Self {
        let follower = Self::new();
        let handle = follower.clone();
        self.on_complete(move || handle.complete());
        follower
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.is_complete() {
            return Poll::Ready(());
        }
        let mut wakers = this.state.wakers.borrow_mut();
        match this.slot.and_then(|slot| wakers.get_mut(slot)) {
            Some(Some(waker)) => waker.clone_from(cx.waker()),
            Some(empty) => *empty = Some(cx.waker().clone()),
            None => {
                // Reuse a slot freed by a dropped handle before growing.
                let slot = match wakers.iter().position(Option::is_none) {
                    Some(free) => {
                        wakers[free] = Some(cx.waker().clone());
                        free
                    }
                    None => {
                        wakers.push(Some(cx.waker().clone()));
                        wakers.len() - 1
                    }
                };
                this.slot = Some(slot);
            }
        }
        Poll::Pending
    }
}

/// A listener that unbinds itself after its first qualifying event.
///
/// Dereferences to [`Listener`] for `unbind`, `is_bound`, and friends.
pub struct OneShotListener<K, E> {
    listener: Listener<K, E>,
    done: Completion,
}

impl<K, E> Clone for OneShotListener<K, E> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
            done: self.done.clone(),
        }
    }
}

impl<K: fmt::Debug, E> fmt::Debug for OneShotListener<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneShotListener")
            .field("listener", &self.listener)
            .field("done", &self.done)
            .finish()
    }
}

impl<K, E> OneShotListener<K, E> {
    pub(crate) fn new(listener: Listener<K, E>, done: Completion) -> Self {
        Self { listener, done }
    }

    /// Whether the listener has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.done.is_complete()
    }

    /// A completion signal for this listener's firing.
    ///
    /// Every call returns an independent signal; all of them fire together.
    #[must_use]
    pub fn completion(&self) -> Completion {
        self.done.follower()
    }

    /// The underlying listener handle.
    #[must_use]
    pub fn listener(&self) -> &Listener<K, E> {
        &self.listener
    }

    /// Convert into the underlying listener handle.
    #[must_use]
    pub fn into_listener(self) -> Listener<K, E> {
        self.listener
    }
}

impl<K, E> Deref for OneShotListener<K, E> {
    type Target = Listener<K, E>;

    fn deref(&self) -> &Self::Target {
        &self.listener
    }
}

/// A signal that fires when the first of `listeners` fires.
///
/// The other listeners are left alone. An empty set never completes.
pub fn race<'a, K, E>(listeners: impl IntoIterator<Item = &'a OneShotListener<K, E>>) -> Completion
where
    K: 'a,
    E: 'a,
{
    let raced = Completion::new();
    for listener in listeners {
        let handle = raced.clone();
        listener.done.on_complete(move || handle.complete());
    }
    raced
}
