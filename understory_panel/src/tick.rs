// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative next-tick scheduling.
//!
//! The panel never blocks. When it has to let the current event finish (or let
//! layout settle) before continuing, it defers a continuation onto a
//! [`TickQueue`]. The host drains the queue once per turn of its event loop,
//! e.g. from a zero-delay timer or after dispatching a batch of input.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_panel::TickQueue;
//!
//! let ticks = TickQueue::new();
//! let ran = Rc::new(Cell::new(0));
//! {
//!     let (ran, inner) = (ran.clone(), ticks.clone());
//!     ticks.defer(move || {
//!         ran.set(ran.get() + 1);
//!         // Deferred from inside a tick: runs on the following one.
//!         let ran = ran.clone();
//!         inner.defer(move || ran.set(ran.get() + 1));
//!     });
//! }
//! assert_eq!(ticks.run_pending(), 1);
//! assert_eq!(ran.get(), 1);
//! assert_eq!(ticks.run_pending(), 1);
//! assert_eq!(ran.get(), 2);
//! ```

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

type Task = Box<dyn FnOnce()>;

/// A FIFO of continuations for the next turn of the event loop.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct TickQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl fmt::Debug for TickQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickQueue")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

impl TickQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` for the next tick.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Number of tasks waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the tasks that were queued before this call, in order.
    ///
    /// Tasks deferred while running wait for the next call. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let batch = core::mem::take(&mut *self.tasks.borrow_mut());
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn runs_in_fifo_order() {
        let ticks = TickQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            ticks.defer(move || order.borrow_mut().push(i));
        }
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks.run_pending(), 3);
        assert_eq!(*order.borrow(), [0, 1, 2]);
        assert!(ticks.is_empty());
    }

    #[test]
    fn empty_queue_runs_nothing() {
        let ticks = TickQueue::new();
        assert_eq!(ticks.run_pending(), 0);
    }
}
