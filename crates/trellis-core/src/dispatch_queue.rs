//! Deferred dispatch queue.
//!
//! Notifications emitted during an input-event handler are not delivered
//! immediately. They are pushed onto a per-thread FIFO and run when the host
//! calls [`drain`] after the handler returns. Delivery order matches
//! emission order, so notifications for a given container are observed in
//! the order their triggering transitions occurred.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::trace;

use crate::logging::targets;

thread_local! {
    static QUEUE: RefCell<VecDeque<Box<dyn FnOnce()>>> = RefCell::new(VecDeque::new());
    static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Queues a deferred invocation on the current thread.
///
/// Used by [`Signal`](crate::Signal) for connections with
/// [`DispatchMode::Deferred`](crate::DispatchMode::Deferred). Hosts normally
/// do not call this directly.
pub fn enqueue(task: Box<dyn FnOnce()>) {
    QUEUE.with(|q| q.borrow_mut().push_back(task));
}

/// Returns the number of invocations currently queued on this thread.
pub fn pending() -> usize {
    QUEUE.with(|q| q.borrow().len())
}

/// Delivers all queued invocations in FIFO order.
///
/// Call this from the host event loop after each input event has been
/// handled. Invocations enqueued while draining (a slot emitting a deferred
/// signal) are delivered in the same pass, after everything already queued.
/// A re-entrant call from inside a slot is a no-op; the outer drain picks up
/// whatever the slot enqueued.
pub fn drain() {
    if DRAINING.with(Cell::get) {
        return;
    }
    DRAINING.with(|d| d.set(true));

    let mut delivered = 0usize;
    loop {
        let task = QUEUE.with(|q| q.borrow_mut().pop_front());
        match task {
            Some(task) => {
                task();
                delivered += 1;
            }
            None => break,
        }
    }

    DRAINING.with(|d| d.set(false));
    if delivered > 0 {
        trace!(target: targets::DISPATCH, delivered, "dispatch queue drained");
    }
}
