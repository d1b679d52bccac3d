//! Signal/slot system for Trellis.
//!
//! This module provides a type-safe signal/slot mechanism for widget
//! notifications. Signals are emitted by widgets when their state changes,
//! and connected slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`DispatchMode`] - When a slot is invoked (Deferred or Direct)
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Dispatch Modes
//!
//! - **Deferred** (default): the invocation is queued on the current thread
//!   and delivered when the host calls [`dispatch::drain`](crate::dispatch::drain)
//!   after the triggering input handler returns. A slot therefore never
//!   observes half-updated widget state and cannot re-enter an engine
//!   mid-transition.
//! - **Direct**: the slot runs immediately inside `emit`. Used by internal
//!   plumbing that must run within the same transition (and by tests).
//!
//! # Example
//!
//! ```
//! use trellis_core::{dispatch, Signal};
//!
//! let selected = Signal::<Vec<String>>::new();
//!
//! selected.connect(|ids| {
//!     println!("selected: {:?}", ids);
//! });
//!
//! selected.emit(vec!["row-1".to_string()]);
//! dispatch::drain();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use tracing::trace;

use crate::dispatch_queue;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Specifies when a connected slot is invoked after the signal is emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Queue the invocation for delivery after the current input handler
    /// completes. This is the default; see the module docs for why.
    #[default]
    Deferred,

    /// Invoke the slot immediately inside `emit`.
    ///
    /// The slot runs mid-transition and may observe intermediate widget
    /// state. Intended for internal wiring and tests.
    Direct,
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Arc<dyn Fn(&Args)>,
    /// When to invoke this slot.
    mode: DispatchMode,
}

/// A type-safe signal that can have multiple connected slots.
///
/// Signals are the sole channel from the Trellis core back to application
/// code; the core never calls application code directly. When a signal is
/// emitted, each connected slot is either queued (deferred) or invoked
/// immediately (direct), per its [`DispatchMode`].
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: Clone + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + 'static> Signal<Args> {
    /// Creates a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connects a slot (closure) to this signal with deferred dispatch.
    ///
    /// Returns a [`ConnectionId`] that can be used to disconnect the slot.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + 'static,
    {
        self.connect_with_mode(slot, DispatchMode::Deferred)
    }

    /// Connects a slot that is invoked immediately inside `emit`.
    pub fn connect_direct<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + 'static,
    {
        self.connect_with_mode(slot, DispatchMode::Direct)
    }

    /// Connects a slot with an explicit dispatch mode.
    pub fn connect_with_mode<F>(&self, slot: F, mode: DispatchMode) -> ConnectionId
    where
        F: Fn(&Args) + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
            mode,
        })
    }

    /// Disconnects a slot by its connection ID.
    ///
    /// Returns `true` if the connection existed and was removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnects all slots.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Returns the number of active connections.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Temporarily blocks emission. Emits while blocked are discarded.
    pub fn block(&self) {
        self.blocked.store(true, Ordering::Relaxed);
    }

    /// Unblocks emission after a call to [`block`](Self::block).
    pub fn unblock(&self) {
        self.blocked.store(false, Ordering::Relaxed);
    }

    /// Returns whether emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Relaxed)
    }

    /// Emits the signal with the given arguments.
    ///
    /// Direct slots run before this call returns; deferred slots are queued
    /// on the current thread for the next
    /// [`dispatch::drain`](crate::dispatch::drain).
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            return;
        }

        // Snapshot the slots so a slot connecting/disconnecting during
        // delivery does not deadlock on the connection table.
        let slots: Vec<(Arc<dyn Fn(&Args)>, DispatchMode)> = self
            .connections
            .lock()
            .values()
            .map(|conn| (conn.slot.clone(), conn.mode))
            .collect();

        if slots.is_empty() {
            return;
        }
        trace!(target: targets::DISPATCH, slots = slots.len(), "signal emit");

        for (slot, mode) in slots {
            match mode {
                DispatchMode::Direct => slot(&args),
                DispatchMode::Deferred => {
                    let args = args.clone();
                    dispatch_queue::enqueue(Box::new(move || slot(&args)));
                }
            }
        }
    }

    /// Connects a slot and returns a guard that disconnects on drop.
    pub fn connect_guarded<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + 'static,
    {
        ConnectionGuard {
            signal: self,
            id: Some(self.connect(slot)),
        }
    }
}

/// RAII guard for a signal connection.
///
/// The connection is disconnected when the guard is dropped, unless
/// [`detach`](Self::detach) was called.
pub struct ConnectionGuard<'a, Args> {
    signal: &'a Signal<Args>,
    id: Option<ConnectionId>,
}

impl<Args: Clone + 'static> ConnectionGuard<'_, Args> {
    /// Releases the guard without disconnecting, returning the raw ID.
    pub fn detach(mut self) -> ConnectionId {
        self.id.take().expect("guard already detached")
    }
}

impl<Args> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.signal.connections.lock().remove(id);
        }
    }
}
