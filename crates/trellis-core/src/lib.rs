//! Core systems for Trellis.
//!
//! This crate provides the foundational components of the Trellis widget
//! toolkit:
//!
//! - **Signal/Slot System**: Type-safe notifications between widgets and
//!   application code
//! - **Deferred Dispatch**: A per-thread queue that delivers notifications
//!   after the triggering input handler has finished
//! - **Error Types**: Shared error definitions
//! - **Logging**: `tracing` target and span-name constants
//!
//! # Signal Example
//!
//! ```
//! use trellis_core::{dispatch, Signal};
//!
//! // Create a signal that passes a string argument
//! let label_changed = Signal::<String>::new();
//!
//! // Connect a slot (closure). Delivery is deferred by default.
//! let conn_id = label_changed.connect(|label| {
//!     println!("Label changed to: {}", label);
//! });
//!
//! // Emit the signal, then drain the dispatch queue to deliver it
//! label_changed.emit("Hello".to_string());
//! dispatch::drain();
//!
//! // Disconnect when done
//! label_changed.disconnect(conn_id);
//! ```
//!
//! # Dispatch Model
//!
//! Trellis widgets run synchronously inside input-event handlers on a single
//! interaction thread. Notifications are queued during a handler and
//! delivered, in order, once the handler returns. This guarantees a
//! notification handler never observes half-updated widget state and cannot
//! re-enter an engine mid-transition. Call [`dispatch::drain`] from the host
//! event loop after each input event.

mod dispatch_queue;
mod error;
pub mod logging;
mod signal;

pub mod dispatch {
    //! Deferred notification dispatch. See [`drain`](crate::dispatch::drain).
    pub use crate::dispatch_queue::{drain, enqueue, pending};
}

pub use error::{CoreError, Result, SignalError};
pub use signal::{ConnectionGuard, ConnectionId, DispatchMode, Signal};
