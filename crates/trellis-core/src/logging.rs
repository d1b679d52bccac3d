//! Logging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```

/// Span names used throughout Trellis for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Selection engine transition span.
    pub const TRANSITION: &str = "trellis::transition";
    /// Grid sort span.
    pub const SORT: &str = "trellis::sort";
    /// Column drag gesture span.
    pub const COLUMN_DRAG: &str = "trellis::column_drag";
    /// Deferred dispatch drain span.
    pub const DISPATCH: &str = "trellis::dispatch";
    /// Signal emission span.
    pub const SIGNAL: &str = "trellis::signal";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem,
/// for example `RUST_LOG=trellis::engine=trace`.
pub mod targets {
    /// Element tree and registry operations.
    pub const ELEMENT: &str = "trellis::element";
    /// Selection engine transitions.
    pub const ENGINE: &str = "trellis::engine";
    /// Role adapter behavior (tree, menu, tab list).
    pub const ROLE: &str = "trellis::role";
    /// Grid sort/filter/reorder operations.
    pub const GRID: &str = "trellis::grid";
    /// Signal and dispatch plumbing.
    pub const DISPATCH: &str = "trellis::dispatch";
}
