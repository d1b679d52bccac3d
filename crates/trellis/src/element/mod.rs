//! Element tree: the structural substrate widgets are built on.
//!
//! Trellis widgets do not own pixels; they own *decision logic* over a tree
//! of elements. An [`ElementTree`] is an arena of [`Element`] nodes with
//! tags, attributes, text, and document order. Widget semantics (selection
//! markers, disabled/hidden flags, the roving tab stop) are read and written
//! through the attribute conventions in [`attrs`].

mod attrs;
mod tree;

pub use attrs::attr;
pub use tree::{Element, ElementId, ElementTree};
