//! Composite widgets: the element registry, the shared selection engine,
//! and the role adapters built on it.
//!
//! A *composite* is any widget whose state is a one-of/many-of selection
//! over a set of member elements. The decision logic lives in one place,
//! [`SelectionEngine`], and every role (list box, tree, menu, tab list,
//! radio group, grid rows) configures it through a [`CompositeConfig`]
//! instead of reimplementing it.

mod engine;
mod registry;
pub mod roles;

pub use engine::{
    CompositeConfig, MultiSelectPolicy, Orientation, SEARCH_RESET, SelectionChange,
    SelectionEngine,
};
pub use registry::{ItemRule, MarkerAttr, Membership};
