//! Prelude module for Trellis.
//!
//! This module re-exports the most commonly used types for convenient
//! importing:
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```
//!
//! This provides access to:
//! - The element tree (`ElementTree`, `ElementId`, `attr`)
//! - The selection engine (`SelectionEngine`, `CompositeConfig`, `SelectionChange`)
//! - Role adapters (`ListBox`, `Tree`, `Menu`, `TabList`, `RadioGroup`)
//! - The grid engine (`GridView`, `GridSpec`, `SortOrder`)
//! - Input types (`Key`, `KeyInput`, `KeyboardModifiers`, `Handled`)

// ============================================================================
// Element Tree
// ============================================================================

pub use crate::element::{Element, ElementId, ElementTree, attr};

// ============================================================================
// Selection Engine
// ============================================================================

pub use crate::composite::{
    CompositeConfig, ItemRule, MarkerAttr, MultiSelectPolicy, Orientation, SelectionChange,
    SelectionEngine,
};

// ============================================================================
// Role Adapters
// ============================================================================

pub use crate::composite::roles::{
    CommandSelected, ItemSpec, ListBox, Menu, MenuItemSpec, RadioGroup, TabList, Tree,
    TreeItemSpec,
};

// ============================================================================
// Grid Engine
// ============================================================================

pub use crate::grid::{
    ColumnSpec, ColumnType, GridColumn, GridRow, GridSpec, GridView, RowSpec, SelectionUnit,
    SortCondition, SortOrder,
};

// ============================================================================
// Input and Errors
// ============================================================================

pub use crate::error::{ConfigError, Result};
pub use crate::events::{Handled, Key, KeyInput, KeyboardModifiers};

pub use trellis_core::{ConnectionId, DispatchMode, Signal, dispatch};
