//! Grid engine: tabular rows as selection members, plus stable type-driven
//! sorting, column visibility, drag-based column reordering, and row
//! filtering.
//!
//! # Example
//!
//! ```ignore
//! use trellis::grid::{GridSpec, GridView, SelectionUnit, SortOrder};
//!
//! let spec: GridSpec = serde_json::from_str(manifest)?;
//! let mut grid = GridView::from_spec(&mut tree, &spec, SelectionUnit::Row)?;
//! grid.sorted.connect(|cond| println!("sorted by {}", cond.key));
//! grid.sort(&mut tree, "priority", None);
//! trellis_core::dispatch::drain();
//! ```

mod model;
mod view;

pub use model::{
    ColumnSpec, ColumnType, GridColumn, GridRow, GridSpec, RowSpec, SelectionUnit, SortCondition,
    SortOrder,
};
pub use view::GridView;
