//! The grid engine: row selection plus sort, column visibility, column
//! drag-reorder, and row filtering over a tabular element structure.

use tracing::{debug, warn};

use trellis_core::Signal;
use trellis_core::logging::targets;

use crate::composite::{CompositeConfig, SelectionEngine};
use crate::element::{ElementId, ElementTree, attr};
use crate::error::{ConfigError, Result};
use crate::events::{Handled, KeyInput, KeyboardModifiers};

use super::model::{
    ColumnType, GridColumn, GridRow, GridSpec, RowSpec, SelectionUnit, SortCondition, SortKey,
    SortOrder, identity_cmp, identity_eq,
};

/// Per-header geometry captured at drag start.
#[derive(Debug, Clone, Copy)]
struct HeaderGeometry {
    /// Index into the column list.
    column: usize,
    /// Left edge in pixels, recomputed after every swap.
    left: f32,
    /// Layout width in pixels.
    width: f32,
}

/// Transient state of an active column-reorder gesture.
struct DragState {
    /// Column index the gesture started on.
    start: usize,
    /// Position of the dragged entry within `geometry`.
    pos: usize,
    /// Visible headers in display order.
    geometry: Vec<HeaderGeometry>,
    /// Floating visual proxy for the dragged column.
    follower: ElementId,
}

/// A grid: rows as selection-engine members plus the tabular operations.
///
/// The element structure is a `grid` container holding a header `rowgroup`
/// (one `row` of `columnheader` elements carrying `data-type` and
/// `data-key` markers) and a body `rowgroup` of `row` elements carrying
/// `data-id`, each with one `gridcell` per column in column order.
///
/// # Notifications
///
/// - [`sorted`](Self::sorted) after every sort, with the active condition
/// - [`filtered`](Self::filtered) after a row filter, with the visible ids
/// - [`columns_modified`](Self::columns_modified) after visibility or
///   order changes, with the column ids in display order
/// - [`rebuilt`](Self::rebuilt) after a full row rebuild
pub struct GridView {
    grid: ElementId,
    header_row: ElementId,
    body: ElementId,
    columns: Vec<GridColumn>,
    rows: Vec<GridRow>,
    sort: Option<SortCondition>,
    engine: SelectionEngine,
    drag: Option<DragState>,
    /// Row identity the host should bring into view on its next layout
    /// pass.
    pending_reveal: Option<String>,

    /// Emitted after every sort.
    pub sorted: Signal<SortCondition>,
    /// Emitted after a row filter, carrying the visible row identities.
    pub filtered: Signal<Vec<String>>,
    /// Emitted when column visibility or order changed.
    pub columns_modified: Signal<Vec<String>>,
    /// Emitted after a full row rebuild.
    pub rebuilt: Signal<()>,
}

impl GridView {
    /// Wraps an existing `grid` element.
    ///
    /// Fails fast on cell-level selection, a missing header or body
    /// section, a column or row without identity, or a grid with no key
    /// column.
    pub fn new(tree: &mut ElementTree, grid: ElementId, unit: SelectionUnit) -> Result<Self> {
        if unit == SelectionUnit::Cell {
            return Err(ConfigError::CellSelectionUnsupported);
        }
        if !tree.contains(grid) {
            return Err(ConfigError::MissingContainer);
        }

        let groups: Vec<ElementId> = tree
            .children(grid)
            .iter()
            .copied()
            .filter(|&el| tree.tag(el) == "rowgroup")
            .collect();
        let header = *groups.first().ok_or(ConfigError::malformed_grid("header"))?;
        let body = *groups.get(1).ok_or(ConfigError::malformed_grid("body"))?;
        let header_row = tree
            .children(header)
            .iter()
            .copied()
            .find(|&el| tree.tag(el) == "row")
            .ok_or(ConfigError::malformed_grid("header row"))?;

        let mut columns = Vec::new();
        for &h in tree.children(header_row) {
            if tree.tag(h) != "columnheader" {
                continue;
            }
            let id = tree
                .string_id(h)
                .ok_or(ConfigError::malformed_grid("column identity"))?
                .to_string();
            columns.push(GridColumn {
                id,
                ty: ColumnType::parse(tree.attr(h, attr::DATA_TYPE).unwrap_or("")),
                key: tree.attr_is(h, attr::DATA_KEY, "true"),
                hidden: tree.is_hidden(h),
                header: h,
                width: tree.attr(h, "width").and_then(|w| w.parse().ok()).unwrap_or(100.0),
            });
        }
        if !columns.iter().any(|c| c.key) {
            return Err(ConfigError::MissingKeyColumn);
        }

        let mut rows = Vec::new();
        for &r in tree.children(body) {
            if tree.tag(r) != "row" {
                continue;
            }
            let id = tree
                .attr(r, attr::DATA_ID)
                .or_else(|| tree.string_id(r))
                .ok_or(ConfigError::malformed_grid("row identity"))?
                .to_string();
            let mut fields = std::collections::BTreeMap::new();
            for (col, &cell) in columns.iter().zip(tree.children(r)) {
                let value = tree.text_content(cell);
                if !value.is_empty() {
                    fields.insert(col.id.clone(), value);
                }
            }
            rows.push(GridRow { id, fields, element: r });
        }

        // The body rowgroup is the engine container; mirror the grid's
        // multi-select flag onto it.
        if tree.attr_is(grid, attr::MULTISELECTABLE, "true") {
            tree.set_attr(body, attr::MULTISELECTABLE, "true");
        }
        let engine = SelectionEngine::new(tree, body, CompositeConfig::grid_rows())?;

        debug!(
            target: targets::GRID,
            columns = columns.len(),
            rows = rows.len(),
            "grid created"
        );
        Ok(Self {
            grid,
            header_row,
            body,
            columns,
            rows,
            sort: None,
            engine,
            drag: None,
            pending_reveal: None,
            sorted: Signal::new(),
            filtered: Signal::new(),
            columns_modified: Signal::new(),
            rebuilt: Signal::new(),
        })
    }

    /// Builds a grid by rendering a [`GridSpec`] into new elements.
    pub fn from_spec(tree: &mut ElementTree, spec: &GridSpec, unit: SelectionUnit) -> Result<Self> {
        let grid = tree.alloc("grid");
        if spec.multiselectable {
            tree.set_attr(grid, attr::MULTISELECTABLE, "true");
        }

        let header = tree.alloc("rowgroup");
        tree.append_child(grid, header);
        let header_row = tree.alloc("row");
        tree.append_child(header, header_row);
        for col in &spec.columns {
            let h = tree.alloc_with_id("columnheader", col.id.clone());
            tree.set_text(h, col.label.clone());
            tree.set_attr(h, attr::DATA_TYPE, col.ty.name());
            tree.set_attr(h, "width", col.width.to_string());
            if col.key {
                tree.set_attr(h, attr::DATA_KEY, "true");
            }
            if col.hidden {
                tree.set_hidden(h, true);
            }
            tree.append_child(header_row, h);
        }

        let body = tree.alloc("rowgroup");
        tree.append_child(grid, body);

        let mut this = Self::new(tree, grid, unit)?;
        for row in &spec.rows {
            this.append_row(tree, row);
        }
        Ok(this)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The `grid` container element.
    pub fn container(&self) -> ElementId {
        self.grid
    }

    /// Columns in display order.
    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    /// Column identities in display order.
    pub fn column_ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Row identities in display order.
    pub fn row_ids(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }

    /// The row with the given identity, if present.
    pub fn row(&self, id: &str) -> Option<&GridRow> {
        self.rows.iter().find(|r| identity_eq(&r.id, id))
    }

    /// The active sort condition, if any.
    pub fn sort_condition(&self) -> Option<&SortCondition> {
        self.sort.as_ref()
    }

    /// The underlying selection engine over the body rows.
    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    /// The underlying selection engine, mutably (to connect signals).
    pub fn engine_mut(&mut self) -> &mut SelectionEngine {
        &mut self.engine
    }

    /// Takes the row identity the host should bring into view, set by
    /// sorting (last selected row) and filtering (first visible row).
    pub fn take_pending_reveal(&mut self) -> Option<String> {
        self.pending_reveal.take()
    }

    /// Handles a key press against the row selection.
    pub fn key_input(&mut self, tree: &mut ElementTree, input: &KeyInput) -> Handled {
        self.engine.key_input(tree, input)
    }

    /// Handles a pointer press on a row.
    pub fn pointer_select(
        &mut self,
        tree: &mut ElementTree,
        target: ElementId,
        modifiers: KeyboardModifiers,
    ) -> Handled {
        self.engine.pointer_select(tree, target, modifiers)
    }

    // =========================================================================
    // Sort
    // =========================================================================

    /// Sorts the rows by a column.
    ///
    /// Reselecting the active key without an explicit order toggles the
    /// direction; a new key resets to ascending. The comparison is driven
    /// by the column's declared type; rows whose value normalizes to
    /// missing sort last in both directions, and ties fall back to row
    /// identity so the order is deterministic. Row elements are reordered
    /// to match and the previously last-selected row is queued for reveal.
    pub fn sort(&mut self, tree: &mut ElementTree, key: &str, order: Option<SortOrder>) {
        let Some(col) = self.columns.iter().find(|c| c.id == key) else {
            warn!(target: targets::GRID, key, "sort on unknown column ignored");
            return;
        };
        let order = order.unwrap_or_else(|| match &self.sort {
            Some(cond) if cond.key == key => cond.order.toggled(),
            _ => SortOrder::Ascending,
        });
        let ty = col.ty;
        let col_id = col.id.clone();

        let mut decorated: Vec<(SortKey, GridRow)> = self
            .rows
            .drain(..)
            .map(|row| {
                let sort_key = SortKey::normalize(row.fields.get(&col_id).map(String::as_str), ty);
                (sort_key, row)
            })
            .collect();
        decorated.sort_by(|a, b| {
            a.0.compare(&b.0, order).then_with(|| identity_cmp(&a.1.id, &b.1.id))
        });
        self.rows = decorated.into_iter().map(|(_, row)| row).collect();

        let row_order: Vec<ElementId> = self.rows.iter().map(|r| r.element).collect();
        tree.reorder_children(self.body, &row_order);

        for c in &self.columns {
            if c.id == key {
                tree.set_attr(c.header, attr::SORT, order.marker());
            } else {
                tree.remove_attr(c.header, attr::SORT);
            }
        }

        self.pending_reveal = self
            .engine
            .selection()
            .last()
            .and_then(|&el| tree.attr(el, attr::DATA_ID))
            .map(str::to_string);
        self.engine.refresh(tree);

        let condition = SortCondition { key: key.to_string(), order };
        debug!(target: targets::GRID, key, order = order.marker(), "rows sorted");
        self.sort = Some(condition.clone());
        self.sorted.emit(condition);
    }

    // =========================================================================
    // Column visibility
    // =========================================================================

    /// Shows or hides a column: its header and every cell in its position.
    ///
    /// The key column can never be hidden.
    pub fn set_column_hidden(&mut self, tree: &mut ElementTree, id: &str, hidden: bool) {
        let Some(pos) = self.columns.iter().position(|c| c.id == id) else {
            warn!(target: targets::GRID, id, "visibility toggle on unknown column ignored");
            return;
        };
        if self.columns[pos].key && hidden {
            warn!(target: targets::GRID, id, "key column cannot be hidden");
            return;
        }
        if self.columns[pos].hidden == hidden {
            return;
        }

        self.columns[pos].hidden = hidden;
        tree.set_hidden(self.columns[pos].header, hidden);
        for row in &self.rows {
            let cell = tree.children(row.element).get(pos).copied();
            if let Some(cell) = cell {
                tree.set_hidden(cell, hidden);
            }
        }
        self.engine.refresh(tree);
        debug!(target: targets::GRID, id, hidden, "column visibility changed");
        self.columns_modified.emit(self.column_ids());
    }

    // =========================================================================
    // Column drag reorder
    // =========================================================================

    /// Starts a column-reorder gesture on a header.
    ///
    /// Captures per-header geometry for the visible columns and spawns the
    /// floating follower. The key column cannot be dragged.
    pub fn begin_drag(&mut self, tree: &mut ElementTree, column_id: &str) -> Handled {
        if self.drag.is_some() {
            warn!(target: targets::GRID, "drag already active");
            return Handled::No;
        }
        let Some(start) = self.columns.iter().position(|c| c.id == column_id) else {
            warn!(target: targets::GRID, column_id, "drag on unknown column ignored");
            return Handled::No;
        };
        if self.columns[start].key {
            warn!(target: targets::GRID, column_id, "key column cannot be dragged");
            return Handled::No;
        }
        if self.columns[start].hidden {
            return Handled::No;
        }

        let mut geometry = Vec::new();
        let mut left = 0.0;
        for (index, col) in self.columns.iter().enumerate() {
            if col.hidden {
                continue;
            }
            geometry.push(HeaderGeometry { column: index, left, width: col.width });
            left += col.width;
        }
        let pos = geometry
            .iter()
            .position(|g| g.column == start)
            .expect("dragged column is visible");

        let follower = tree.alloc("follower");
        tree.set_text(follower, tree.text_content(self.columns[start].header));
        tree.set_attr(follower, "left", geometry[pos].left.to_string());
        tree.append_child(self.grid, follower);
        tree.set_attr(self.columns[start].header, attr::GRABBED, "true");

        debug!(target: targets::GRID, column_id, "column drag started");
        self.drag = Some(DragState { start, pos, geometry, follower });
        Handled::Yes
    }

    /// Advances the gesture to pointer position `x`.
    ///
    /// The dragged column swaps with a neighbor whenever the pointer
    /// crosses that neighbor's midpoint; only the in-memory geometry and
    /// the follower move, the real headers are untouched until release.
    pub fn drag_to(&mut self, tree: &mut ElementTree, x: f32) {
        let Some(mut drag) = self.drag.take() else {
            return;
        };

        loop {
            let pos = drag.pos;
            if pos > 0 {
                let left = &drag.geometry[pos - 1];
                if x < left.left + left.width / 2.0 && !self.columns[left.column].key {
                    drag.geometry.swap(pos - 1, pos);
                    Self::reflow(&mut drag.geometry);
                    drag.pos = pos - 1;
                    continue;
                }
            }
            if pos + 1 < drag.geometry.len() {
                let right = &drag.geometry[pos + 1];
                if x > right.left + right.width / 2.0 && !self.columns[right.column].key {
                    drag.geometry.swap(pos, pos + 1);
                    Self::reflow(&mut drag.geometry);
                    drag.pos = pos + 1;
                    continue;
                }
            }
            break;
        }

        tree.set_attr(drag.follower, "left", x.to_string());
        self.drag = Some(drag);
    }

    /// Recomputes left offsets after a geometry swap.
    fn reflow(geometry: &mut [HeaderGeometry]) {
        let mut left = 0.0;
        for g in geometry {
            g.left = left;
            left += g.width;
        }
    }

    /// Ends the gesture, committing the reorder if the dragged column
    /// landed on a new position.
    ///
    /// Cleanup (grabbed marker, follower) happens regardless of whether a
    /// reorder occurred.
    pub fn end_drag(&mut self, tree: &mut ElementTree) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        tree.remove_attr(self.columns[drag.start].header, attr::GRABBED);
        tree.remove(drag.follower);

        // Final occupant of every visible slot, hidden columns staying put.
        let visible_slots: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.hidden)
            .map(|(i, _)| i)
            .collect();
        let mut order: Vec<usize> = (0..self.columns.len()).collect();
        for (&slot, geo) in visible_slots.iter().zip(&drag.geometry) {
            order[slot] = geo.column;
        }
        if order.iter().enumerate().all(|(i, &c)| i == c) {
            debug!(target: targets::GRID, "column drag ended without reorder");
            return;
        }

        self.columns = order.iter().map(|&i| self.columns[i].clone()).collect();
        let headers: Vec<ElementId> = self.columns.iter().map(|c| c.header).collect();
        tree.reorder_children(self.header_row, &headers);
        for row in &self.rows {
            let cells = tree.children(row.element).to_vec();
            if cells.len() == order.len() {
                let reordered: Vec<ElementId> = order.iter().map(|&i| cells[i]).collect();
                tree.reorder_children(row.element, &reordered);
            }
        }

        self.engine.refresh(tree);
        debug!(target: targets::GRID, "columns reordered");
        self.columns_modified.emit(self.column_ids());
    }

    /// Abandons the gesture without reordering. Cleanup still happens.
    pub fn cancel_drag(&mut self, tree: &mut ElementTree) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        tree.remove_attr(self.columns[drag.start].header, attr::GRABBED);
        tree.remove(drag.follower);
        debug!(target: targets::GRID, "column drag cancelled");
    }

    // =========================================================================
    // Row filter
    // =========================================================================

    /// Hides every row whose identity is not in `allow`.
    ///
    /// Identity equality is tried as string, falling back to numeric
    /// comparison when both sides parse as numbers. Selected rows that
    /// became hidden are dropped from the selection, and the scroll
    /// position resets to the first visible row.
    pub fn filter_rows(&mut self, tree: &mut ElementTree, allow: &[String]) {
        let mut visible = Vec::new();
        for row in &self.rows {
            let keep = allow.iter().any(|id| identity_eq(id, &row.id));
            tree.set_hidden(row.element, !keep);
            if keep {
                visible.push(row.id.clone());
            }
        }
        self.engine.refresh(tree);
        self.pending_reveal = visible.first().cloned();
        debug!(target: targets::GRID, visible = visible.len(), "rows filtered");
        self.filtered.emit(visible);
    }

    // =========================================================================
    // Row data
    // =========================================================================

    /// Updates one field, re-rendering only the affected cell.
    pub fn set_field(&mut self, tree: &mut ElementTree, row_id: &str, column_id: &str, value: impl Into<String>) {
        let Some(pos) = self.columns.iter().position(|c| c.id == column_id) else {
            warn!(target: targets::GRID, column_id, "field update on unknown column ignored");
            return;
        };
        let Some(row) = self.rows.iter_mut().find(|r| identity_eq(&r.id, row_id)) else {
            warn!(target: targets::GRID, row_id, "field update on unknown row ignored");
            return;
        };
        let value = value.into();
        row.fields.insert(column_id.to_string(), value.clone());
        let cell = tree.children(row.element).get(pos).copied();
        if let Some(cell) = cell {
            tree.set_text(cell, value);
        }
    }

    /// Appends a row rendered from a spec. Duplicate identities are
    /// rejected.
    pub fn append_row(&mut self, tree: &mut ElementTree, spec: &RowSpec) {
        if self.rows.iter().any(|r| identity_eq(&r.id, &spec.id)) {
            warn!(target: targets::GRID, id = %spec.id, "append of duplicate row identity ignored");
            return;
        }
        let row = self.render_row(tree, spec);
        self.rows.push(row);
        self.engine.refresh(tree);
    }

    /// Removes a row and its element subtree.
    pub fn remove_row(&mut self, tree: &mut ElementTree, row_id: &str) {
        let Some(pos) = self.rows.iter().position(|r| identity_eq(&r.id, row_id)) else {
            warn!(target: targets::GRID, row_id, "removal of unknown row ignored");
            return;
        };
        let row = self.rows.remove(pos);
        tree.remove(row.element);
        self.engine.refresh(tree);
    }

    /// Replaces every row with ones rendered from `rows` and clears the
    /// sort condition.
    pub fn rebuild(&mut self, tree: &mut ElementTree, rows: &[RowSpec]) {
        for row in self.rows.drain(..) {
            tree.remove(row.element);
        }
        for spec in rows {
            let row = self.render_row(tree, spec);
            self.rows.push(row);
        }
        for c in &self.columns {
            tree.remove_attr(c.header, attr::SORT);
        }
        self.sort = None;
        self.engine.refresh(tree);
        debug!(target: targets::GRID, rows = rows.len(), "grid rebuilt");
        self.rebuilt.emit(());
    }

    fn render_row(&self, tree: &mut ElementTree, spec: &RowSpec) -> GridRow {
        let el = tree.alloc_with_id("row", spec.id.clone());
        tree.set_attr(el, attr::DATA_ID, spec.id.clone());
        for col in &self.columns {
            let cell = tree.alloc("gridcell");
            if let Some(value) = spec.fields.get(&col.id) {
                tree.set_text(cell, value.clone());
            }
            if col.hidden {
                tree.set_hidden(cell, true);
            }
            tree.append_child(el, cell);
        }
        tree.append_child(self.body, el);
        GridRow { id: spec.id.clone(), fields: spec.fields.clone(), element: el }
    }
}
