//! End-to-end grid scenarios: build from a declarative spec, sort, hide,
//! filter, and observe notifications through the deferred dispatch queue.

use std::cell::RefCell;
use std::rc::Rc;

use trellis::element::{ElementTree, attr};
use trellis::events::KeyboardModifiers;
use trellis::grid::{GridSpec, GridView, SelectionUnit, SortCondition, SortOrder};
use trellis_core::dispatch;

fn tasks_grid() -> (ElementTree, GridView) {
    let manifest = r#"{
        "columns": [
            { "id": "name", "label": "Name", "key": true },
            { "id": "count", "label": "Count", "type": "integer" }
        ],
        "rows": [
            { "id": "alpha", "fields": { "name": "Alpha", "count": "30" } },
            { "id": "beta",  "fields": { "name": "Beta",  "count": "10" } },
            { "id": "gamma", "fields": { "name": "Gamma", "count": "20" } }
        ],
        "multiselectable": true
    }"#;
    let spec: GridSpec = serde_json::from_str(manifest).expect("manifest parses");
    let mut tree = ElementTree::new();
    let grid = GridView::from_spec(&mut tree, &spec, SelectionUnit::Row).expect("grid builds");
    (tree, grid)
}

/// Header clicks toggle the integer sort; hiding the string column leaves
/// row identities and the sort untouched.
#[test]
fn test_sort_toggle_then_hide_column() {
    let (mut tree, mut grid) = tasks_grid();

    // First activation of the count header sorts ascending.
    grid.sort(&mut tree, "count", None);
    assert_eq!(grid.row_ids(), vec!["beta", "gamma", "alpha"]);
    assert_eq!(
        grid.sort_condition(),
        Some(&SortCondition { key: "count".to_string(), order: SortOrder::Ascending })
    );

    // Second activation toggles to descending.
    grid.sort(&mut tree, "count", None);
    assert_eq!(grid.row_ids(), vec!["alpha", "gamma", "beta"]);

    // Hiding the name column removes its header and cells from view but
    // leaves the rows and their order alone. The key column is "name", so
    // hide "count" instead to exercise a hideable column.
    grid.set_column_hidden(&mut tree, "count", true);
    let count_header = grid.columns()[1].header;
    assert!(tree.is_hidden(count_header));
    for row in grid.rows() {
        assert!(tree.is_hidden(tree.children(row.element)[1]));
    }
    assert_eq!(grid.row_ids(), vec!["alpha", "gamma", "beta"]);
    assert_eq!(grid.engine().members().len(), 3);
}

/// Notifications arrive after the triggering call, in transition order.
#[test]
fn test_notifications_are_deferred_and_ordered() {
    let (mut tree, mut grid) = tasks_grid();
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let log_sorted = log.clone();
    grid.sorted
        .connect(move |cond| log_sorted.borrow_mut().push(format!("sorted:{}", cond.key)));
    let log_selected = log.clone();
    grid.engine_mut()
        .selection_changed
        .connect(move |change| log_selected.borrow_mut().push(format!("selected:{}", change.ids.len())));
    let log_filtered = log.clone();
    grid.filtered
        .connect(move |ids| log_filtered.borrow_mut().push(format!("filtered:{}", ids.len())));

    grid.sort(&mut tree, "count", None);
    let first = grid.engine().members()[0];
    let _ = grid.pointer_select(&mut tree, first, KeyboardModifiers::NONE);
    grid.filter_rows(&mut tree, &["beta".to_string()]);

    assert!(log.borrow().is_empty(), "nothing delivered before drain");
    dispatch::drain();
    assert_eq!(
        *log.borrow(),
        vec!["sorted:count".to_string(), "selected:1".to_string(), "filtered:1".to_string()]
    );
}

/// Filtering away the selected row drops it from the selection and the
/// remaining rows stay selectable.
#[test]
fn test_filter_then_reselect() {
    let (mut tree, mut grid) = tasks_grid();
    let alpha = grid.row("alpha").unwrap().element;
    let _ = grid.pointer_select(&mut tree, alpha, KeyboardModifiers::NONE);

    grid.filter_rows(&mut tree, &["beta".to_string(), "gamma".to_string()]);
    assert!(grid.engine().selection().is_empty());

    let beta = grid.row("beta").unwrap().element;
    assert!(grid.pointer_select(&mut tree, beta, KeyboardModifiers::NONE).is_handled());
    assert_eq!(grid.engine().selection(), &[beta]);
    assert!(tree.attr_is(beta, attr::SELECTED, "true"));
}

/// A drag that reorders columns keeps every row's cells aligned with the
/// new column order.
#[test]
fn test_drag_reorder_keeps_cells_aligned() {
    let (mut tree, mut grid) = tasks_grid();

    assert!(grid.begin_drag(&mut tree, "count").is_handled());
    // The name column is the key and cannot be displaced; dragging far
    // left leaves the order unchanged.
    grid.drag_to(&mut tree, 10.0);
    grid.end_drag(&mut tree);
    assert_eq!(grid.column_ids(), vec!["name", "count"]);

    for row in grid.rows() {
        let cells = tree.children(row.element);
        assert_eq!(tree.text_content(cells[0]), row.fields["name"].as_str());
        assert_eq!(tree.text_content(cells[1]), row.fields["count"].as_str());
    }
}
