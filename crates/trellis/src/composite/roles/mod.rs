//! Role adapters: per-role configuration of the shared selection engine.
//!
//! Each adapter supplies an item-matching rule, a multi-select policy, and
//! cycling/type-ahead flags through [`CompositeConfig`](super::CompositeConfig),
//! and layers role-specific handlers that run *before* falling back to the
//! shared engine: tree expand/collapse, menu submenu open/close, tab-panel
//! switching. Adapters never mutate selection state around the engine.

mod list_box;
mod menu;
mod radio_group;
mod tab_list;
mod tree_role;

pub use list_box::ListBox;
pub use menu::{CommandSelected, Menu, MenuItemSpec};
pub use radio_group::RadioGroup;
pub use tab_list::TabList;
pub use tree_role::{Tree, TreeItemSpec};

use serde::Deserialize;

/// Declarative description of a flat item (list box, radio group).
///
/// Widgets built from these render their own elements; widgets wrapped
/// around an existing element tree ignore them.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    /// Stable identity.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Whether the item starts disabled.
    #[serde(default)]
    pub disabled: bool,
}

impl ItemSpec {
    /// Creates an enabled item spec.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: false,
        }
    }
}

pub(crate) fn render_item(
    tree: &mut crate::element::ElementTree,
    parent: crate::element::ElementId,
    tag: &str,
    spec: &ItemSpec,
) -> crate::element::ElementId {
    use crate::element::attr;

    let el = tree.alloc_with_id(tag, spec.id.clone());
    tree.set_text(el, spec.label.clone());
    if spec.disabled {
        tree.set_attr(el, attr::DISABLED, "true");
    }
    tree.append_child(parent, el);
    el
}
