//! Tab list role adapter: horizontal selection synchronized with panels.

use tracing::{debug, warn};

use trellis_core::logging::targets;

use crate::composite::{CompositeConfig, SelectionEngine};
use crate::element::{ElementId, ElementTree, attr};
use crate::error::Result;
use crate::events::{Handled, KeyInput, KeyboardModifiers};

use super::ItemSpec;

/// A tab list: single-select horizontal navigation where the selected tab
/// determines the visible panel.
///
/// Each tab names its panel through `aria-controls`; the adapter hides
/// every controlled panel except the selected tab's. Panel visibility is
/// reconciled synchronously within the same transition that changed the
/// selection, before any deferred notifications are delivered.
pub struct TabList {
    engine: SelectionEngine,
}

impl TabList {
    /// Wraps an existing `tablist` container element and reconciles panel
    /// visibility with the current selection.
    pub fn new(tree: &mut ElementTree, container: ElementId) -> Result<Self> {
        let mut this = Self {
            engine: SelectionEngine::new(tree, container, CompositeConfig::tab_list())?,
        };
        if this.engine.selection().is_empty()
            && let Some(&first) = this.engine.members().first()
        {
            this.engine.set_selection(tree, &[first]);
        }
        this.sync_panels(tree);
        Ok(this)
    }

    /// Builds a tab list with one panel per tab under a shared wrapper.
    ///
    /// Panels get the identity `<tab-id>-panel` and start empty; the first
    /// enabled tab is selected.
    pub fn from_items(tree: &mut ElementTree, items: &[ItemSpec]) -> Result<Self> {
        let root = tree.alloc("group");
        let tablist = tree.alloc("tablist");
        tree.append_child(root, tablist);

        for spec in items {
            let tab = super::render_item(tree, tablist, "tab", spec);
            let panel_id = format!("{}-panel", spec.id);
            tree.set_attr(tab, attr::CONTROLS, panel_id.clone());

            let panel = tree.alloc_with_id("tabpanel", panel_id);
            tree.set_attr(panel, attr::LABELLED_BY, spec.id.clone());
            tree.append_child(root, panel);
        }
        Self::new(tree, tablist)
    }

    /// The underlying selection engine.
    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    /// The underlying selection engine, mutably (to connect signals).
    pub fn engine_mut(&mut self) -> &mut SelectionEngine {
        &mut self.engine
    }

    /// The `tablist` container element.
    pub fn container(&self) -> ElementId {
        self.engine.container()
    }

    /// The panel controlled by a tab, resolved through `aria-controls`.
    pub fn panel_for(&self, tree: &ElementTree, tab: ElementId) -> Option<ElementId> {
        let panel_id = tree.attr(tab, attr::CONTROLS)?;
        tree.element_by_string_id(panel_id)
    }

    /// The currently selected tab, if any.
    pub fn selected_tab(&self) -> Option<ElementId> {
        self.engine.selection().first().copied()
    }

    /// Hides every controlled panel except the selected tab's.
    fn sync_panels(&self, tree: &mut ElementTree) {
        let selected = self.selected_tab();
        for &tab in self.engine.members() {
            let Some(panel) = self.panel_for(tree, tab) else {
                warn!(target: targets::ROLE, "tab without a resolvable panel");
                continue;
            };
            tree.set_hidden(panel, selected != Some(tab));
        }
        debug!(target: targets::ROLE, "panel visibility reconciled");
    }

    /// Handles a key press, then reconciles panel visibility.
    pub fn key_input(&mut self, tree: &mut ElementTree, input: &KeyInput) -> Handled {
        let handled = self.engine.key_input(tree, input);
        if handled.is_handled() {
            self.sync_panels(tree);
        }
        handled
    }

    /// Handles a pointer press on a tab, then reconciles panel visibility.
    pub fn pointer_select(
        &mut self,
        tree: &mut ElementTree,
        target: ElementId,
        modifiers: KeyboardModifiers,
    ) -> Handled {
        let handled = self.engine.pointer_select(tree, target, modifiers);
        if handled.is_handled() {
            self.sync_panels(tree);
        }
        handled
    }

    /// Recomputes membership after a structural mutation and reconciles
    /// panel visibility.
    pub fn refresh(&mut self, tree: &mut ElementTree) {
        self.engine.refresh(tree);
        self.sync_panels(tree);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Key;

    fn fixture() -> (ElementTree, TabList) {
        let mut tree = ElementTree::new();
        let items = vec![
            ItemSpec::new("overview", "Overview"),
            ItemSpec::new("detail", "Detail"),
            ItemSpec::new("history", "History"),
        ];
        let tabs = TabList::from_items(&mut tree, &items).unwrap();
        (tree, tabs)
    }

    #[test]
    fn test_first_tab_and_panel_start_active() {
        let (tree, tabs) = fixture();
        let first = tabs.engine().members()[0];
        assert_eq!(tabs.selected_tab(), Some(first));

        let panel = tabs.panel_for(&tree, first).unwrap();
        assert!(tree.is_visible(panel));
        let second = tabs.engine().members()[1];
        assert!(!tree.is_visible(tabs.panel_for(&tree, second).unwrap()));
    }

    #[test]
    fn test_arrow_right_switches_tab_and_panel() {
        let (mut tree, mut tabs) = fixture();
        let handled = tabs.key_input(&mut tree, &KeyInput::plain(Key::ArrowRight));
        assert!(handled.is_handled());

        let second = tabs.engine().members()[1];
        assert_eq!(tabs.selected_tab(), Some(second));
        assert!(tree.is_visible(tabs.panel_for(&tree, second).unwrap()));
        let first = tabs.engine().members()[0];
        assert!(!tree.is_visible(tabs.panel_for(&tree, first).unwrap()));
    }

    #[test]
    fn test_navigation_cycles_past_the_ends() {
        let (mut tree, mut tabs) = fixture();
        let _ = tabs.key_input(&mut tree, &KeyInput::plain(Key::ArrowLeft));
        let last = *tabs.engine().members().last().unwrap();
        assert_eq!(tabs.selected_tab(), Some(last));
        assert!(tree.is_visible(tabs.panel_for(&tree, last).unwrap()));
    }

    #[test]
    fn test_multiselectable_container_is_rejected() {
        let mut tree = ElementTree::new();
        let container = tree.alloc("tablist");
        tree.set_attr(container, attr::MULTISELECTABLE, "true");
        assert!(TabList::new(&mut tree, container).is_err());
    }
}
