//! List box role adapter.

use crate::composite::{CompositeConfig, SelectionEngine};
use crate::element::{ElementId, ElementTree, attr};
use crate::error::Result;
use crate::events::{Handled, KeyInput, KeyboardModifiers};

use super::ItemSpec;

/// A list box: flat one-of/many-of selection with type-ahead.
///
/// Multi-select is taken from the container's `aria-multiselectable`
/// attribute. The adapter adds nothing beyond the shared engine; it exists
/// so list boxes are constructed and driven the same way as every other
/// role.
pub struct ListBox {
    engine: SelectionEngine,
}

impl ListBox {
    /// Wraps an existing container element.
    pub fn new(tree: &ElementTree, container: ElementId) -> Result<Self> {
        Ok(Self {
            engine: SelectionEngine::new(tree, container, CompositeConfig::list_box())?,
        })
    }

    /// Builds a list box by rendering `items` into a new container.
    pub fn from_items(
        tree: &mut ElementTree,
        items: &[ItemSpec],
        multiselectable: bool,
    ) -> Result<Self> {
        let container = tree.alloc("listbox");
        if multiselectable {
            tree.set_attr(container, attr::MULTISELECTABLE, "true");
        }
        for spec in items {
            super::render_item(tree, container, "option", spec);
        }
        Self::new(tree, container)
    }

    /// The underlying selection engine.
    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    /// The underlying selection engine, mutably (to connect signals).
    pub fn engine_mut(&mut self) -> &mut SelectionEngine {
        &mut self.engine
    }

    /// The container element.
    pub fn container(&self) -> ElementId {
        self.engine.container()
    }

    /// Handles a key press.
    pub fn key_input(&mut self, tree: &mut ElementTree, input: &KeyInput) -> Handled {
        self.engine.key_input(tree, input)
    }

    /// Handles a pointer press on an option.
    pub fn pointer_select(
        &mut self,
        tree: &mut ElementTree,
        target: ElementId,
        modifiers: KeyboardModifiers,
    ) -> Handled {
        self.engine.pointer_select(tree, target, modifiers)
    }

    /// Recomputes membership after a structural mutation.
    pub fn refresh(&mut self, tree: &mut ElementTree) {
        self.engine.refresh(tree);
    }
}
