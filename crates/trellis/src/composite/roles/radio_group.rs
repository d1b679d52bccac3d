//! Radio group role adapter.

use crate::composite::{CompositeConfig, SelectionEngine};
use crate::element::{ElementId, ElementTree};
use crate::error::Result;
use crate::events::{Handled, KeyInput, KeyboardModifiers};

use super::ItemSpec;

/// A radio group: single-select with the `aria-checked` marker, cycling
/// navigation on all four arrow keys, and no type-ahead.
pub struct RadioGroup {
    engine: SelectionEngine,
}

impl RadioGroup {
    /// Wraps an existing container element.
    pub fn new(tree: &ElementTree, container: ElementId) -> Result<Self> {
        Ok(Self {
            engine: SelectionEngine::new(tree, container, CompositeConfig::radio_group())?,
        })
    }

    /// Builds a radio group by rendering `items` into a new container.
    pub fn from_items(tree: &mut ElementTree, items: &[ItemSpec]) -> Result<Self> {
        let container = tree.alloc("radiogroup");
        for spec in items {
            super::render_item(tree, container, "radio", spec);
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

    /// The checked radio, if any.
    pub fn checked(&self) -> Option<ElementId> {
        self.engine.selection().first().copied()
    }

    /// Handles a key press.
    pub fn key_input(&mut self, tree: &mut ElementTree, input: &KeyInput) -> Handled {
        self.engine.key_input(tree, input)
    }

    /// Handles a pointer press on a radio.
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
