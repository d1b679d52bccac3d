//! Tree role adapter: hierarchical selection with expand/collapse.

use serde::Deserialize;
use tracing::debug;

use trellis_core::logging::targets;

use crate::composite::{CompositeConfig, SelectionEngine};
use crate::element::{ElementId, ElementTree, attr};
use crate::error::Result;
use crate::events::{Handled, Key, KeyInput, KeyboardModifiers};

/// Declarative description of a tree item, possibly with children.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeItemSpec {
    /// Stable identity.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Whether the item starts disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Child items, rendered into a collapsed subgroup.
    #[serde(default)]
    pub children: Vec<TreeItemSpec>,
}

/// A tree: list-like selection where items may own collapsible subgroups.
///
/// ArrowRight expands the focused item's subgroup, ArrowLeft collapses it;
/// everything else falls back to the shared engine. Expanding or collapsing
/// recomputes the eligible member list, and collapsing a group whose
/// descendants were selected drops those descendants from the selection.
pub struct Tree {
    engine: SelectionEngine,
}

impl Tree {
    /// Wraps an existing container element.
    pub fn new(tree: &ElementTree, container: ElementId) -> Result<Self> {
        Ok(Self {
            engine: SelectionEngine::new(tree, container, CompositeConfig::tree())?,
        })
    }

    /// Builds a tree by rendering `items` into a new container.
    ///
    /// Subgroups start collapsed.
    pub fn from_items(
        tree: &mut ElementTree,
        items: &[TreeItemSpec],
        multiselectable: bool,
    ) -> Result<Self> {
        let container = tree.alloc("tree");
        if multiselectable {
            tree.set_attr(container, attr::MULTISELECTABLE, "true");
        }
        for spec in items {
            Self::render_item(tree, container, spec);
        }
        Self::new(tree, container)
    }

    fn render_item(tree: &mut ElementTree, parent: ElementId, spec: &TreeItemSpec) {
        let item = tree.alloc_with_id("treeitem", spec.id.clone());
        tree.set_text(item, spec.label.clone());
        if spec.disabled {
            tree.set_attr(item, attr::DISABLED, "true");
        }
        tree.append_child(parent, item);

        if !spec.children.is_empty() {
            tree.set_attr(item, attr::EXPANDED, "false");
            let group = tree.alloc("group");
            tree.set_hidden(group, true);
            tree.append_child(item, group);
            for child in &spec.children {
                Self::render_item(tree, group, child);
            }
        }
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

    /// The subgroup element owned by an item, if any.
    pub fn subgroup(&self, tree: &ElementTree, item: ElementId) -> Option<ElementId> {
        tree.children(item)
            .iter()
            .copied()
            .find(|&c| tree.tag(c) == "group")
    }

    /// Whether an item's subgroup is expanded.
    pub fn is_expanded(&self, tree: &ElementTree, item: ElementId) -> bool {
        tree.attr_is(item, attr::EXPANDED, "true")
    }

    /// Expands an item's subgroup, adding its descendants to the member
    /// list. No-op for items without a subgroup.
    pub fn expand(&mut self, tree: &mut ElementTree, item: ElementId) {
        let Some(group) = self.subgroup(tree, item) else {
            return;
        };
        debug!(target: targets::ROLE, "tree item expanded");
        tree.set_attr(item, attr::EXPANDED, "true");
        tree.set_hidden(group, false);
        self.engine.refresh(tree);
    }

    /// Collapses an item's subgroup, removing its descendants from the
    /// member list and from the selection.
    pub fn collapse(&mut self, tree: &mut ElementTree, item: ElementId) {
        let Some(group) = self.subgroup(tree, item) else {
            return;
        };
        debug!(target: targets::ROLE, "tree item collapsed");
        tree.set_attr(item, attr::EXPANDED, "false");
        tree.set_hidden(group, true);
        self.engine.refresh(tree);
    }

    /// Handles a key press: expand/collapse pre-hook, then the engine.
    pub fn key_input(&mut self, tree: &mut ElementTree, input: &KeyInput) -> Handled {
        if !input.modifiers.primary() && !input.modifiers.shift {
            if let Some(focused) = self.engine.focused() {
                match input.key {
                    Key::ArrowRight
                        if self.subgroup(tree, focused).is_some()
                            && !self.is_expanded(tree, focused) =>
                    {
                        self.expand(tree, focused);
                        return Handled::Yes;
                    }
                    Key::ArrowLeft
                        if self.subgroup(tree, focused).is_some()
                            && self.is_expanded(tree, focused) =>
                    {
                        self.collapse(tree, focused);
                        return Handled::Yes;
                    }
                    _ => {}
                }
            }
        }
        self.engine.key_input(tree, input)
    }

    /// Handles a pointer press on an item.
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
