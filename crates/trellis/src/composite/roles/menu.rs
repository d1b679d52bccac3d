//! Menu role adapter: nested menus with submenu open/close and command
//! activation.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use trellis_core::Signal;
use trellis_core::logging::targets;

use crate::composite::{CompositeConfig, SelectionEngine};
use crate::element::{ElementId, ElementTree, attr};
use crate::error::Result;
use crate::events::{Handled, Key, KeyInput, KeyboardModifiers};

/// Declarative description of a menu item, possibly owning a submenu.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemSpec {
    /// Stable identity.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Whether the item starts disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Submenu items; non-empty makes this item a submenu owner.
    #[serde(default)]
    pub children: Vec<MenuItemSpec>,
}

/// Payload of the `command_selected` notification.
#[derive(Debug, Clone)]
pub struct CommandSelected {
    /// Stable identity of the activated leaf item.
    pub id: String,
    /// Accessible label of the activated leaf item.
    pub label: String,
}

/// One menu level: a container, its engine, and its submenus indexed by
/// the identity of the owning item.
struct MenuNode {
    container: ElementId,
    engine: SelectionEngine,
    /// The item in the parent menu that owns this submenu.
    owner_item: Option<ElementId>,
    /// Submenus, keyed by owner-item identity.
    children: HashMap<String, MenuNode>,
}

/// A menu: an owned tree of menu levels over nested `menu` containers.
///
/// Each level is its own single-select, cycling composite. Opening a
/// submenu transfers focus into it; closing propagates focus back to the
/// owning item and, on explicit propagation, closes ancestor menus
/// transitively. Activating a leaf item emits [`CommandSelected`] and
/// closes the whole chain.
pub struct Menu {
    root: MenuNode,
    /// Identities of the currently open submenus, outermost first.
    open_path: Vec<String>,

    /// Emitted when a leaf item is activated.
    pub command_selected: Signal<CommandSelected>,
}

impl Menu {
    /// Wraps an existing `menu` container element.
    ///
    /// Submenu containers are `menu` elements nested inside their owning
    /// `menuitem`; they are hidden until opened. Submenu owners need a
    /// stable identity.
    pub fn new(tree: &ElementTree, container: ElementId) -> Result<Self> {
        Ok(Self {
            root: Self::build_node(tree, container, None)?,
            open_path: Vec::new(),
            command_selected: Signal::new(),
        })
    }

    /// Builds a menu by rendering `items` into a new container.
    pub fn from_items(tree: &mut ElementTree, items: &[MenuItemSpec]) -> Result<Self> {
        let container = tree.alloc("menu");
        for spec in items {
            Self::render_item(tree, container, spec);
        }
        Self::new(tree, container)
    }

    fn render_item(tree: &mut ElementTree, parent: ElementId, spec: &MenuItemSpec) {
        let item = tree.alloc_with_id("menuitem", spec.id.clone());
        tree.set_text(item, spec.label.clone());
        if spec.disabled {
            tree.set_attr(item, attr::DISABLED, "true");
        }
        tree.append_child(parent, item);

        if !spec.children.is_empty() {
            let submenu = tree.alloc("menu");
            tree.set_hidden(submenu, true);
            tree.append_child(item, submenu);
            for child in &spec.children {
                Self::render_item(tree, submenu, child);
            }
        }
    }

    fn build_node(
        tree: &ElementTree,
        container: ElementId,
        owner_item: Option<ElementId>,
    ) -> Result<MenuNode> {
        let engine = SelectionEngine::new(tree, container, CompositeConfig::menu())?;

        let mut children = HashMap::new();
        // Direct items only: do not descend into nested menu containers.
        let mut stack: Vec<ElementId> = tree.children(container).iter().rev().copied().collect();
        while let Some(el) = stack.pop() {
            if tree.tag(el) == "menu" {
                continue;
            }
            stack.extend(tree.children(el).iter().rev());
            if tree.tag(el) != "menuitem" {
                continue;
            }
            for &sub in tree.children(el) {
                if tree.tag(sub) != "menu" {
                    continue;
                }
                match tree.string_id(el) {
                    Some(id) => {
                        children.insert(id.to_string(), Self::build_node(tree, sub, Some(el))?);
                    }
                    None => {
                        warn!(target: targets::ROLE, "submenu owner without identity ignored")
                    }
                }
            }
        }

        Ok(MenuNode {
            container,
            engine,
            owner_item,
            children,
        })
    }

    // =========================================================================
    // Node access
    // =========================================================================

    fn node_at(&self, depth: usize) -> &MenuNode {
        let mut node = &self.root;
        for id in &self.open_path[..depth] {
            node = node.children.get(id).expect("open path references live node");
        }
        node
    }

    fn node_at_mut(&mut self, depth: usize) -> &mut MenuNode {
        let mut node = &mut self.root;
        for id in &self.open_path[..depth] {
            node = node
                .children
                .get_mut(id)
                .expect("open path references live node");
        }
        node
    }

    fn active_depth(&self) -> usize {
        self.open_path.len()
    }

    /// The engine of the deepest open menu level.
    pub fn active_engine(&self) -> &SelectionEngine {
        &self.node_at(self.active_depth()).engine
    }

    /// The root container element.
    pub fn container(&self) -> ElementId {
        self.root.container
    }

    /// Number of currently open submenu levels.
    pub fn open_depth(&self) -> usize {
        self.open_path.len()
    }

    // =========================================================================
    // Submenu protocol
    // =========================================================================

    /// Opens the submenu owned by the active level's focused item,
    /// transferring focus to its first item.
    pub fn open_submenu(&mut self, tree: &mut ElementTree) -> Handled {
        let depth = self.active_depth();
        let Some(focused) = self.node_at(depth).engine.focused() else {
            return Handled::No;
        };
        let Some(id) = tree.string_id(focused).map(str::to_string) else {
            return Handled::No;
        };
        if !self.node_at(depth).children.contains_key(&id) {
            return Handled::No;
        }

        debug!(target: targets::ROLE, submenu = %id, "submenu opened");
        self.open_path.push(id.clone());
        let depth = self.active_depth();
        let node = self.node_at_mut(depth);
        tree.set_hidden(node.container, false);
        node.engine.refresh(tree);
        if let Some(&first) = node.engine.members().first() {
            node.engine.focus_member(tree, first);
        }
        Handled::Yes
    }

    /// Closes the deepest open submenu, propagating focus back to the
    /// owning item. With `propagate`, ancestor menus close transitively
    /// until only the root remains.
    pub fn close_submenu(&mut self, tree: &mut ElementTree, propagate: bool) -> Handled {
        if self.open_path.is_empty() {
            return Handled::No;
        }
        loop {
            let depth = self.active_depth();
            let node = self.node_at_mut(depth);
            tree.set_hidden(node.container, true);
            let owner = node.owner_item;
            node.engine.refresh(tree);

            self.open_path.pop();
            let parent_depth = self.active_depth();
            if let Some(owner) = owner {
                self.node_at_mut(parent_depth).engine.focus_member(tree, owner);
            }
            debug!(target: targets::ROLE, "submenu closed");

            if !propagate || self.open_path.is_empty() {
                break;
            }
        }
        Handled::Yes
    }

    /// Activates the active level's focused item: opens its submenu, or
    /// emits [`CommandSelected`] for a leaf and closes the whole chain.
    pub fn activate(&mut self, tree: &mut ElementTree) -> Handled {
        if self.open_submenu(tree).is_handled() {
            return Handled::Yes;
        }
        let depth = self.active_depth();
        let Some(focused) = self.node_at(depth).engine.focused() else {
            return Handled::No;
        };

        let command = CommandSelected {
            id: tree.string_id(focused).unwrap_or_default().to_string(),
            label: tree.accessible_label(focused),
        };
        debug!(target: targets::ROLE, command = %command.id, "command selected");
        self.command_selected.emit(command);
        let _ = self.close_submenu(tree, true);
        Handled::Yes
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handles a key press: submenu pre-hooks, then the active engine.
    pub fn key_input(&mut self, tree: &mut ElementTree, input: &KeyInput) -> Handled {
        match input.key {
            Key::ArrowRight => self.open_submenu(tree),
            Key::ArrowLeft => self.close_submenu(tree, false),
            Key::Escape => self.close_submenu(tree, true),
            Key::Enter => self.activate(tree),
            Key::Space => self.activate(tree),
            _ => {
                let depth = self.active_depth();
                self.node_at_mut(depth).engine.key_input(tree, input)
            }
        }
    }

    /// Handles a pointer press on an item at any open level.
    ///
    /// Levels deeper than the pressed item's close first; a press on a
    /// submenu owner opens it, a press on a leaf activates it.
    pub fn pointer_select(
        &mut self,
        tree: &mut ElementTree,
        target: ElementId,
        modifiers: KeyboardModifiers,
    ) -> Handled {
        let Some(depth) =
            (0..=self.active_depth()).find(|&d| self.node_at(d).engine.members().contains(&target))
        else {
            warn!(target: targets::ROLE, "pointer press outside open menu levels");
            return Handled::No;
        };

        // Close levels deeper than the pressed one.
        while self.active_depth() > depth {
            let _ = self.close_submenu(tree, false);
        }

        let handled = self.node_at_mut(depth).engine.pointer_select(tree, target, modifiers);
        if !handled.is_handled() {
            return Handled::No;
        }
        let _ = self.activate(tree);
        Handled::Yes
    }
}
