//! Arena-backed element tree with document-order traversal.

use std::collections::BTreeMap;

use slotmap::{SlotMap, new_key_type};
use tracing::{trace, warn};

use super::attrs::attr;
use trellis_core::logging::targets;

new_key_type! {
    /// Key of an element within an [`ElementTree`].
    ///
    /// Keys are stable for the lifetime of the element; removing an element
    /// invalidates the keys of its whole subtree.
    pub struct ElementId;
}

/// A single node in the element tree.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

impl Element {
    fn new(tag: String) -> Self {
        Self {
            tag,
            attrs: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// The element's tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The element's own (non-descendant) text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// An arena of elements with parent/child structure and a focus slot.
///
/// The tree tracks a revision counter bumped by every structural or
/// visibility mutation; registries compare revisions to detect stale
/// snapshots. At most one element holds input focus at a time.
pub struct ElementTree {
    nodes: SlotMap<ElementId, Element>,
    focused: Option<ElementId>,
    revision: u64,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            focused: None,
            revision: 0,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `id` refers to a live element.
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Current structural revision. Bumped by insertion, removal, reorder,
    /// and visibility/eligibility flag changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // =========================================================================
    // Construction and structure
    // =========================================================================

    /// Allocates a new detached element.
    pub fn alloc(&mut self, tag: impl Into<String>) -> ElementId {
        self.revision += 1;
        self.nodes.insert(Element::new(tag.into()))
    }

    /// Allocates a new detached element carrying a stable string identity.
    pub fn alloc_with_id(&mut self, tag: impl Into<String>, id: impl Into<String>) -> ElementId {
        let el = self.alloc(tag);
        self.nodes[el].attrs.insert(attr::ID.to_string(), id.into());
        el
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let count = self.nodes[parent].children.len();
        self.insert_child(parent, count, child);
    }

    /// Inserts `child` at `index` among `parent`'s children.
    pub fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId) {
        debug_assert!(parent != child, "element cannot parent itself");
        self.detach(child);
        let index = index.min(self.nodes[parent].children.len());
        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        self.revision += 1;
    }

    /// Unlinks `child` from its parent, keeping it allocated.
    pub fn detach(&mut self, child: ElementId) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|&c| c != child);
            self.revision += 1;
        }
    }

    /// Removes an element and its whole subtree from the arena.
    ///
    /// Clears focus if the focused element was inside the removed subtree.
    pub fn remove(&mut self, id: ElementId) {
        if !self.contains(id) {
            warn!(target: targets::ELEMENT, "remove of dead element ignored");
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(el) = stack.pop() {
            if let Some(node) = self.nodes.remove(el) {
                stack.extend(node.children);
            }
            if self.focused == Some(el) {
                self.focused = None;
            }
        }
        self.revision += 1;
    }

    /// Moves the child at position `from` to position `to` within `parent`.
    pub fn move_child(&mut self, parent: ElementId, from: usize, to: usize) {
        let children = &mut self.nodes[parent].children;
        if from >= children.len() || to >= children.len() || from == to {
            return;
        }
        let child = children.remove(from);
        children.insert(to, child);
        self.revision += 1;
    }

    /// Reorders `parent`'s children to match `order`.
    ///
    /// `order` must be a permutation of the current child list; anything
    /// else is rejected as a no-op.
    pub fn reorder_children(&mut self, parent: ElementId, order: &[ElementId]) {
        let children = &self.nodes[parent].children;
        if order.len() != children.len() || !order.iter().all(|c| children.contains(c)) {
            warn!(target: targets::ELEMENT, "reorder_children rejected: not a permutation");
            return;
        }
        self.nodes[parent].children = order.to_vec();
        self.revision += 1;
    }

    /// The element's parent, if attached.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes[id].parent
    }

    /// The element's children in document order.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.nodes[id].children
    }

    /// All descendants of `id` in document (pre-order) sequence, excluding
    /// `id` itself.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(self.nodes[el].children.iter().rev());
        }
        out
    }

    /// Borrows an element node.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id)
    }

    /// The element's tag name.
    pub fn tag(&self, id: ElementId) -> &str {
        &self.nodes[id].tag
    }

    // =========================================================================
    // Attributes and flags
    // =========================================================================

    /// Sets an attribute. Visibility/eligibility attributes bump the
    /// structural revision.
    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        self.nodes[id].attrs.insert(name.to_string(), value.into());
        if matches!(name, attr::HIDDEN | attr::DISABLED) {
            self.revision += 1;
        }
    }

    /// Removes an attribute, returning whether it was present.
    pub fn remove_attr(&mut self, id: ElementId, name: &str) -> bool {
        let removed = self.nodes[id].attrs.remove(name).is_some();
        if removed && matches!(name, attr::HIDDEN | attr::DISABLED) {
            self.revision += 1;
        }
        removed
    }

    /// Attribute value by name.
    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.nodes[id].attr(name)
    }

    /// Returns whether `name` has the exact value `value`.
    pub fn attr_is(&self, id: ElementId, name: &str, value: &str) -> bool {
        self.attr(id, name) == Some(value)
    }

    /// The element's stable string identity, if set.
    pub fn string_id(&self, id: ElementId) -> Option<&str> {
        self.attr(id, attr::ID)
    }

    /// Finds an element by its stable string identity.
    pub fn element_by_string_id(&self, string_id: &str) -> Option<ElementId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.attr(attr::ID) == Some(string_id))
            .map(|(id, _)| id)
    }

    /// Sets or clears the presence-based `hidden` flag.
    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        if hidden {
            self.set_attr(id, attr::HIDDEN, "");
        } else {
            self.remove_attr(id, attr::HIDDEN);
        }
    }

    /// Whether the element itself carries the `hidden` flag.
    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.nodes[id].attrs.contains_key(attr::HIDDEN)
    }

    /// Whether the element is visible: neither it nor any ancestor is
    /// hidden.
    pub fn is_visible(&self, id: ElementId) -> bool {
        let mut cursor = Some(id);
        while let Some(el) = cursor {
            if self.is_hidden(el) {
                return false;
            }
            cursor = self.nodes[el].parent;
        }
        true
    }

    /// Whether the element is flagged disabled.
    pub fn is_disabled(&self, id: ElementId) -> bool {
        self.attr_is(id, attr::DISABLED, "true")
    }

    // =========================================================================
    // Text and labels
    // =========================================================================

    /// Sets the element's own text.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.nodes[id].text = text.into();
    }

    /// The element's own text.
    pub fn text(&self, id: ElementId) -> &str {
        &self.nodes[id].text
    }

    /// Concatenated text of the element and all descendants, document order.
    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::from(self.nodes[id].text.as_str());
        for el in self.descendants(id) {
            out.push_str(&self.nodes[el].text);
        }
        out
    }

    /// Resolves the accessible label of an element.
    ///
    /// Resolution order: element referenced via `aria-labelledby`, then an
    /// embedded `label` child, then the element's plain text content.
    pub fn accessible_label(&self, id: ElementId) -> String {
        if let Some(reference) = self.attr(id, attr::LABELLED_BY)
            && let Some(label_el) = self.element_by_string_id(reference)
        {
            return self.text_content(label_el).trim().to_string();
        }
        if let Some(&label_child) = self.nodes[id]
            .children
            .iter()
            .find(|&&c| self.nodes[c].tag == "label")
        {
            return self.text_content(label_child).trim().to_string();
        }
        self.text_content(id).trim().to_string()
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// The element currently holding input focus.
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Moves input focus, or clears it with `None`.
    pub fn set_focus(&mut self, id: Option<ElementId>) {
        if let Some(el) = id
            && !self.contains(el)
        {
            warn!(target: targets::ELEMENT, "focus on dead element ignored");
            return;
        }
        trace!(target: targets::ELEMENT, ?id, "focus moved");
        self.focused = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listbox_fixture() -> (ElementTree, ElementId, Vec<ElementId>) {
        let mut tree = ElementTree::new();
        let container = tree.alloc("listbox");
        let mut options = Vec::new();
        for (i, name) in ["Apple", "Apricot", "Banana"].iter().enumerate() {
            let opt = tree.alloc_with_id("option", format!("opt-{i}"));
            tree.set_text(opt, *name);
            tree.append_child(container, opt);
            options.push(opt);
        }
        (tree, container, options)
    }

    #[test]
    fn test_document_order_traversal() {
        let (tree, container, options) = listbox_fixture();
        assert_eq!(tree.descendants(container), options);
    }

    #[test]
    fn test_nested_descendants_are_preorder() {
        let mut tree = ElementTree::new();
        let root = tree.alloc("tree");
        let item = tree.alloc("treeitem");
        let group = tree.alloc("group");
        let nested = tree.alloc("treeitem");
        tree.append_child(root, item);
        tree.append_child(item, group);
        tree.append_child(group, nested);
        assert_eq!(tree.descendants(root), vec![item, group, nested]);
    }

    #[test]
    fn test_hidden_ancestor_hides_subtree() {
        let mut tree = ElementTree::new();
        let root = tree.alloc("tree");
        let group = tree.alloc("group");
        let item = tree.alloc("treeitem");
        tree.append_child(root, group);
        tree.append_child(group, item);

        assert!(tree.is_visible(item));
        tree.set_hidden(group, true);
        assert!(tree.is_visible(root));
        assert!(!tree.is_visible(item));
    }

    #[test]
    fn test_structural_mutation_bumps_revision() {
        let (mut tree, container, options) = listbox_fixture();
        let before = tree.revision();
        tree.set_hidden(options[0], true);
        assert!(tree.revision() > before);

        let before = tree.revision();
        tree.move_child(container, 0, 2);
        assert!(tree.revision() > before);

        // Non-structural attributes do not invalidate snapshots.
        let before = tree.revision();
        tree.set_attr(options[1], "class", "highlight");
        assert_eq!(tree.revision(), before);
    }

    #[test]
    fn test_remove_subtree_clears_focus() {
        let mut tree = ElementTree::new();
        let root = tree.alloc("menu");
        let item = tree.alloc("menuitem");
        tree.append_child(root, item);
        tree.set_focus(Some(item));

        tree.remove(root);
        assert_eq!(tree.focused(), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_label_resolution_order() {
        let mut tree = ElementTree::new();
        let caption = tree.alloc_with_id("span", "caption-1");
        tree.set_text(caption, "Referenced");

        let by_reference = tree.alloc("option");
        tree.set_text(by_reference, "ignored");
        tree.set_attr(by_reference, attr::LABELLED_BY, "caption-1");

        let by_child = tree.alloc("option");
        let label = tree.alloc("label");
        tree.set_text(label, "Embedded");
        tree.append_child(by_child, label);

        let by_text = tree.alloc("option");
        tree.set_text(by_text, "  Plain  ");

        assert_eq!(tree.accessible_label(by_reference), "Referenced");
        assert_eq!(tree.accessible_label(by_child), "Embedded");
        assert_eq!(tree.accessible_label(by_text), "Plain");
    }

    #[test]
    fn test_reorder_children_rejects_non_permutation() {
        let (mut tree, container, options) = listbox_fixture();
        let revision = tree.revision();
        tree.reorder_children(container, &options[..2]);
        assert_eq!(tree.children(container), options.as_slice());
        assert_eq!(tree.revision(), revision);

        let reversed: Vec<_> = options.iter().rev().copied().collect();
        tree.reorder_children(container, &reversed);
        assert_eq!(tree.children(container), reversed.as_slice());
    }
}
