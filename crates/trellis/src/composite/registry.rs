//! Element registry: eligible-member snapshots for composite widgets.

use tracing::trace;

use crate::element::{ElementId, ElementTree};
use trellis_core::logging::targets;

/// The selection-marker attribute a role reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerAttr {
    /// Plain selection marker (`aria-selected`).
    #[default]
    Selected,
    /// Checked-style marker used by radio-style roles (`aria-checked`).
    Checked,
}

impl MarkerAttr {
    /// The attribute name written on member elements.
    pub fn name(self) -> &'static str {
        match self {
            Self::Selected => crate::element::attr::SELECTED,
            Self::Checked => crate::element::attr::CHECKED,
        }
    }
}

/// Rule deciding which descendants of a container are items of a role.
#[derive(Debug, Clone)]
pub struct ItemRule {
    /// Tag names that qualify as items.
    tags: Vec<String>,
    /// Marker attribute recording selection on matched items.
    marker: MarkerAttr,
    /// Tags that start a nested composite; traversal does not descend into
    /// them (a submenu's items belong to the submenu, not its parent).
    boundaries: Vec<String>,
}

impl ItemRule {
    /// Creates a rule matching the given tags, selecting via `marker`.
    pub fn new<I, S>(tags: I, marker: MarkerAttr) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            marker,
            boundaries: Vec::new(),
        }
    }

    /// Rule matching one tag with the plain selection marker.
    pub fn for_tag(tag: impl Into<String>) -> Self {
        Self::new([tag.into()], MarkerAttr::Selected)
    }

    /// Marks a tag as a nested-composite boundary.
    pub fn with_boundary(mut self, tag: impl Into<String>) -> Self {
        self.boundaries.push(tag.into());
        self
    }

    /// The marker attribute this rule selects with.
    pub fn marker(&self) -> MarkerAttr {
        self.marker
    }

    /// Whether an element matches the rule by tag.
    pub fn matches(&self, tree: &ElementTree, el: ElementId) -> bool {
        self.tags.iter().any(|t| t == tree.tag(el))
    }

    /// Whether traversal must stop at (and not descend into) `el`.
    pub fn is_boundary(&self, tree: &ElementTree, el: ElementId) -> bool {
        self.boundaries.iter().any(|t| t == tree.tag(el))
    }
}

/// A fresh snapshot of a container's eligible members.
///
/// Recomputed whenever the surrounding structure mutates; never patched in
/// place. `focused` starts as `None` on every refresh; focus is an engine
/// decision, not a structural fact.
#[derive(Debug, Clone, Default)]
pub struct Membership {
    /// Eligible members in document order.
    pub members: Vec<ElementId>,
    /// Currently marked-selected members, in document order.
    pub selected: Vec<ElementId>,
    /// Focused member. Always `None` straight after a refresh.
    pub focused: Option<ElementId>,
    /// Tree revision this snapshot was taken at.
    revision: u64,
}

impl Membership {
    /// Takes a fresh snapshot of `container`'s members under `rule`.
    ///
    /// Elements flagged disabled or hidden (directly or via an ancestor) are
    /// excluded. An empty container yields an empty membership.
    pub fn refresh(tree: &ElementTree, container: ElementId, rule: &ItemRule) -> Self {
        let marker = rule.marker().name();
        let mut members = Vec::new();
        let mut selected = Vec::new();

        // Pre-order walk that stops at nested-composite boundaries.
        let mut stack: Vec<ElementId> = tree.children(container).iter().rev().copied().collect();
        while let Some(el) = stack.pop() {
            if rule.is_boundary(tree, el) {
                continue;
            }
            stack.extend(tree.children(el).iter().rev());

            if !rule.matches(tree, el) || tree.is_disabled(el) || !tree.is_visible(el) {
                continue;
            }
            members.push(el);
            if tree.attr_is(el, marker, "true") {
                selected.push(el);
            }
        }

        trace!(
            target: targets::ELEMENT,
            members = members.len(),
            selected = selected.len(),
            "membership refreshed"
        );
        Self {
            members,
            selected,
            focused: None,
            revision: tree.revision(),
        }
    }

    /// Whether the snapshot matches the tree's current revision.
    pub fn is_current(&self, tree: &ElementTree) -> bool {
        self.revision == tree.revision()
    }

    /// Position of a member in document order, if eligible.
    pub fn index_of(&self, el: ElementId) -> Option<usize> {
        self.members.iter().position(|&m| m == el)
    }

    /// Whether `el` is in the eligible set.
    pub fn is_member(&self, el: ElementId) -> bool {
        self.index_of(el).is_some()
    }
}
