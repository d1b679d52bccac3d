//! The shared selection/navigation engine.
//!
//! Every composite widget (list box, menu, tree, tab list, radio group,
//! grid) is a [`SelectionEngine`] plus a role-specific [`CompositeConfig`].
//! The engine consumes pointer and key events against the current
//! [`Membership`] snapshot and produces a new (selected set, focused member)
//! pair, writing marker attributes and the roving tab stop back to the tree
//! and emitting a deferred [`SelectionChange`] notification.
//!
//! # Invariants
//!
//! After any transition the focused member, if set, is a member of the
//! current eligible set, and the selected set is a subset of it.
//! Single-select configurations never hold more than one selected member.
//!
//! # Example
//!
//! ```ignore
//! use trellis::composite::{CompositeConfig, SelectionEngine};
//! use trellis::events::{Key, KeyInput};
//!
//! let mut engine = SelectionEngine::new(&tree, container, CompositeConfig::list_box())?;
//! engine.selection_changed.connect(|change| {
//!     println!("selected: {:?}", change.labels);
//! });
//! let handled = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowDown));
//! trellis_core::dispatch::drain();
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use trellis_core::Signal;
use trellis_core::logging::targets;

use super::registry::{ItemRule, MarkerAttr, Membership};
use crate::element::{ElementId, ElementTree, attr};
use crate::error::{ConfigError, Result};
use crate::events::{Handled, Key, KeyInput, KeyboardModifiers};

/// Inactivity window after which the incremental-search buffer resets.
pub const SEARCH_RESET: Duration = Duration::from_millis(1500);

/// Axis along which arrow keys navigate the members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// ArrowUp/ArrowDown navigate (lists, menus, trees).
    #[default]
    Vertical,
    /// ArrowLeft/ArrowRight navigate (tab lists).
    Horizontal,
    /// All four arrows navigate (radio groups).
    Both,
}

/// Where a role takes its multi-select capability from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiSelectPolicy {
    /// The role is single-select only; a multiselectable container is a
    /// configuration error.
    #[default]
    Forbidden,
    /// The container's `aria-multiselectable` attribute decides.
    FromContainer,
}

/// Capability set configuring a [`SelectionEngine`] for a role.
///
/// Roles compose the engine through this struct (plus pre-hooks layered in
/// the role adapter) rather than overriding its behavior.
#[derive(Debug, Clone)]
pub struct CompositeConfig {
    /// Item-matching rule, including the selection-marker attribute.
    pub rule: ItemRule,
    /// Arrow-key navigation axis.
    pub orientation: Orientation,
    /// Multi-select capability source.
    pub multiselect: MultiSelectPolicy,
    /// Whether previous/next navigation wraps at the ends.
    pub cycling: bool,
    /// Whether printable characters drive incremental search.
    pub type_ahead: bool,
    /// Role name, used in errors and logging.
    pub role: &'static str,
}

impl CompositeConfig {
    /// Configuration for a list box.
    pub fn list_box() -> Self {
        Self {
            rule: ItemRule::for_tag("option"),
            orientation: Orientation::Vertical,
            multiselect: MultiSelectPolicy::FromContainer,
            cycling: false,
            type_ahead: true,
            role: "listbox",
        }
    }

    /// Configuration for a tree.
    pub fn tree() -> Self {
        Self {
            rule: ItemRule::for_tag("treeitem"),
            orientation: Orientation::Vertical,
            multiselect: MultiSelectPolicy::FromContainer,
            cycling: false,
            type_ahead: true,
            role: "tree",
        }
    }

    /// Configuration for a menu.
    pub fn menu() -> Self {
        Self {
            rule: ItemRule::for_tag("menuitem").with_boundary("menu"),
            orientation: Orientation::Vertical,
            multiselect: MultiSelectPolicy::Forbidden,
            cycling: true,
            type_ahead: true,
            role: "menu",
        }
    }

    /// Configuration for a tab list.
    pub fn tab_list() -> Self {
        Self {
            rule: ItemRule::for_tag("tab"),
            orientation: Orientation::Horizontal,
            multiselect: MultiSelectPolicy::Forbidden,
            cycling: true,
            type_ahead: false,
            role: "tablist",
        }
    }

    /// Configuration for a radio group.
    pub fn radio_group() -> Self {
        Self {
            rule: ItemRule::new(["radio"], MarkerAttr::Checked),
            orientation: Orientation::Both,
            multiselect: MultiSelectPolicy::Forbidden,
            cycling: true,
            type_ahead: false,
            role: "radiogroup",
        }
    }

    /// Configuration for grid rows.
    pub fn grid_rows() -> Self {
        Self {
            rule: ItemRule::for_tag("row"),
            orientation: Orientation::Vertical,
            multiselect: MultiSelectPolicy::FromContainer,
            cycling: false,
            type_ahead: false,
            role: "grid",
        }
    }
}

/// Payload of the `selection_changed` notification.
#[derive(Debug, Clone)]
pub struct SelectionChange {
    /// Selection before the transition, document order.
    pub previous: Vec<ElementId>,
    /// Selection after the transition, range-ordered (focused member last).
    pub selection: Vec<ElementId>,
    /// Stable string identities of the new selection.
    pub ids: Vec<String>,
    /// Accessible labels of the new selection.
    pub labels: Vec<String>,
    /// The newly focused member, if any.
    pub focused: Option<ElementId>,
}

/// Selection state machine for one container.
///
/// The engine owns the membership snapshot, the range anchor, and the
/// incremental-search buffer for its container. It is the only writer of
/// selection state; role adapters and application code go through
/// [`set_selection`](Self::set_selection) and the input entry points, never
/// around them.
pub struct SelectionEngine {
    container: ElementId,
    config: CompositeConfig,
    membership: Membership,
    /// Whether this instance allows more than one selected member.
    multiselectable: bool,
    /// Range anchor: the selection boundary Shift-navigation extends from.
    anchor: Option<ElementId>,
    /// Rolling incremental-search buffer (lowercased).
    search_buffer: String,
    /// When the search buffer expires.
    search_deadline: Option<Instant>,

    /// Emitted after every selection or focus transition.
    pub selection_changed: Signal<SelectionChange>,
}

impl SelectionEngine {
    /// Creates an engine for `container` under `config`.
    ///
    /// Fails fast if the container is missing or requests multi-select from
    /// a role that forbids it.
    pub fn new(tree: &ElementTree, container: ElementId, config: CompositeConfig) -> Result<Self> {
        if !tree.contains(container) {
            return Err(ConfigError::MissingContainer);
        }

        let wants_multi = tree.attr_is(container, attr::MULTISELECTABLE, "true");
        let multiselectable = match config.multiselect {
            MultiSelectPolicy::FromContainer => wants_multi,
            MultiSelectPolicy::Forbidden if wants_multi => {
                return Err(ConfigError::multi_select_forbidden(config.role));
            }
            MultiSelectPolicy::Forbidden => false,
        };

        let membership = Membership::refresh(tree, container, &config.rule);
        debug!(
            target: targets::ENGINE,
            role = config.role,
            members = membership.members.len(),
            multiselectable,
            "engine created"
        );

        Ok(Self {
            container,
            config,
            membership,
            multiselectable,
            anchor: None,
            search_buffer: String::new(),
            search_deadline: None,
            selection_changed: Signal::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The container element this engine operates on.
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// The engine's role configuration.
    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    /// Whether more than one member may be selected.
    pub fn is_multiselectable(&self) -> bool {
        self.multiselectable
    }

    /// Eligible members in document order.
    pub fn members(&self) -> &[ElementId] {
        &self.membership.members
    }

    /// The current selection.
    pub fn selection(&self) -> &[ElementId] {
        &self.membership.selected
    }

    /// The focused member, if any.
    pub fn focused(&self) -> Option<ElementId> {
        self.membership.focused
    }

    // =========================================================================
    // Membership maintenance
    // =========================================================================

    /// Recomputes the membership snapshot from the tree.
    ///
    /// Members that left the eligible set lose their selection marker;
    /// focus is cleared if the focused member became ineligible. This is a
    /// structural correction, not a transition, so no notification is
    /// emitted.
    pub fn refresh(&mut self, tree: &mut ElementTree) {
        let old_selected = std::mem::take(&mut self.membership.selected);
        let old_focused = self.membership.focused;

        self.membership = Membership::refresh(tree, self.container, &self.config.rule);

        let marker = self.config.rule.marker().name();
        for el in old_selected {
            if tree.contains(el) && !self.membership.is_member(el) {
                tree.remove_attr(el, marker);
            }
        }
        if let Some(focused) = old_focused {
            if self.membership.is_member(focused) {
                self.membership.focused = Some(focused);
            } else if tree.contains(focused) {
                tree.remove_attr(focused, attr::TAB_INDEX);
            }
        }
        if let Some(anchor) = self.anchor
            && !self.membership.is_member(anchor)
        {
            self.anchor = None;
        }
    }

    /// Refreshes lazily when the snapshot fell behind the tree revision.
    ///
    /// In a browser this is driven by a structural-change observer; here the
    /// revision check plays that part at every input entry point.
    fn ensure_current(&mut self, tree: &mut ElementTree) {
        if !self.membership.is_current(tree) {
            self.refresh(tree);
        }
    }

    // =========================================================================
    // Explicit selection API
    // =========================================================================

    /// Replaces the selection, validating against the eligible set.
    ///
    /// Requested elements outside the current membership are ignored with a
    /// warning; selecting a disabled or hidden element is never performed
    /// silently. On single-select configurations only the first eligible
    /// requested member is taken. Focus moves to the last selected member.
    pub fn set_selection(&mut self, tree: &mut ElementTree, desired: &[ElementId]) {
        self.ensure_current(tree);

        let mut selection: Vec<ElementId> = Vec::new();
        for &el in desired {
            if self.membership.is_member(el) {
                if !selection.contains(&el) {
                    selection.push(el);
                }
            } else {
                warn!(
                    target: targets::ENGINE,
                    role = self.config.role,
                    "set_selection ignored non-eligible element"
                );
            }
        }
        if !self.multiselectable {
            selection.truncate(1);
        }

        let focus = selection.last().copied().or(self.membership.focused);
        self.anchor = selection.first().copied();
        self.apply(tree, selection, focus);
    }

    /// Clears the selection, keeping focus where it is.
    pub fn clear_selection(&mut self, tree: &mut ElementTree) {
        self.ensure_current(tree);
        let focus = self.membership.focused;
        self.anchor = None;
        self.apply(tree, Vec::new(), focus);
    }

    /// Moves focus (and the roving tab stop) to a member without changing
    /// the selection. Non-members are ignored.
    pub fn focus_member(&mut self, tree: &mut ElementTree, el: ElementId) {
        self.ensure_current(tree);
        if !self.membership.is_member(el) {
            warn!(target: targets::ENGINE, role = self.config.role, "focus on non-member ignored");
            return;
        }
        let selection = self.membership.selected.clone();
        self.apply(tree, selection, Some(el));
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// Handles a pointer press on `target`.
    ///
    /// Plain click selects exactly the target. With the primary modifier on
    /// a multiselectable widget the target's membership in the selection is
    /// toggled. With Shift on a multiselectable widget the selection becomes
    /// the contiguous range between the first currently selected member and
    /// the target. Presses on non-members are ignored.
    pub fn pointer_select(
        &mut self,
        tree: &mut ElementTree,
        target: ElementId,
        modifiers: KeyboardModifiers,
    ) -> Handled {
        self.ensure_current(tree);
        if !self.membership.is_member(target) {
            warn!(target: targets::ENGINE, role = self.config.role, "pointer press outside eligible set");
            return Handled::No;
        }

        if self.multiselectable && modifiers.shift {
            let from = self
                .membership
                .selected
                .first()
                .copied()
                .or(self.anchor)
                .unwrap_or(target);
            let range = self.range(from, target);
            self.anchor = Some(from);
            self.apply(tree, range, Some(target));
        } else if self.multiselectable && modifiers.primary() {
            let mut selection = self.membership.selected.clone();
            match selection.iter().position(|&el| el == target) {
                Some(pos) => {
                    selection.remove(pos);
                }
                None => selection.push(target),
            }
            self.anchor = Some(target);
            let focus = selection.last().copied().or(Some(target));
            self.apply(tree, selection, focus);
        } else {
            self.anchor = Some(target);
            self.apply(tree, vec![target], Some(target));
        }
        Handled::Yes
    }

    // =========================================================================
    // Keyboard input
    // =========================================================================

    /// Handles a key press.
    ///
    /// Returns [`Handled::Yes`] for every key the engine consumed; the host
    /// must then suppress the default action and stop propagation. Tab is
    /// never intercepted. An empty member list makes every key a no-op.
    pub fn key_input(&mut self, tree: &mut ElementTree, input: &KeyInput) -> Handled {
        self.ensure_current(tree);
        if self.membership.members.is_empty() {
            return Handled::No;
        }

        match input.key {
            Key::Tab => Handled::No,
            Key::Home | Key::PageUp => self.navigate(tree, NavTarget::First, input.modifiers),
            Key::End | Key::PageDown => self.navigate(tree, NavTarget::Last, input.modifiers),
            Key::ArrowUp if self.vertical() => {
                self.navigate(tree, NavTarget::Previous, input.modifiers)
            }
            Key::ArrowDown if self.vertical() => {
                self.navigate(tree, NavTarget::Next, input.modifiers)
            }
            Key::ArrowLeft if self.horizontal() => {
                self.navigate(tree, NavTarget::Previous, input.modifiers)
            }
            Key::ArrowRight if self.horizontal() => {
                self.navigate(tree, NavTarget::Next, input.modifiers)
            }
            Key::Space => self.toggle_focused(tree),
            Key::Character('a' | 'A') if input.modifiers.primary() => self.select_all(tree),
            Key::Character(c)
                if self.config.type_ahead && !input.modifiers.primary() && !c.is_control() =>
            {
                self.type_ahead(tree, c, input.modifiers, input.timestamp)
            }
            _ => Handled::No,
        }
    }

    /// Selects every eligible member and focuses the first.
    ///
    /// Single-select configurations do not handle select-all.
    pub fn select_all(&mut self, tree: &mut ElementTree) -> Handled {
        self.ensure_current(tree);
        if !self.multiselectable {
            return Handled::No;
        }
        let selection = self.membership.members.clone();
        let focus = selection.first().copied();
        self.anchor = focus;
        self.apply(tree, selection, focus);
        Handled::Yes
    }

    fn vertical(&self) -> bool {
        matches!(self.config.orientation, Orientation::Vertical | Orientation::Both)
    }

    fn horizontal(&self) -> bool {
        matches!(self.config.orientation, Orientation::Horizontal | Orientation::Both)
    }

    fn navigate(
        &mut self,
        tree: &mut ElementTree,
        nav: NavTarget,
        modifiers: KeyboardModifiers,
    ) -> Handled {
        let members = &self.membership.members;
        let last = members.len() - 1;
        let current = self.membership.focused.and_then(|f| self.membership.index_of(f));

        let target_index = match (nav, current) {
            (NavTarget::First, _) => 0,
            (NavTarget::Last, _) => last,
            (NavTarget::Previous | NavTarget::Next, None) => 0,
            (NavTarget::Previous, Some(0)) => {
                if self.config.cycling {
                    last
                } else {
                    0
                }
            }
            (NavTarget::Previous, Some(i)) => i - 1,
            (NavTarget::Next, Some(i)) if i == last => {
                if self.config.cycling {
                    0
                } else {
                    last
                }
            }
            (NavTarget::Next, Some(i)) => i + 1,
        };
        let target = members[target_index];

        if modifiers.primary() {
            // Move-without-selecting: focus travels alone.
            let selection = self.membership.selected.clone();
            self.apply(tree, selection, Some(target));
        } else {
            self.select_and_move(tree, target, modifiers);
        }
        Handled::Yes
    }

    /// Applies the select-and-move rule for a navigation or search target.
    fn select_and_move(
        &mut self,
        tree: &mut ElementTree,
        target: ElementId,
        modifiers: KeyboardModifiers,
    ) {
        if self.multiselectable && modifiers.shift {
            let from = self
                .anchor
                .filter(|&a| self.membership.is_member(a))
                .or(self.membership.focused)
                .unwrap_or(target);
            let range = self.range(from, target);
            self.anchor = Some(from);
            self.apply(tree, range, Some(target));
        } else {
            self.anchor = Some(target);
            self.apply(tree, vec![target], Some(target));
        }
    }

    fn toggle_focused(&mut self, tree: &mut ElementTree) -> Handled {
        let Some(focused) = self.membership.focused else {
            return Handled::No;
        };
        let mut selection = self.membership.selected.clone();
        if self.multiselectable {
            match selection.iter().position(|&el| el == focused) {
                Some(pos) => {
                    selection.remove(pos);
                }
                None => selection.push(focused),
            }
        } else {
            selection = vec![focused];
        }
        self.anchor = Some(focused);
        self.apply(tree, selection, Some(focused));
        Handled::Yes
    }

    // =========================================================================
    // Incremental search
    // =========================================================================

    fn type_ahead(
        &mut self,
        tree: &mut ElementTree,
        c: char,
        modifiers: KeyboardModifiers,
        now: Instant,
    ) -> Handled {
        if self.search_deadline.is_none_or(|deadline| now > deadline) {
            self.search_buffer.clear();
        }
        self.search_buffer.extend(c.to_lowercase());
        self.search_deadline = Some(now + SEARCH_RESET);

        let members = &self.membership.members;
        let len = members.len();
        // A one-character buffer scans forward from the member after the
        // focused one; a growing buffer re-tests the focused member first so
        // a continued prefix stays put.
        let start = match self.membership.focused.and_then(|f| self.membership.index_of(f)) {
            Some(i) if self.search_buffer.chars().count() > 1 => i,
            Some(i) => (i + 1) % len,
            None => 0,
        };

        let found = (0..len).map(|offset| members[(start + offset) % len]).find(|&el| {
            tree.accessible_label(el)
                .to_lowercase()
                .starts_with(&self.search_buffer)
        });

        trace!(
            target: targets::ENGINE,
            role = self.config.role,
            buffer = %self.search_buffer,
            matched = found.is_some(),
            "incremental search"
        );
        if let Some(el) = found {
            self.select_and_move(tree, el, modifiers);
        }
        Handled::Yes
    }

    // =========================================================================
    // Transition core
    // =========================================================================

    /// Contiguous member range from `from` to `to`, emitted so that `to`
    /// is last (reversed when `to` precedes `from` in document order).
    fn range(&self, from: ElementId, to: ElementId) -> Vec<ElementId> {
        let members = &self.membership.members;
        let a = self.membership.index_of(from).unwrap_or(0);
        let b = self.membership.index_of(to).unwrap_or(a);
        if a <= b {
            members[a..=b].to_vec()
        } else {
            members[b..=a].iter().rev().copied().collect()
        }
    }

    /// Commits a transition: marker attributes, roving tab stop, input
    /// focus, and the deferred notification.
    fn apply(
        &mut self,
        tree: &mut ElementTree,
        selection: Vec<ElementId>,
        focus: Option<ElementId>,
    ) {
        debug_assert!(
            self.multiselectable || selection.len() <= 1,
            "single-select cardinality violated"
        );
        debug_assert!(selection.iter().all(|&el| self.membership.is_member(el)));
        debug_assert!(focus.is_none_or(|el| self.membership.is_member(el)));

        let previous = self.membership.selected.clone();
        let focus_changed = focus != self.membership.focused;
        if previous == selection && !focus_changed {
            return;
        }

        let marker = self.config.rule.marker().name();
        for &el in &previous {
            if !selection.contains(&el) {
                tree.remove_attr(el, marker);
            }
        }
        for &el in &selection {
            tree.set_attr(el, marker, "true");
        }

        // Roving tab stop: the focused member is the sole tab stop.
        for &el in &self.membership.members.clone() {
            if Some(el) == focus {
                tree.set_attr(el, attr::TAB_INDEX, "0");
            } else {
                tree.remove_attr(el, attr::TAB_INDEX);
            }
        }
        tree.set_focus(focus);

        self.membership.selected = selection.clone();
        self.membership.focused = focus;

        debug!(
            target: targets::ENGINE,
            role = self.config.role,
            selected = selection.len(),
            "selection transition"
        );
        let change = SelectionChange {
            previous,
            ids: selection
                .iter()
                .map(|&el| tree.string_id(el).unwrap_or_default().to_string())
                .collect(),
            labels: selection.iter().map(|&el| tree.accessible_label(el)).collect(),
            selection,
            focused: focus,
        };
        self.selection_changed.emit(change);
    }
}

/// Navigation destinations shared by the key bindings.
#[derive(Debug, Clone, Copy)]
enum NavTarget {
    First,
    Last,
    Previous,
    Next,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::attr;

    fn list_fixture(multi: bool) -> (ElementTree, SelectionEngine, Vec<ElementId>) {
        let mut tree = ElementTree::new();
        let container = tree.alloc("listbox");
        if multi {
            tree.set_attr(container, attr::MULTISELECTABLE, "true");
        }
        let mut options = Vec::new();
        for (i, name) in ["Apple", "Apricot", "Banana", "Cherry", "Date"]
            .iter()
            .enumerate()
        {
            let opt = tree.alloc_with_id("option", format!("opt-{i}"));
            tree.set_text(opt, *name);
            tree.append_child(container, opt);
            options.push(opt);
        }
        let engine = SelectionEngine::new(&tree, container, CompositeConfig::list_box()).unwrap();
        (tree, engine, options)
    }

    fn assert_invariants(engine: &SelectionEngine) {
        if let Some(focused) = engine.focused() {
            assert!(engine.members().contains(&focused), "focused must be a member");
        }
        for el in engine.selection() {
            assert!(engine.members().contains(el), "selection must be a subset of members");
        }
        if !engine.is_multiselectable() {
            assert!(engine.selection().len() <= 1);
        }
    }

    #[test]
    fn test_plain_click_selects_exactly_target() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let handled = engine.pointer_select(&mut tree, options[2], KeyboardModifiers::NONE);
        assert!(handled.is_handled());
        assert_eq!(engine.selection(), &[options[2]]);
        assert_eq!(engine.focused(), Some(options[2]));
        assert!(tree.attr_is(options[2], attr::SELECTED, "true"));
        assert_invariants(&engine);
    }

    #[test]
    fn test_primary_click_toggles_membership() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);
        let _ = engine.pointer_select(&mut tree, options[2], KeyboardModifiers::primary_only());
        assert_eq!(engine.selection(), &[options[0], options[2]]);

        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::primary_only());
        assert_eq!(engine.selection(), &[options[2]]);
        assert!(!tree.attr_is(options[0], attr::SELECTED, "true"));
        assert_invariants(&engine);
    }

    #[test]
    fn test_shift_click_selects_range_from_first_selected() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let _ = engine.pointer_select(&mut tree, options[1], KeyboardModifiers::NONE);
        let _ = engine.pointer_select(&mut tree, options[3], KeyboardModifiers::shift());
        assert_eq!(engine.selection(), &[options[1], options[2], options[3]]);
        assert_eq!(engine.focused(), Some(options[3]));
        assert_invariants(&engine);
    }

    #[test]
    fn test_shift_click_backwards_reverses_range() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let _ = engine.pointer_select(&mut tree, options[3], KeyboardModifiers::NONE);
        let _ = engine.pointer_select(&mut tree, options[1], KeyboardModifiers::shift());
        // Reversed so the clicked (earlier) member is last, and focused.
        assert_eq!(engine.selection(), &[options[3], options[2], options[1]]);
        assert_eq!(engine.focused(), Some(options[1]));
        assert_invariants(&engine);
    }

    #[test]
    fn test_plain_click_after_range_collapses_to_target() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);
        let _ = engine.pointer_select(&mut tree, options[3], KeyboardModifiers::shift());
        let _ = engine.pointer_select(&mut tree, options[3], KeyboardModifiers::NONE);
        assert_eq!(engine.selection(), &[options[3]]);
        assert_invariants(&engine);
    }

    #[test]
    fn test_click_on_non_member_is_noop() {
        let (mut tree, mut engine, options) = list_fixture(false);
        tree.set_attr(options[1], attr::DISABLED, "true");
        let handled = engine.pointer_select(&mut tree, options[1], KeyboardModifiers::NONE);
        assert_eq!(handled, Handled::No);
        assert!(engine.selection().is_empty());
        assert_invariants(&engine);
    }

    #[test]
    fn test_single_select_navigation_moves_selection() {
        let (mut tree, mut engine, options) = list_fixture(false);
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowDown));
        assert_eq!(engine.selection(), &[options[0]]);

        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowDown));
        assert_eq!(engine.selection(), &[options[1]]);
        assert_eq!(engine.focused(), Some(options[1]));

        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::End));
        assert_eq!(engine.selection(), &[options[4]]);
        assert_invariants(&engine);
    }

    #[test]
    fn test_modifier_navigation_moves_focus_only() {
        let (mut tree, mut engine, options) = list_fixture(false);
        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);
        let _ = engine.key_input(
            &mut tree,
            &KeyInput::new(Key::ArrowDown, KeyboardModifiers::primary_only()),
        );
        assert_eq!(engine.selection(), &[options[0]]);
        assert_eq!(engine.focused(), Some(options[1]));
        // Roving tab stop follows focus, not selection.
        assert!(tree.attr_is(options[1], attr::TAB_INDEX, "0"));
        assert_eq!(tree.attr(options[0], attr::TAB_INDEX), None);
        assert_invariants(&engine);
    }

    #[test]
    fn test_no_cycling_sticks_at_ends() {
        let (mut tree, mut engine, options) = list_fixture(false);
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowUp));
        assert_eq!(engine.focused(), Some(options[0]));
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowUp));
        assert_eq!(engine.focused(), Some(options[0]));
    }

    #[test]
    fn test_cycling_wraps_both_ways() {
        let mut tree = ElementTree::new();
        let container = tree.alloc("radiogroup");
        let mut radios = Vec::new();
        for i in 0..3 {
            let r = tree.alloc_with_id("radio", format!("r-{i}"));
            tree.append_child(container, r);
            radios.push(r);
        }
        let mut engine =
            SelectionEngine::new(&tree, container, CompositeConfig::radio_group()).unwrap();

        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowUp));
        assert_eq!(engine.focused(), Some(radios[0]));
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowUp));
        assert_eq!(engine.focused(), Some(radios[2]));
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowRight));
        assert_eq!(engine.focused(), Some(radios[0]));
        // Radio-style roles select via the checked-style marker.
        assert!(tree.attr_is(radios[0], attr::CHECKED, "true"));
        assert_eq!(tree.attr(radios[0], attr::SELECTED), None);
    }

    #[test]
    fn test_shift_navigation_extends_and_shrinks_range() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let _ = engine.pointer_select(&mut tree, options[1], KeyboardModifiers::NONE);

        let _ = engine.key_input(&mut tree, &KeyInput::new(Key::ArrowDown, KeyboardModifiers::shift()));
        assert_eq!(engine.selection(), &[options[1], options[2]]);

        let _ = engine.key_input(&mut tree, &KeyInput::new(Key::ArrowDown, KeyboardModifiers::shift()));
        assert_eq!(engine.selection(), &[options[1], options[2], options[3]]);

        // Shrinks back toward the anchor.
        let _ = engine.key_input(&mut tree, &KeyInput::new(Key::ArrowUp, KeyboardModifiers::shift()));
        assert_eq!(engine.selection(), &[options[1], options[2]]);
        assert_invariants(&engine);
    }

    #[test]
    fn test_navigation_without_shift_collapses_selection() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);
        let _ = engine.pointer_select(&mut tree, options[2], KeyboardModifiers::shift());
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowDown));
        assert_eq!(engine.selection(), &[options[3]]);
        assert_invariants(&engine);
    }

    #[test]
    fn test_space_toggles_on_multiselect() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);
        let _ = engine.key_input(
            &mut tree,
            &KeyInput::new(Key::ArrowDown, KeyboardModifiers::primary_only()),
        );
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::Space));
        assert_eq!(engine.selection(), &[options[0], options[1]]);

        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::Space));
        assert_eq!(engine.selection(), &[options[0]]);
        assert_invariants(&engine);
    }

    #[test]
    fn test_select_all_on_multiselect_focuses_first() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let handled = engine.key_input(
            &mut tree,
            &KeyInput::new(Key::Character('a'), KeyboardModifiers::primary_only()),
        );
        assert!(handled.is_handled());
        assert_eq!(engine.selection(), options.as_slice());
        assert_eq!(engine.focused(), Some(options[0]));
        assert_invariants(&engine);
    }

    #[test]
    fn test_select_all_is_unhandled_on_single_select() {
        let (mut tree, mut engine, _) = list_fixture(false);
        let handled = engine.key_input(
            &mut tree,
            &KeyInput::new(Key::Character('a'), KeyboardModifiers::primary_only()),
        );
        assert_eq!(handled, Handled::No);
        assert!(engine.selection().is_empty());
    }

    #[test]
    fn test_tab_is_never_intercepted() {
        let (mut tree, mut engine, _) = list_fixture(true);
        let handled = engine.key_input(&mut tree, &KeyInput::plain(Key::Tab));
        assert_eq!(handled, Handled::No);
    }

    #[test]
    fn test_empty_member_list_is_noop() {
        let mut tree = ElementTree::new();
        let container = tree.alloc("listbox");
        let mut engine =
            SelectionEngine::new(&tree, container, CompositeConfig::list_box()).unwrap();
        let handled = engine.key_input(&mut tree, &KeyInput::plain(Key::ArrowDown));
        assert_eq!(handled, Handled::No);
        assert!(engine.selection().is_empty());
    }

    #[test]
    fn test_type_ahead_finds_forward_prefix_match() {
        let (mut tree, mut engine, options) = list_fixture(false);
        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);

        let start = Instant::now();
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::Character('a')).at(start));
        assert_eq!(engine.focused(), Some(options[1]), "first forward match after Apple");

        let _ = engine.key_input(
            &mut tree,
            &KeyInput::plain(Key::Character('p')).at(start + Duration::from_millis(200)),
        );
        assert_eq!(engine.focused(), Some(options[1]), "growing buffer keeps Apricot");
        assert_eq!(engine.selection(), &[options[1]]);
    }

    #[test]
    fn test_type_ahead_buffer_expires_and_restarts() {
        let (mut tree, mut engine, options) = list_fixture(false);
        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);

        let start = Instant::now();
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::Character('a')).at(start));
        let _ = engine.key_input(
            &mut tree,
            &KeyInput::plain(Key::Character('p')).at(start + Duration::from_millis(100)),
        );
        assert_eq!(engine.focused(), Some(options[1]));

        // After the reset window the buffer restarts; 'a' wraps past Banana
        // and lands on Apple again.
        let later = start + Duration::from_millis(2000);
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::Character('a')).at(later));
        let _ = engine.key_input(
            &mut tree,
            &KeyInput::plain(Key::Character('p')).at(later + Duration::from_millis(100)),
        );
        assert_eq!(engine.focused(), Some(options[0]));
    }

    #[test]
    fn test_type_ahead_wraps_once() {
        let (mut tree, mut engine, options) = list_fixture(false);
        let _ = engine.pointer_select(&mut tree, options[3], KeyboardModifiers::NONE);
        let _ = engine.key_input(&mut tree, &KeyInput::plain(Key::Character('a')));
        assert_eq!(engine.focused(), Some(options[0]));
    }

    #[test]
    fn test_set_selection_rejects_non_members() {
        let (mut tree, mut engine, options) = list_fixture(true);
        tree.set_hidden(options[4], true);
        engine.set_selection(&mut tree, &[options[1], options[4]]);
        assert_eq!(engine.selection(), &[options[1]]);
        assert_invariants(&engine);
    }

    #[test]
    fn test_set_selection_clamps_single_select() {
        let (mut tree, mut engine, options) = list_fixture(false);
        engine.set_selection(&mut tree, &[options[1], options[2]]);
        assert_eq!(engine.selection(), &[options[1]]);
        assert_invariants(&engine);
    }

    #[test]
    fn test_refresh_prunes_hidden_members_from_selection() {
        let (mut tree, mut engine, options) = list_fixture(true);
        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);
        let _ = engine.pointer_select(&mut tree, options[2], KeyboardModifiers::shift());
        assert_eq!(engine.selection().len(), 3);

        tree.set_hidden(options[1], true);
        engine.refresh(&mut tree);
        assert_eq!(engine.selection(), &[options[0], options[2]]);
        assert!(!tree.attr_is(options[1], attr::SELECTED, "true"));
        assert_invariants(&engine);
    }

    #[test]
    fn test_multiselect_forbidden_fails_fast() {
        let mut tree = ElementTree::new();
        let container = tree.alloc("tablist");
        tree.set_attr(container, attr::MULTISELECTABLE, "true");
        let result = SelectionEngine::new(&tree, container, CompositeConfig::tab_list());
        assert!(matches!(
            result,
            Err(ConfigError::MultiSelectForbidden { role: "tablist" })
        ));
    }

    #[test]
    fn test_notification_carries_previous_and_labels() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let (mut tree, mut engine, options) = list_fixture(false);
        let seen: Rc<RefCell<Vec<SelectionChange>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        engine
            .selection_changed
            .connect(move |change| seen_clone.borrow_mut().push(change.clone()));

        let _ = engine.pointer_select(&mut tree, options[0], KeyboardModifiers::NONE);
        let _ = engine.pointer_select(&mut tree, options[2], KeyboardModifiers::NONE);
        // Deferred: nothing delivered until the handler finishes and the
        // host drains.
        assert!(seen.borrow().is_empty());
        trellis_core::dispatch::drain();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].previous, Vec::<ElementId>::new());
        assert_eq!(seen[0].labels, vec!["Apple".to_string()]);
        assert_eq!(seen[1].previous, vec![options[0]]);
        assert_eq!(seen[1].ids, vec!["opt-2".to_string()]);
        assert_eq!(seen[1].labels, vec!["Banana".to_string()]);
    }
}
