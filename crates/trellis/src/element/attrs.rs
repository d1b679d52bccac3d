//! Attribute-name conventions consumed and produced by widgets.

/// Attribute names with widget-level meaning.
///
/// Widgets read and write these on the elements they consume. Application
/// structure that follows the same conventions interoperates with any
/// Trellis widget.
pub mod attr {
    /// Stable string identity of an element.
    pub const ID: &str = "id";

    /// Selection marker used by plain-selection roles (`"true"`/absent).
    pub const SELECTED: &str = "aria-selected";

    /// Selection marker used by checked-style roles (radio groups).
    pub const CHECKED: &str = "aria-checked";

    /// Multi-select flag on a container (`"true"` enables it).
    pub const MULTISELECTABLE: &str = "aria-multiselectable";

    /// Disabled flag on a member (`"true"` excludes it from eligibility).
    pub const DISABLED: &str = "aria-disabled";

    /// Hidden flag. Presence hides the element and its subtree.
    pub const HIDDEN: &str = "hidden";

    /// Expansion state of a tree item owning a subgroup.
    pub const EXPANDED: &str = "aria-expanded";

    /// Sequential-focus participation. The roving tab stop keeps this at
    /// `"0"` on the focused member only.
    pub const TAB_INDEX: &str = "tabindex";

    /// Reference to a labelling element by its [`ID`].
    pub const LABELLED_BY: &str = "aria-labelledby";

    /// Panel controlled by a tab, by its [`ID`].
    pub const CONTROLS: &str = "aria-controls";

    /// Sort direction marker on a grid column header
    /// (`"ascending"`/`"descending"`).
    pub const SORT: &str = "aria-sort";

    /// Grabbed marker on a column header during a drag gesture.
    pub const GRABBED: &str = "aria-grabbed";

    /// Declared value type of a grid column (`string`, `integer`, `boolean`,
    /// `time`).
    pub const DATA_TYPE: &str = "data-type";

    /// Key-column marker on a grid column header.
    pub const DATA_KEY: &str = "data-key";

    /// Row identity on a grid row.
    pub const DATA_ID: &str = "data-id";
}
