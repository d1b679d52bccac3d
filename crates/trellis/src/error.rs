//! Error types for the Trellis toolkit.
//!
//! Only construction-time misconfiguration is an error. Runtime requests
//! against stale or absent members are no-ops by design: the eligible-member
//! snapshot is the single source of truth and anything outside it is
//! ignored (with a `warn!` trace).

/// Result type alias for widget construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Developer errors raised at widget construction time.
///
/// These are never recovered silently; fix the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Cell-level grid selection was requested.
    #[error("cell-level grid selection is not implemented; use row selection")]
    CellSelectionUnsupported,

    /// A single-select-only role was given a multiselectable container.
    #[error("role '{role}' does not support multiple selection")]
    MultiSelectForbidden { role: &'static str },

    /// The container element is not present in the tree.
    #[error("container element is not present in the element tree")]
    MissingContainer,

    /// A grid container is missing a required section.
    #[error("grid container has no {part} section")]
    MalformedGrid { part: &'static str },

    /// A grid was declared without a key column.
    #[error("grid declares no key column")]
    MissingKeyColumn,
}

impl ConfigError {
    /// Creates a multi-select misconfiguration error for a role.
    pub fn multi_select_forbidden(role: &'static str) -> Self {
        Self::MultiSelectForbidden { role }
    }

    /// Creates a malformed-grid error for a missing section.
    pub fn malformed_grid(part: &'static str) -> Self {
        Self::MalformedGrid { part }
    }
}
