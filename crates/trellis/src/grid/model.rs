//! Grid data model: columns, rows, sort conditions, and the type-driven
//! value normalization behind sorting.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::element::ElementId;

/// Declared value type of a grid column, driving sort comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Compared case-insensitively after stripping bracket/quote
    /// punctuation.
    #[default]
    String,
    /// Compared numerically.
    Integer,
    /// Compared as boolean ordering (`false < true`).
    Boolean,
    /// Compared as parsed instants.
    Time,
}

impl ColumnType {
    /// Parses the `data-type` attribute value; unknown names fall back to
    /// string comparison.
    pub fn parse(name: &str) -> Self {
        match name {
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "time" => Self::Time,
            _ => Self::String,
        }
    }

    /// The `data-type` attribute value for this type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Time => "time",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// The `aria-sort` attribute value for this direction.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// The grid's single active sort condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCondition {
    /// Column identity the rows are ordered by.
    pub key: String,
    /// Sort direction.
    pub order: SortOrder,
}

/// Granularity of grid selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionUnit {
    /// Whole rows are the selectable members.
    #[default]
    Row,
    /// Individual cells. Requesting this fails fast at construction.
    Cell,
}

/// One grid column.
///
/// Columns are created at build/parse time and reordered in place by the
/// drag-reorder protocol; they are never deleted at runtime, only hidden.
#[derive(Debug, Clone)]
pub struct GridColumn {
    /// Column identity, keying row fields.
    pub id: String,
    /// Declared value type.
    pub ty: ColumnType,
    /// Key-column flag. The key column can never be hidden or displaced
    /// by a drag.
    pub key: bool,
    /// Whether the column (header and cells) is hidden.
    pub hidden: bool,
    /// The `columnheader` element.
    pub header: ElementId,
    /// Layout width in pixels, used by the drag geometry snapshot.
    pub width: f32,
}

/// One grid row: identity, field values keyed by column id, and the
/// rendered `row` element.
#[derive(Debug, Clone)]
pub struct GridRow {
    /// Row identity (`data-id`).
    pub id: String,
    /// Field values keyed by column id.
    pub fields: BTreeMap<String, String>,
    /// The `row` element.
    pub element: ElementId,
}

// =============================================================================
// Declarative build specs
// =============================================================================

/// Declarative description of a whole grid.
#[derive(Debug, Clone, Deserialize)]
pub struct GridSpec {
    /// Columns in display order.
    pub columns: Vec<ColumnSpec>,
    /// Initial rows.
    #[serde(default)]
    pub rows: Vec<RowSpec>,
    /// Whether rows are multiselectable.
    #[serde(default)]
    pub multiselectable: bool,
}

fn default_width() -> f32 {
    100.0
}

/// Declarative description of one column.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSpec {
    /// Column identity.
    pub id: String,
    /// Header label.
    pub label: String,
    /// Declared value type.
    #[serde(default, rename = "type")]
    pub ty: ColumnType,
    /// Key-column flag.
    #[serde(default)]
    pub key: bool,
    /// Whether the column starts hidden.
    #[serde(default)]
    pub hidden: bool,
    /// Layout width in pixels.
    #[serde(default = "default_width")]
    pub width: f32,
}

/// Declarative description of one row.
#[derive(Debug, Clone, Deserialize)]
pub struct RowSpec {
    /// Row identity.
    pub id: String,
    /// Field values keyed by column id. Missing fields render empty.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl RowSpec {
    /// Creates a row spec from `(column id, value)` pairs.
    pub fn new<I, K, V>(id: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: id.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// =============================================================================
// Sort-value normalization
// =============================================================================

/// A field value normalized for comparison under a column type.
///
/// `Missing` absorbs absent fields and every falsy normalization result
/// (empty string, zero, `false`, unparseable time). Missing values sort
/// after any present value regardless of direction; this mirrors the
/// long-standing observable behavior and is not a general-purpose total
/// order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SortKey {
    Missing,
    Text(String),
    Number(f64),
    Flag(bool),
    Instant(i64),
}

impl SortKey {
    /// Normalizes a raw field value under a column type.
    pub(crate) fn normalize(raw: Option<&str>, ty: ColumnType) -> Self {
        let Some(raw) = raw else {
            return Self::Missing;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match ty {
            ColumnType::String => {
                let cleaned: String = trimmed
                    .chars()
                    .filter(|c| !matches!(c, '[' | ']' | '(' | ')' | '{' | '}' | '"' | '\''))
                    .collect::<String>()
                    .to_lowercase();
                if cleaned.is_empty() {
                    Self::Missing
                } else {
                    Self::Text(cleaned)
                }
            }
            ColumnType::Integer => match trimmed.parse::<f64>() {
                Ok(n) if n != 0.0 => Self::Number(n),
                _ => Self::Missing,
            },
            ColumnType::Boolean => {
                if trimmed == "true" {
                    Self::Flag(true)
                } else {
                    Self::Missing
                }
            }
            ColumnType::Time => parse_instant(trimmed).map_or(Self::Missing, Self::Instant),
        }
    }

    /// Compares two normalized values in the given direction.
    ///
    /// Missing values compare greater than any present value in both
    /// directions; the direction reverses only present-vs-present results.
    pub(crate) fn compare(&self, other: &Self, order: SortOrder) -> Ordering {
        let base = match (self, other) {
            (Self::Missing, Self::Missing) => return Ordering::Equal,
            (Self::Missing, _) => return Ordering::Greater,
            (_, Self::Missing) => return Ordering::Less,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            (Self::Instant(a), Self::Instant(b)) => a.cmp(b),
            // Mixed variants only occur if a column's declared type changed
            // mid-flight; treat as equal and let the stable order hold.
            _ => Ordering::Equal,
        };
        match order {
            SortOrder::Ascending => base,
            SortOrder::Descending => base.reverse(),
        }
    }
}

fn parse_instant(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
    }
    None
}

/// Compares two row identities: equal as strings, or equal as numbers when
/// both parse. Used for filter membership and sort tie-breaking.
pub(crate) fn identity_cmp(a: &str, b: &str) -> Ordering {
    if let (Ok(x), Ok(y)) = (a.parse::<f64>(), b.parse::<f64>()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    a.cmp(b)
}

/// Identity equality under the same string-then-numeric rule.
pub(crate) fn identity_eq(a: &str, b: &str) -> bool {
    a == b || identity_cmp(a, b) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_normalization_strips_punctuation_and_case() {
        let key = SortKey::normalize(Some("[Draft] \"Report\""), ColumnType::String);
        assert_eq!(key, SortKey::Text("draft report".to_string()));
    }

    #[test]
    fn test_falsy_values_normalize_to_missing() {
        assert_eq!(SortKey::normalize(None, ColumnType::String), SortKey::Missing);
        assert_eq!(SortKey::normalize(Some("  "), ColumnType::String), SortKey::Missing);
        assert_eq!(SortKey::normalize(Some("0"), ColumnType::Integer), SortKey::Missing);
        assert_eq!(SortKey::normalize(Some("x"), ColumnType::Integer), SortKey::Missing);
        assert_eq!(SortKey::normalize(Some("false"), ColumnType::Boolean), SortKey::Missing);
        assert_eq!(SortKey::normalize(Some("not a date"), ColumnType::Time), SortKey::Missing);
    }

    #[test]
    fn test_missing_sorts_last_in_both_directions() {
        let present = SortKey::Number(3.0);
        assert_eq!(present.compare(&SortKey::Missing, SortOrder::Ascending), Ordering::Less);
        assert_eq!(present.compare(&SortKey::Missing, SortOrder::Descending), Ordering::Less);
        assert_eq!(SortKey::Missing.compare(&present, SortOrder::Descending), Ordering::Greater);
    }

    #[test]
    fn test_descending_reverses_present_comparisons_only() {
        let a = SortKey::Number(1.0);
        let b = SortKey::Number(2.0);
        assert_eq!(a.compare(&b, SortOrder::Ascending), Ordering::Less);
        assert_eq!(a.compare(&b, SortOrder::Descending), Ordering::Greater);
    }

    #[test]
    fn test_time_parsing_formats() {
        assert!(SortKey::normalize(Some("2024-05-01T10:30:00Z"), ColumnType::Time) != SortKey::Missing);
        assert!(SortKey::normalize(Some("2024-05-01 10:30:00"), ColumnType::Time) != SortKey::Missing);
        assert!(SortKey::normalize(Some("2024-05-01"), ColumnType::Time) != SortKey::Missing);
    }

    #[test]
    fn test_identity_comparison_falls_back_to_numeric() {
        assert!(identity_eq("2", "2"));
        assert!(identity_eq("2", "2.0"));
        assert!(!identity_eq("2", "3"));
        assert!(!identity_eq("abc", "abd"));
        assert_eq!(identity_cmp("10", "9"), Ordering::Greater);
        assert_eq!(identity_cmp("abc", "abd"), Ordering::Less);
    }
}
