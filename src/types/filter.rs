use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Who controls a column's allowed-value set.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    /// The engine adds every newly entered value, so nothing typed is hidden.
    #[default]
    Auto,
    /// The user picked values explicitly; automatic additions stop.
    Manual,
}

/// Allowed values for one column.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    /// Allowed raw values
    pub values: BTreeSet<String>,
    pub mode: FilterMode,
}

impl ColumnFilter {
    /// Auto-mode filter seeded with `values`.
    pub fn seeded<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            mode: FilterMode::Auto,
        }
    }

    pub fn is_customized(&self) -> bool {
        self.mode == FilterMode::Manual
    }

    /// Whether a cell holding `value` passes this column.
    ///
    /// An empty set in auto mode means "not filtering". An empty set in
    /// manual mode means every value was deselected, so nothing passes.
    pub fn admits(&self, value: &str) -> bool {
        if self.values.is_empty() {
            return self.mode == FilterMode::Auto;
        }
        self.values.contains(value)
    }
}

/// A value-list filter found in an imported file (e.g. an XLSX `<autoFilter>`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportedFilter {
    /// 0-based column index in the imported matrix
    pub column: usize,
    /// Values left checked
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_auto_admits_everything() {
        let filter = ColumnFilter::default();
        assert!(filter.admits("anything"));
        assert!(filter.admits(""));
    }

    #[test]
    fn test_empty_manual_admits_nothing() {
        let filter = ColumnFilter {
            values: BTreeSet::new(),
            mode: FilterMode::Manual,
        };
        assert!(!filter.admits("anything"));
        assert!(!filter.admits(""));
    }

    #[test]
    fn test_membership() {
        let filter = ColumnFilter::seeded(["John", "Alice"]);
        assert!(filter.admits("Alice"));
        assert!(!filter.admits("Bob"));
        assert!(!filter.is_customized());
    }
}
