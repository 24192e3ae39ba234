use serde::{Deserialize, Serialize};

/// Everything a renderer needs to draw the grid once.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Header row cells
    pub header: Vec<String>,
    pub column_widths: Vec<u32>,
    /// Data rows that pass the filters, in grid order
    pub rows: Vec<VisibleRow>,
    pub columns: Vec<ColumnState>,
    /// Data rows before filtering
    pub total_rows: usize,
}

/// A data row kept by the filters.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRow {
    /// Index into the full row list (header is 0)
    pub index: usize,
    pub cells: Vec<String>,
}

/// Filter dropdown state for one column.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    /// Letter label ("A", "B", ... "AA")
    pub label: String,
    /// Choices offered in the dropdown
    pub distinct_values: Vec<String>,
    /// Values currently checked
    pub selected: Vec<String>,
    pub customized: bool,
    pub dropdown_open: bool,
}
