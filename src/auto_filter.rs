//! Per-column value filters and visible-row computation.
//!
//! Each column keeps a set of allowed values plus a mode flag. In auto mode the
//! engine keeps adding values as they are typed, so an unfiltered column never
//! hides fresh input. The first explicit user choice (toggling a value,
//! select all, select none) switches the column to manual mode, and it stays
//! there until the whole grid is replaced.
//!
//! A data row is visible when every column admits its value in that column
//! (AND across columns, set membership within a column).
//!
//! Any change to the cells closes the open dropdown.
//!
//! The engine does not own the cells. [`crate::sheet::Spreadsheet`] calls the
//! `record_*` hooks after each successful grid mutation to keep the two in step.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::error::{GridError, Result};
use crate::grid::Grid;
use crate::types::{ColumnFilter, FilterMode};

/// Filter state for every column of a grid.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    columns: Vec<ColumnFilter>,
    /// Column whose dropdown is open. At most one is open at a time.
    open_dropdown: Option<usize>,
    /// Bumped whenever any column's set or mode changes.
    revision: u64,
}

/// Sorted distinct values of `col` across the grid's data rows.
///
/// Always derived from the current cells, never cached here.
pub fn distinct_values(grid: &Grid, col: usize) -> Result<Vec<String>> {
    let set: BTreeSet<&str> = grid.column_values(col)?.collect();
    Ok(set.into_iter().map(ToString::to_string).collect())
}

impl FilterEngine {
    /// Seed every column in auto mode with the values already present.
    pub fn from_grid(grid: &Grid) -> Self {
        let columns = (0..grid.column_count())
            .map(|col| {
                ColumnFilter::seeded(
                    grid.column_values(col)
                        .map(|values| values.collect::<Vec<_>>())
                        .unwrap_or_default(),
                )
            })
            .collect();
        Self {
            columns,
            open_dropdown: None,
            revision: 0,
        }
    }

    // ---- Reads ----

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, col: usize) -> Result<&ColumnFilter> {
        let columns = self.columns.len();
        self.columns
            .get(col)
            .ok_or(GridError::ColumnOutOfRange { col, columns })
    }

    pub fn columns(&self) -> &[ColumnFilter] {
        &self.columns
    }

    /// The allowed-value set of `col`.
    pub fn filter_set(&self, col: usize) -> Result<&BTreeSet<String>> {
        Ok(&self.column(col)?.values)
    }

    /// Whether `col` has left auto mode.
    pub fn is_customized(&self, col: usize) -> Result<bool> {
        Ok(self.column(col)?.is_customized())
    }

    pub fn mode(&self, col: usize) -> Result<FilterMode> {
        Ok(self.column(col)?.mode)
    }

    pub fn open_dropdown(&self) -> Option<usize> {
        self.open_dropdown
    }

    pub fn is_dropdown_open(&self, col: usize) -> bool {
        self.open_dropdown == Some(col)
    }

    /// Dropdown flags as one boolean per column.
    pub fn dropdown_open(&self) -> Vec<bool> {
        (0..self.columns.len())
            .map(|col| self.is_dropdown_open(col))
            .collect()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Indices of the data rows that pass every column filter, in grid order.
    ///
    /// Full scan; callers that read repeatedly should cache on
    /// `(grid.revision(), self.revision())`.
    pub fn visible_rows(&self, grid: &Grid) -> Vec<usize> {
        grid.data_rows()
            .filter(|(_, row)| {
                row.iter()
                    .zip(&self.columns)
                    .all(|(value, filter)| filter.admits(value))
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    // ---- Grid mutation hooks ----

    /// A cell was edited. Data-row edits in auto columns add the new value.
    pub fn record_cell_edit(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        let columns = self.columns.len();
        let filter = self
            .columns
            .get_mut(col)
            .ok_or(GridError::ColumnOutOfRange { col, columns })?;
        self.open_dropdown = None;
        if row == 0 || filter.is_customized() {
            return Ok(());
        }
        if filter.values.insert(value.to_string()) {
            self.revision += 1;
        }
        Ok(())
    }

    /// A blank data row was appended. Auto columns admit the empty value so the
    /// new row shows up.
    pub fn record_row_added(&mut self) {
        self.open_dropdown = None;
        let mut changed = false;
        for filter in self.columns.iter_mut().filter(|f| !f.is_customized()) {
            changed |= filter.values.insert(String::new());
        }
        if changed {
            self.revision += 1;
        }
    }

    /// A column was appended. It starts unrestricted in auto mode.
    pub fn record_column_added(&mut self) {
        self.open_dropdown = None;
        self.columns.push(ColumnFilter::default());
        self.revision += 1;
    }

    /// Resize to `column_count`, padding with unrestricted auto columns or
    /// truncating. A dropdown on a removed column is closed.
    pub fn resync(&mut self, column_count: usize) {
        if column_count == self.columns.len() {
            return;
        }
        debug!(
            "Resyncing filters from {} to {column_count} columns",
            self.columns.len()
        );
        self.columns.resize_with(column_count, ColumnFilter::default);
        if self.open_dropdown.is_some_and(|col| col >= column_count) {
            self.open_dropdown = None;
        }
        self.revision += 1;
    }

    /// Discard every customization and reseed from `grid`. Used after the
    /// matrix was replaced wholesale.
    pub fn reset(&mut self, grid: &Grid) {
        let revision = self.revision + 1;
        *self = Self::from_grid(grid);
        self.revision = revision;
    }

    // ---- User actions ----

    /// Flip `value` in the allowed set of `col` and switch the column to
    /// manual mode. Returns whether the value is now allowed.
    pub fn toggle_filter_value(&mut self, col: usize, value: &str) -> Result<bool> {
        let filter = self.column_mut(col)?;
        filter.mode = FilterMode::Manual;
        let selected = if filter.values.remove(value) {
            false
        } else {
            filter.values.insert(value.to_string());
            true
        };
        self.revision += 1;
        debug!("Filter column {col}: {value:?} selected={selected}");
        Ok(selected)
    }

    /// Select every current distinct value of `col`, or none of them. Either
    /// way the column becomes manual.
    pub fn select_all_values_for_column(
        &mut self,
        grid: &Grid,
        col: usize,
        select_all: bool,
    ) -> Result<()> {
        let values: BTreeSet<String> = if select_all {
            distinct_values(grid, col)?.into_iter().collect()
        } else {
            BTreeSet::new()
        };
        let filter = self.column_mut(col)?;
        filter.values = values;
        filter.mode = FilterMode::Manual;
        self.revision += 1;
        debug!("Filter column {col}: select_all={select_all}");
        Ok(())
    }

    /// Replace the allowed set of `col` with `values` and make it manual.
    pub fn apply_selection<I, S>(&mut self, col: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = self.column_mut(col)?;
        filter.values = values.into_iter().map(Into::into).collect();
        filter.mode = FilterMode::Manual;
        self.revision += 1;
        Ok(())
    }

    /// Open the dropdown of `col` and close the others. Toggling the column
    /// that is already open closes it. Returns whether it is now open.
    pub fn toggle_filter_dropdown(&mut self, col: usize) -> Result<bool> {
        self.column(col)?;
        if self.open_dropdown == Some(col) {
            self.open_dropdown = None;
            Ok(false)
        } else {
            self.open_dropdown = Some(col);
            Ok(true)
        }
    }

    pub fn close_filter_dropdowns(&mut self) {
        self.open_dropdown = None;
    }

    fn column_mut(&mut self, col: usize) -> Result<&mut ColumnFilter> {
        let columns = self.columns.len();
        self.columns.get_mut(col).ok_or_else(|| {
            warn!("Rejected filter change on column {col} ({columns} columns)");
            GridError::ColumnOutOfRange { col, columns }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn two_column_grid() -> Grid {
        let rows = vec![
            vec!["Name".to_string(), "Age".to_string()],
            vec!["John".to_string(), "25".to_string()],
            vec!["Alice".to_string(), "30".to_string()],
        ];
        Grid::new(rows, vec![100, 100]).unwrap()
    }

    #[test]
    fn test_seeded_from_data_rows_only() {
        let grid = two_column_grid();
        let engine = FilterEngine::from_grid(&grid);
        let names: Vec<&str> = engine.filter_set(0).unwrap().iter().map(String::as_str).collect();
        assert_eq!(names, ["Alice", "John"]);
        assert!(!engine.filter_set(0).unwrap().contains("Name"));
        assert!(!engine.is_customized(0).unwrap());
    }

    #[test]
    fn test_distinct_values_sorted_and_deduplicated() {
        let grid = Grid::sample();
        assert_eq!(
            distinct_values(&grid, 0).unwrap(),
            ["Alice", "Bob", "John"]
        );
    }

    #[test]
    fn test_header_edit_is_ignored() {
        let mut engine = FilterEngine::from_grid(&two_column_grid());
        engine.record_cell_edit(0, 0, "Full name").unwrap();
        assert!(!engine.filter_set(0).unwrap().contains("Full name"));
        assert_eq!(engine.revision(), 0);
    }

    #[test]
    fn test_toggle_switches_to_manual() {
        let mut engine = FilterEngine::from_grid(&two_column_grid());
        assert!(!engine.toggle_filter_value(0, "John").unwrap());
        assert!(engine.is_customized(0).unwrap());
        assert!(engine.toggle_filter_value(0, "John").unwrap());
        assert!(engine.is_customized(0).unwrap());
    }

    #[test]
    fn test_dropdown_single_open() {
        let mut engine = FilterEngine::from_grid(&two_column_grid());
        assert!(engine.toggle_filter_dropdown(0).unwrap());
        assert!(engine.toggle_filter_dropdown(1).unwrap());
        assert_eq!(engine.dropdown_open(), [false, true]);
        assert!(!engine.toggle_filter_dropdown(1).unwrap());
        assert_eq!(engine.dropdown_open(), [false, false]);
        assert!(engine.toggle_filter_dropdown(2).is_err());
    }

    #[test]
    fn test_data_changes_close_dropdown() {
        let mut engine = FilterEngine::from_grid(&two_column_grid());
        engine.toggle_filter_dropdown(0).unwrap();
        engine.record_column_added();
        assert_eq!(engine.open_dropdown(), None);

        engine.toggle_filter_dropdown(1).unwrap();
        engine.record_row_added();
        assert_eq!(engine.open_dropdown(), None);

        engine.toggle_filter_dropdown(1).unwrap();
        engine.record_cell_edit(0, 1, "Years").unwrap();
        assert_eq!(engine.open_dropdown(), None);
    }

    #[test]
    fn test_resync_shrink_closes_dropdown() {
        let mut engine = FilterEngine::from_grid(&two_column_grid());
        engine.toggle_filter_dropdown(1).unwrap();
        engine.resync(1);
        assert_eq!(engine.column_count(), 1);
        assert_eq!(engine.open_dropdown(), None);
        engine.resync(3);
        assert_eq!(engine.column_count(), 3);
        assert!(engine.filter_set(2).unwrap().is_empty());
        assert!(!engine.is_customized(2).unwrap());
    }

    #[test]
    fn test_reset_bumps_revision() {
        let grid = two_column_grid();
        let mut engine = FilterEngine::from_grid(&grid);
        engine.toggle_filter_value(1, "25").unwrap();
        let before = engine.revision();
        engine.reset(&grid);
        assert!(engine.revision() > before);
        assert!(!engine.is_customized(1).unwrap());
    }
}
