//! The editable sheet: grid, filters and resize drag in one state container.
//!
//! [`Spreadsheet`] is the only mutation entry point a front end needs. Every
//! method applies the grid change first and then feeds the filter engine, so
//! the two never disagree about the number of columns. Derived queries
//! (distinct values, visible rows) are cached until the next change.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::auto_filter::{self, FilterEngine};
use crate::cell_ref::column_label;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::grid::Grid;
use crate::import::ImportedTable;
use crate::resize::ResizeSession;
use crate::types::{ColumnState, Snapshot, VisibleRow};

/// Cached derived queries, valid for one `(grid, filters)` revision pair.
#[derive(Debug, Default)]
struct DerivedCache {
    key: (u64, u64),
    visible_rows: Option<Rc<[usize]>>,
    distinct: HashMap<usize, Rc<[String]>>,
}

impl DerivedCache {
    /// Drop everything if the revisions moved on.
    fn refresh(&mut self, key: (u64, u64)) {
        if self.key != key {
            trace!("Derived cache invalidated: {:?} -> {key:?}", self.key);
            self.key = key;
            self.visible_rows = None;
            self.distinct.clear();
        }
    }
}

/// An editable grid with per-column value filters.
#[derive(Debug)]
pub struct Spreadsheet {
    grid: Grid,
    filters: FilterEngine,
    resize: Option<ResizeSession>,
    cache: RefCell<DerivedCache>,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new(Grid::sample())
    }
}

impl Spreadsheet {
    /// Wrap a grid; every column starts in auto mode.
    pub fn new(grid: Grid) -> Self {
        let filters = FilterEngine::from_grid(&grid);
        Self {
            grid,
            filters,
            resize: None,
            cache: RefCell::new(DerivedCache::default()),
        }
    }

    /// Build from a matrix with every column at the configured default width.
    pub fn from_rows(rows: Vec<Vec<String>>, config: GridConfig) -> Result<Self> {
        Ok(Self::new(Grid::from_rows(rows, config)?))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    pub fn active_resize(&self) -> Option<&ResizeSession> {
        self.resize.as_ref()
    }

    // ---- Cell and structure edits ----

    /// Replace one cell. Data-row edits in auto columns also widen that
    /// column's filter so the new value stays visible.
    pub fn update_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.grid
            .update_cell(row, col, value.as_str())
            .inspect_err(|e| warn!("Rejected cell edit: {e}"))?;
        self.filters.record_cell_edit(row, col, &value)
    }

    /// Append a blank data row. Returns its row index.
    pub fn add_row(&mut self) -> usize {
        let idx = self.grid.add_row();
        self.filters.record_row_added();
        idx
    }

    /// Append a blank column. Returns its column index.
    pub fn add_column(&mut self) -> usize {
        let idx = self.grid.add_column();
        self.filters.record_column_added();
        self.filters.resync(self.grid.column_count());
        idx
    }

    /// Replace the whole matrix. Widths, filter choices and any resize drag
    /// are discarded.
    pub fn set_data(&mut self, rows: Vec<Vec<String>>) -> Result<()> {
        self.grid.set_data(rows)?;
        self.filters.reset(&self.grid);
        self.resize = None;
        Ok(())
    }

    /// Load a decoded table. Value-list filters saved in the file are
    /// reapplied as manual selections on top of the fresh data.
    pub fn import(&mut self, table: ImportedTable) -> Result<()> {
        let (rows, saved_filters) = table.into_parts()?;
        self.set_data(rows)?;
        for saved in saved_filters {
            if let Err(e) = self.filters.apply_selection(saved.column, saved.values) {
                warn!("Skipping imported filter: {e}");
            }
        }
        debug!(
            "Imported {} data rows, {} columns",
            self.grid.data_row_count(),
            self.grid.column_count()
        );
        Ok(())
    }

    /// Store a column width (raised to the minimum). Returns the stored width.
    pub fn set_column_width(&mut self, col: usize, width: u32) -> Result<u32> {
        self.grid.set_column_width(col, width)
    }

    // ---- Filter actions ----

    pub fn toggle_filter_value(&mut self, col: usize, value: &str) -> Result<bool> {
        self.filters.toggle_filter_value(col, value)
    }

    pub fn select_all_values_for_column(&mut self, col: usize, select_all: bool) -> Result<()> {
        self.filters
            .select_all_values_for_column(&self.grid, col, select_all)
    }

    pub fn toggle_filter_dropdown(&mut self, col: usize) -> Result<bool> {
        self.filters.toggle_filter_dropdown(col)
    }

    pub fn close_filter_dropdowns(&mut self) {
        self.filters.close_filter_dropdowns();
    }

    // ---- Derived queries ----

    /// Sorted distinct values of `col` across data rows.
    pub fn distinct_values(&self, col: usize) -> Result<Rc<[String]>> {
        let mut cache = self.cache.borrow_mut();
        cache.refresh(self.cache_key());
        if let Some(values) = cache.distinct.get(&col) {
            return Ok(Rc::clone(values));
        }
        let values: Rc<[String]> = auto_filter::distinct_values(&self.grid, col)?.into();
        cache.distinct.insert(col, Rc::clone(&values));
        Ok(values)
    }

    /// Indices of the data rows passing every column filter, in grid order.
    pub fn visible_rows(&self) -> Rc<[usize]> {
        let mut cache = self.cache.borrow_mut();
        cache.refresh(self.cache_key());
        if let Some(rows) = &cache.visible_rows {
            trace!("Visible rows cache hit");
            return Rc::clone(rows);
        }
        let rows: Rc<[usize]> = self.filters.visible_rows(&self.grid).into();
        cache.visible_rows = Some(Rc::clone(&rows));
        rows
    }

    /// Full render state: header, widths, visible rows, dropdown contents.
    pub fn snapshot(&self) -> Snapshot {
        let rows = self
            .visible_rows()
            .iter()
            .filter_map(|&index| {
                self.grid.row(index).map(|cells| VisibleRow {
                    index,
                    cells: cells.to_vec(),
                })
            })
            .collect();
        let columns = self
            .filters
            .columns()
            .iter()
            .enumerate()
            .map(|(col, filter)| ColumnState {
                label: column_label(col),
                distinct_values: self
                    .distinct_values(col)
                    .map(|v| v.to_vec())
                    .unwrap_or_default(),
                selected: filter.values.iter().cloned().collect(),
                customized: filter.is_customized(),
                dropdown_open: self.filters.is_dropdown_open(col),
            })
            .collect();
        Snapshot {
            header: self.grid.header().to_vec(),
            column_widths: self.grid.column_widths().to_vec(),
            rows,
            columns,
            total_rows: self.grid.data_row_count(),
        }
    }

    // ---- Column resize drag ----

    /// Start dragging the resize handle of `col` with the pointer at
    /// `pointer_x`. Replaces any drag already in progress.
    pub fn begin_resize(&mut self, col: usize, pointer_x: f32) -> Result<()> {
        let columns = self.grid.column_count();
        let start_width = self
            .grid
            .column_width(col)
            .ok_or(GridError::ColumnOutOfRange { col, columns })?;
        self.resize = Some(ResizeSession::new(col, start_width, pointer_x));
        Ok(())
    }

    /// Apply an already computed width during the drag of `col`.
    pub fn sample_resize(&mut self, col: usize, width: u32) -> Result<u32> {
        match self.resize {
            Some(session) if session.col == col => self.grid.set_column_width(col, width),
            _ => Err(GridError::NoActiveResize { col }),
        }
    }

    /// Apply a pointer-move sample. `None` when no drag is in progress.
    pub fn sample_resize_pointer(&mut self, pointer_x: f32) -> Option<u32> {
        let session = self.resize?;
        let width = session.width_at(pointer_x, self.grid.config());
        self.grid.set_column_width(session.col, width).ok()
    }

    /// Finish the drag of `col`.
    pub fn end_resize(&mut self, col: usize) -> Result<()> {
        match self.resize {
            Some(session) if session.col == col => {
                self.resize = None;
                Ok(())
            }
            _ => Err(GridError::NoActiveResize { col }),
        }
    }

    fn cache_key(&self) -> (u64, u64) {
        (self.grid.revision(), self.filters.revision())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sample_sheet() {
        let sheet = Spreadsheet::default();
        assert_eq!(&*sheet.visible_rows(), [1, 2, 3, 4]);
        assert_eq!(sheet.grid().column_widths(), [100, 100, 100]);
    }

    #[test]
    fn test_visible_rows_cached_until_change() {
        let mut sheet = Spreadsheet::default();
        let first = sheet.visible_rows();
        let second = sheet.visible_rows();
        assert!(Rc::ptr_eq(&first, &second));

        sheet.toggle_filter_value(0, "John").unwrap();
        let third = sheet.visible_rows();
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(&*third, [2, 3]);
    }

    #[test]
    fn test_width_change_keeps_cache() {
        let mut sheet = Spreadsheet::default();
        let before = sheet.visible_rows();
        sheet.set_column_width(0, 200).unwrap();
        assert!(Rc::ptr_eq(&before, &sheet.visible_rows()));
    }

    #[test]
    fn test_distinct_values_follow_edits() {
        let mut sheet = Spreadsheet::default();
        assert_eq!(&*sheet.distinct_values(0).unwrap(), ["Alice", "Bob", "John"]);
        sheet.update_cell(3, 0, "Zoe").unwrap();
        assert_eq!(&*sheet.distinct_values(0).unwrap(), ["Alice", "John", "Zoe"]);
    }

    #[test]
    fn test_snapshot_columns() {
        let mut sheet = Spreadsheet::default();
        sheet.toggle_filter_dropdown(1).unwrap();
        let snap = sheet.snapshot();
        assert_eq!(snap.total_rows, 4);
        assert_eq!(snap.columns.len(), 3);
        assert_eq!(snap.columns[2].label, "C");
        assert!(snap.columns[1].dropdown_open);
        assert!(!snap.columns[0].dropdown_open);
        assert_eq!(snap.rows[0].cells, ["John", "25", "New York"]);
    }
}
