//! Rectangular cell matrix with per-column display widths.
//!
//! Row 0 is the header row; rows from 1 on are data rows. Every row always has
//! exactly [`Grid::column_count`] cells and there is exactly one width per
//! column. Operations that would break either rule are rejected before any
//! state changes.

use log::{debug, warn};

use crate::config::GridConfig;
use crate::error::{GridError, Result};

/// The cell matrix and its column widths.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Vec<String>>,
    column_widths: Vec<u32>,
    config: GridConfig,
    /// Bumped on every change to `rows`. Width changes do not count.
    revision: u64,
}

impl Grid {
    /// Create a grid from a seed matrix and seed widths.
    pub fn new(rows: Vec<Vec<String>>, column_widths: Vec<u32>) -> Result<Self> {
        Self::with_config(rows, column_widths, GridConfig::default())
    }

    /// Create a grid with explicit width settings. Seed widths below the
    /// configured minimum are raised to it.
    pub fn with_config(
        rows: Vec<Vec<String>>,
        column_widths: Vec<u32>,
        config: GridConfig,
    ) -> Result<Self> {
        let columns = validate_matrix(&rows)?;
        if column_widths.len() != columns {
            return Err(GridError::WidthCountMismatch {
                widths: column_widths.len(),
                columns,
            });
        }
        let column_widths = column_widths
            .into_iter()
            .map(|w| config.clamp_width(w))
            .collect();
        Ok(Self {
            rows,
            column_widths,
            config,
            revision: 0,
        })
    }

    /// Create a grid with every column at the default width.
    pub fn from_rows(rows: Vec<Vec<String>>, config: GridConfig) -> Result<Self> {
        let columns = validate_matrix(&rows)?;
        let widths = vec![config.default_column_width; columns];
        Self::with_config(rows, widths, config)
    }

    /// The starter sheet shown before anything is imported.
    #[must_use]
    pub fn sample() -> Self {
        let rows = [
            ["Name", "Age", "City"],
            ["John", "25", "New York"],
            ["Alice", "30", "Los Angeles"],
            ["Bob", "40", "Chicago"],
            ["John", "28", "Houston"],
        ]
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
        let config = GridConfig::default();
        Self {
            rows,
            column_widths: vec![config.default_column_width; 3],
            config,
            revision: 0,
        }
    }

    // ---- Reads ----

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Data rows paired with their index in [`Grid::rows`].
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> + '_ {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| (idx, row.as_slice()))
    }

    /// Values of one column across the data rows, top to bottom.
    pub fn column_values(&self, col: usize) -> Result<impl Iterator<Item = &str> + '_> {
        self.check_col(col)?;
        Ok(self
            .rows
            .iter()
            .skip(1)
            .filter_map(move |row| row.get(col).map(String::as_str)))
    }

    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    /// Total rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn column_widths(&self) -> &[u32] {
        &self.column_widths
    }

    pub fn column_width(&self, col: usize) -> Option<u32> {
        self.column_widths.get(col).copied()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ---- Mutations ----

    /// Replace one cell. The matrix shape never changes.
    pub fn update_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        self.check_col(col)?;
        let rows = self.rows.len();
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(GridError::RowOutOfRange { row, rows })?;
        *cell = value.into();
        self.revision += 1;
        debug!("Updated cell ({row}, {col})");
        Ok(())
    }

    /// Append a data row of empty cells. Returns its row index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(vec![String::new(); self.column_count()]);
        self.revision += 1;
        let idx = self.rows.len() - 1;
        debug!("Added row {idx}");
        idx
    }

    /// Append an empty column at the default width. Returns its index.
    pub fn add_column(&mut self) -> usize {
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.column_widths.push(self.config.default_column_width);
        self.revision += 1;
        let idx = self.column_widths.len() - 1;
        debug!("Added column {idx}");
        idx
    }

    /// Replace the whole matrix. Every column goes back to the default width.
    pub fn set_data(&mut self, rows: Vec<Vec<String>>) -> Result<()> {
        let columns = validate_matrix(&rows).inspect_err(|e| warn!("Rejected set_data: {e}"))?;
        self.rows = rows;
        self.column_widths = vec![self.config.default_column_width; columns];
        self.revision += 1;
        debug!(
            "Replaced grid data: {} rows x {columns} columns",
            self.rows.len()
        );
        Ok(())
    }

    /// Store a column width, raised to the configured minimum. Returns the
    /// width actually stored.
    pub fn set_column_width(&mut self, col: usize, width: u32) -> Result<u32> {
        let columns = self.column_count();
        let stored = self.config.clamp_width(width);
        let slot = self
            .column_widths
            .get_mut(col)
            .ok_or(GridError::ColumnOutOfRange { col, columns })?;
        *slot = stored;
        Ok(stored)
    }

    fn check_col(&self, col: usize) -> Result<()> {
        let columns = self.column_count();
        if col < columns {
            Ok(())
        } else {
            Err(GridError::ColumnOutOfRange { col, columns })
        }
    }
}

/// Check that `rows` is non-empty and rectangular; returns the column count.
pub fn validate_matrix(rows: &[Vec<String>]) -> Result<usize> {
    let expected = match rows.first() {
        Some(header) if !header.is_empty() => header.len(),
        _ => return Err(GridError::EmptyMatrix),
    };
    if let Some((row, found)) = rows
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, len)| len != expected)
    {
        return Err(GridError::RaggedMatrix {
            row,
            expected,
            found,
        });
    }
    Ok(expected)
}
