//! xlgrid - editable grid model with spreadsheet-style value filters
//!
//! Holds a rectangular matrix of text cells (row 0 is the header), lets
//! callers edit cells and add rows/columns, tracks a display width per column,
//! and decides which data rows are visible under per-column value filters:
//! - Distinct values per column for filter dropdowns
//! - Auto mode (new values stay visible) vs manual mode (user's choice sticks)
//! - AND across columns, set membership within a column
//! - CSV/TSV/XLSX import, including saved XLSX auto-filters
//!
//! # Usage
//!
//! ```rust
//! use xlgrid::Spreadsheet;
//!
//! let mut sheet = Spreadsheet::default();
//! sheet.toggle_filter_value(0, "John")?;
//! assert_eq!(&*sheet.visible_rows(), [2, 3]);
//! # Ok::<(), xlgrid::GridError>(())
//! ```

pub mod auto_filter;
pub mod cell_ref;
pub mod config;
pub mod error;
pub mod grid;
pub mod import;
pub mod resize;
pub mod sheet;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod bindings;

use wasm_bindgen::prelude::*;

pub use auto_filter::FilterEngine;
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use grid::Grid;
pub use sheet::Spreadsheet;
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use bindings::XlGrid;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
