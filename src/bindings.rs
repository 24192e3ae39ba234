//! JavaScript bindings.
//!
//! `XlGrid` wraps a [`Spreadsheet`] for a browser front end. The front end
//! renders from [`XlGrid::snapshot`] and calls back into the mutation methods
//! on user input; every call is synchronous.
//!
//! ```javascript
//! import init, { XlGrid } from 'xlgrid';
//! await init();
//! const grid = new XlGrid();
//! grid.load(new Uint8Array(await file.arrayBuffer()), file.name);
//! grid.toggle_filter_value(0, "John");
//! render(grid.snapshot());
//! ```

use std::path::Path;

use wasm_bindgen::prelude::*;

use crate::import::{read_table, TableFormat};
use crate::sheet::Spreadsheet;

/// The grid session exported to JavaScript.
#[wasm_bindgen]
pub struct XlGrid {
    sheet: Spreadsheet,
}

#[wasm_bindgen]
impl XlGrid {
    /// Start from the sample sheet.
    #[wasm_bindgen(constructor)]
    pub fn new() -> XlGrid {
        console_error_panic_hook::set_once();
        XlGrid {
            sheet: Spreadsheet::default(),
        }
    }

    /// Replace the grid with a decoded file. The format comes from the file
    /// name's extension, or from the bytes when the name has none. Legacy
    /// `.xls` workbooks are rejected and leave the grid as it was.
    pub fn load(&mut self, data: &[u8], file_name: &str) -> Result<(), JsValue> {
        let format = TableFormat::resolve(Path::new(file_name), data)?;
        let table = read_table(data, format)?;
        self.sheet.import(table)?;
        Ok(())
    }

    /// Replace the grid with rows given as `string[][]`.
    pub fn set_data(&mut self, rows: JsValue) -> Result<(), JsValue> {
        let rows: Vec<Vec<String>> = serde_wasm_bindgen::from_value(rows)?;
        self.sheet.set_data(rows)?;
        Ok(())
    }

    pub fn update_cell(&mut self, row: usize, col: usize, value: String) -> Result<(), JsValue> {
        self.sheet.update_cell(row, col, value)?;
        Ok(())
    }

    pub fn add_row(&mut self) -> usize {
        self.sheet.add_row()
    }

    pub fn add_column(&mut self) -> usize {
        self.sheet.add_column()
    }

    pub fn set_column_width(&mut self, col: usize, width: u32) -> Result<u32, JsValue> {
        Ok(self.sheet.set_column_width(col, width)?)
    }

    /// Pointer-down on a column's resize handle.
    pub fn begin_resize(&mut self, col: usize, pointer_x: f32) -> Result<(), JsValue> {
        self.sheet.begin_resize(col, pointer_x)?;
        Ok(())
    }

    /// Pointer-move while dragging. Returns the stored width, if a drag is active.
    pub fn resize_to(&mut self, pointer_x: f32) -> Option<u32> {
        self.sheet.sample_resize_pointer(pointer_x)
    }

    /// Pointer-up.
    pub fn end_resize(&mut self, col: usize) -> Result<(), JsValue> {
        self.sheet.end_resize(col)?;
        Ok(())
    }

    /// Returns whether `value` is now checked.
    pub fn toggle_filter_value(&mut self, col: usize, value: &str) -> Result<bool, JsValue> {
        Ok(self.sheet.toggle_filter_value(col, value)?)
    }

    pub fn select_all_values(&mut self, col: usize, select_all: bool) -> Result<(), JsValue> {
        self.sheet.select_all_values_for_column(col, select_all)?;
        Ok(())
    }

    /// Returns whether the dropdown of `col` is now open.
    pub fn toggle_filter_dropdown(&mut self, col: usize) -> Result<bool, JsValue> {
        Ok(self.sheet.toggle_filter_dropdown(col)?)
    }

    pub fn close_filter_dropdowns(&mut self) {
        self.sheet.close_filter_dropdowns();
    }

    pub fn visible_rows(&self) -> Vec<usize> {
        self.sheet.visible_rows().to_vec()
    }

    pub fn distinct_values(&self, col: usize) -> Result<Vec<String>, JsValue> {
        Ok(self.sheet.distinct_values(col)?.to_vec())
    }

    /// Render state as a plain JS object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sheet.snapshot())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }
}

impl Default for XlGrid {
    fn default() -> Self {
        Self::new()
    }
}
