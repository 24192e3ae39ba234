//! Structured error types for xlgrid.
//!
//! Precondition violations on grid and filter operations are reported as
//! ordinary errors instead of panics; a rejected operation never mutates state.

/// All errors that can occur in xlgrid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Row index outside `0..rows`.
    #[error("row {row} out of range (grid has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    /// Column index outside `0..columns`.
    #[error("column {col} out of range (grid has {columns} columns)")]
    ColumnOutOfRange { col: usize, columns: usize },

    /// Replacement matrix has no rows, or a header row with no cells.
    #[error("matrix must contain at least one row and one column")]
    EmptyMatrix,

    /// Replacement matrix row whose length differs from the header row.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Seed widths do not line up with the seed matrix.
    #[error("{widths} column widths given for {columns} columns")]
    WidthCountMismatch { widths: usize, columns: usize },

    /// Resize sample or end for a column with no active resize session.
    #[error("no active resize on column {col}")]
    NoActiveResize { col: usize },

    /// Configuration values that cannot describe a usable grid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML configuration could not be decoded.
    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Input that is not a table format xlgrid can decode.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// General decode error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// True for caller mistakes (bad index, malformed matrix) as opposed to
    /// failures while decoding or loading external input.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::RowOutOfRange { .. }
                | Self::ColumnOutOfRange { .. }
                | Self::EmptyMatrix
                | Self::RaggedMatrix { .. }
                | Self::WidthCountMismatch { .. }
                | Self::NoActiveResize { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
