//! Decoders that turn foreign tabular files into a grid matrix.
//!
//! A decoder produces an [`ImportedTable`]: rows of [`RawValue`]s (row 0 is
//! the header) plus any value-list filters the file carried. The table is
//! turned into the rectangular string matrix [`crate::grid::Grid::set_data`]
//! expects by [`ImportedTable::into_matrix`], which pads short rows.

mod csv;
mod xlsx;

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{GridError, Result};
use crate::types::{ImportedFilter, RawValue};

pub use csv::{Delimiter, DelimitedDecoder};
pub use xlsx::XlsxDecoder;

/// A file format that can be decoded into a table.
pub trait TableDecoder {
    fn decode(&self, data: &[u8]) -> Result<ImportedTable>;
}

/// Rows decoded from a file, before they become grid cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedTable {
    /// Row 0 is the header. Rows may differ in length.
    pub rows: Vec<Vec<RawValue>>,
    /// Saved value-list filters, by matrix column.
    pub filters: Vec<ImportedFilter>,
}

impl ImportedTable {
    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Canonical string matrix, every row padded with `""` to [`Self::width`].
    pub fn into_matrix(self) -> Result<Vec<Vec<String>>> {
        Ok(self.into_parts()?.0)
    }

    /// Matrix and saved filters together.
    pub fn into_parts(self) -> Result<(Vec<Vec<String>>, Vec<ImportedFilter>)> {
        let width = self.width();
        if width == 0 {
            return Err(GridError::EmptyMatrix);
        }
        let matrix = self
            .rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.into_iter().map(RawValue::into_text).collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();
        Ok((matrix, self.filters))
    }
}

/// Compound File header of legacy `.xls` workbooks.
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0";

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl TableFormat {
    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// Guess from content: ZIP packages are XLSX, text with a tab in its first
    /// line is TSV, anything else CSV. Legacy OLE workbooks are rejected.
    pub fn sniff(data: &[u8]) -> Result<Self> {
        if data.starts_with(OLE_MAGIC) {
            return Err(legacy_xls_error());
        }
        if data.starts_with(b"PK\x03\x04") {
            return Ok(Self::Xlsx);
        }
        let first_line = data.split(|&b| b == b'\n').next().unwrap_or_default();
        if first_line.contains(&b'\t') {
            Ok(Self::Tsv)
        } else {
            Ok(Self::Csv)
        }
    }

    /// Format for a named input: the extension when it is known, otherwise
    /// the content. `.xls` files are rejected either way.
    pub fn resolve(path: &Path, data: &[u8]) -> Result<Self> {
        if is_legacy_xls(path) {
            return Err(legacy_xls_error());
        }
        match Self::from_path(path) {
            Some(format) => Ok(format),
            None => Self::sniff(data),
        }
    }

    pub fn decoder(self) -> Box<dyn TableDecoder> {
        match self {
            Self::Csv => Box::new(DelimitedDecoder::new(Delimiter::Comma)),
            Self::Tsv => Box::new(DelimitedDecoder::new(Delimiter::Tab)),
            Self::Xlsx => Box::new(XlsxDecoder),
        }
    }
}

/// Decode `data` in the given format.
pub fn read_table(data: &[u8], format: TableFormat) -> Result<ImportedTable> {
    let table = format.decoder().decode(data)?;
    debug!(
        "Decoded {format:?}: {} rows, width {}, {} saved filters",
        table.rows.len(),
        table.width(),
        table.filters.len()
    );
    Ok(table)
}

/// Read and decode a file. The extension picks the format; unknown
/// extensions fall back to sniffing the content.
pub fn read_file(path: impl AsRef<Path>) -> Result<ImportedTable> {
    let path = path.as_ref();
    if is_legacy_xls(path) {
        return Err(legacy_xls_error());
    }
    let data = fs::read(path)?;
    read_table(&data, TableFormat::resolve(path, &data)?)
}

fn is_legacy_xls(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xls"))
}

fn legacy_xls_error() -> GridError {
    GridError::UnsupportedFormat("legacy .xls workbooks are not supported; save as .xlsx".into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_into_matrix_pads_short_rows() {
        let table = ImportedTable {
            rows: vec![
                vec![RawValue::Text("A".into()), RawValue::Text("B".into())],
                vec![RawValue::Number(1.0)],
                vec![],
            ],
            filters: Vec::new(),
        };
        let matrix = table.into_matrix().unwrap();
        assert_eq!(matrix, vec![vec!["A", "B"], vec!["1", ""], vec!["", ""]]);
    }

    #[test]
    fn test_into_matrix_rejects_empty() {
        assert!(matches!(
            ImportedTable::default().into_matrix(),
            Err(GridError::EmptyMatrix)
        ));
        let blank = ImportedTable {
            rows: vec![vec![]],
            filters: Vec::new(),
        };
        assert!(matches!(blank.into_matrix(), Err(GridError::EmptyMatrix)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            TableFormat::from_path(Path::new("data/People.XLSX")),
            Some(TableFormat::Xlsx)
        );
        assert_eq!(
            TableFormat::from_path(Path::new("a.tsv")),
            Some(TableFormat::Tsv)
        );
        assert_eq!(TableFormat::from_path(Path::new("notes")), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(TableFormat::sniff(b"PK\x03\x04rest").unwrap(), TableFormat::Xlsx);
        assert_eq!(TableFormat::sniff(b"a\tb\n1\t2").unwrap(), TableFormat::Tsv);
        assert_eq!(TableFormat::sniff(b"a,b\n1\t2").unwrap(), TableFormat::Csv);
        assert!(matches!(
            TableFormat::sniff(b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1"),
            Err(GridError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_legacy_xls_rejected() {
        let err = read_file("old.xls").unwrap_err();
        assert!(matches!(err, GridError::UnsupportedFormat(_)));
    }
}
