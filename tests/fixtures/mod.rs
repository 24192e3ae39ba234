//! Test fixtures for generating XLSX packages in memory.
//!
//! # Example
//!
//! ```rust
//! let xlsx = XlsxBuilder::new()
//!     .shared_strings(&["Name", "John"])
//!     .cell("A1", CellSpec::shared(0))
//!     .cell("A2", CellSpec::shared(1))
//!     .build();
//! ```
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

/// One `<c>` element.
#[derive(Clone, Debug)]
pub struct CellSpec {
    /// `t` attribute
    pub cell_type: Option<&'static str>,
    /// `<v>` text, or the `<is><t>` text for inline strings
    pub value: String,
}

impl CellSpec {
    pub fn shared(index: usize) -> Self {
        Self {
            cell_type: Some("s"),
            value: index.to_string(),
        }
    }

    pub fn number(value: &str) -> Self {
        Self {
            cell_type: None,
            value: value.to_string(),
        }
    }

    pub fn inline(text: &str) -> Self {
        Self {
            cell_type: Some("inlineStr"),
            value: text.to_string(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            cell_type: Some("b"),
            value: if value { "1" } else { "0" }.to_string(),
        }
    }

    pub fn error(literal: &str) -> Self {
        Self {
            cell_type: Some("e"),
            value: literal.to_string(),
        }
    }

    fn to_xml(&self, cell_ref: &str) -> String {
        let t = self
            .cell_type
            .map(|t| format!(r#" t="{t}""#))
            .unwrap_or_default();
        if self.cell_type == Some("inlineStr") {
            format!(r#"<c r="{cell_ref}"{t}><is><t>{}</t></is></c>"#, self.value)
        } else {
            format!(r#"<c r="{cell_ref}"{t}><v>{}</v></c>"#, self.value)
        }
    }
}

/// Builder for a single-sheet workbook.
#[derive(Default)]
pub struct XlsxBuilder {
    shared: Vec<String>,
    /// (row number, cell ref, cell)
    cells: Vec<(usize, String, CellSpec)>,
    auto_filter: Option<String>,
    extra_rows: String,
    sheet_path: Option<String>,
}

impl XlsxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared = strings.iter().map(ToString::to_string).collect();
        self
    }

    pub fn cell(mut self, cell_ref: &str, cell: CellSpec) -> Self {
        let row: usize = cell_ref
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .parse()
            .expect("cell ref has a row number");
        self.cells.push((row, cell_ref.to_string(), cell));
        self
    }

    /// Raw `<row>` elements placed after the generated rows.
    pub fn raw_rows(mut self, xml: &str) -> Self {
        self.extra_rows.push_str(xml);
        self
    }

    /// Raw `<autoFilter>` element placed after `<sheetData>`.
    pub fn auto_filter(mut self, xml: &str) -> Self {
        self.auto_filter = Some(xml.to_string());
        self
    }

    /// Store the worksheet somewhere other than the default path.
    pub fn sheet_path(mut self, path: &str) -> Self {
        self.sheet_path = Some(path.to_string());
        self
    }

    fn sheet_xml(&self) -> String {
        let mut rows: Vec<usize> = self.cells.iter().map(|(r, _, _)| *r).collect();
        rows.sort_unstable();
        rows.dedup();

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for row in rows {
            write!(xml, r#"<row r="{row}">"#).unwrap();
            for (_, cell_ref, cell) in self.cells.iter().filter(|(r, _, _)| *r == row) {
                xml.push_str(&cell.to_xml(cell_ref));
            }
            xml.push_str("</row>");
        }
        xml.push_str(&self.extra_rows);
        xml.push_str("</sheetData>");
        if let Some(af) = &self.auto_filter {
            xml.push_str(af);
        }
        xml.push_str("</worksheet>");
        xml
    }

    fn shared_strings_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            self.shared.len()
        );
        for s in &self.shared {
            write!(xml, "<si><t>{s}</t></si>").unwrap();
        }
        xml.push_str("</sst>");
        xml
    }

    pub fn build(self) -> Vec<u8> {
        let sheet_path = self
            .sheet_path
            .clone()
            .unwrap_or_else(|| "worksheets/sheet1.xml".to_string());

        let workbook_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="{sheet_path}"/>
  <Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#
        );
        let workbook = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="People" sheetId="1" r:id="rId7"/>
  </sheets>
</workbook>"#;

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            let parts = [
                ("[Content_Types].xml".to_string(), CONTENT_TYPES_XML.to_string()),
                ("_rels/.rels".to_string(), RELS_XML.to_string()),
                ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels),
                ("xl/workbook.xml".to_string(), workbook.to_string()),
                ("xl/sharedStrings.xml".to_string(), self.shared_strings_xml()),
                (format!("xl/{sheet_path}"), self.sheet_xml()),
            ];
            for (name, body) in parts {
                zip.start_file(name, options).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }
}

/// The sample people table as an XLSX package.
pub fn people_xlsx() -> Vec<u8> {
    XlsxBuilder::new()
        .shared_strings(&["Name", "Age", "City", "John", "Alice", "New York", "Los Angeles"])
        .cell("A1", CellSpec::shared(0))
        .cell("B1", CellSpec::shared(1))
        .cell("C1", CellSpec::shared(2))
        .cell("A2", CellSpec::shared(3))
        .cell("B2", CellSpec::number("25"))
        .cell("C2", CellSpec::shared(5))
        .cell("A3", CellSpec::shared(4))
        .cell("B3", CellSpec::number("30"))
        .cell("C3", CellSpec::shared(6))
        .build()
}
