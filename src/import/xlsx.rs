//! XLSX decoder: the first worksheet's cell values and saved value filters.
//!
//! Reads only what the grid needs:
//! - `xl/_rels/workbook.xml.rels` for part paths
//! - `xl/workbook.xml` for the first sheet
//! - `xl/sharedStrings.xml`
//! - the sheet's `<sheetData>` and `<autoFilter>`
//!
//! Styles, formulas and number formats are ignored; numbers come through as
//! their stored value. The matrix starts at the first used row and column.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::cell_ref::{parse_cell_ref, parse_range};
use crate::error::{GridError, Result};
use crate::types::{ImportedFilter, RawValue};

use super::{ImportedTable, TableDecoder};

/// Largest sheet Excel can hold.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Decoder for Office Open XML workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxDecoder;

impl TableDecoder for XlsxDecoder {
    fn decode(&self, data: &[u8]) -> Result<ImportedTable> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let rels = parse_workbook_relationships(&mut archive);
        let sheet_path = first_sheet_path(&mut archive, &rels.worksheets)?;
        let shared_strings = parse_shared_strings(&mut archive, rels.shared_strings.as_deref());
        debug!(
            "Reading {sheet_path} with {} shared strings",
            shared_strings.len()
        );
        let sheet = parse_sheet(&mut archive, &sheet_path, &shared_strings)?;
        Ok(sheet.into_table())
    }
}

/// Paths from xl/_rels/workbook.xml.rels, resolved to full archive paths.
#[derive(Default, Debug)]
struct WorkbookRelationships {
    /// rId -> path, e.g. "rId1" -> "xl/worksheets/sheet1.xml"
    worksheets: HashMap<String, String>,
    shared_strings: Option<String>,
}

fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Like [`attr_string`], but matches the local part of a prefixed key
/// (`r:id` for `id`).
fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> WorkbookRelationships {
    let mut rels = WorkbookRelationships::default();

    let Ok(file) = archive.by_name("xl/_rels/workbook.xml.rels") else {
        return rels; // Relationships file is optional
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_string(e, b"Id").unwrap_or_default();
                let target = attr_string(e, b"Target").unwrap_or_default();
                let rel_type = attr_string(e, b"Type").unwrap_or_default();

                let full_path = match target.strip_prefix('/') {
                    Some(stripped) => stripped.to_string(),
                    None => format!("xl/{target}"),
                };

                if rel_type.ends_with("/worksheet") && !id.is_empty() && !target.is_empty() {
                    rels.worksheets.insert(id, full_path);
                } else if rel_type.ends_with("/sharedStrings") {
                    rels.shared_strings = Some(full_path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("Malformed workbook relationships: {e}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    rels
}

/// Archive path of the first `<sheet>` in xl/workbook.xml.
fn first_sheet_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    worksheets: &HashMap<String, String>,
) -> Result<String> {
    let file = archive.by_name("xl/workbook.xml")?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                let path = attr_string_local(e, b"id")
                    .and_then(|r_id| worksheets.get(&r_id).cloned())
                    .unwrap_or_else(|| "xl/worksheets/sheet1.xml".to_string());
                return Ok(path);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Err(GridError::Parse("workbook contains no sheets".into()))
}

fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Vec<String> {
    let sst_path = path.unwrap_or("xl/sharedStrings.xml");
    let Ok(file) = archive.by_name(sst_path) else {
        return Vec::new(); // SharedStrings is optional
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    // Phonetic runs (<rPh>) carry reading hints, not cell text.
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Ok(Event::Text(ref e)) if in_t => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("Malformed shared strings, keeping {} entries: {e}", strings.len());
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    strings
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Number,
}

fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Number,
    }
}

fn resolve_value(tag: CellTypeTag, text: String, shared_strings: &[String]) -> RawValue {
    if text.is_empty() && tag != CellTypeTag::Inline {
        return RawValue::Empty;
    }
    match tag {
        CellTypeTag::Shared => match text.trim().parse::<usize>() {
            Ok(idx) => match shared_strings.get(idx) {
                Some(s) => RawValue::Text(s.clone()),
                None => {
                    warn!("Shared string index {idx} out of range");
                    RawValue::Empty
                }
            },
            Err(_) => RawValue::Text(text),
        },
        CellTypeTag::Inline | CellTypeTag::Str => RawValue::Text(text),
        CellTypeTag::Bool => RawValue::Bool(text.trim() == "1"),
        CellTypeTag::Error => RawValue::Error(text),
        CellTypeTag::Number => match text.trim().parse::<f64>() {
            Ok(n) => RawValue::Number(n),
            Err(_) => RawValue::Text(text),
        },
    }
}

/// Cells and filters collected from one worksheet, in sheet coordinates.
#[derive(Debug, Default)]
struct ParsedSheet {
    /// (row, col, value); empty values are dropped.
    cells: Vec<(usize, usize, RawValue)>,
    auto_filter: Option<SavedAutoFilter>,
}

#[derive(Debug)]
struct SavedAutoFilter {
    /// Sheet column of the filter range's first column
    start_col: usize,
    /// (colId, allowed values)
    columns: Vec<(usize, Vec<String>)>,
}

impl ParsedSheet {
    /// Shift to the first used row/column and lay the cells out as rows.
    fn into_table(self) -> ImportedTable {
        let Some(min_row) = self.cells.iter().map(|&(r, _, _)| r).min() else {
            return ImportedTable::default();
        };
        let min_col = self.cells.iter().map(|&(_, c, _)| c).min().unwrap_or(0);
        let max_row = self.cells.iter().map(|&(r, _, _)| r).max().unwrap_or(min_row);

        let mut rows: Vec<Vec<RawValue>> = vec![Vec::new(); max_row - min_row + 1];
        for (r, c, value) in self.cells {
            let Some(row) = rows.get_mut(r - min_row) else {
                continue;
            };
            let col = c - min_col;
            if row.len() <= col {
                row.resize(col + 1, RawValue::Empty);
            }
            if let Some(slot) = row.get_mut(col) {
                *slot = value;
            }
        }

        let filters = self
            .auto_filter
            .map(|af| {
                af.columns
                    .into_iter()
                    .filter_map(|(col_id, values)| {
                        let column = af.start_col.checked_add(col_id)?.checked_sub(min_col)?;
                        Some(ImportedFilter { column, values })
                    })
                    .collect()
            })
            .unwrap_or_default();

        ImportedTable { rows, filters }
    }
}

fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    shared_strings: &[String],
) -> Result<ParsedSheet> {
    let file = archive.by_name(path)?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut sheet = ParsedSheet::default();
    let mut buf = Vec::new();
    // Sheet row of the current <row>, and the next one when `r` is omitted.
    let mut current_row: usize = 0;
    let mut next_row: usize = 0;
    let mut next_col: usize = 0;

    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"row" => {
                current_row = attr_string(e, b"r")
                    .and_then(|r| r.parse::<usize>().ok())
                    .and_then(|r| r.checked_sub(1))
                    .unwrap_or(next_row);
                next_row = current_row.checked_add(1).unwrap_or_else(|| {
                    // Cells in this row land past MAX_ROWS and are skipped below
                    warn!("Row number overflow after row {current_row}, skipping row");
                    current_row
                });
                next_col = 0;
            }
            Event::Start(ref e) if e.local_name().as_ref() == b"c" => {
                let (col, row, tag) = cell_position(e, current_row, next_col);
                next_col = col.saturating_add(1);
                let text = read_cell_text(&mut xml, tag == CellTypeTag::Inline)?;
                if row >= MAX_ROWS || col >= MAX_COLS {
                    warn!("Skipping cell outside sheet bounds at ({row}, {col})");
                    continue;
                }
                let value = resolve_value(tag, text, shared_strings);
                if !value.is_empty() {
                    sheet.cells.push((row, col, value));
                }
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"c" => {
                // Styled but valueless cell
                let (col, _, _) = cell_position(e, current_row, next_col);
                next_col = col.saturating_add(1);
            }
            Event::Start(ref e) if e.local_name().as_ref() == b"autoFilter" => {
                sheet.auto_filter = parse_auto_filter(e, &mut xml);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!("Parsed {} non-empty cells from {path}", sheet.cells.len());
    Ok(sheet)
}

/// Column, row and type of a `<c>` element. Cells without a reference take
/// the position after the previous cell in the row.
fn cell_position(e: &BytesStart, row: usize, next_col: usize) -> (usize, usize, CellTypeTag) {
    let mut pos = (next_col, row);
    let mut tag = CellTypeTag::Number;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some(parsed) = parse_cell_ref(&attr.value) {
                    pos = parsed;
                }
            }
            b"t" => tag = parse_cell_type_tag(&attr.value),
            _ => {}
        }
    }
    (pos.0, pos.1, tag)
}

/// Collect the text of a `<c>` element up to its end tag: the `<v>` value, or
/// the `<t>` runs of an inline string.
fn read_cell_text<R: BufRead>(xml: &mut Reader<R>, inline: bool) -> Result<String> {
    let mut text = String::new();
    let mut capture = false;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = e.local_name();
                capture = if inline {
                    name.as_ref() == b"t"
                } else {
                    name.as_ref() == b"v"
                };
            }
            Event::Text(ref e) if capture => text.push_str(&e.unescape()?),
            Event::CData(ref e) if capture => {
                text.push_str(&String::from_utf8_lossy(e));
            }
            Event::End(ref e) => {
                if e.local_name().as_ref() == b"c" {
                    break;
                }
                capture = false;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Parse an `<autoFilter>` element, keeping only value-list columns.
///
/// ```xml
/// <autoFilter ref="A1:D10">
///   <filterColumn colId="0">
///     <filters blank="1"><filter val="Value1"/><filter val="Value2"/></filters>
///   </filterColumn>
/// </autoFilter>
/// ```
///
/// Custom, top-10, dynamic, color and icon filters have no value-list form
/// and are skipped.
fn parse_auto_filter<R: BufRead>(e: &BytesStart, xml: &mut Reader<R>) -> Option<SavedAutoFilter> {
    let range = attr_string(e, b"ref")?;
    let ((start_col, _), _) = parse_range(&range)?;

    let mut columns = Vec::new();
    let mut buf = Vec::new();
    let mut col_id: Option<usize> = None;
    let mut values: Vec<String> = Vec::new();
    let mut has_values = false;

    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref inner)) => match inner.local_name().as_ref() {
                b"filterColumn" => {
                    col_id = attr_string(inner, b"colId").and_then(|s| s.parse().ok());
                    values.clear();
                    has_values = false;
                }
                b"filters" => {
                    has_values = true;
                    if attr_string(inner, b"blank").as_deref() == Some("1") {
                        values.push(String::new());
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref inner)) => match inner.local_name().as_ref() {
                b"filter" if has_values => {
                    if let Some(val) = attr_string(inner, b"val") {
                        values.push(val);
                    }
                }
                b"filters" => {
                    // <filters blank="1"/>: only blanks are shown
                    has_values = true;
                    if attr_string(inner, b"blank").as_deref() == Some("1") {
                        values.push(String::new());
                    }
                }
                b"dateGroupItem" => {
                    // Date groups select ranges, not stored values
                    has_values = false;
                }
                other => {
                    debug!(
                        "Ignoring {} auto-filter criterion",
                        String::from_utf8_lossy(other)
                    );
                }
            },
            Ok(Event::End(ref inner)) => match inner.local_name().as_ref() {
                b"filterColumn" => {
                    if let (Some(id), true) = (col_id.take(), has_values) {
                        columns.push((id, std::mem::take(&mut values)));
                    }
                }
                b"autoFilter" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!("Malformed autoFilter: {err}");
                break;
            }
            _ => {}
        }
    }

    Some(SavedAutoFilter { start_col, columns })
}
