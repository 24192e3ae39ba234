//! Minimal CSV/TSV decoder.
//!
//! Quoted fields and doubled-quote escapes are supported; a quoted field may
//! not span lines. Blank lines are skipped and cells are trimmed. Values stay
//! text so leading zeros and number formatting survive the import.

use log::warn;

use crate::error::Result;
use crate::types::RawValue;

use super::{ImportedTable, TableDecoder};

/// Field separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }
}

/// Decoder for comma- or tab-separated text.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedDecoder {
    delimiter: Delimiter,
}

impl DelimitedDecoder {
    pub fn new(delimiter: Delimiter) -> Self {
        Self { delimiter }
    }
}

impl TableDecoder for DelimitedDecoder {
    fn decode(&self, data: &[u8]) -> Result<ImportedTable> {
        Ok(parse_delimited(data, self.delimiter))
    }
}

/// Parse CSV/TSV bytes into table rows.
pub(crate) fn parse_delimited(data: &[u8], delim: Delimiter) -> ImportedTable {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let text = String::from_utf8_lossy(data);
    let sep = delim.as_char();

    let rows = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let (fields, open_quote) = split_csv_line(line, sep);
            if open_quote {
                warn!(
                    "Line {}: quoted field runs past the end of the line; \
                     its remainder is read as separate rows",
                    idx + 1
                );
            }
            fields
                .into_iter()
                .map(|field| {
                    let value = field.trim();
                    if value.is_empty() {
                        RawValue::Empty
                    } else {
                        RawValue::Text(value.to_string())
                    }
                })
                .collect()
        })
        .collect();

    ImportedTable {
        rows,
        filters: Vec::new(),
    }
}

/// Split a CSV line respecting quoted fields. The flag is set when the line
/// ends inside an open quote.
fn split_csv_line(line: &str, sep: char) -> (Vec<String>, bool) {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    // Escaped quote
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == sep {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    (fields, in_quotes)
}
