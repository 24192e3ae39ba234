//! A1-style cell references and column letters.

/// Column letters for a 0-based index: 0 → "A", 25 → "Z", 26 → "AA".
pub fn column_label(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        // rem < 26, so the sum stays within ASCII uppercase
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Inverse of [`column_label`]: "A" → 0, "aa" → 26.
pub fn parse_column_label(label: &str) -> Option<usize> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let mut col: usize = 0;
    for b in label.bytes() {
        col = col
            .checked_mul(26)?
            .checked_add(usize::from(b.to_ascii_uppercase() - b'A') + 1)?;
    }
    Some(col - 1)
}

/// Parse a reference like `B3` or `$B$3` from raw bytes into 0-based
/// `(col, row)`. Returns `None` when either part is missing.
pub fn parse_cell_ref(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut col: usize = 0;
    let mut row: usize = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in bytes.iter().filter(|&&b| b != b'$') {
        if b.is_ascii_alphabetic() && !saw_row {
            let upper = b.to_ascii_uppercase();
            col = col
                .checked_mul(26)?
                .checked_add(usize::from(upper - b'A') + 1)?;
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.checked_mul(10)?.checked_add(usize::from(b - b'0'))?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }
    Some((col - 1, row - 1))
}

/// Parse a range like `A1:D10` (or a single cell) into
/// `((start_col, start_row), (end_col, end_row))`.
pub fn parse_range(range: &str) -> Option<((usize, usize), (usize, usize))> {
    let (start, end) = range.split_once(':').unwrap_or((range, range));
    let start = parse_cell_ref(start.trim().as_bytes())?;
    let end = parse_cell_ref(end.trim().as_bytes())?;
    Some((start, end))
}
