//! Spreadsheet → [`Workbook`] conversion.
//!
//! The first sheet row is the header row and is not emitted; data rows are
//! numbered from 1 directly below it, columns from 1 at column A. Positions
//! used by the extractors (currency at row 1 column 3, annual rate at row 6
//! column 2) are expressed in this numbering.

use calamine::{Data, DataType, Range, Reader, Xls, Xlsx};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ExtractError;
use crate::grid::{Cell, CellGrid, Workbook, column_letter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
}

/// Identifies the container from its magic bytes.
pub fn detect_format(bytes: &[u8]) -> Option<SpreadsheetFormat> {
    if bytes.starts_with(b"PK\x03\x04") {
        Some(SpreadsheetFormat::Xlsx)
    } else if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        Some(SpreadsheetFormat::Xls)
    } else {
        None
    }
}

/// Reads every sheet of an `.xlsx`/`.xls` file.
///
/// # Errors
///
/// Returns an error for unreadable files and unsupported formats.
pub fn read_workbook_file(path: impl AsRef<Path>) -> Result<Workbook, ExtractError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| ExtractError::Workbook(format!("{}: {e}", path.display())))?;
    read_workbook(bytes)
}

/// Reads every sheet of an in-memory `.xlsx`/`.xls` document.
///
/// # Errors
///
/// Returns an error when the bytes are not a supported spreadsheet.
pub fn read_workbook(bytes: Vec<u8>) -> Result<Workbook, ExtractError> {
    let format = detect_format(&bytes)
        .ok_or_else(|| ExtractError::UnsupportedFormat("not an Excel file".into()))?;
    debug!(?format, bytes = bytes.len(), "Reading spreadsheet");

    let cursor = Cursor::new(bytes);
    match format {
        SpreadsheetFormat::Xlsx => {
            let workbook: Xlsx<_> =
                Xlsx::new(cursor).map_err(|e| ExtractError::Workbook(e.to_string()))?;
            read_sheets(workbook)
        }
        SpreadsheetFormat::Xls => {
            let workbook: Xls<_> =
                Xls::new(cursor).map_err(|e| ExtractError::Workbook(e.to_string()))?;
            read_sheets(workbook)
        }
    }
}

fn read_sheets<R>(mut workbook: R) -> Result<Workbook, ExtractError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    let mut out = Workbook::new();

    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractError::Workbook(format!("sheet '{name}': {e}")))?;
        let grid = flatten_range(&range).with_sheet_name(name.clone());
        info!(sheet = %name, cells = grid.len(), "Processed sheet");
        out.insert(name, grid);
    }

    Ok(out)
}

/// Flattens a sheet range into non-empty cells below the header row.
pub fn flatten_range(range: &Range<Data>) -> CellGrid {
    let (Some(start), Some(end)) = (range.start(), range.end()) else {
        return CellGrid::new(Vec::new(), 0, 0);
    };

    let mut cells = Vec::new();
    for (i, row) in range.rows().enumerate() {
        // Absolute 0-based sheet row; row 0 is the header.
        let sheet_row = start.0 + i as u32;
        if sheet_row == 0 {
            continue;
        }
        for (j, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let column = start.1 + j as u32 + 1;
            cells.push(Cell {
                row: sheet_row,
                column,
                column_letter: Some(column_letter(column)),
                value: value.to_string(),
            });
        }
    }

    CellGrid::new(cells, end.0, end.1 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(b"PK\x03\x04rest"),
            Some(SpreadsheetFormat::Xlsx)
        );
        assert_eq!(
            detect_format(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1]),
            Some(SpreadsheetFormat::Xls)
        );
        assert_eq!(detect_format(b"{\"a\": 1}"), None);
        assert_eq!(detect_format(b""), None);
    }

    #[test]
    fn test_read_workbook_rejects_unknown_bytes() {
        assert!(matches!(
            read_workbook(b"not a spreadsheet".to_vec()),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_read_workbook_file_missing() {
        assert!(matches!(
            read_workbook_file("/nonexistent/report.xlsx"),
            Err(ExtractError::Workbook(_))
        ));
    }

    #[test]
    fn test_flatten_skips_header_and_empty_cells() {
        let mut range = Range::new((0, 0), (6, 2));
        range.set_value((0, 0), Data::String("Header".into()));
        range.set_value((1, 2), Data::String("EUR".into()));
        range.set_value((6, 1), Data::Float(1250.5));
        range.set_value((3, 0), Data::String("Based on 2023 prices".into()));

        let grid = flatten_range(&range);

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.max_row, 6);
        assert_eq!(grid.max_column, 3);
        assert_eq!(grid.value(1, 3), Some("EUR"));
        assert_eq!(grid.value(3, 1), Some("Based on 2023 prices"));
        assert_eq!(grid.value(6, 2), Some("1250.5"));
        assert_eq!(grid.get(1, 3).and_then(|c| c.column_letter.as_deref()), Some("C"));
        assert!(grid.cells().iter().all(|c| c.value != "Header"));
    }

    #[test]
    fn test_flatten_offset_range_keeps_absolute_positions() {
        let mut range = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("B3".into()));
        range.set_value((3, 2), Data::Int(7));

        let grid = flatten_range(&range);

        assert_eq!(grid.value(2, 2), Some("B3"));
        assert_eq!(grid.value(3, 3), Some("7"));
    }

    #[test]
    fn test_flatten_empty_range() {
        let range: Range<Data> = Range::empty();
        let grid = flatten_range(&range);
        assert!(grid.is_empty());
        assert_eq!(grid.max_row, 0);
    }
}
