//! JSON decoder for converted workbooks.

use crate::error::ExtractError;
use crate::grid::{CellGrid, Workbook};

/// Decodes a workbook JSON document (sheet name → flattened sheet).
///
/// # Errors
///
/// Returns an error if the bytes are not a valid workbook document.
pub fn parse_workbook(bytes: &[u8]) -> Result<Workbook, ExtractError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes a workbook and returns its report table.
///
/// # Errors
///
/// Returns an error if the document cannot be decoded or has no report table.
pub fn parse_report(bytes: &[u8]) -> Result<CellGrid, ExtractError> {
    let mut workbook = parse_workbook(bytes)?;
    workbook.take_report_table()
}
