//! Flattened sheet model: one entry per non-empty cell.
//!
//! A [`Workbook`] maps sheet names to [`CellGrid`]s and is the JSON document
//! exchanged between the spreadsheet reader and the extractors.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::ExtractError;

/// Sheet that holds the cost report produced by the upstream report tool.
pub const REPORT_TABLE: &str = "Table p. 1";

/// A single non-empty cell. `row` and `column` are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_letter: Option<String>,
    pub value: String,
}

impl Cell {
    pub fn new(row: u32, column: u32, value: impl Into<String>) -> Self {
        Self {
            row,
            column,
            column_letter: None,
            value: value.into(),
        }
    }
}

#[derive(Deserialize)]
struct RawCellGrid {
    #[serde(default)]
    sheet_name: Option<String>,
    #[serde(default)]
    max_row: u32,
    #[serde(default)]
    max_column: u32,
    #[serde(default)]
    cells: Vec<Cell>,
}

impl From<RawCellGrid> for CellGrid {
    fn from(raw: RawCellGrid) -> Self {
        let mut grid = CellGrid::new(raw.cells, raw.max_row, raw.max_column);
        grid.sheet_name = raw.sheet_name;
        grid
    }
}

/// Immutable flattened sheet.
///
/// Cells are kept in row-major order (stable with respect to the input), which
/// is the scan order every extractor relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawCellGrid")]
pub struct CellGrid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    pub max_row: u32,
    pub max_column: u32,
    cells: Vec<Cell>,
    #[serde(skip)]
    index: HashMap<(u32, u32), usize>,
}

impl CellGrid {
    pub fn new(mut cells: Vec<Cell>, max_row: u32, max_column: u32) -> Self {
        cells.sort_by_key(|c| (c.row, c.column));

        let mut index = HashMap::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            index.entry((cell.row, cell.column)).or_insert(i);
        }

        Self {
            sheet_name: None,
            max_row,
            max_column,
            cells,
            index,
        }
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell at `(row, column)`, if any.
    pub fn get(&self, row: u32, column: u32) -> Option<&Cell> {
        self.index.get(&(row, column)).map(|&i| &self.cells[i])
    }

    pub fn value(&self, row: u32, column: u32) -> Option<&str> {
        self.get(row, column).map(|c| c.value.as_str())
    }

    /// Cells of one column in scan order.
    pub fn column(&self, column: u32) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |c| c.column == column)
    }

    /// Minimal well-formedness check for a report sheet.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Structure`] if the grid has no cells, no
    /// dimensions, or cells outside 1-based coordinates.
    pub fn validate(&self) -> Result<(), ExtractError> {
        let sheet = self.sheet_name.clone().unwrap_or_else(|| REPORT_TABLE.to_string());

        if self.cells.is_empty() {
            return Err(ExtractError::Structure {
                sheet,
                reason: "sheet has no cells".into(),
            });
        }
        if self.max_row == 0 || self.max_column == 0 {
            return Err(ExtractError::Structure {
                sheet,
                reason: format!(
                    "invalid dimensions {}x{}",
                    self.max_row, self.max_column
                ),
            });
        }
        if let Some(cell) = self.cells.iter().find(|c| c.row == 0 || c.column == 0) {
            return Err(ExtractError::Structure {
                sheet,
                reason: format!(
                    "cell at ({}, {}) is not 1-based",
                    cell.row, cell.column
                ),
            });
        }

        Ok(())
    }
}

/// Sheet name → flattened sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workbook {
    sheets: BTreeMap<String, CellGrid>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, grid: CellGrid) {
        self.sheets.insert(name.into(), grid);
    }

    pub fn sheet(&self, name: &str) -> Option<&CellGrid> {
        self.sheets.get(name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// The cost report sheet.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MissingTable`] when the workbook was not produced
    /// from a cost report.
    pub fn report_table(&self) -> Result<&CellGrid, ExtractError> {
        self.sheet(REPORT_TABLE)
            .ok_or_else(|| ExtractError::MissingTable(REPORT_TABLE.to_string()))
    }

    /// Like [`Workbook::report_table`], but moves the sheet out.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MissingTable`] when there is no report table.
    pub fn take_report_table(&mut self) -> Result<CellGrid, ExtractError> {
        self.sheets
            .remove(REPORT_TABLE)
            .ok_or_else(|| ExtractError::MissingTable(REPORT_TABLE.to_string()))
    }
}

/// Spreadsheet column letters for a 1-based column index (`1 → A`, `27 → AA`).
pub fn column_letter(column: u32) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
