use std::collections::BTreeMap;
use tracing::{debug, trace};

use super::naming::normalize_name;
use super::section::find_section_start;
use crate::grid::CellGrid;

/// Line-item display name → annual cost. Every value is finite and `> 0`.
pub type CostMap = BTreeMap<String, f64>;

/// Label of the summary row closing each cost table.
const TOTAL_ROW: &str = "TOTAL";

pub const DEFAULT_VALUE_COLUMN: u32 = 5;

/// Where a cost table sits in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostSection {
    pub start_marker: &'static str,
    pub end_marker: Option<&'static str>,
    pub value_column: u32,
}

impl CostSection {
    pub fn extract(&self, grid: &CellGrid) -> CostMap {
        extract_costs(grid, self.start_marker, self.end_marker, self.value_column)
    }
}

/// Collects positive line-item costs from the section headed by `start_marker`.
///
/// Scanning starts two rows below the header (the row in between holds column
/// captions) and stops at the first column-1 label containing `end_marker`.
/// A missing section yields an empty map.
pub fn extract_costs(
    grid: &CellGrid,
    start_marker: &str,
    end_marker: Option<&str>,
    value_column: u32,
) -> CostMap {
    let mut costs = CostMap::new();

    let Some(start_row) = find_section_start(grid, start_marker) else {
        debug!(start_marker, "Cost section not found");
        return costs;
    };

    for cell in grid.column(1).filter(|c| c.row > start_row.saturating_add(1)) {
        if let Some(end) = end_marker {
            if cell.value.contains(end) {
                break;
            }
        }

        let name = cell.value.trim();
        if name.is_empty() || name == TOTAL_ROW {
            continue;
        }
        let name = normalize_name(name);

        let Some(raw) = grid.value(cell.row, value_column) else {
            continue;
        };

        match parse_cost(raw) {
            Some(cost) if cost > 0.0 => {
                costs.insert(name.to_string(), cost);
            }
            Some(_) => {}
            None => trace!(row = cell.row, item = name, value = raw, "Skipping unparseable cost"),
        }
    }

    debug!(start_marker, items = costs.len(), "Cost section extracted");
    costs
}

/// Parses a noisy cost cell such as `"1,234.50"` or `"$ 980.00"`.
///
/// Thousands separators go first, then every character other than ASCII
/// digits, `.` and `-`. Non-finite results are rejected.
pub fn parse_cost(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .replace(',', "")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn operating_section(rows: Vec<Cell>) -> CellGrid {
        let mut cells = vec![
            Cell::new(10, 1, "4. ANNUAL OPERATING COST (2023 prices) - PROCESS SUMMARY"),
            Cell::new(11, 1, "Cost Item"),
            Cell::new(11, 2, "$"),
        ];
        cells.extend(rows);
        cells.push(Cell::new(30, 1, "10. PROFITABILITY ANALYSIS"));
        cells.push(Cell::new(31, 1, "Unrelated"));
        cells.push(Cell::new(31, 2, "99"));
        CellGrid::new(cells, 40, 6)
    }

    #[test]
    fn test_parse_cost_thousands() {
        assert_eq!(parse_cost("1,234.50"), Some(1234.5));
        assert_eq!(parse_cost("1,500"), Some(1500.0));
    }

    #[test]
    fn test_parse_cost_strips_noise() {
        assert_eq!(parse_cost("$ 980.00"), Some(980.0));
        assert_eq!(parse_cost("12 %"), Some(12.0));
        assert_eq!(parse_cost("-50"), Some(-50.0));
    }

    #[test]
    fn test_parse_cost_rejects_garbage() {
        assert_eq!(parse_cost(""), None);
        assert_eq!(parse_cost("n/a"), None);
        assert_eq!(parse_cost("1.2.3"), None);
        assert_eq!(parse_cost("-"), None);
    }

    #[test]
    fn test_operating_costs_normalized() {
        let grid = operating_section(vec![
            Cell::new(12, 1, "Utilities"),
            Cell::new(12, 2, "1,500"),
            Cell::new(13, 1, "Labor-Dependent"),
            Cell::new(13, 2, "2,000"),
        ]);

        let costs = extract_costs(&grid, "ANNUAL OPERATING COST", Some("10."), 2);

        let expected: CostMap = [
            ("Utilities (OPEX)".to_string(), 1500.0),
            ("Labor (OPEX)".to_string(), 2000.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(costs, expected);
    }

    #[test]
    fn test_later_duplicate_name_overwrites() {
        let grid = operating_section(vec![
            Cell::new(12, 1, "Utilities"),
            Cell::new(12, 2, "1,500"),
            Cell::new(13, 1, "Utilities (OPEX)"),
            Cell::new(13, 2, "700"),
        ]);

        let costs = extract_costs(&grid, "ANNUAL OPERATING COST", Some("10."), 2);

        assert_eq!(costs.len(), 1);
        assert_eq!(costs.get("Utilities (OPEX)"), Some(&700.0));
    }

    #[test]
    fn test_header_on_last_row() {
        let grid = CellGrid::new(
            vec![
                Cell::new(1, 1, "x"),
                Cell::new(u32::MAX, 1, "UTILITIES COST"),
            ],
            u32::MAX,
            5,
        );
        assert!(grid.validate().is_ok());
        assert!(extract_costs(&grid, "UTILITIES COST", Some("9."), 5).is_empty());
    }

    #[test]
    fn test_missing_section_is_empty() {
        let grid = operating_section(vec![Cell::new(12, 1, "Utilities"), Cell::new(12, 5, "10")]);
        assert!(extract_costs(&grid, "UTILITIES COST", Some("9."), 5).is_empty());
    }

    #[test]
    fn test_drops_non_positive_and_total() {
        let grid = operating_section(vec![
            Cell::new(12, 1, "Zero"),
            Cell::new(12, 2, "0"),
            Cell::new(13, 1, "Negative"),
            Cell::new(13, 2, "-50"),
            Cell::new(14, 1, "Broken"),
            Cell::new(14, 2, "n/a"),
            Cell::new(15, 1, "No value"),
            Cell::new(16, 1, "  TOTAL  "),
            Cell::new(16, 2, "10,000"),
            Cell::new(17, 1, "   "),
            Cell::new(17, 2, "5"),
            Cell::new(18, 1, "Kept"),
            Cell::new(18, 2, "0.5"),
        ]);

        let costs = extract_costs(&grid, "ANNUAL OPERATING COST", Some("10."), 2);

        assert_eq!(costs.len(), 1);
        assert_eq!(costs.get("Kept"), Some(&0.5));
        assert!(costs.values().all(|v| *v > 0.0));
    }

    #[test]
    fn test_stops_at_end_marker() {
        let grid = operating_section(vec![Cell::new(12, 1, "Utilities"), Cell::new(12, 2, "1")]);
        let costs = extract_costs(&grid, "ANNUAL OPERATING COST", Some("10."), 2);
        assert!(!costs.contains_key("Unrelated"));
    }

    #[test]
    fn test_without_end_marker_reads_to_bottom() {
        let grid = operating_section(vec![Cell::new(12, 1, "Utilities"), Cell::new(12, 2, "1")]);
        let costs = extract_costs(&grid, "ANNUAL OPERATING COST", None, 2);
        assert_eq!(costs.get("Unrelated"), Some(&99.0));
    }

    #[test]
    fn test_skips_caption_row_after_header() {
        let grid = CellGrid::new(
            vec![
                Cell::new(1, 1, "MATERIALS COST"),
                Cell::new(2, 1, "Caption"),
                Cell::new(2, 5, "100"),
                Cell::new(3, 1, "Water"),
                Cell::new(3, 5, "20"),
            ],
            3,
            5,
        );
        let costs = extract_costs(&grid, "MATERIALS COST", Some("6."), DEFAULT_VALUE_COLUMN);
        assert_eq!(costs.len(), 1);
        assert_eq!(costs.get("Water"), Some(&20.0));
    }

    #[test]
    fn test_unordered_cells_scanned_by_row() {
        let grid = CellGrid::new(
            vec![
                Cell::new(5, 1, "6. NEXT"),
                Cell::new(4, 5, "7"),
                Cell::new(4, 1, "Water"),
                Cell::new(1, 1, "MATERIALS COST"),
                Cell::new(6, 1, "After"),
                Cell::new(6, 5, "3"),
            ],
            6,
            5,
        );
        let costs = extract_costs(&grid, "MATERIALS COST", Some("6."), 5);
        assert_eq!(costs.len(), 1);
        assert_eq!(costs.get("Water"), Some(&7.0));
    }
}
