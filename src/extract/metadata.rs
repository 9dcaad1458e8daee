use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::grid::CellGrid;

pub const DEFAULT_CURRENCY: &str = "$";
pub const DEFAULT_YEAR: i32 = 2024;
pub const EURO: &str = "€";

const CURRENCY_CELL: (u32, u32) = (1, 3);
const ANNUAL_RATE_CELL: (u32, u32) = (6, 2);

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*?(\d{4}).*?prices").expect("valid year regex"));

/// Report-level metadata found at fixed positions of the cost report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub currency: String,
    pub year: i32,
    pub annual_rate: f64,
}

pub fn detect_metadata(grid: &CellGrid) -> Metadata {
    Metadata {
        currency: detect_currency(grid),
        year: detect_year(grid),
        annual_rate: detect_annual_rate(grid),
    }
}

/// Currency symbol from row 1, column 3. Euro in any spelling collapses to `€`.
pub fn detect_currency(grid: &CellGrid) -> String {
    let Some(raw) = grid.value(CURRENCY_CELL.0, CURRENCY_CELL.1) else {
        debug!("No currency cell, defaulting to {}", DEFAULT_CURRENCY);
        return DEFAULT_CURRENCY.to_string();
    };

    let trimmed = raw.trim();
    if trimmed.contains("EUR") || trimmed.contains(EURO) {
        return EURO.to_string();
    }

    let currency: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    // A blank currency cell counts as not detected.
    if currency.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        currency
    }
}

/// Base year from the first column-1 cell reading like "... 2023 prices".
pub fn detect_year(grid: &CellGrid) -> i32 {
    grid.column(1)
        .find_map(|cell| {
            YEAR_RE
                .captures(&cell.value)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<i32>().ok())
        })
        .unwrap_or_else(|| {
            debug!("No base year found, defaulting to {}", DEFAULT_YEAR);
            DEFAULT_YEAR
        })
}

/// Annual throughput from row 6, column 2. Unusable values read as 0.0.
pub fn detect_annual_rate(grid: &CellGrid) -> f64 {
    let Some(raw) = grid.value(ANNUAL_RATE_CELL.0, ANNUAL_RATE_CELL.1) else {
        debug!("No annual rate cell");
        return 0.0;
    };

    match raw.replace(',', "").trim().parse::<f64>() {
        Ok(rate) if rate.is_finite() && rate >= 0.0 => rate,
        Ok(rate) => {
            debug!(rate, "Annual rate out of range, using 0");
            0.0
        }
        Err(e) => {
            debug!(value = raw, error = %e, "Annual rate is not numeric");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn grid(cells: Vec<Cell>) -> CellGrid {
        CellGrid::new(cells, 20, 6)
    }

    #[test]
    fn test_currency_eur_text() {
        let g = grid(vec![Cell::new(1, 3, "EUR ")]);
        assert_eq!(detect_currency(&g), "€");
    }

    #[test]
    fn test_currency_euro_glyph() {
        let g = grid(vec![Cell::new(1, 3, " € ")]);
        assert_eq!(detect_currency(&g), "€");
    }

    #[test]
    fn test_currency_strips_whitespace() {
        let g = grid(vec![Cell::new(1, 3, " US $ ")]);
        assert_eq!(detect_currency(&g), "US$");
    }

    #[test]
    fn test_currency_blank_cell_defaults() {
        let g = grid(vec![Cell::new(1, 3, "   ")]);
        assert_eq!(detect_currency(&g), DEFAULT_CURRENCY);
    }

    #[test]
    fn test_currency_default() {
        let g = grid(vec![Cell::new(1, 2, "EUR")]);
        assert_eq!(detect_currency(&g), "$");
    }

    #[test]
    fn test_year_detected() {
        let g = grid(vec![
            Cell::new(1, 1, "Cost report"),
            Cell::new(2, 1, "Report based on 2023 prices"),
        ]);
        assert_eq!(detect_year(&g), 2023);
    }

    #[test]
    fn test_year_first_match_wins() {
        let g = grid(vec![
            Cell::new(2, 1, "2019 prices"),
            Cell::new(3, 1, "2031 prices"),
        ]);
        assert_eq!(detect_year(&g), 2019);
    }

    #[test]
    fn test_year_ignores_other_columns() {
        let g = grid(vec![Cell::new(2, 2, "Report based on 2023 prices")]);
        assert_eq!(detect_year(&g), DEFAULT_YEAR);
    }

    #[test]
    fn test_year_requires_prices_after_digits() {
        let g = grid(vec![Cell::new(2, 1, "prices as of 2023")]);
        assert_eq!(detect_year(&g), DEFAULT_YEAR);
    }

    #[test]
    fn test_annual_rate_with_separators() {
        let g = grid(vec![Cell::new(6, 2, "1,250,000.5")]);
        assert_eq!(detect_annual_rate(&g), 1_250_000.5);
    }

    #[test]
    fn test_annual_rate_defaults() {
        assert_eq!(detect_annual_rate(&grid(vec![])), 0.0);
        assert_eq!(detect_annual_rate(&grid(vec![Cell::new(6, 2, "n/a")])), 0.0);
        assert_eq!(detect_annual_rate(&grid(vec![Cell::new(6, 2, "-5")])), 0.0);
    }

    #[test]
    fn test_detect_metadata_combines() {
        let g = grid(vec![
            Cell::new(1, 3, "EUR"),
            Cell::new(3, 1, "Based on 2022 prices"),
            Cell::new(6, 2, "10,000"),
        ]);
        assert_eq!(
            detect_metadata(&g),
            Metadata {
                currency: "€".into(),
                year: 2022,
                annual_rate: 10_000.0,
            }
        );
    }
}
