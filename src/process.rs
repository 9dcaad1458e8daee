use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::CostCategory;
use crate::error::ExtractError;
use crate::extract::{CostMap, detect_metadata, metadata};
use crate::grid::{CellGrid, Workbook};

/// Structured cost data recovered from one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub name: String,
    pub currency: String,
    pub year: i32,
    pub operating_costs: CostMap,
    pub material_costs: CostMap,
    pub consumable_costs: CostMap,
    pub utility_costs: CostMap,
    pub annual_rate: f64,
}

impl ProcessRecord {
    /// Assembles a record from the report sheet.
    ///
    /// `scenario_name` wins over the name derived from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Structure`] if the grid is not a report sheet.
    pub fn from_grid(
        grid: &CellGrid,
        scenario_name: Option<&str>,
        source: &str,
    ) -> Result<Self, ExtractError> {
        grid.validate()?;

        let name = match scenario_name.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => name_from_source(source),
        };
        let meta = detect_metadata(grid);

        let record = ProcessRecord {
            name,
            currency: meta.currency,
            year: meta.year,
            operating_costs: CostCategory::Operating.section().extract(grid),
            material_costs: CostCategory::Material.section().extract(grid),
            consumable_costs: CostCategory::Consumable.section().extract(grid),
            utility_costs: CostCategory::Utility.section().extract(grid),
            annual_rate: meta.annual_rate,
        };

        debug!(
            process = %record.name,
            currency = %record.currency,
            year = record.year,
            annual_rate = record.annual_rate,
            "Process record assembled"
        );

        Ok(record)
    }

    /// Assembles a record from the report table of a converted workbook.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MissingTable`] if the workbook has no report table.
    pub fn from_workbook(
        workbook: &Workbook,
        scenario_name: Option<&str>,
        source: &str,
    ) -> Result<Self, ExtractError> {
        Self::from_grid(workbook.report_table()?, scenario_name, source)
    }

    /// A record with defaults and no costs.
    pub fn empty(name: &str) -> Self {
        ProcessRecord {
            name: name.to_string(),
            currency: metadata::DEFAULT_CURRENCY.to_string(),
            year: metadata::DEFAULT_YEAR,
            operating_costs: CostMap::new(),
            material_costs: CostMap::new(),
            consumable_costs: CostMap::new(),
            utility_costs: CostMap::new(),
            annual_rate: 0.0,
        }
    }

    pub fn total(&self, category: CostCategory) -> f64 {
        category.costs(self).values().sum()
    }

    /// Annual operating cost of `item` per produced unit, 0 without a rate.
    pub fn unit_cost(&self, item: &str) -> f64 {
        per_unit(
            self.operating_costs.get(item).copied().unwrap_or(0.0),
            self.annual_rate,
        )
    }
}

/// Divides by the annual rate, yielding 0 when no rate was detected.
pub fn per_unit(annual: f64, annual_rate: f64) -> f64 {
    if annual_rate > 0.0 {
        annual / annual_rate
    } else {
        0.0
    }
}

/// Display name from a file path or URL, e.g. `"1729777526733-Process A.json"`
/// becomes `"Process A"`.
pub fn name_from_source(source: &str) -> String {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let stem = match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    };

    match stem.split_once('-') {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest.to_string()
        }
        _ => stem.to_string(),
    }
}

/// One CSV row summarizing a processed source.
#[derive(Debug, Default, Serialize)]
pub struct ProcessSummary {
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub year: Option<i32>,
    pub annual_rate: f64,

    pub operating_total: f64,
    pub material_total: f64,
    pub consumable_total: f64,
    pub utility_total: f64,
    pub operating_unit_cost: f64,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl ProcessSummary {
    pub fn from_record(record: &ProcessRecord) -> Self {
        ProcessSummary {
            timestamp: Utc::now(),
            source: None,
            name: Some(record.name.clone()),
            currency: Some(record.currency.clone()),
            year: Some(record.year),
            annual_rate: record.annual_rate,
            operating_total: record.total(CostCategory::Operating),
            material_total: record.total(CostCategory::Material),
            consumable_total: record.total(CostCategory::Consumable),
            utility_total: record.total(CostCategory::Utility),
            operating_unit_cost: per_unit(record.total(CostCategory::Operating), record.annual_rate),
            error_type: None,
            error_message: None,
        }
    }

    /// Create an error row with timestamp and error information
    pub fn from_error(error_type: &str, error_message: &str) -> Self {
        ProcessSummary {
            timestamp: Utc::now(),
            error_type: Some(error_type.to_string()),
            error_message: Some(error_message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn report_grid() -> CellGrid {
        CellGrid::new(
            vec![
                Cell::new(1, 1, "Process economics"),
                Cell::new(1, 3, "EUR"),
                Cell::new(2, 1, "Report based on 2023 prices"),
                Cell::new(6, 1, "Annual rate"),
                Cell::new(6, 2, "1,000"),
                Cell::new(10, 1, "4. ANNUAL OPERATING COST (2023 prices)"),
                Cell::new(11, 1, "Cost Item"),
                Cell::new(12, 1, "Utilities"),
                Cell::new(12, 2, "1,500"),
                Cell::new(13, 1, "Labor-Dependent"),
                Cell::new(13, 2, "2,000"),
                Cell::new(14, 1, "TOTAL"),
                Cell::new(14, 2, "3,500"),
                Cell::new(15, 1, "10. PROFITABILITY ANALYSIS"),
            ],
            15,
            5,
        )
    }

    #[test]
    fn test_from_grid_end_to_end() {
        let record = ProcessRecord::from_grid(&report_grid(), Some("Base case"), "x.json").unwrap();

        assert_eq!(record.name, "Base case");
        assert_eq!(record.currency, "€");
        assert_eq!(record.year, 2023);
        assert_eq!(record.annual_rate, 1000.0);
        assert_eq!(record.operating_costs.len(), 2);
        assert_eq!(record.operating_costs.get("Utilities (OPEX)"), Some(&1500.0));
        assert_eq!(record.operating_costs.get("Labor (OPEX)"), Some(&2000.0));
        assert!(record.material_costs.is_empty());
        assert!(record.consumable_costs.is_empty());
        assert!(record.utility_costs.is_empty());
    }

    #[test]
    fn test_from_grid_rejects_empty_grid() {
        let grid = CellGrid::new(vec![], 0, 0);
        assert!(ProcessRecord::from_grid(&grid, None, "a.json").is_err());
    }

    #[test]
    fn test_from_grid_name_from_source() {
        let record =
            ProcessRecord::from_grid(&report_grid(), None, "uploads/1729777526733-Plant B.json")
                .unwrap();
        assert_eq!(record.name, "Plant B");

        let record = ProcessRecord::from_grid(&report_grid(), Some("  "), "Plant C.json").unwrap();
        assert_eq!(record.name, "Plant C");
    }

    #[test]
    fn test_from_workbook_requires_report_table() {
        let mut workbook = Workbook::new();
        workbook.insert("Sheet1", report_grid());
        assert!(matches!(
            ProcessRecord::from_workbook(&workbook, None, "a.json"),
            Err(ExtractError::MissingTable(_))
        ));

        workbook.insert(crate::grid::REPORT_TABLE, report_grid());
        assert!(ProcessRecord::from_workbook(&workbook, None, "a.json").is_ok());
    }

    #[test]
    fn test_name_from_source() {
        assert_eq!(name_from_source("1729777526733-Process A.json"), "Process A");
        assert_eq!(name_from_source("Process-A.json"), "Process-A");
        assert_eq!(name_from_source("/tmp/12-a-b.json"), "a-b");
        assert_eq!(
            name_from_source("https://host/bucket/99-run.json?token=1"),
            "run"
        );
        assert_eq!(name_from_source("plain"), "plain");
        assert_eq!(name_from_source("-x.json"), "-x");
    }

    #[test]
    fn test_per_unit_guards_zero_rate() {
        assert_eq!(per_unit(100.0, 0.0), 0.0);
        assert_eq!(per_unit(100.0, 4.0), 25.0);
    }

    #[test]
    fn test_summary_from_record() {
        let record = ProcessRecord::from_grid(&report_grid(), None, "p.json").unwrap();
        let summary = ProcessSummary::from_record(&record).with_source("p.json");

        assert_eq!(summary.source.as_deref(), Some("p.json"));
        assert_eq!(summary.operating_total, 3500.0);
        assert_eq!(summary.operating_unit_cost, 3.5);
        assert!(summary.error_type.is_none());
    }

    #[test]
    fn test_summary_from_error() {
        let summary = ProcessSummary::from_error("parse_error", "bad json");
        assert_eq!(summary.error_type.as_deref(), Some("parse_error"));
        assert!(summary.name.is_none());
    }
}
