//! The four cost breakdowns of a report.

use serde::Serialize;

use crate::extract::costs::DEFAULT_VALUE_COLUMN;
use crate::extract::{CostMap, CostSection};
use crate::process::ProcessRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Operating,
    Material,
    Consumable,
    Utility,
}

impl CostCategory {
    pub const ALL: [CostCategory; 4] = [
        CostCategory::Operating,
        CostCategory::Material,
        CostCategory::Consumable,
        CostCategory::Utility,
    ];

    /// Report section holding this breakdown.
    ///
    /// Operating costs are a summary table with the amount in column 2; the
    /// detail tables carry their annual cost in column 5.
    pub const fn section(self) -> CostSection {
        match self {
            CostCategory::Operating => CostSection {
                start_marker: "ANNUAL OPERATING COST",
                end_marker: Some("10."),
                value_column: 2,
            },
            CostCategory::Material => CostSection {
                start_marker: "MATERIALS COST",
                end_marker: Some("6."),
                value_column: DEFAULT_VALUE_COLUMN,
            },
            CostCategory::Consumable => CostSection {
                start_marker: "VARIOUS CONSUMABLES COST",
                end_marker: Some("7."),
                value_column: DEFAULT_VALUE_COLUMN,
            },
            CostCategory::Utility => CostSection {
                start_marker: "UTILITIES COST",
                end_marker: Some("9."),
                value_column: DEFAULT_VALUE_COLUMN,
            },
        }
    }

    pub fn costs(self, record: &ProcessRecord) -> &CostMap {
        match self {
            CostCategory::Operating => &record.operating_costs,
            CostCategory::Material => &record.material_costs,
            CostCategory::Consumable => &record.consumable_costs,
            CostCategory::Utility => &record.utility_costs,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CostCategory::Operating => "Operating Costs",
            CostCategory::Material => "Material Costs",
            CostCategory::Consumable => "Consumable Costs",
            CostCategory::Utility => "Utility Costs",
        }
    }

    /// Name under which the rendered chart is published.
    pub fn file_stem(self) -> &'static str {
        match self {
            CostCategory::Operating => "AOC",
            CostCategory::Material => "Materials",
            CostCategory::Consumable => "Consumables",
            CostCategory::Utility => "Utilities",
        }
    }
}
