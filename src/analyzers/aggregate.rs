use anyhow::bail;
use chrono::Utc;

use crate::analyzers::label::{segment_label, total_label};
use crate::analyzers::types::{
    ChartIndex, ChartIndexEntry, ChartSet, ComparativeDataset, ComparativeSeries,
    StackedDataset, StackedSegment, StackedSeries,
};
use crate::analyzers::utility::{by_total_desc, totals_by_key};
use crate::category::CostCategory;
use crate::process::ProcessRecord;

/// Operating-cost items stacked in the unit production cost chart, bottom to top.
pub static STACKED_CATEGORIES: &[&str] = &[
    "Raw materials (OPEX)",
    "Labor (OPEX)",
    "Utilities (OPEX)",
    "Consumables (OPEX)",
    "Wastewater treatment (OPEX)",
    "Laboratory/QC/QA (OPEX)",
    "Facility-dependent (CAPEX)",
];

pub const STACKED_TITLE: &str = "Comparative Unit Production Cost";
pub const STACKED_FILE_STEM: &str = "stacked_bar_chart";

/// Builds the grouped bar dataset for one cost breakdown.
///
/// Bars are ordered by their total across all processes, largest first, with
/// ties broken by name. Processes keep their input order and get 0 for items
/// they do not report.
pub fn build_comparative(
    records: &[ProcessRecord],
    category: CostCategory,
    currency: &str,
) -> ComparativeDataset {
    let totals = totals_by_key(records.iter().map(|r| category.costs(r)));

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(by_total_desc);
    let categories: Vec<String> = ranked.into_iter().map(|(name, _)| name.to_string()).collect();

    let series = records
        .iter()
        .map(|record| {
            let costs = category.costs(record);
            ComparativeSeries {
                process: record.name.clone(),
                values: categories
                    .iter()
                    .map(|c| costs.get(c).copied().unwrap_or(0.0))
                    .collect(),
            }
        })
        .collect();

    ComparativeDataset {
        category,
        file_stem: category.file_stem().to_string(),
        title: format!("Comparative {}", category.title()),
        ylabel: format!("Annual Cost ({currency})"),
        categories,
        series,
    }
}

/// Builds the stacked unit production cost dataset.
///
/// Each segment is the item's annual operating cost divided by the process's
/// annual rate; processes without a rate get zero everywhere. Every segment
/// counts towards the total, labelled or not.
pub fn build_stacked(records: &[ProcessRecord], currency: &str) -> StackedDataset {
    let series = records
        .iter()
        .map(|record| {
            let segments: Vec<StackedSegment> = STACKED_CATEGORIES
                .iter()
                .map(|&category| {
                    let unit_cost = record.unit_cost(category);
                    StackedSegment {
                        category: category.to_string(),
                        unit_cost,
                        label: segment_label(unit_cost),
                    }
                })
                .collect();
            let total: f64 = segments.iter().map(|s| s.unit_cost).sum();

            StackedSeries {
                process: record.name.clone(),
                segments,
                total,
                total_label: total_label(total),
            }
        })
        .collect();

    StackedDataset {
        title: STACKED_TITLE.to_string(),
        ylabel: format!("Unit Production Cost [{currency} kg⁻¹]"),
        categories: STACKED_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        series,
    }
}

/// Builds all comparison datasets. Axis labels use the first record's currency.
pub fn build_chart_set(records: &[ProcessRecord]) -> anyhow::Result<ChartSet> {
    let Some(first) = records.first() else {
        bail!("No valid process data found");
    };
    let currency = first.currency.as_str();

    let comparative = CostCategory::ALL
        .iter()
        .map(|&category| build_comparative(records, category, currency))
        .collect();

    Ok(ChartSet {
        generated_at: Utc::now(),
        currency: currency.to_string(),
        comparative,
        stacked: build_stacked(records, currency),
    })
}

/// Index listing the processes of a chart set and the keys its charts were written to.
pub fn build_index(records: &[ProcessRecord], set: &ChartSet, charts: Vec<String>) -> ChartIndex {
    let processes = records
        .iter()
        .zip(&set.stacked.series)
        .map(|(record, series)| ChartIndexEntry {
            name: record.name.clone(),
            currency: record.currency.clone(),
            year: record.year,
            annual_rate: record.annual_rate,
            unit_cost_total: series.total,
        })
        .collect();

    ChartIndex {
        generated_at: set.generated_at,
        processes,
        charts,
    }
}
