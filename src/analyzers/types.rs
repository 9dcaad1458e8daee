//! Chart-ready datasets handed to the renderer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::category::CostCategory;

/// One process's bars in a comparative chart, aligned with the dataset's categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeSeries {
    pub process: String,
    pub values: Vec<f64>,
}

/// Grouped bar chart comparing one cost breakdown across processes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeDataset {
    pub category: CostCategory,
    pub file_stem: String,
    pub title: String,
    pub ylabel: String,
    pub categories: Vec<String>,
    pub series: Vec<ComparativeSeries>,
}

impl ComparativeDataset {
    /// Value of `category` for `process`, 0 if either is unknown.
    #[cfg(test)]
    pub fn value(&self, process: &str, category: &str) -> f64 {
        let Some(idx) = self.categories.iter().position(|c| c == category) else {
            return 0.0;
        };
        self.series
            .iter()
            .find(|s| s.process == process)
            .map(|s| s.values[idx])
            .unwrap_or(0.0)
    }
}

/// One stacked segment of a process bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSegment {
    pub category: String,
    pub unit_cost: f64,
    /// Text drawn inside the segment; only set for segments large enough to label.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSeries {
    pub process: String,
    pub segments: Vec<StackedSegment>,
    pub total: f64,
    pub total_label: String,
}

/// Unit production cost per process, broken down into the fixed OPEX/CAPEX categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedDataset {
    pub title: String,
    pub ylabel: String,
    pub categories: Vec<String>,
    pub series: Vec<StackedSeries>,
}

/// Everything needed to draw the comparison charts of one request.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSet {
    pub generated_at: DateTime<Utc>,
    pub currency: String,
    pub comparative: Vec<ComparativeDataset>,
    pub stacked: StackedDataset,
}

/// Summary entry for the chart index listing.
#[derive(Debug, Clone, Serialize)]
pub struct ChartIndexEntry {
    pub name: String,
    pub currency: String,
    pub year: i32,
    pub annual_rate: f64,
    pub unit_cost_total: f64,
}

/// Top-level index of a chart build, written as `index.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ChartIndex {
    pub generated_at: DateTime<Utc>,
    pub processes: Vec<ChartIndexEntry>,
    pub charts: Vec<String>,
}
