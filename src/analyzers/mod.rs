//! Cross-process aggregation into chart-ready datasets.
//!
//! This module ranks each cost breakdown across processes, derives unit
//! production costs for the stacked chart, and persists the resulting
//! datasets as JSON locally or in S3.

pub mod aggregate;
pub mod analyzer;
pub mod label;
pub mod types;
pub mod utility;
pub mod writetos3;
