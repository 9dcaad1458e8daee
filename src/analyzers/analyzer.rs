use anyhow::Result;
use std::path::Path;
use tracing::{error, info, warn};

use crate::analyzers::aggregate::{STACKED_FILE_STEM, build_chart_set, build_index};
use crate::analyzers::types::ChartSet;
use crate::analyzers::writetos3::{write_bytes_to_s3, write_json_to_s3};
use crate::output::append_record;
use crate::parser::parse_workbook;
use crate::process::{ProcessRecord, ProcessSummary};
use crate::request::ChartSource;

pub const INDEX_FILE: &str = "index.json";

/// A request source together with its loaded bytes (or why loading failed).
pub struct LoadedSource {
    pub source: ChartSource,
    pub bytes: Result<Vec<u8>>,
}

/// Assembles one record per source, in input order.
///
/// Sources that cannot be loaded or are not cost reports are logged and
/// skipped; when `summary_path` is set every source leaves a CSV row there,
/// failed ones as error rows.
pub fn assemble_records(loaded: Vec<LoadedSource>, summary_path: Option<&str>) -> Vec<ProcessRecord> {
    let mut records = Vec::new();

    for LoadedSource { source, bytes } in loaded {
        let name = source.source.as_str();

        let summary = match bytes {
            Err(e) => {
                error!(source = name, error = %e, "Report fetch failed");
                ProcessSummary::from_error("fetch_error", &e.to_string())
            }
            Ok(bytes) => match parse_workbook(&bytes).and_then(|workbook| {
                ProcessRecord::from_workbook(&workbook, source.scenario.as_deref(), name)
            }) {
                Ok(record) => {
                    info!(source = name, process = %record.name, "Report processed");
                    let summary = ProcessSummary::from_record(&record);
                    records.push(record);
                    summary
                }
                Err(e) => {
                    error!(source = name, error = %e, "Report extraction failed");
                    ProcessSummary::from_error("extract_error", &e.to_string())
                }
            },
        };

        if let Some(path) = summary_path {
            if let Err(e) = append_record(path, &summary.with_source(name)) {
                warn!(path, error = %e, "Failed to write summary row");
            }
        }
    }

    records
}

/// Serialized chart documents of a set, keyed by file name.
pub fn chart_documents(set: &ChartSet) -> Result<Vec<(String, Vec<u8>)>> {
    let mut documents = Vec::with_capacity(set.comparative.len() + 1);

    for dataset in &set.comparative {
        documents.push((
            format!("{}.json", dataset.file_stem),
            serde_json::to_vec_pretty(dataset)?,
        ));
    }
    documents.push((
        format!("{STACKED_FILE_STEM}.json"),
        serde_json::to_vec_pretty(&set.stacked)?,
    ));

    Ok(documents)
}

/// Builds the chart set for `records` and writes it to `output_dir`.
///
/// Returns the chart set together with the paths written, index last.
pub fn write_charts(records: &[ProcessRecord], output_dir: &str) -> Result<(ChartSet, Vec<String>)> {
    let set = build_chart_set(records)?;
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for (file, body) in chart_documents(&set)? {
        let path = Path::new(output_dir).join(&file);
        std::fs::write(&path, body)?;
        written.push(path.display().to_string());
    }

    let index = build_index(records, &set, written.clone());
    let index_path = Path::new(output_dir).join(INDEX_FILE);
    crate::output::write_json_file(&index_path, &index)?;
    written.push(index_path.display().to_string());

    info!(output_dir, charts = written.len(), "Chart datasets written");
    Ok((set, written))
}

/// Uploads the chart documents of `set` under `prefix`, then an index listing them.
#[tracing::instrument(skip(s3, records, set))]
pub async fn upload_charts(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    prefix: &str,
    records: &[ProcessRecord],
    set: &ChartSet,
) -> Result<Vec<String>> {
    let mut keys = Vec::new();

    for (file, body) in chart_documents(set)? {
        let key = format!("{prefix}/{file}");
        write_bytes_to_s3(s3, bucket, &key, body, "application/json").await?;
        keys.push(key);
    }

    let index = build_index(records, set, keys.clone());
    let index_key = format!("{prefix}/{INDEX_FILE}");
    write_json_to_s3(s3, bucket, &index_key, &index).await?;
    keys.push(index_key);

    info!(uploaded = keys.len(), "Chart datasets uploaded");
    Ok(keys)
}
