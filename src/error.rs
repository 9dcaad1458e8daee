use thiserror::Error;

/// Errors that abort processing of a single report.
///
/// Missing sections, metadata cells, or unparseable cost values are not
/// errors; they degrade to defaults inside the extractors.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid report format: missing top-level table '{0}'")]
    MissingTable(String),

    #[error("invalid report sheet '{sheet}': {reason}")]
    Structure { sheet: String, reason: String },

    #[error("failed to decode workbook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read workbook: {0}")]
    Workbook(String),
}
