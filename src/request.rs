use anyhow::{Context, Result};
use serde::Deserialize;

/// A chart build request: which reports to compare and what to call them.
///
/// Stored as JSON on disk:
/// ```json
/// {
///   "files": ["https://.../1729777526733-base_output.json", "reports/alt_output.json"],
///   "scenarios": ["Base case", "Alternative"]
/// }
/// ```
/// Files without a scenario name are called `"Scenario <n>"`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartRequest {
    pub files: Vec<String>,
    #[serde(default)]
    pub scenarios: Vec<String>,
}

/// One report of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSource {
    pub source: String,
    pub scenario: Option<String>,
}

impl ChartRequest {
    /// Loads a request from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading request '{path}'"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let request: ChartRequest = serde_json::from_str(content)?;
        if request.files.is_empty() {
            anyhow::bail!("No files provided");
        }
        Ok(request)
    }

    /// Pairs every file with its scenario name.
    pub fn sources(&self) -> Vec<ChartSource> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| ChartSource {
                source: file.clone(),
                scenario: Some(
                    self.scenarios
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("Scenario {}", i + 1)),
                ),
            })
            .collect()
    }
}

/// Pairs command-line sources with `--scenario` names by position.
///
/// Sources without a name are named after their file.
pub fn sources_from_args(files: &[String], scenarios: &[String]) -> Vec<ChartSource> {
    files
        .iter()
        .enumerate()
        .map(|(i, file)| ChartSource {
            source: file.clone(),
            scenario: scenarios.get(i).cloned(),
        })
        .collect()
}
