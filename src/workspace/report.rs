use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Summary of a successful extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub input: PathBuf,
    pub artifact: PathBuf,
    pub artifact_size: u64,
    pub tool: PathBuf,
    pub tool_exit_code: Option<i32>,
    pub tool_duration: Duration,
    pub total_duration: Duration,
    pub completed_at: DateTime<Utc>,
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    pub fn display_summary(&self) -> String {
        format!(
            "Input: {}\nArtifact: {}\nSize: {} bytes\nTool: {}",
            self.input.display(),
            self.artifact.display(),
            self.artifact_size,
            self.tool.display()
        )
    }
}
