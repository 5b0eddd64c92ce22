use crate::batch::{RunSummary, SegmentFailure};
use crate::job::JobConfig;
use anyhow::Result;
use comfy_table::{Table, presets::UTF8_FULL};
use serde::Serialize;
use std::{fs, io::Write, path::Path};

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct SegmentRecord<'a> {
    pub index: usize,
    pub output: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<&'a str>,
}

/// Machine-readable record of one run, written with `--report`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub source: &'a Path,
    pub succeeded: usize,
    pub failed: usize,
    pub segments: Vec<SegmentRecord<'a>>,
}

impl<'a> RunReport<'a> {
    pub fn new(job: &'a JobConfig, summary: &'a RunSummary) -> Self {
        let segments = summary
            .outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(()) => SegmentRecord {
                    index: outcome.index,
                    output: outcome.output.to_string(),
                    status: Status::Ok,
                    error: None,
                    stderr: None,
                },
                Err(failure) => SegmentRecord {
                    index: outcome.index,
                    output: outcome.output.to_string(),
                    status: Status::Failed,
                    error: Some(failure.to_string()),
                    stderr: match failure {
                        SegmentFailure::Execution(inner) => inner.stderr(),
                        _ => None,
                    },
                },
            })
            .collect();

        RunReport {
            source: &job.source,
            succeeded: summary.succeeded,
            failed: summary.failed,
            segments,
        }
    }
}

pub fn write_report(path: &Path, report: &RunReport<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    let mut file = fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn results_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Output", "Result"]);

    for outcome in &summary.outcomes {
        let result = match &outcome.result {
            Ok(()) => "✅ ok".to_string(),
            Err(failure) => format!("❌ {}", failure),
        };
        table.add_row(vec![
            outcome.index.to_string(),
            outcome.output.to_string(),
            result,
        ]);
    }
    table
}
