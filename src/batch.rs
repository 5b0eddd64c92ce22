use crate::cutter::SegmentExecutor;
use crate::ffmpeg::ExecutionFailure;
use crate::job::{JobConfig, OutputSpec, SegmentSpec};
use crate::time::{TimeOffset, TimeParseError, parse_time};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}

/// Why a single segment was not cut. None of these stop the batch.
#[derive(Debug, Error)]
pub enum SegmentFailure {
    #[error("{field}: {error}")]
    InvalidTimeFormat {
        field: &'static str,
        error: TimeParseError,
    },
    #[error("invalid time range: start ({start}s) >= end ({end}s)")]
    InvalidRange { start: TimeOffset, end: TimeOffset },
    #[error("negative start offset: {start}s")]
    NegativeOffset { start: TimeOffset },
    #[error("output must be a string path, got {0}")]
    InvalidOutput(String),
    #[error(transparent)]
    Execution(#[from] ExecutionFailure),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

#[derive(Debug)]
pub struct SegmentOutcome {
    /// 1-based position in the job.
    pub index: usize,
    pub output: OutputSpec,
    pub result: Result<(), SegmentFailure>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<SegmentOutcome>,
}

impl RunSummary {
    fn record(mut self, outcome: SegmentOutcome) -> Self {
        match outcome.result {
            Ok(()) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
        self.outcomes.push(outcome);
        self
    }
}

/// Cut every segment of `job`, in order, with `executor`.
///
/// Only a missing source aborts the run, and it does so before any segment is
/// touched. Everything that goes wrong afterwards is recorded against the
/// segment it happened in.
pub fn run_batch(
    job: &JobConfig,
    executor: &mut dyn SegmentExecutor,
) -> Result<RunSummary, BatchError> {
    if !job.source.exists() {
        return Err(BatchError::SourceNotFound(job.source.clone()));
    }

    let total = job.segments.len();
    println!("ℹ️ Source: {}", job.source.display());
    println!("ℹ️ Total segments: {}\n", total);
    tracing::info!(source = %job.source.display(), total, "starting batch");

    let summary = job
        .segments
        .iter()
        .enumerate()
        .fold(RunSummary::default(), |summary, (i, segment)| {
            let index = i + 1;
            println!("[{}/{}]", index, total);

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                process_segment(&job.source, segment, &mut *executor)
            }))
            .unwrap_or_else(|payload| Err(SegmentFailure::Unexpected(panic_message(&*payload))));

            report_outcome(index, segment, &result);
            println!();

            summary.record(SegmentOutcome {
                index,
                output: segment.output.clone(),
                result,
            })
        });

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "batch finished"
    );
    Ok(summary)
}

fn process_segment(
    source: &Path,
    segment: &SegmentSpec,
    executor: &mut dyn SegmentExecutor,
) -> Result<(), SegmentFailure> {
    let start = parse_time(&segment.start)
        .map_err(|error| SegmentFailure::InvalidTimeFormat {
            field: "start",
            error,
        })?;
    let end = parse_time(&segment.end).map_err(|error| SegmentFailure::InvalidTimeFormat {
        field: "end",
        error,
    })?;

    if start >= end {
        return Err(SegmentFailure::InvalidRange { start, end });
    }
    if start.is_negative() {
        return Err(SegmentFailure::NegativeOffset { start });
    }
    let output = segment
        .output
        .path()
        .ok_or_else(|| SegmentFailure::InvalidOutput(segment.output.to_string()))?;

    println!(
        "  Processing: {} (start={}s, end={}s)",
        output.display(),
        start,
        end
    );
    executor.cut_segment(source, start, end, output)?;
    Ok(())
}

fn report_outcome(index: usize, segment: &SegmentSpec, result: &Result<(), SegmentFailure>) {
    match result {
        Ok(()) => println!("  ✅ Successfully created: {}", segment.output),
        Err(SegmentFailure::Execution(failure)) => {
            println!("  ❌ Failed to cut segment: {}", segment.output);
            println!("    Error: {}", failure);
            if let Some(stderr) = failure.stderr() {
                for line in stderr.lines() {
                    println!("    {}", line);
                }
            }
        }
        Err(failure) => println!("  ❌ {}", failure),
    }

    if let Err(failure) = result {
        tracing::warn!(
            segment = index,
            start = %segment.start,
            end = %segment.end,
            output = %segment.output,
            error = %failure,
            "segment failed"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "segment processing panicked".to_string()
    }
}
