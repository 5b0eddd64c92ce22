use crate::ffmpeg::{ExecutionFailure, run_ffmpeg};
use crate::time::TimeOffset;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Something that can cut `[start, end)` out of `source` into `output`.
pub trait SegmentExecutor {
    fn cut_segment(
        &mut self,
        source: &Path,
        start: TimeOffset,
        end: TimeOffset,
        output: &Path,
    ) -> Result<(), ExecutionFailure>;
}

/// Build the ffmpeg arguments for one cut.
///
/// Metadata and non-audio streams are dropped, the audio stream is copied
/// without re-encoding and an existing `output` is overwritten.
pub fn build_cut_args(
    source: &Path,
    start: TimeOffset,
    end: TimeOffset,
    output: &Path,
) -> Vec<OsString> {
    let mut args = vec![
        OsString::from("-ss"),
        OsString::from(start.to_string()),
        OsString::from("-to"),
        OsString::from(end.to_string()),
        OsString::from("-i"),
        source.as_os_str().to_owned(),
    ];
    args.extend(["-map_metadata", "-1", "-vn", "-c", "copy", "-y"].map(OsString::from));
    args.push(output.as_os_str().to_owned());
    args
}

pub struct FfmpegCutter {
    binary: PathBuf,
    debug: bool,
}

impl FfmpegCutter {
    pub fn new(binary: PathBuf, debug: bool) -> Self {
        Self { binary, debug }
    }
}

impl SegmentExecutor for FfmpegCutter {
    fn cut_segment(
        &mut self,
        source: &Path,
        start: TimeOffset,
        end: TimeOffset,
        output: &Path,
    ) -> Result<(), ExecutionFailure> {
        let args = build_cut_args(source, start, end, output);
        run_ffmpeg(&self.binary, &args, self.debug)?;
        Ok(())
    }
}

/// Prints the command each cut would run instead of running it.
pub struct DryRunCutter {
    binary: PathBuf,
}

impl DryRunCutter {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

impl SegmentExecutor for DryRunCutter {
    fn cut_segment(
        &mut self,
        source: &Path,
        start: TimeOffset,
        end: TimeOffset,
        output: &Path,
    ) -> Result<(), ExecutionFailure> {
        let args = build_cut_args(source, start, end, output);
        let line = args
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        println!("  ▶️ {} {}", self.binary.display(), line);
        Ok(())
    }
}
