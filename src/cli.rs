use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Cut segments out of an audio file with ffmpeg, as described by a JSON job file.
///
/// The job file names the source audio and a list of segments, each with a
/// start, an end (seconds, mm:ss or hh:mm:ss) and an output path. Audio is
/// stream-copied, never re-encoded.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// JSON job file ({"source": "...", "segments": [{"start", "end", "output"}]})
    #[arg(required_unless_present = "check_ffmpeg", value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// ffmpeg binary to use instead of the one found in PATH
    #[arg(long, env = "AUDIO_SLICER_FFMPEG", value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Print the ffmpeg commands without running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write a JSON report of every segment's result to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Show ffmpeg command lines and logs.
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// Check the ffmpeg binary and its version, then exit.
    #[arg(short = 'c', long)]
    pub check_ffmpeg: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
