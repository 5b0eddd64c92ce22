use regex::{Captures, Regex};
use std::{
    env,
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Output},
};
use thiserror::Error;

const MINIMUM_FFMPEG_MAJOR_VERSION: u32 = 4;

#[cfg(windows)]
const FFMPEG_BINARY: &str = "ffmpeg.exe";
#[cfg(not(windows))]
const FFMPEG_BINARY: &str = "ffmpeg";

#[derive(Debug, PartialEq, Eq)]
pub struct FFmpegVersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub is_compatible: bool,
}

#[derive(Debug, Error)]
pub enum FFmpegError {
    #[error(
        "`{0}` command not found. Please ensure it is installed and in your PATH, or pass --ffmpeg."
    )]
    CommandNotFound(String),
    #[error("Failed to run `{0}`: {1}")]
    CommandFailed(String, String),
    #[error("Could not parse ffmpeg version from output.")]
    VersionParseError,
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// A single ffmpeg invocation that did not succeed.
#[derive(Debug, Error)]
pub enum ExecutionFailure {
    #[error("failed to launch `{}`: {error}", binary.display())]
    Spawn { binary: PathBuf, error: io::Error },
    #[error("ffmpeg failed ({status})")]
    NonZeroExit { status: ExitStatus, stderr: String },
}

impl ExecutionFailure {
    /// Captured ffmpeg error output, if the process got far enough to write any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ExecutionFailure::NonZeroExit { stderr, .. } => {
                Some(stderr.trim()).filter(|s| !s.is_empty())
            }
            ExecutionFailure::Spawn { .. } => None,
        }
    }
}

/// Run ffmpeg with `args`, capturing stdout and stderr.
///
/// With `debug` set the full command line and ffmpeg's log output are echoed to
/// stderr. Output is never inherited, so a noisy ffmpeg does not interleave with
/// the progress report.
pub fn run_ffmpeg<S: AsRef<OsStr>>(
    binary: &Path,
    args: &[S],
    debug: bool,
) -> Result<Output, ExecutionFailure> {
    let mut command = Command::new(binary);
    command.args(args);

    tracing::debug!(command = ?command, "running ffmpeg");
    if debug {
        eprintln!("{:?}", command);
    }

    let output = command.output().map_err(|error| ExecutionFailure::Spawn {
        binary: binary.to_path_buf(),
        error,
    })?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if debug && !stderr.is_empty() {
        eprintln!("{}", stderr.trim_end());
    }

    if !output.status.success() {
        tracing::debug!(status = %output.status, %stderr, "ffmpeg exited with failure");
        return Err(ExecutionFailure::NonZeroExit {
            status: output.status,
            stderr,
        });
    }
    Ok(output)
}

/// Resolve the ffmpeg binary to use for this run.
///
/// An explicit path must name an existing file. Without one, `PATH` is searched.
pub fn locate_ffmpeg(explicit: Option<&Path>) -> Result<PathBuf, FFmpegError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(FFmpegError::CommandNotFound(path.display().to_string()))
        };
    }

    env::var_os("PATH")
        .and_then(|paths| search_path(&paths, FFMPEG_BINARY))
        .ok_or_else(|| FFmpegError::CommandNotFound(FFMPEG_BINARY.to_string()))
}

fn search_path(paths: &OsStr, binary: &str) -> Option<PathBuf> {
    env::split_paths(paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

pub fn check_ffmpeg_version(binary: &Path) -> Result<FFmpegVersionInfo, FFmpegError> {
    let output = match Command::new(binary).arg("-version").output() {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FFmpegError::CommandNotFound(binary.display().to_string()));
        }
        Err(e) => {
            return Err(FFmpegError::CommandFailed(
                binary.display().to_string(),
                e.to_string(),
            ));
        }
    };
    if !output.status.success() {
        return Err(FFmpegError::CommandFailed(
            format!("{} -version", binary.display()),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let version_info = String::from_utf8_lossy(&output.stdout);
    parse_version_banner(&version_info)?.ok_or(FFmpegError::VersionParseError)
}

fn parse_version_banner(banner: &str) -> Result<Option<FFmpegVersionInfo>, FFmpegError> {
    let re = Regex::new(r"ffmpeg version n?(\d+)\.(\d+)(?:\.(\d+))?")?;

    let Some(caps) = re.captures(banner) else {
        return Ok(None);
    };
    let (Some(major), Some(minor)) = (capture_u32(&caps, 1), capture_u32(&caps, 2)) else {
        return Ok(None);
    };
    let patch = capture_u32(&caps, 3).unwrap_or(0);

    Ok(Some(FFmpegVersionInfo {
        major,
        minor,
        patch,
        is_compatible: major >= MINIMUM_FFMPEG_MAJOR_VERSION,
    }))
}

/// Numeric value of capture group `index`, if it matched and fits in a `u32`.
fn capture_u32(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}
