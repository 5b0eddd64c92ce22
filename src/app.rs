use crate::batch::run_batch;
use crate::cli::Args;
use crate::cutter::{DryRunCutter, FfmpegCutter};
use crate::ffmpeg::{FFmpegError, check_ffmpeg_version, locate_ffmpeg};
use crate::job::JobConfig;
use crate::report::{RunReport, results_table, write_report};
use anyhow::{Context, Result, anyhow, bail};
use std::path::PathBuf;

pub fn run(args: Args) -> Result<()> {
    // Handle --check-ffmpeg command
    if args.check_ffmpeg {
        return handle_ffmpeg_check(args.ffmpeg);
    }

    let config_path = args
        .config
        .as_deref()
        .ok_or_else(|| anyhow!("a job config file is required"))?;

    println!("ℹ️ Loading configuration from {}...", config_path.display());
    let job = JobConfig::load(config_path)?;

    let summary = if args.dry_run {
        // A dry run never spawns anything, so a missing binary is not fatal.
        let binary = locate_ffmpeg(args.ffmpeg.as_deref()).unwrap_or_else(|e| {
            tracing::info!(error = %e, "ffmpeg not located, showing commands with bare name");
            PathBuf::from("ffmpeg")
        });
        println!("ℹ️ Dry run, no files will be written.\n");
        run_batch(&job, &mut DryRunCutter::new(binary))?
    } else {
        let binary = locate_ffmpeg(args.ffmpeg.as_deref())?;
        println!("ℹ️ FFmpeg: {}\n", binary.display());
        run_batch(&job, &mut FfmpegCutter::new(binary, args.debug))?
    };

    println!("{}", results_table(&summary));
    println!("{}", "=".repeat(50));
    println!(
        "Completed: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    println!("{}", "=".repeat(50));

    if let Some(report_path) = &args.report {
        write_report(report_path, &RunReport::new(&job, &summary)).with_context(|| {
            format!("failed to write run report to {}", report_path.display())
        })?;
        println!("✅ Wrote run report to {}", report_path.display());
    }

    Ok(())
}

fn handle_ffmpeg_check(explicit: Option<PathBuf>) -> Result<()> {
    println!("🔍 Checking FFmpeg installation...\n");

    let binary = locate_ffmpeg(explicit.as_deref())?;
    println!("✅ FFmpeg found: {}", binary.display());

    match check_ffmpeg_version(&binary) {
        Ok(version_info) => {
            println!(
                "   Version: {}.{}.{}",
                version_info.major, version_info.minor, version_info.patch
            );
            if version_info.is_compatible {
                println!("   Status: ✅ Compatible (minimum required: 4.0.0)");
            } else {
                println!("   Status: ❌ Too old (minimum required: 4.0.0)");
                bail!(
                    "FFmpeg {}.{} is too old for stream-copy cutting",
                    version_info.major,
                    version_info.minor
                );
            }
        }
        Err(FFmpegError::VersionParseError) => {
            println!("⚠️  Could not parse FFmpeg version from output, assuming a development build");
        }
        Err(e) => return Err(e.into()),
    }

    println!("\n🎉 FFmpeg check complete!");
    Ok(())
}
