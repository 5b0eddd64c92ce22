//! End-to-end tests of the audio-slicer binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;

fn slicer() -> Command {
    let mut cmd = cargo_bin_cmd!("audio-slicer");
    cmd.env_remove("AUDIO_SLICER_FFMPEG").env_remove("RUST_LOG");
    cmd
}

fn write_job(dir: &Path, job: serde_json::Value) -> PathBuf {
    let path = dir.join("job.json");
    fs::write(&path, serde_json::to_vec_pretty(&job).unwrap()).unwrap();
    path
}

/// Stand-in for ffmpeg: appends its arguments to `calls.log` and creates the
/// output file. Outputs with "broken" in the name fail like a bad input would.
#[cfg(unix)]
fn fake_ffmpeg(dir: &Path) -> (PathBuf, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let log = dir.join("calls.log");
    let script = dir.join("ffmpeg");
    let body = format!(
        r#"#!/bin/sh
echo "$*" >> '{log}'
for last; do :; done
case "$last" in
  *broken*)
    echo 'Invalid data found when processing input' >&2
    exit 1
    ;;
esac
: > "$last"
"#,
        log = log.display()
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    (script, log)
}

#[test]
fn test_missing_argument_exits_with_one() {
    slicer()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("CONFIG"));
}

#[test]
fn test_help_exits_successfully() {
    slicer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    slicer()
        .arg(dir.path().join("nope.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: config file not found"));
}

#[test]
fn test_malformed_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.json");
    fs::write(&path, "{\"source\": ").unwrap();

    slicer()
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed JSON document"));
}

#[test]
fn test_empty_segments_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(dir.path(), json!({"source": "a.mp3", "segments": []}));

    slicer()
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'segments' cannot be empty"));
}

#[test]
fn test_missing_segments_field() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(dir.path(), json!({"source": "a.mp3"}));

    slicer()
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "missing required field 'segments'",
        ));
}

#[test]
fn test_explicit_ffmpeg_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp3");
    fs::write(&source, b"audio").unwrap();
    let job = write_job(
        dir.path(),
        json!({"source": source, "segments": [{"start": "0", "end": "1", "output": "a.mp3"}]}),
    );

    slicer()
        .arg(&job)
        .arg("--ffmpeg")
        .arg(dir.path().join("no-such-ffmpeg"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("command not found"));
}

#[cfg(unix)]
#[test]
fn test_bad_segment_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let (ffmpeg, log) = fake_ffmpeg(dir.path());
    let source = dir.path().join("source.mp3");
    fs::write(&source, b"audio").unwrap();
    let out = |name: &str| dir.path().join(name);
    let job = write_job(
        dir.path(),
        json!({
            "source": source,
            "segments": [
                {"start": "0", "end": "10", "output": out("one.mp3")},
                {"start": "a:b", "end": "20", "output": out("two.mp3")},
                {"start": "00:20", "end": 30.5, "output": out("three.mp3")}
            ]
        }),
    );

    slicer()
        .arg(&job)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .assert()
        .success()
        .stdout(predicate::str::contains("[2/3]"))
        .stdout(predicate::str::contains("invalid time format: 'a:b'"))
        .stdout(predicate::str::contains("Completed: 2 succeeded, 1 failed"));

    let calls = fs::read_to_string(&log).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        format!(
            "-ss 0 -to 10 -i {} -map_metadata -1 -vn -c copy -y {}",
            source.display(),
            out("one.mp3").display()
        )
    );
    assert!(calls[1].starts_with("-ss 20 -to 30.5 "));
    assert!(out("one.mp3").exists());
    assert!(!out("two.mp3").exists());
    assert!(out("three.mp3").exists());
}

#[cfg(unix)]
#[test]
fn test_non_string_output_fails_only_that_segment() {
    let dir = tempfile::tempdir().unwrap();
    let (ffmpeg, log) = fake_ffmpeg(dir.path());
    let source = dir.path().join("source.mp3");
    fs::write(&source, b"audio").unwrap();
    let job = write_job(
        dir.path(),
        json!({
            "source": source,
            "segments": [
                {"start": "0", "end": "1", "output": dir.path().join("ok.mp3")},
                {"start": "1", "end": "2", "output": 5}
            ]
        }),
    );

    slicer()
        .arg(&job)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .assert()
        .success()
        .stdout(predicate::str::contains("output must be a string path, got 5"))
        .stdout(predicate::str::contains("Completed: 1 succeeded, 1 failed"));

    assert_eq!(fs::read_to_string(&log).unwrap().lines().count(), 1);
    assert!(dir.path().join("ok.mp3").exists());
}

#[cfg(unix)]
#[test]
fn test_inverted_range_is_not_cut() {
    let dir = tempfile::tempdir().unwrap();
    let (ffmpeg, log) = fake_ffmpeg(dir.path());
    let source = dir.path().join("source.mp3");
    fs::write(&source, b"audio").unwrap();
    let job = write_job(
        dir.path(),
        json!({
            "source": source,
            "segments": [{"start": "00:10", "end": "00:05", "output": dir.path().join("x.mp3")}]
        }),
    );

    slicer()
        .arg(&job)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid time range"))
        .stdout(predicate::str::contains("Completed: 0 succeeded, 1 failed"));

    assert!(!log.exists());
}

#[cfg(unix)]
#[test]
fn test_missing_source_attempts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (ffmpeg, log) = fake_ffmpeg(dir.path());
    let job = write_job(
        dir.path(),
        json!({
            "source": dir.path().join("missing.mp3"),
            "segments": [{"start": "0", "end": "1", "output": dir.path().join("a.mp3")}]
        }),
    );

    slicer()
        .arg(&job)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[1/1]").not())
        .stderr(predicate::str::contains("error: source file not found"));

    assert!(!log.exists());
}

#[cfg(unix)]
#[test]
fn test_ffmpeg_failure_is_reported_per_segment() {
    let dir = tempfile::tempdir().unwrap();
    let (ffmpeg, _log) = fake_ffmpeg(dir.path());
    let source = dir.path().join("source.mp3");
    fs::write(&source, b"audio").unwrap();
    let report = dir.path().join("report.json");
    let job = write_job(
        dir.path(),
        json!({
            "source": source,
            "segments": [
                {"start": "0", "end": "5", "output": dir.path().join("broken.mp3")},
                {"start": "5", "end": "9", "output": dir.path().join("fine.mp3")}
            ]
        }),
    );

    slicer()
        .arg(&job)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to cut segment"))
        .stdout(predicate::str::contains(
            "Invalid data found when processing input",
        ))
        .stdout(predicate::str::contains("Completed: 1 succeeded, 1 failed"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["succeeded"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["segments"][0]["status"], "failed");
    assert_eq!(
        report["segments"][0]["stderr"],
        "Invalid data found when processing input"
    );
    assert_eq!(report["segments"][1]["status"], "ok");
}

#[cfg(unix)]
#[test]
fn test_dry_run_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (ffmpeg, log) = fake_ffmpeg(dir.path());
    let source = dir.path().join("source.mp3");
    fs::write(&source, b"audio").unwrap();
    let job = write_job(
        dir.path(),
        json!({
            "source": source,
            "segments": [{"start": "1:00", "end": "1:30", "output": dir.path().join("a.mp3")}]
        }),
    );

    slicer()
        .arg(&job)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("-ss 60 -to 90"))
        .stdout(predicate::str::contains("-map_metadata -1 -vn -c copy -y"));

    assert!(!log.exists());
    assert!(!dir.path().join("a.mp3").exists());
}

#[cfg(unix)]
#[test]
fn test_rerun_issues_identical_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (ffmpeg, log) = fake_ffmpeg(dir.path());
    let source = dir.path().join("source.mp3");
    fs::write(&source, b"audio").unwrap();
    let job = write_job(
        dir.path(),
        json!({
            "source": source,
            "segments": [
                {"start": "0.5", "end": "00:00:01.75", "output": dir.path().join("a.mp3")},
                {"start": 2, "end": "0:03", "output": dir.path().join("b.mp3")}
            ]
        }),
    );

    for _ in 0..2 {
        slicer()
            .arg(&job)
            .arg("--ffmpeg")
            .arg(&ffmpeg)
            .assert()
            .success();
    }

    let calls = fs::read_to_string(&log).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], calls[2]);
    assert_eq!(calls[1], calls[3]);
}
